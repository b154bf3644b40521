use std::{
    cell::Cell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the single best-score integer lives between runs.
pub trait BestScoreStore {
    fn load(&self) -> Result<u32>;
    fn save(&mut self, score: u32) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default)]
    game_prefs: GamePrefs,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GamePrefs {
    #[serde(default)]
    best_score: u32,
}

/// Stores the best score under `[game_prefs]` in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlScoreStore {
    path: PathBuf,
}

impl TomlScoreStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for TomlScoreStore {
    fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }
        let contents = fs::read_to_string(&self.path)?;
        let prefs: PrefsFile = toml::from_str(&contents)?;
        Ok(prefs.game_prefs.best_score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        let prefs = PrefsFile {
            game_prefs: GamePrefs { best_score: score },
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, toml::to_string(&prefs)?)?;
        Ok(())
    }
}

/// In-process store; clones share the same value and save counter.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Rc<Cell<u32>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryScoreStore {
    pub fn with_best(best: u32) -> Self {
        let store = Self::default();
        store.best.set(best);
        store
    }

    pub fn best(&self) -> u32 {
        self.best.get()
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl BestScoreStore for MemoryScoreStore {
    fn load(&self) -> Result<u32> {
        Ok(self.best.get())
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.best.set(score);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
