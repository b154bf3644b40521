use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const SCREEN_WIDTH: u32 = 1280;
pub const SCREEN_HEIGHT: u32 = 720;
pub const WORLD_SIZE: usize = 64;
pub const PHYSICS_FRAME_TIME: f32 = 1.0 / 60.0;
pub const MAX_PHYSICS_STEPS_PER_FRAME: u32 = 5;

pub const MAX_HEALTH: i32 = 100;
pub const MOVE_SPEED: f32 = 0.05;
pub const MOVE_DEAD_ZONE: f32 = 0.01;
pub const PLAYER_SPAWN_CELL: (usize, usize) = (1, 1);

pub const WEAPON_COOLDOWN_TICKS: u32 = 10;
pub const WEAPON_RANGE: f32 = 20.0;
pub const WEAPON_STEP: f32 = 0.1;
pub const WEAPON_HIT_RADIUS: f32 = 0.5;
pub const WEAPON_DAMAGE: i32 = 50;

pub const SCORE_ENEMY_HIT: u32 = 10;
pub const SCORE_ENEMY_KILL: u32 = 50;
pub const SCORE_PORTAL: u32 = 100;

pub const ENEMY_SPAWN_CHANCE: f64 = 0.05;
pub const MEDKIT_SPAWN_CHANCE: f64 = 0.02;

pub const FOV_DEFAULT: f32 = 66.0;
pub const FOV_MIN: f32 = 40.0;
pub const FOV_MAX: f32 = 120.0;
pub const FOV_STEP: f32 = 1.0;
pub const SENSITIVITY_DEFAULT: f32 = 0.003;
pub const SENSITIVITY_MIN: f32 = 0.001;
pub const SENSITIVITY_MAX: f32 = 0.01;
pub const SENSITIVITY_STEP: f32 = 0.0005;

/// Rendering quality tier. Selects both the ray stride and the wall fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    #[default]
    Medium,
    Low,
}

impl Quality {
    /// Only every n-th screen column is ray-cast at this tier.
    pub fn ray_stride(self) -> usize {
        match self {
            Quality::High => 1,
            Quality::Medium => 2,
            Quality::Low => 4,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Quality::High => Quality::Medium,
            Quality::Medium => Quality::Low,
            Quality::Low => Quality::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::High => "HIGH",
            Quality::Medium => "MEDIUM",
            Quality::Low => "LOW",
        }
    }
}

/// User-tunable values read by the engine every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fov_degrees: f32,
    pub look_sensitivity: f32,
    pub quality: Quality,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fov_degrees: FOV_DEFAULT,
            look_sensitivity: SENSITIVITY_DEFAULT,
            quality: Quality::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self, EngineError> {
        let settings: Settings = toml::from_str(contents)?;
        Ok(settings.clamped())
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Loads `path`, falling back to defaults when it is missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable settings file");
                Self::default()
            }
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            fov_degrees: self.fov_degrees.clamp(FOV_MIN, FOV_MAX),
            look_sensitivity: self.look_sensitivity.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX),
            quality: self.quality,
        }
    }

    pub fn adjust_fov(&mut self, steps: i32) {
        self.fov_degrees = (self.fov_degrees + steps as f32 * FOV_STEP).clamp(FOV_MIN, FOV_MAX);
    }

    pub fn adjust_sensitivity(&mut self, steps: i32) {
        self.look_sensitivity = (self.look_sensitivity + steps as f32 * SENSITIVITY_STEP)
            .clamp(SENSITIVITY_MIN, SENSITIVITY_MAX);
    }

    pub fn cycle_quality(&mut self) {
        self.quality = self.quality.next();
    }
}
