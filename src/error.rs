use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("texture dimensions must be powers of two, got {width}x{height}")]
    TextureSize { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
