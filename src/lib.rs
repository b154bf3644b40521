//! Grid raycasting engine: maze generation, DDA wall casting, billboard
//! sprites with per-column occlusion, and the fixed-step simulation that
//! drives enemies, rockets, medkits and the level-exit portal.

pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod raycast;
pub mod render;
pub mod score;
pub mod simulation;
pub mod surface;
pub mod texture;
pub mod world;

pub use error::{EngineError, Result};
