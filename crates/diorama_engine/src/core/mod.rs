//! # Core Engine Module
//!
//! Shared configuration used across the engine's subsystems.

pub mod config;

pub use crate::foundation;

pub use config::{
    CameraConfig,
    Config,
    ConfigError,
    ConfigFormat,
    EngineConfig,
    ViewerConfig,
};
