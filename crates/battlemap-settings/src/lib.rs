//! Battlemap Settings Crate
//!
//! Handles application configuration: canvas defaults, fog tool tuning,
//! player view mirroring and logging, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{CanvasSettings, Config, FogSettings, LoggingSettings, MirrorSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
