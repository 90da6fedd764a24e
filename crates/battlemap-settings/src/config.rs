//! Configuration and settings management for Battlemap
//!
//! Supports JSON and TOML file formats, chosen by file extension, stored in
//! the platform configuration directory by default.
//!
//! Configuration is organized into logical sections:
//! - Canvas defaults (grid size, viewport size)
//! - Fog tool tuning (brush radius and cadence, drag threshold, fog colour)
//! - Player view mirroring (debounce delay)
//! - Logging

use battlemap_canvas::{
    presentation_channel, FogColor, FogState, FogToolSettings, GridSize, PresentationReceiver,
    SnapshotSink, StateMirror, Viewport,
};
use battlemap_core::constants::{
    DEFAULT_BRUSH_INTERVAL_MS, DEFAULT_BRUSH_RADIUS, DEFAULT_FOG_OPACITY, FOG_DRAG_THRESHOLD,
    MIRROR_COALESCE_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Canvas defaults applied when an encounter does not specify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Grid size for maps that omit one
    pub grid_size: GridSize,
    /// Viewport width in screen pixels
    pub viewport_width: f64,
    /// Viewport height in screen pixels
    pub viewport_height: f64,
    /// Fit the map into view when an encounter is opened
    pub recenter_on_open: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            grid_size: GridSize::default(),
            viewport_width: 1280.0,
            viewport_height: 800.0,
            recenter_on_open: true,
        }
    }
}

/// Fog-of-war tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogSettings {
    /// Fog colour for new encounters
    pub color: FogColor,
    /// Fog opacity for new encounters, 0.0 to 1.0
    pub opacity: f32,
    /// Brush stamp radius in canvas pixels
    pub brush_radius: f64,
    /// Milliseconds between brush stamps
    pub brush_interval_ms: u64,
    /// Rectangle and circle drags smaller than this are discarded
    pub drag_threshold: f64,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            color: FogColor::default(),
            opacity: DEFAULT_FOG_OPACITY,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            brush_interval_ms: DEFAULT_BRUSH_INTERVAL_MS,
            drag_threshold: FOG_DRAG_THRESHOLD,
        }
    }
}

/// Player view mirroring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    pub enabled: bool,
    /// Quiet period before a change is pushed
    pub coalesce_ms: u64,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            coalesce_ms: MIRROR_COALESCE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of pretty output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasSettings,
    pub fog: FogSettings,
    pub mirror: MirrorSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/battlemap/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })?;
        Ok(dir.join("battlemap").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {}", path.display());

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let canvas = &self.canvas;
        if !(canvas.viewport_width > 0.0 && canvas.viewport_width.is_finite()) {
            return Err(ConfigError::out_of_range(
                "canvas.viewport_width",
                canvas.viewport_width,
            ));
        }
        if !(canvas.viewport_height > 0.0 && canvas.viewport_height.is_finite()) {
            return Err(ConfigError::out_of_range(
                "canvas.viewport_height",
                canvas.viewport_height,
            ));
        }

        let fog = &self.fog;
        if !(0.0..=1.0).contains(&fog.opacity) {
            return Err(ConfigError::out_of_range("fog.opacity", fog.opacity));
        }
        if !(fog.brush_radius > 0.0 && fog.brush_radius.is_finite()) {
            return Err(ConfigError::out_of_range("fog.brush_radius", fog.brush_radius));
        }
        if fog.brush_interval_ms == 0 {
            return Err(ConfigError::out_of_range("fog.brush_interval_ms", 0));
        }
        if !(fog.drag_threshold >= 0.0 && fog.drag_threshold.is_finite()) {
            return Err(ConfigError::out_of_range(
                "fog.drag_threshold",
                fog.drag_threshold,
            ));
        }

        Ok(())
    }

    pub fn fog_tool_settings(&self) -> FogToolSettings {
        FogToolSettings {
            drag_threshold: self.fog.drag_threshold,
            brush_radius: self.fog.brush_radius,
            brush_interval: Duration::from_millis(self.fog.brush_interval_ms),
        }
    }

    /// Fog state for an encounter created from scratch.
    pub fn new_fog_state(&self) -> FogState {
        FogState::new(true, self.fog.color, self.fog.opacity)
    }

    pub fn mirror_delay(&self) -> Duration {
        Duration::from_millis(self.mirror.coalesce_ms)
    }

    /// A mirror and its presentation receiver, or `None` when mirroring is
    /// disabled.
    pub fn presentation_mirror(
        &self,
    ) -> Option<(StateMirror<Box<dyn SnapshotSink>>, PresentationReceiver)> {
        if !self.mirror.enabled {
            tracing::debug!("Player view mirroring disabled");
            return None;
        }
        let (sink, receiver) = presentation_channel();
        let sink: Box<dyn SnapshotSink> = Box::new(sink);
        Some((StateMirror::with_delay(sink, self.mirror_delay()), receiver))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.viewport_width, self.canvas.viewport_height)
    }
}
