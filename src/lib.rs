//! # Battlemap
//!
//! Spatial canvas and visibility engine for tabletop battle maps:
//! - Pan and zoom over a gridded map image
//! - Fog of war painted with reveal and hide tools, replayed in chronological order
//! - Token placement that spirals out to the nearest free cell
//! - A presentation rectangle framing what players see, mirrored to a second surface
//! - Chebyshev movement measurement in 5 ft squares
//!
//! ## Architecture
//!
//! Battlemap is organized as a workspace with multiple crates:
//!
//! 1. **battlemap-core** - Error types, shared constants
//! 2. **battlemap-canvas** - Geometry, viewport, fog, placement, presentation, mirror, session
//! 3. **battlemap-settings** - JSON/TOML configuration
//! 4. **battlemap** - Command-line renderer that integrates all crates

pub use battlemap_canvas::renderer;

pub use battlemap_core::{Error, Result};

pub use battlemap_canvas::{
    CreatureSize, Encounter, EncounterProvider, EncounterUpdate, FogOperation, FogState,
    GridCell, GridSize, InMemoryEncounterStore, MapInfo, Point, Rect, Session, Token, TokenKind,
    Tool, Viewport,
};

pub use battlemap_settings::{Config, LoggingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, falling back to `settings.level`
/// - Pretty console output, or JSON lines when `settings.json` is set
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}
