//! Error handling for Battlemap
//!
//! Provides error types for every layer of the canvas engine:
//! - Geometry errors (grid sizes, non-finite coordinates)
//! - Fog errors (degenerate or unordered fog areas)
//! - Mirror errors (presentation channel delivery)
//! - Encounter errors (state provider failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when a grid or raster size would otherwise divide by zero or
/// allocate nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Grid size must be a positive number of pixels
    #[error("Grid size must be greater than zero, got {size}")]
    InvalidGridSize {
        /// The rejected grid size.
        size: i64,
    },

    /// Viewport dimensions must be positive
    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewportSize {
        /// The rejected width.
        width: f64,
        /// The rejected height.
        height: f64,
    },
}

/// Fog-of-war error type
///
/// Fog compositing depends on a total order of areas by timestamp, so any
/// area that would break that order is rejected before it is stored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FogError {
    /// Area has zero or negative extent
    #[error("Degenerate fog {kind}: {reason}")]
    Degenerate {
        /// The shape kind.
        kind: String,
        /// Why the geometry was rejected.
        reason: String,
    },

    /// Area carries no creation timestamp
    #[error("Fog area {id} is missing its creation timestamp")]
    MissingTimestamp {
        /// The area id.
        id: String,
    },

    /// Area timestamp does not advance past the newest stored area
    #[error("Fog area timestamp {created_at} is not after the latest area ({latest})")]
    OutOfOrder {
        /// The rejected timestamp.
        created_at: u64,
        /// The newest timestamp already stored.
        latest: u64,
    },

    /// Newest stored area already carries the largest possible timestamp
    #[error("No fog timestamp is available after {latest}")]
    TimestampExhausted {
        /// The newest timestamp already stored.
        latest: u64,
    },

    /// Fog colour could not be parsed
    #[error("Invalid fog colour '{value}'")]
    InvalidColor {
        /// The rejected colour string.
        value: String,
    },

    /// Opacity outside [0, 1]
    #[error("Fog opacity {opacity} is outside [0, 1]")]
    InvalidOpacity {
        /// The rejected opacity.
        opacity: f32,
    },

    /// Raster could not be allocated for the map size
    #[error("Cannot allocate a {width}x{height} fog raster")]
    RasterAllocation {
        /// Map width in pixels.
        width: u32,
        /// Map height in pixels.
        height: u32,
    },
}

/// State mirror error type
///
/// Represents delivery failures on the one-way channel to the presentation
/// surface. None of these are retried; the surface recovers by requesting a
/// resend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// Presentation surface is not listening
    #[error("Presentation surface is not listening")]
    NotListening,

    /// Snapshot could not be serialized
    #[error("Snapshot serialization failed: {reason}")]
    Serialization {
        /// The serializer message.
        reason: String,
    },

    /// Channel was closed by the presentation side
    #[error("Presentation channel closed")]
    ChannelClosed,
}

/// Encounter state error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncounterError {
    /// The encounter has no map loaded
    #[error("Encounter has no map")]
    NoMap,

    /// Referenced token does not exist
    #[error("Token {id} not found")]
    TokenNotFound {
        /// The missing token id.
        id: String,
    },

    /// The state provider refused an update
    #[error("Encounter provider rejected update: {reason}")]
    ProviderRejected {
        /// The provider's reason.
        reason: String,
    },
}

/// Main error type for Battlemap
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Fog error
    #[error(transparent)]
    Fog(#[from] FogError),

    /// Mirror error
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// Encounter error
    #[error(transparent)]
    Encounter(#[from] EncounterError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is a fog error
    pub fn is_fog_error(&self) -> bool {
        matches!(self, Error::Fog(_))
    }

    /// Check if this is a mirror error
    pub fn is_mirror_error(&self) -> bool {
        matches!(self, Error::Mirror(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
