//! Fog of war.
//!
//! Visibility is not stored as a grid of booleans. It is the result of
//! replaying an ordered log of immutable reveal/hide areas:
//!
//! ```text
//! FogState (revealedAreas + hiddenAreas, each timestamped)
//!   └── ordered_operations()   merge + sort by createdAt
//!         └── composite()      opaque fill, then reveal = clear, hide = repaint
//!               └── FogCompositor   cache keyed by (revision, width, height)
//! ```
//!
//! Because replay is chronological, a hide issued after a reveal covers the
//! revealed pixels again, and a later reveal exposes them once more.

mod area;
mod compositor;
mod state;
mod tools;

pub use area::{FogArea, FogShape};
pub use compositor::{composite, FogCompositor, FogRaster};
pub use state::{FogColor, FogOperation, FogState};
pub use tools::{FogGesture, FogTool, FogToolSettings, FogToolShape};
