//! # Battlemap Canvas
//!
//! Spatial canvas and visibility engine for a tabletop battle map: coordinate
//! transforms, viewport control, fog of war, token placement, presentation
//! bounds, movement measurement and mirroring to a player display.
//!
//! ## Core Components
//!
//! - **Geometry**: screen ↔ canvas ↔ grid transforms with a validated grid size
//! - **Viewport / Controller**: wheel zoom toward the pointer, pan by tool,
//!   space or middle button, recenter
//! - **Fog**: append-only reveal/hide log composited into a cached raster,
//!   plus rectangle, circle, polygon and brush tools
//! - **Placement**: nearest free cell by bounded square spiral
//! - **Presentation**: the crop shown to players, moved and resized by handles
//! - **Measure**: Chebyshev movement paths priced in feet
//! - **Mirror**: debounced full snapshots to the presentation surface
//! - **Session**: routes input events to all of the above
//!
//! ## Architecture
//!
//! ```text
//! InputEvent ──► Session ──► ViewportController ──► Viewport
//!                   │
//!                   ├──► FogGesture ──► FogState ──► FogCompositor ──► FogRaster
//!                   ├──► BoundsEditor
//!                   ├──► MovementMeasurer
//!                   ├──► placement::spiral_search
//!                   │
//!                   ├──► EncounterProvider   (committed updates)
//!                   └──► StateMirror ──► SnapshotSink ──► presentation surface
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use battlemap_canvas::{Encounter, InMemoryEncounterStore, Session, Viewport};
//!
//! let store = InMemoryEncounterStore::new(Encounter::from_json(&json)?);
//! let mut session = Session::new(store, Viewport::new(1280.0, 720.0))?;
//! session.recenter();
//! session.handle_event(event, Instant::now());
//! ```

pub mod controller;
pub mod encounter;
pub mod fog;
pub mod geometry;
pub mod input;
pub mod measure;
pub mod mirror;
pub mod placement;
pub mod presentation;
pub mod renderer;
pub mod session;
pub mod viewport;

pub use controller::{PanSource, ViewportController};
pub use encounter::{
    CreatureSize, Encounter, EncounterProvider, EncounterUpdate, InMemoryEncounterStore,
    MapInfo, Token, TokenKind,
};
pub use fog::{
    FogArea, FogColor, FogCompositor, FogGesture, FogOperation, FogRaster, FogShape, FogState,
    FogTool, FogToolSettings, FogToolShape,
};
pub use geometry::{GridCell, GridSize, Point, Rect, ViewTransform};
pub use input::{InputEvent, Key, MouseButton};
pub use measure::{chebyshev_path, distance_feet, MeasureOverlay, MovementMeasurer};
pub use mirror::{
    presentation_channel, PresentationReceiver, Snapshot, SnapshotSink, StateMirror, WatchSink,
};
pub use placement::{spiral_search, PlacementBounds, PlacementHint};
pub use presentation::{BoundsEditor, BoundsHit, Handle};
pub use session::{Session, Tool};
pub use viewport::{ViewState, Viewport};
