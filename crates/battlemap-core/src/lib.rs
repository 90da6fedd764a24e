//! # Battlemap Core
//!
//! Shared error types and constants for the Battlemap workspace.
//! Every other crate reports failures through [`Error`] and reads its
//! numeric limits (zoom range, minimum presentation size, fog thresholds)
//! from [`constants`].

pub mod constants;
pub mod error;

pub use error::{EncounterError, Error, FogError, GeometryError, MirrorError, Result};
