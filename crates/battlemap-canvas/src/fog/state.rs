//! Fog-of-war state: the ordered operation log and its presentation settings.

use std::sync::atomic::{AtomicU64, Ordering};

use battlemap_core::constants::{DEFAULT_FOG_COLOR, DEFAULT_FOG_OPACITY};
use battlemap_core::{FogError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::area::{FogArea, FogShape};
use crate::geometry::Rect;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Whether an area cuts fog away or paints it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FogOperation {
    Reveal,
    Hide,
}

impl std::fmt::Display for FogOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reveal => write!(f, "reveal"),
            Self::Hide => write!(f, "hide"),
        }
    }
}

/// Opaque RGB fog colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FogColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FogColor {
    pub const BLACK: FogColor = FogColor { r: 0, g: 0, b: 0 };

    /// Parses `#rrggbb` or `#rgb`.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || FogError::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid().into());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Ok(Self {
                    r: expand(&hex[0..1])?,
                    g: expand(&hex[1..2])?,
                    b: expand(&hex[2..3])?,
                })
            }
            _ => Err(invalid().into()),
        }
    }
}

impl Default for FogColor {
    fn default() -> Self {
        Self::parse(DEFAULT_FOG_COLOR).unwrap_or(Self::BLACK)
    }
}

impl std::fmt::Display for FogColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for FogColor {
    type Error = battlemap_core::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FogColor> for String {
    fn from(color: FogColor) -> Self {
        color.to_string()
    }
}

/// The encounter's fog of war.
///
/// Areas are never edited in place. Every mutation assigns a new revision
/// number, which the compositor uses as its cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FogStateRecord")]
pub struct FogState {
    enabled: bool,
    color: FogColor,
    opacity: f32,
    revealed_areas: Vec<FogArea>,
    hidden_areas: Vec<FogArea>,
    #[serde(skip)]
    revision: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FogStateRecord {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    color: FogColor,
    #[serde(default = "default_opacity")]
    opacity: f32,
    #[serde(default)]
    revealed_areas: Vec<FogArea>,
    #[serde(default)]
    hidden_areas: Vec<FogArea>,
}

fn default_enabled() -> bool {
    true
}

fn default_opacity() -> f32 {
    DEFAULT_FOG_OPACITY
}

impl From<FogStateRecord> for FogState {
    fn from(record: FogStateRecord) -> Self {
        let opacity = if record.opacity.is_finite() {
            record.opacity.clamp(0.0, 1.0)
        } else {
            DEFAULT_FOG_OPACITY
        };
        Self {
            enabled: record.enabled,
            color: record.color,
            opacity,
            revealed_areas: record.revealed_areas,
            hidden_areas: record.hidden_areas,
            revision: next_revision(),
        }
    }
}

/// Equality ignores the revision counter.
impl PartialEq for FogState {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.color == other.color
            && self.opacity == other.opacity
            && self.revealed_areas == other.revealed_areas
            && self.hidden_areas == other.hidden_areas
    }
}

impl Default for FogState {
    fn default() -> Self {
        Self::new(true, FogColor::default(), DEFAULT_FOG_OPACITY)
    }
}

impl FogState {
    pub fn new(enabled: bool, color: FogColor, opacity: f32) -> Self {
        Self {
            enabled,
            color,
            opacity: opacity.clamp(0.0, 1.0),
            revealed_areas: Vec::new(),
            hidden_areas: Vec::new(),
            revision: next_revision(),
        }
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.touch();
        }
    }

    pub fn color(&self) -> FogColor {
        self.color
    }

    pub fn set_color(&mut self, color: FogColor) {
        if self.color != color {
            self.color = color;
            self.touch();
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) -> Result<()> {
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(FogError::InvalidOpacity { opacity }.into());
        }
        self.opacity = opacity;
        self.touch();
        Ok(())
    }

    pub fn revealed_areas(&self) -> &[FogArea] {
        &self.revealed_areas
    }

    pub fn hidden_areas(&self) -> &[FogArea] {
        &self.hidden_areas
    }

    pub fn area_count(&self) -> usize {
        self.revealed_areas.len() + self.hidden_areas.len()
    }

    /// Newest timestamp in either list, or 0 when empty.
    pub fn latest_timestamp(&self) -> u64 {
        self.revealed_areas
            .iter()
            .chain(self.hidden_areas.iter())
            .map(FogArea::created_at)
            .max()
            .unwrap_or(0)
    }

    /// A timestamp strictly after every stored area, tracking wall time.
    pub fn next_timestamp(&self) -> Result<u64> {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let latest = self.latest_timestamp();
        let after = latest
            .checked_add(1)
            .ok_or(FogError::TimestampExhausted { latest })?;
        Ok(now.max(after))
    }

    /// Appends an already-built area. Its timestamp must be newer than every stored area.
    pub fn add_area(&mut self, operation: FogOperation, area: FogArea) -> Result<()> {
        let latest = self.latest_timestamp();
        if area.created_at() <= latest {
            tracing::warn!(
                "Rejected {} area {}: timestamp {} not after {}",
                operation,
                area.id(),
                area.created_at(),
                latest
            );
            return Err(FogError::OutOfOrder {
                created_at: area.created_at(),
                latest,
            }
            .into());
        }

        tracing::debug!(
            "Fog {} {} ({}) at t={}",
            operation,
            area.id(),
            area.shape().kind_name(),
            area.created_at()
        );
        match operation {
            FogOperation::Reveal => self.revealed_areas.push(area),
            FogOperation::Hide => self.hidden_areas.push(area),
        }
        self.touch();
        Ok(())
    }

    /// Builds and appends an area stamped with [`FogState::next_timestamp`].
    pub fn apply(&mut self, operation: FogOperation, shape: FogShape) -> Result<Uuid> {
        let area = FogArea::new(shape, self.next_timestamp()?)?;
        let id = area.id();
        self.add_area(operation, area)?;
        Ok(id)
    }

    pub fn reveal(&mut self, shape: FogShape) -> Result<Uuid> {
        self.apply(FogOperation::Reveal, shape)
    }

    pub fn hide(&mut self, shape: FogShape) -> Result<Uuid> {
        self.apply(FogOperation::Hide, shape)
    }

    /// Removes an area from whichever list holds it.
    pub fn remove_area(&mut self, id: Uuid) -> bool {
        let before = self.area_count();
        self.revealed_areas.retain(|a| a.id() != id);
        self.hidden_areas.retain(|a| a.id() != id);
        let removed = self.area_count() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Replaces the history with a single reveal covering the whole map.
    pub fn clear_all(&mut self, map_width: f64, map_height: f64) -> Result<()> {
        let area = FogArea::new(
            FogShape::rectangle(Rect::new(0.0, 0.0, map_width, map_height)),
            self.next_timestamp()?,
        )?;
        self.revealed_areas = vec![area];
        self.hidden_areas.clear();
        self.touch();
        tracing::info!("Fog cleared over {}x{} map", map_width, map_height);
        Ok(())
    }

    /// Discards every area. `enabled`, colour and opacity are kept.
    pub fn reset(&mut self) {
        self.revealed_areas.clear();
        self.hidden_areas.clear();
        self.touch();
        tracing::info!("Fog reset");
    }

    /// Both lists merged in replay order.
    ///
    /// Sorted by `created_at`. The sort is stable over reveals followed by
    /// hides, so on a timestamp tie reveals replay first and hides win.
    pub fn ordered_operations(&self) -> Vec<(FogOperation, &FogArea)> {
        let mut ops: Vec<(FogOperation, &FogArea)> = self
            .revealed_areas
            .iter()
            .map(|a| (FogOperation::Reveal, a))
            .chain(self.hidden_areas.iter().map(|a| (FogOperation::Hide, a)))
            .collect();
        ops.sort_by_key(|(_, area)| area.created_at());
        ops
    }
}
