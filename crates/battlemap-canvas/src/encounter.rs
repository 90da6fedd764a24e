//! Encounter model and the provider boundary.
//!
//! The engine never persists anything itself. It reads an [`Encounter`] from
//! an [`EncounterProvider`] and reports every committed change back as an
//! [`EncounterUpdate`]. Updates are values; the provider decides how to store
//! them.

use battlemap_core::{EncounterError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fog::{FogArea, FogOperation, FogState};
use crate::geometry::{GridCell, GridSize, Rect};
use crate::viewport::ViewState;

/// Creature size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatureSize {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl CreatureSize {
    /// Grid cells spanned along each axis.
    pub fn cells(&self) -> u32 {
        match self {
            CreatureSize::Tiny | CreatureSize::Small | CreatureSize::Medium => 1,
            CreatureSize::Large => 2,
            CreatureSize::Huge => 3,
            CreatureSize::Gargantuan => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Player,
    #[default]
    Monster,
    Npc,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Player => write!(f, "player"),
            TokenKind::Monster => write!(f, "monster"),
            TokenKind::Npc => write!(f, "npc"),
        }
    }
}

/// A token on the map. Occupancy is its anchor cell only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: TokenKind,
    pub grid_x: i32,
    pub grid_y: i32,
    #[serde(default)]
    pub size: CreatureSize,
}

impl Token {
    /// Creates a token at `cell`, clamping negative coordinates to zero.
    pub fn new(name: impl Into<String>, kind: TokenKind, size: CreatureSize, cell: GridCell) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            grid_x: cell.x.max(0),
            grid_y: cell.y.max(0),
            size,
        }
    }

    pub fn cell(&self) -> GridCell {
        GridCell::new(self.grid_x, self.grid_y)
    }

    pub fn size_in_cells(&self) -> u32 {
        self.size.cells()
    }

    /// Copy with a fresh id at `cell`.
    pub fn duplicate_at(&self, cell: GridCell) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            grid_x: cell.x.max(0),
            grid_y: cell.y.max(0),
            ..*self
        }
    }
}

/// The map image and its grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    /// Image location, opaque to the engine.
    #[serde(default)]
    pub image: Option<String>,
    pub width: f64,
    pub height: f64,
    /// `None` until a size is stored or a default is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<GridSize>,
    #[serde(default = "default_show_grid")]
    pub show_grid: bool,
}

fn default_show_grid() -> bool {
    true
}

impl MapInfo {
    pub fn new(width: f64, height: f64, grid_size: GridSize) -> Self {
        Self {
            image: None,
            width,
            height,
            grid_size: Some(grid_size),
            show_grid: true,
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid_size.unwrap_or_default()
    }

    /// Raster dimensions, rounded up to whole pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.max(0.0).ceil() as u32,
            self.height.max(0.0).ceil() as u32,
        )
    }
}

/// Everything the canvas edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub map: Option<MapInfo>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub fog_of_war: FogState,
    #[serde(default)]
    pub view: ViewState,
    #[serde(default)]
    pub presentation_bounds: Option<Rect>,
}

impl Encounter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            map: None,
            tokens: Vec::new(),
            fog_of_war: FogState::default(),
            view: ViewState::default(),
            presentation_bounds: None,
        }
    }

    pub fn with_map(mut self, map: MapInfo) -> Self {
        self.map = Some(map);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Gives a map that was stored without a grid size the configured one.
    pub fn apply_default_grid(&mut self, grid: GridSize) {
        if let Some(map) = self.map.as_mut().filter(|m| m.grid_size.is_none()) {
            tracing::debug!("Map has no grid size, using {}", grid.get());
            map.grid_size = Some(grid);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn map(&self) -> Result<&MapInfo> {
        self.map.as_ref().ok_or_else(|| EncounterError::NoMap.into())
    }

    pub fn token(&self, id: Uuid) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// Applies an update to this copy of the encounter.
    pub fn apply(&mut self, update: &EncounterUpdate) -> Result<()> {
        match update {
            EncounterUpdate::AddFogArea { operation, area } => {
                self.fog_of_war.add_area(*operation, area.clone())?;
            }
            EncounterUpdate::RemoveFogArea { id } => {
                self.fog_of_war.remove_area(*id);
            }
            EncounterUpdate::ReplaceFog(fog) => self.fog_of_war = fog.clone(),
            EncounterUpdate::AddToken(token) => self.tokens.push(token.clone()),
            EncounterUpdate::MoveToken { id, cell } => {
                let token = self
                    .tokens
                    .iter_mut()
                    .find(|t| t.id == *id)
                    .ok_or_else(|| EncounterError::TokenNotFound { id: id.to_string() })?;
                token.grid_x = cell.x.max(0);
                token.grid_y = cell.y.max(0);
            }
            EncounterUpdate::UpdateView(view) => self.view = *view,
            EncounterUpdate::UpdatePresentationBounds(bounds) => {
                self.presentation_bounds = *bounds;
            }
        }
        Ok(())
    }
}

/// A committed change, reported to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterUpdate {
    AddFogArea {
        operation: FogOperation,
        area: FogArea,
    },
    RemoveFogArea {
        id: Uuid,
    },
    ReplaceFog(FogState),
    AddToken(Token),
    MoveToken {
        id: Uuid,
        cell: GridCell,
    },
    UpdateView(ViewState),
    UpdatePresentationBounds(Option<Rect>),
}

impl EncounterUpdate {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EncounterUpdate::AddFogArea { .. } => "add_fog_area",
            EncounterUpdate::RemoveFogArea { .. } => "remove_fog_area",
            EncounterUpdate::ReplaceFog(_) => "replace_fog",
            EncounterUpdate::AddToken(_) => "add_token",
            EncounterUpdate::MoveToken { .. } => "move_token",
            EncounterUpdate::UpdateView(_) => "update_view",
            EncounterUpdate::UpdatePresentationBounds(_) => "update_presentation_bounds",
        }
    }
}

/// Supplies the encounter and receives updates.
pub trait EncounterProvider {
    fn load(&self) -> Result<Encounter>;

    fn apply(&mut self, update: EncounterUpdate) -> Result<()>;
}

/// Lets a session borrow a provider that outlives it.
impl<P: EncounterProvider + ?Sized> EncounterProvider for &mut P {
    fn load(&self) -> Result<Encounter> {
        (**self).load()
    }

    fn apply(&mut self, update: EncounterUpdate) -> Result<()> {
        (**self).apply(update)
    }
}

/// Provider that keeps the encounter in memory.
#[derive(Debug, Clone)]
pub struct InMemoryEncounterStore {
    encounter: Encounter,
    applied: usize,
}

impl InMemoryEncounterStore {
    pub fn new(encounter: Encounter) -> Self {
        Self {
            encounter,
            applied: 0,
        }
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// Number of updates accepted so far.
    pub fn applied_count(&self) -> usize {
        self.applied
    }
}

impl EncounterProvider for InMemoryEncounterStore {
    fn load(&self) -> Result<Encounter> {
        Ok(self.encounter.clone())
    }

    fn apply(&mut self, update: EncounterUpdate) -> Result<()> {
        self.encounter.apply(&update)?;
        self.applied += 1;
        Ok(())
    }
}
