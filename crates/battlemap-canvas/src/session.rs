//! Interactive editing session.
//!
//! A [`Session`] owns the working copy of an encounter and routes input
//! events to the viewport controller, fog tools, bounds editor, measurer and
//! token placement depending on the active [`Tool`]. Every committed change is
//! applied locally and then reported to the [`EncounterProvider`]; provider
//! failures are logged and never interrupt the interaction.
//!
//! Dropping a session reports the current view to the provider, whether it
//! ends normally, through an early return or while unwinding. Pass
//! `&mut provider` to inspect the provider afterwards.

use std::collections::HashSet;
use std::time::Instant;

use battlemap_core::constants::POLYGON_CLOSE_RADIUS;
use battlemap_core::{EncounterError, Result};
use uuid::Uuid;

use crate::controller::ViewportController;
use crate::encounter::{
    CreatureSize, Encounter, EncounterProvider, EncounterUpdate, MapInfo, Token, TokenKind,
};
use crate::fog::{
    FogArea, FogCompositor, FogGesture, FogOperation, FogRaster, FogShape, FogTool,
    FogToolSettings, FogToolShape,
};
use crate::geometry::{GridCell, GridSize, Point, Rect};
use crate::input::{InputEvent, Key, MouseButton};
use crate::measure::{MeasureOverlay, MovementMeasurer};
use crate::mirror::{SnapshotSink, StateMirror};
use crate::placement::{self, PlacementBounds, PlacementHint};
use crate::presentation::BoundsEditor;
use crate::viewport::Viewport;

/// How left-button pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Click to pick a cell, drag tokens.
    #[default]
    Select,
    Pan,
    Measure,
    Fog(FogTool),
    PresentationBounds,
    /// Each click places a new token at the nearest free cell.
    AddToken { kind: TokenKind, size: CreatureSize },
}

pub struct Session<P: EncounterProvider> {
    provider: P,
    encounter: Encounter,
    controller: ViewportController,
    tool: Tool,
    fog_gesture: FogGesture,
    compositor: FogCompositor,
    bounds_editor: Option<BoundsEditor>,
    measurer: MovementMeasurer,
    mirror: Option<StateMirror<Box<dyn SnapshotSink>>>,
    player_view: bool,
    last_click: Option<GridCell>,
    token_drag: Option<Uuid>,
}

impl<P: EncounterProvider> Session<P> {
    /// Loads the encounter and restores its persisted view.
    pub fn new(provider: P, viewport: Viewport) -> Result<Self> {
        let encounter = provider.load()?;
        let mut controller = ViewportController::new(viewport);
        controller.viewport_mut().apply_view_state(&encounter.view);
        let bounds_editor = encounter
            .map
            .as_ref()
            .map(|m| BoundsEditor::new(m.width, m.height, encounter.presentation_bounds));

        tracing::info!(
            "Session opened for '{}' ({} tokens, {} fog areas)",
            encounter.name,
            encounter.tokens.len(),
            encounter.fog_of_war.area_count()
        );

        Ok(Self {
            provider,
            encounter,
            controller,
            tool: Tool::default(),
            fog_gesture: FogGesture::default(),
            compositor: FogCompositor::new(),
            bounds_editor,
            measurer: MovementMeasurer::new(),
            mirror: None,
            player_view: false,
            last_click: None,
            token_drag: None,
        })
    }

    pub fn with_fog_settings(mut self, settings: FogToolSettings) -> Self {
        self.fog_gesture.set_settings(settings);
        self
    }

    /// Starts mirroring to a presentation surface.
    pub fn attach_mirror(&mut self, mirror: StateMirror<Box<dyn SnapshotSink>>) {
        self.mirror = Some(mirror);
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn viewport(&self) -> &Viewport {
        self.controller.viewport()
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.controller.viewport_mut().set_viewport_size(width, height);
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switches tools, abandoning any gesture the old tool had in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.cancel_interactions();
        self.fog_gesture.cancel();
        self.tool = tool;
        self.controller.set_pan_tool_active(tool == Tool::Pan);
        if tool == Tool::PresentationBounds {
            self.ensure_presentation_bounds();
        }
        tracing::debug!("Tool changed to {:?}", tool);
    }

    /// Grid size of the map, or the default when no map is loaded.
    pub fn grid(&self) -> GridSize {
        self.encounter
            .map
            .as_ref()
            .map(MapInfo::grid)
            .unwrap_or_default()
    }

    pub fn map_size(&self) -> Option<(f64, f64)> {
        self.encounter.map.as_ref().map(|m| (m.width, m.height))
    }

    pub fn last_click(&self) -> Option<GridCell> {
        self.last_click
    }

    pub fn is_player_view(&self) -> bool {
        self.player_view
    }

    /// Toggles presentation mode. Turning it on without bounds creates the default ones.
    pub fn set_player_view(&mut self, enabled: bool) {
        self.player_view = enabled;
        if enabled {
            self.ensure_presentation_bounds();
        }
        tracing::info!("Player view {}", if enabled { "on" } else { "off" });
    }

    /// Bounds to draw, including an uncommitted preview.
    pub fn presentation_bounds(&self) -> Option<Rect> {
        self.bounds_editor.as_ref().and_then(BoundsEditor::bounds)
    }

    pub fn committed_presentation_bounds(&self) -> Option<Rect> {
        self.bounds_editor.as_ref().and_then(BoundsEditor::committed)
    }

    fn ensure_presentation_bounds(&mut self) {
        let created = self
            .bounds_editor
            .as_mut()
            .and_then(BoundsEditor::ensure_default);
        if let Some(rect) = created {
            self.commit(EncounterUpdate::UpdatePresentationBounds(Some(rect)));
        }
    }

    /// Pending fog shapes for preview rendering.
    pub fn fog_preview(&self) -> Vec<FogShape> {
        self.fog_gesture.preview()
    }

    pub fn measurement(&self) -> Option<MeasureOverlay> {
        self.measurer.overlay(self.grid())
    }

    /// The composited fog for the current map, `None` when fog is off or there is no map.
    pub fn fog_raster(&mut self) -> Result<Option<&FogRaster>> {
        let Some((width, height)) = self.encounter.map.as_ref().map(|m| m.pixel_size()) else {
            return Ok(None);
        };
        self.compositor
            .raster(&self.encounter.fog_of_war, width, height)
    }

    /// Applies an update locally, then forwards it to the provider.
    fn commit(&mut self, update: EncounterUpdate) -> bool {
        if let Err(e) = self.encounter.apply(&update) {
            tracing::warn!("Rejected {}: {}", update.kind_name(), e);
            return false;
        }
        let kind = update.kind_name();
        if let Err(e) = self.provider.apply(update) {
            tracing::warn!("Provider failed to store {}: {}", kind, e);
        }
        true
    }

    fn commit_fog_shapes(&mut self, operation: FogOperation, shapes: Vec<FogShape>) {
        for shape in shapes {
            let area = self
                .encounter
                .fog_of_war
                .next_timestamp()
                .and_then(|created_at| FogArea::new(shape, created_at));
            match area {
                Ok(area) => {
                    self.commit(EncounterUpdate::AddFogArea { operation, area });
                }
                Err(e) => tracing::warn!("Skipped fog {}: {}", operation, e),
            }
        }
    }

    /// Handles a canvas-level event.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Wheel { position, delta_y } => self.controller.wheel(position, delta_y),
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { key: Key::Space } => self.controller.space_up(),
            InputEvent::KeyUp { .. } => {}
            InputEvent::PointerDown { position, button } => self.pointer_down(position, button, now),
            InputEvent::PointerMove { position } => self.pointer_move(position),
            InputEvent::PointerUp { position, button } => self.pointer_up(position, button),
            InputEvent::PointerLeave => {
                self.controller.pointer_leave();
                self.cancel_interactions();
            }
        }
    }

    /// Handles a window-level event while the controller has listeners armed.
    pub fn handle_window_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { position } => {
                self.controller.window_pointer_move(position);
            }
            InputEvent::PointerUp { button, .. } => {
                self.controller.window_pointer_up(button);
            }
            _ => {}
        }
    }

    pub fn wants_window_events(&self) -> bool {
        self.controller.wants_window_events()
    }

    /// Advances timers: brush stamping and the mirror.
    pub fn tick(&mut self, now: Instant) {
        self.fog_gesture.tick(now);
        let bounds = self.committed_presentation_bounds();
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.notify(&self.encounter, bounds, now);
            mirror.poll(&self.encounter, bounds, now);
        }
    }

    fn key_down(&mut self, key: Key) {
        match key {
            Key::Space => self.controller.space_down(),
            Key::Home => self.recenter(),
            Key::Escape => {
                self.cancel_interactions();
                self.fog_gesture.cancel();
            }
            Key::Enter => {
                if let Tool::Fog(tool) = self.tool {
                    if let Some(shape) = self.fog_gesture.close_polygon() {
                        self.commit_fog_shapes(tool.operation, vec![shape]);
                    }
                }
            }
            Key::Char(_) => {}
        }
    }

    fn to_canvas(&self, position: Point) -> (Point, GridCell) {
        let transform = self.viewport().transform(self.grid());
        (
            transform.screen_to_canvas(position),
            transform.screen_to_grid(position),
        )
    }

    fn pointer_down(&mut self, position: Point, button: MouseButton, now: Instant) {
        if self.controller.pointer_down(position, button) || button != MouseButton::Left {
            return;
        }
        let (canvas, cell) = self.to_canvas(position);
        let zoom = self.viewport().zoom();

        match self.tool {
            Tool::Select => {
                self.last_click = Some(cell);
                self.token_drag = self.token_at(cell).map(|t| t.id);
            }
            Tool::Pan => {}
            Tool::Measure => self.measurer.start(cell),
            Tool::Fog(tool) => match tool.shape {
                FogToolShape::Polygon => {
                    if let Some(shape) = self
                        .fog_gesture
                        .polygon_click(canvas, POLYGON_CLOSE_RADIUS / zoom)
                    {
                        self.commit_fog_shapes(tool.operation, vec![shape]);
                    }
                }
                shape => self.fog_gesture.begin(shape, canvas, now),
            },
            Tool::PresentationBounds => {
                if let Some(editor) = self.bounds_editor.as_mut() {
                    editor.begin(canvas, zoom);
                }
            }
            Tool::AddToken { kind, size } => {
                self.last_click = Some(cell);
                let name = format!("{} {}", kind, self.encounter.tokens.len() + 1);
                if let Err(e) = self.add_token(name, kind, size) {
                    tracing::warn!("Could not place token: {}", e);
                }
            }
        }
    }

    fn pointer_move(&mut self, position: Point) {
        if self.controller.pointer_move(position) {
            return;
        }
        let (canvas, cell) = self.to_canvas(position);
        self.fog_gesture.update(canvas);
        self.measurer.update(cell);
        if let Some(editor) = self.bounds_editor.as_mut() {
            editor.update(canvas);
        }
    }

    fn pointer_up(&mut self, position: Point, button: MouseButton) {
        if self.controller.pointer_up(position, button) || button != MouseButton::Left {
            return;
        }
        let (canvas, cell) = self.to_canvas(position);

        if let Tool::Fog(tool) = self.tool {
            let shapes = self.fog_gesture.finish(canvas);
            self.commit_fog_shapes(tool.operation, shapes);
        }
        self.measurer.end();
        if let Some(rect) = self.bounds_editor.as_mut().and_then(|e| e.finish(canvas)) {
            self.commit(EncounterUpdate::UpdatePresentationBounds(Some(rect)));
        }
        if let Some(id) = self.token_drag.take() {
            if let Err(e) = self.move_token(id, cell) {
                tracing::warn!("Token drag failed: {}", e);
            }
        }
    }

    /// Drops every uncommitted pointer interaction except a polygon in progress.
    fn cancel_interactions(&mut self) {
        self.fog_gesture.cancel_stroke();
        self.measurer.end();
        if let Some(editor) = self.bounds_editor.as_mut() {
            editor.cancel();
        }
        self.token_drag = None;
    }

    /// Token whose footprint covers `cell`; the most recently added wins.
    pub fn token_at(&self, cell: GridCell) -> Option<&Token> {
        self.encounter.tokens.iter().rev().find(|t| {
            let span = t.size_in_cells() as i32;
            cell.x >= t.grid_x
                && cell.x < t.grid_x + span
                && cell.y >= t.grid_y
                && cell.y < t.grid_y + span
        })
    }

    fn occupied_cells(&self) -> HashSet<GridCell> {
        self.encounter.tokens.iter().map(Token::cell).collect()
    }

    /// Bounds new tokens must land in.
    pub fn placement_bounds(&self) -> Result<PlacementBounds> {
        let map = self.encounter.map()?;
        let presentation = self
            .player_view
            .then(|| self.committed_presentation_bounds())
            .flatten();
        Ok(placement::active_bounds(
            map.width,
            map.height,
            map.grid(),
            presentation.as_ref(),
        ))
    }

    /// Places a new token at the nearest free cell and returns its id.
    pub fn add_token(
        &mut self,
        name: impl Into<String>,
        kind: TokenKind,
        size: CreatureSize,
    ) -> Result<Uuid> {
        let bounds = self.placement_bounds()?;
        let hint = PlacementHint {
            last_click: self.last_click,
            viewport_center: Some(self.viewport().center_cell(self.grid())),
            presentation: self.player_view && self.committed_presentation_bounds().is_some(),
        };
        let cell = placement::resolve_placement(&bounds, &hint, &self.occupied_cells());
        let token = Token::new(name, kind, size, cell);
        let id = token.id;
        tracing::info!("Placed {} '{}' at {}", token.kind, token.name, cell);
        self.commit(EncounterUpdate::AddToken(token));
        Ok(id)
    }

    /// Copies a token to the free cell nearest the original.
    pub fn duplicate_token(&mut self, id: Uuid) -> Result<Uuid> {
        let source = self
            .encounter
            .token(id)
            .cloned()
            .ok_or_else(|| EncounterError::TokenNotFound { id: id.to_string() })?;
        let bounds = self.placement_bounds()?;
        let cell = placement::resolve_duplicate(source.cell(), &bounds, &self.occupied_cells());
        let copy = source.duplicate_at(cell);
        let copy_id = copy.id;
        tracing::info!("Duplicated '{}' to {}", source.name, cell);
        self.commit(EncounterUpdate::AddToken(copy));
        Ok(copy_id)
    }

    pub fn move_token(&mut self, id: Uuid, cell: GridCell) -> Result<()> {
        if self.encounter.token(id).is_none() {
            return Err(EncounterError::TokenNotFound { id: id.to_string() }.into());
        }
        self.commit(EncounterUpdate::MoveToken { id, cell });
        Ok(())
    }

    /// Reveals the whole map.
    pub fn clear_all_fog(&mut self) -> Result<()> {
        let (width, height) = self.map_size().ok_or(EncounterError::NoMap)?;
        let mut fog = self.encounter.fog_of_war.clone();
        fog.clear_all(width, height)?;
        self.commit(EncounterUpdate::ReplaceFog(fog));
        Ok(())
    }

    /// Discards all fog history; the map is fully fogged again.
    pub fn reset_fog(&mut self) {
        let mut fog = self.encounter.fog_of_war.clone();
        fog.reset();
        self.commit(EncounterUpdate::ReplaceFog(fog));
    }

    pub fn set_fog_enabled(&mut self, enabled: bool) {
        let mut fog = self.encounter.fog_of_war.clone();
        fog.set_enabled(enabled);
        self.commit(EncounterUpdate::ReplaceFog(fog));
    }

    pub fn remove_fog_area(&mut self, id: Uuid) -> bool {
        let exists = self
            .encounter
            .fog_of_war
            .revealed_areas()
            .iter()
            .chain(self.encounter.fog_of_war.hidden_areas())
            .any(|a| a.id() == id);
        exists && self.commit(EncounterUpdate::RemoveFogArea { id })
    }

    /// Fits the map into view.
    pub fn recenter(&mut self) {
        let size = self.map_size();
        self.controller.recenter(size);
    }

}

impl<P: EncounterProvider> Drop for Session<P> {
    fn drop(&mut self) {
        let view = self.viewport().view_state();
        self.encounter.view = view;
        if let Err(e) = self.provider.apply(EncounterUpdate::UpdateView(view)) {
            tracing::warn!("Could not persist view on close: {}", e);
        }
        tracing::info!("Session closed for '{}'", self.encounter.name);
    }
}

impl<P: EncounterProvider> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("encounter", &self.encounter.name)
            .field("tool", &self.tool)
            .field("viewport", self.controller.viewport())
            .field("player_view", &self.player_view)
            .finish()
    }
}
