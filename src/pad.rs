//! The tactical pad: one editing session over a field background.
//!
//! `TacticalPad` owns the scene, the transform engine, the gesture router and
//! the frame reel, and is the only surface a host talks to. Every operation
//! returns the [`Action`]s the host should react to; editing operations never
//! fail, they log and degrade to no-ops. The roster is read-only.

#[cfg(test)]
#[path = "pad_test.rs"]
mod pad_test;

use crate::capture::{CaptureError, FrameReel, PlaybackStep};
use crate::config::PadConfig;
use crate::geom::{Point, Transform, Viewport};
use crate::input::{GestureEvent, SequenceId};
use crate::publish::{
    ProjectPayload, ProjectPublisher, PublishError, PublishReceipt, ValidationError, build_project_payload,
    check_roster,
};
use crate::roster::{PlayerId, Roster};
use crate::router::{Action, GestureRouter};
use crate::scene::{EntityId, FieldCategory, Mode, SceneModel, ShapeKind, StrokeStyle, Tool};
use crate::transform::TransformEngine;

pub struct TacticalPad {
    scene: SceneModel,
    engine: TransformEngine,
    router: GestureRouter,
    reel: FrameReel,
    roster: Roster,
    config: PadConfig,
}

impl TacticalPad {
    #[must_use]
    pub fn new(config: PadConfig, roster: Roster) -> Self {
        Self {
            scene: SceneModel::new(config.scale_limits),
            engine: TransformEngine::new(config.scale_limits),
            router: GestureRouter::new(Viewport::default(), config.hit_slop()),
            reel: FrameReel::new(config.frame_cap, config.frame_interval()),
            roster,
            config,
        }
    }

    /// Screen rectangle the field is drawn into. Until the host calls this
    /// the pad assumes a square field of `DEFAULT_VIEWPORT_PX` pixels.
    /// An unusable viewport is ignored.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Vec<Action> {
        if self.router.set_viewport(viewport) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.router.viewport()
    }

    // --- Gestures ---

    pub fn handle(&mut self, seq: SequenceId, event: GestureEvent) -> Vec<Action> {
        self.router.route(&mut self.scene, &mut self.engine, seq, event)
    }

    // --- Scene editing ---

    pub fn add_shape(&mut self, kind: ShapeKind) -> Vec<Action> {
        let entity = self.scene.add_shape(kind);
        vec![Action::EntityAdded(entity), Action::RenderNeeded]
    }

    /// Put a roster player on the field. Unknown or already placed players
    /// are ignored.
    pub fn place_player(&mut self, player_id: PlayerId, at: Point) -> Vec<Action> {
        let Some(player) = self.roster.player(player_id) else {
            tracing::warn!(player = %player_id, "player not in roster");
            return Vec::new();
        };
        match self.scene.place_player(player, at) {
            Some(entity) => vec![Action::EntityAdded(entity), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    pub fn delete_entity(&mut self, id: EntityId) -> Vec<Action> {
        let Some(removed) = self.scene.delete_entity(id) else {
            return Vec::new();
        };
        let mut actions: Vec<Action> = self.router.forget(removed.id).into_iter().collect();
        actions.push(Action::EntityDeleted { id: removed.id });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove every entity. Frames are kept.
    pub fn clear_all(&mut self) -> Vec<Action> {
        let removed = self.scene.clear_all();
        let mut actions: Vec<Action> = self.router.select(None).into_iter().collect();
        tracing::info!(removed, "pad cleared");
        actions.push(Action::SceneCleared);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_background(&mut self, category: FieldCategory, image_id: u32) -> Vec<Action> {
        if self.scene.set_background(category, image_id) {
            vec![Action::BackgroundChanged, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Switch mode. Handles are only shown in move/none, so drawing and
    /// erasing drop the selection.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        self.scene.set_mode(mode);
        let mut actions = Vec::new();
        if matches!(mode, Mode::Draw | Mode::Erase) {
            actions.extend(self.router.select(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.scene.set_tool(tool);
    }

    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.scene.set_stroke_style(style);
    }

    /// Select an entity (`None` clears). Unknown ids are ignored.
    pub fn select(&mut self, id: Option<EntityId>) -> Vec<Action> {
        if let Some(id) = id {
            if !self.scene.contains(id) {
                return Vec::new();
            }
        }
        self.router.select(id).map(|a| vec![a, Action::RenderNeeded]).unwrap_or_default()
    }

    /// Attach or clear an entity's note. Returns false for unknown ids.
    pub fn describe_entity(&mut self, id: EntityId, note: Option<String>) -> bool {
        self.scene.describe_entity(id, note)
    }

    // --- Frames ---

    /// Append a captured image of the current view to the reel.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] for a blank reference or a full reel.
    pub fn capture_frame(&mut self, image_ref: impl Into<String>) -> Result<Vec<Action>, CaptureError> {
        self.reel.capture_frame(image_ref)?;
        Ok(vec![Action::FramesChanged])
    }

    pub fn delete_frame(&mut self, index: usize) -> Vec<Action> {
        match self.reel.delete_frame(index) {
            Some(_) => vec![Action::FramesChanged],
            None => Vec::new(),
        }
    }

    /// Highlight a frame. The scene is not touched.
    pub fn select_frame(&mut self, index: usize) -> Vec<Action> {
        if self.reel.select_frame(index) { vec![Action::FramesChanged] } else { Vec::new() }
    }

    pub fn describe_frame(&mut self, index: usize, text: &str) -> Vec<Action> {
        if self.reel.describe_frame(index, text) { vec![Action::FramesChanged] } else { Vec::new() }
    }

    pub fn playback(&self) -> impl Iterator<Item = PlaybackStep<'_>> {
        self.reel.playback()
    }

    // --- Publish ---

    /// Check the roster, then assemble the project payload.
    ///
    /// # Errors
    ///
    /// `MissingTeam` or `SameTeam` for an incomplete roster, `EmptyProject`
    /// when there is nothing to publish.
    pub fn build_payload(&self) -> Result<ProjectPayload, ValidationError> {
        check_roster(&self.roster)?;
        build_project_payload(&self.scene, &self.reel, &self.roster)
    }

    /// Build the payload and send it through `publisher`.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] for validation or transport failures.
    pub async fn publish(&self, publisher: &dyn ProjectPublisher) -> Result<PublishReceipt, PublishError> {
        let payload = self.build_payload()?;
        tracing::info!(
            entities = self.scene.len(),
            frames = self.reel.len(),
            "publishing project"
        );
        publisher.publish(&payload).await
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    #[must_use]
    pub fn reel(&self) -> &FrameReel {
        &self.reel
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    #[must_use]
    pub fn selected(&self) -> Option<EntityId> {
        self.router.selected()
    }

    /// Transform to draw an entity with: live during a gesture.
    #[must_use]
    pub fn display_transform(&self, id: EntityId) -> Option<Transform> {
        self.engine.effective(&self.scene, id)
    }

    #[must_use]
    pub fn is_gesturing(&self, id: EntityId) -> bool {
        self.engine.is_active(id)
    }

    /// Paths of strokes still being drawn.
    pub fn pending_strokes(&self) -> impl Iterator<Item = &[Point]> {
        self.router.pending_strokes()
    }
}
