//! Gesture router: turns touch-sequence events into scene operations.
//!
//! DESIGN
//! ======
//! Each touch sequence runs its own small state machine (`GestureState`).
//! The current `Mode` is read on `Down` only; a sequence keeps the meaning it
//! started with even if the mode changes under it.
//!
//! - `move` / `none`: `Down` hit-tests and starts a transform gesture on the
//!   hit entity, `Up` commits it through the transform engine.
//! - `erase`: `Down` deletes the entity under the finger.
//! - `draw`: points accumulate into a pending stroke committed on `Up`.
//!
//! There is no revert path. `Cancel`, or a new `Down` on a sequence that never
//! saw its `Up`, commits whatever was last applied. Only a pending stroke is
//! discarded on `Cancel`.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use crate::geom::{Point, Transform, Viewport, angle_between};
use crate::hit::{HitPart, HitSlop, hit_test};
use crate::input::{GestureEvent, GestureState, SequenceId};
use crate::scene::{EntityId, Mode, SceneEntity, SceneModel};
use crate::transform::TransformEngine;

/// Effects the host should react to (re-render, persist, animate).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EntityAdded(SceneEntity),
    /// A gesture moved an entity; the scene itself is unchanged yet.
    EntityPreview { id: EntityId, transform: Transform },
    /// A transform was committed to the scene.
    EntityUpdated { id: EntityId, transform: Transform },
    EntityDeleted { id: EntityId },
    SelectionChanged(Option<EntityId>),
    SceneCleared,
    BackgroundChanged,
    FramesChanged,
    RenderNeeded,
}

/// Routes gesture events by mode and tracks every live touch sequence.
#[derive(Debug, Default)]
pub struct GestureRouter {
    sequences: HashMap<SequenceId, GestureState>,
    selected: Option<EntityId>,
    viewport: Viewport,
    slop: HitSlop,
}

impl GestureRouter {
    /// An unusable `viewport` falls back to the default one.
    #[must_use]
    pub fn new(viewport: Viewport, slop: HitSlop) -> Self {
        let mut router = Self { sequences: HashMap::new(), selected: None, viewport: Viewport::default(), slop };
        router.set_viewport(viewport);
        router
    }

    /// Replace the viewport. A zero, negative or non-finite one is logged
    /// and ignored; returns whether it was taken.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if !viewport.is_valid() {
            tracing::warn!(?viewport, "ignoring unusable viewport");
            return false;
        }
        self.viewport = viewport;
        true
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// Select an entity (or clear the selection). Returns the action to emit
    /// when the selection actually changed.
    pub fn select(&mut self, id: Option<EntityId>) -> Option<Action> {
        if self.selected == id {
            return None;
        }
        self.selected = id;
        Some(Action::SelectionChanged(id))
    }

    /// State of one touch sequence; `Idle` when unknown.
    #[must_use]
    pub fn state(&self, seq: SequenceId) -> GestureState {
        self.sequences.get(&seq).cloned().unwrap_or_default()
    }

    /// Number of sequences currently doing something.
    #[must_use]
    pub fn active_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Points of every stroke still being drawn, for the renderer.
    pub fn pending_strokes(&self) -> impl Iterator<Item = &[Point]> {
        self.sequences.values().filter_map(|s| match s {
            GestureState::Drawing { points } => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Route one event. All mutations go through `scene` and `engine`.
    pub fn route(
        &mut self,
        scene: &mut SceneModel,
        engine: &mut TransformEngine,
        seq: SequenceId,
        event: GestureEvent,
    ) -> Vec<Action> {
        match event {
            GestureEvent::Down { point, pointers } => self.on_down(scene, engine, seq, point, pointers),
            GestureEvent::Move { point } => self.on_move(engine, seq, point),
            GestureEvent::Pinch { factor } => self.on_pinch(engine, seq, factor),
            GestureEvent::Rotate { angle } => self.on_rotate(engine, seq, angle),
            GestureEvent::Up => self.finish(scene, engine, seq, true),
            GestureEvent::Cancel => self.finish(scene, engine, seq, false),
        }
    }

    /// Forget the selection if it points at an entity that is gone.
    pub fn forget(&mut self, id: EntityId) -> Option<Action> {
        if self.selected == Some(id) { self.select(None) } else { None }
    }

    // --- Handlers ---

    fn on_down(
        &mut self,
        scene: &mut SceneModel,
        engine: &mut TransformEngine,
        seq: SequenceId,
        screen: Point,
        pointers: u8,
    ) -> Vec<Action> {
        // An unfinished sequence keeps what it last applied.
        let mut actions = self.finish(scene, engine, seq, true);

        let field = self.viewport.screen_to_field(screen);
        if !field.is_finite() {
            return actions;
        }
        scene.set_last_touch(field);

        match scene.mode() {
            Mode::Erase => {
                let hit = hit_test(field, scene, engine, &self.viewport, self.slop, None);
                if let Some(removed) = hit.and_then(|h| scene.delete_entity(h.entity_id)) {
                    actions.extend(self.forget(removed.id));
                    actions.push(Action::EntityDeleted { id: removed.id });
                    actions.push(Action::RenderNeeded);
                }
            }
            Mode::Draw => {
                self.sequences.insert(seq, GestureState::Drawing { points: vec![field] });
                actions.push(Action::RenderNeeded);
            }
            Mode::Move | Mode::Idle => {
                let Some(hit) = hit_test(field, scene, engine, &self.viewport, self.slop, self.selected) else {
                    actions.extend(self.select(None));
                    return actions;
                };
                let id = hit.entity_id;
                if !engine.begin_gesture(scene, id) {
                    tracing::debug!(%id, seq = seq.0, "entity busy with another touch");
                    return actions;
                }
                let state = match (hit.part, pointers) {
                    (HitPart::RotateHandle, _) => GestureState::Rotating { id, last_field: field },
                    (HitPart::ScaleHandle, _) => GestureState::Scaling { id, last_field: field },
                    (HitPart::Body, n) if n >= 2 => GestureState::Pinching { id, last_field: field },
                    (HitPart::Body, _) => GestureState::Dragging { id, last_field: field },
                };
                self.sequences.insert(seq, state);
                actions.extend(self.select(Some(id)));
            }
        }
        actions
    }

    fn on_move(&mut self, engine: &mut TransformEngine, seq: SequenceId, screen: Point) -> Vec<Action> {
        let field = self.viewport.screen_to_field(screen);
        if !field.is_finite() {
            return Vec::new();
        }
        let Some(state) = self.sequences.get_mut(&seq) else {
            return Vec::new();
        };

        let moved = match state {
            GestureState::Idle => None,
            GestureState::Drawing { points } => {
                points.push(field);
                return vec![Action::RenderNeeded];
            }
            GestureState::Dragging { id, last_field } | GestureState::Pinching { id, last_field } => {
                let (dx, dy) = (field.x - last_field.x, field.y - last_field.y);
                *last_field = field;
                engine.apply_pan_delta(*id, dx, dy).map(|t| (*id, t))
            }
            GestureState::Scaling { id, last_field } => {
                let center = engine.live(*id).map(|t| t.position());
                let previous = *last_field;
                *last_field = field;
                center.and_then(|c| {
                    let before = c.distance(previous);
                    if before <= f64::EPSILON {
                        return None;
                    }
                    engine.apply_pinch_delta(*id, c.distance(field) / before).map(|t| (*id, t))
                })
            }
            GestureState::Rotating { id, last_field } => {
                let center = engine.live(*id).map(|t| t.position());
                let previous = *last_field;
                *last_field = field;
                center.and_then(|c| {
                    let delta = wrap_angle(angle_between(c, field) - angle_between(c, previous));
                    engine.apply_rotate_delta(*id, delta).map(|t| (*id, t))
                })
            }
        };

        moved
            .map(|(id, transform)| vec![Action::EntityPreview { id, transform }, Action::RenderNeeded])
            .unwrap_or_default()
    }

    fn on_pinch(&mut self, engine: &mut TransformEngine, seq: SequenceId, factor: f64) -> Vec<Action> {
        let Some(id) = self.sequences.get(&seq).and_then(GestureState::entity) else {
            return Vec::new();
        };
        engine
            .apply_pinch_delta(id, factor)
            .map(|transform| vec![Action::EntityPreview { id, transform }, Action::RenderNeeded])
            .unwrap_or_default()
    }

    fn on_rotate(&mut self, engine: &mut TransformEngine, seq: SequenceId, angle: f64) -> Vec<Action> {
        let Some(id) = self.sequences.get(&seq).and_then(GestureState::entity) else {
            return Vec::new();
        };
        engine
            .apply_rotate_delta(id, angle)
            .map(|transform| vec![Action::EntityPreview { id, transform }, Action::RenderNeeded])
            .unwrap_or_default()
    }

    /// End a sequence. `keep_stroke` is false only for `Cancel`.
    fn finish(
        &mut self,
        scene: &mut SceneModel,
        engine: &mut TransformEngine,
        seq: SequenceId,
        keep_stroke: bool,
    ) -> Vec<Action> {
        let Some(state) = self.sequences.remove(&seq) else {
            return Vec::new();
        };
        match state {
            GestureState::Idle => Vec::new(),
            GestureState::Drawing { points } => {
                if !keep_stroke {
                    return vec![Action::RenderNeeded];
                }
                match scene.add_stroke(&points) {
                    Some(entity) => vec![Action::EntityAdded(entity), Action::RenderNeeded],
                    None => vec![Action::RenderNeeded],
                }
            }
            GestureState::Dragging { id, .. }
            | GestureState::Pinching { id, .. }
            | GestureState::Scaling { id, .. }
            | GestureState::Rotating { id, .. } => match engine.end_gesture(scene, id) {
                Some(transform) => vec![Action::EntityUpdated { id, transform }, Action::RenderNeeded],
                None => {
                    let mut actions: Vec<Action> = self.forget(id).into_iter().collect();
                    actions.push(Action::RenderNeeded);
                    actions
                }
            },
        }
    }
}

/// Fold an angle difference into `(-PI, PI]` so crossing the `atan2` branch
/// cut does not spin the entity a full turn.
fn wrap_angle(delta: f64) -> f64 {
    let mut d = delta % TAU;
    if d > PI {
        d -= TAU;
    } else if d <= -PI {
        d += TAU;
    }
    d
}
