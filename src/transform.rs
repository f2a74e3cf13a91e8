//! Transform engine: live position/scale/rotation while a gesture is running.
//!
//! DESIGN
//! ======
//! `begin_gesture` snapshots the entity's committed transform as a baseline.
//! Deltas arrive incrementally (each one relative to the previous event) and
//! accumulate on top of that baseline, so the live value after any sequence
//! of pans is `baseline + sum(deltas)`. Live values are visual only; the
//! scene sees nothing until `end_gesture` writes the result back through
//! [`SceneModel::update_entity_transform`].
//!
//! Each entity has its own slot, so gestures on different entities never
//! interfere. A second `begin_gesture` on an entity that is already moving is
//! refused rather than resetting its baseline.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::collections::HashMap;

use crate::geom::{ScaleLimits, Transform};
use crate::scene::{EntityId, Mode, SceneModel};

#[derive(Debug, Clone, Copy)]
struct LiveGesture {
    baseline: Transform,
    current: Transform,
}

/// Per-entity gesture state, keyed by entity id.
#[derive(Debug, Default)]
pub struct TransformEngine {
    live: HashMap<EntityId, LiveGesture>,
    limits: ScaleLimits,
}

impl TransformEngine {
    #[must_use]
    pub fn new(limits: ScaleLimits) -> Self {
        Self { live: HashMap::new(), limits }
    }

    /// Capture the entity's committed transform as the gesture baseline.
    ///
    /// Returns false (and does nothing) when the entity does not exist, the
    /// scene is in erase mode, or a gesture on this entity is already running.
    pub fn begin_gesture(&mut self, scene: &SceneModel, id: EntityId) -> bool {
        if scene.mode() == Mode::Erase || self.live.contains_key(&id) {
            return false;
        }
        let Some(entity) = scene.get(id) else {
            return false;
        };
        let baseline = entity.transform;
        self.live.insert(id, LiveGesture { baseline, current: baseline });
        tracing::trace!(%id, "gesture started");
        true
    }

    /// Move by `(dx, dy)` field units. Position is never clamped.
    pub fn apply_pan_delta(&mut self, id: EntityId, dx: f64, dy: f64) -> Option<Transform> {
        if !dx.is_finite() || !dy.is_finite() {
            return self.live(id);
        }
        let gesture = self.live.get_mut(&id)?;
        gesture.current.x += dx;
        gesture.current.y += dy;
        Some(gesture.current)
    }

    /// Multiply scale by `factor`, freezing at the configured bounds.
    pub fn apply_pinch_delta(&mut self, id: EntityId, factor: f64) -> Option<Transform> {
        if !factor.is_finite() || factor <= 0.0 {
            return self.live(id);
        }
        let limits = self.limits;
        let gesture = self.live.get_mut(&id)?;
        gesture.current.scale = limits.clamp(gesture.current.scale * factor);
        Some(gesture.current)
    }

    /// Rotate by `angle` radians. Rotation is unbounded.
    pub fn apply_rotate_delta(&mut self, id: EntityId, angle: f64) -> Option<Transform> {
        if !angle.is_finite() {
            return self.live(id);
        }
        let gesture = self.live.get_mut(&id)?;
        gesture.current.rotation += angle;
        Some(gesture.current)
    }

    /// Commit the live transform into the scene and release the entity.
    ///
    /// Returns the committed transform, or `None` when no gesture was running
    /// or the entity was deleted mid-gesture (logged, never fatal).
    pub fn end_gesture(&mut self, scene: &mut SceneModel, id: EntityId) -> Option<Transform> {
        let gesture = self.live.remove(&id)?;
        match scene.update_entity_transform(id, gesture.current) {
            Ok(()) => {
                tracing::trace!(%id, "gesture committed");
                scene.get(id).map(|e| e.transform)
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "dropping gesture commit");
                None
            }
        }
    }

    /// Live transform of an entity under a gesture.
    #[must_use]
    pub fn live(&self, id: EntityId) -> Option<Transform> {
        self.live.get(&id).map(|g| g.current)
    }

    /// Transform captured when the running gesture began.
    #[must_use]
    pub fn baseline(&self, id: EntityId) -> Option<Transform> {
        self.live.get(&id).map(|g| g.baseline)
    }

    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.live.len()
    }

    /// The transform to draw: live while a gesture runs, committed otherwise.
    #[must_use]
    pub fn effective(&self, scene: &SceneModel, id: EntityId) -> Option<Transform> {
        self.live(id).or_else(|| scene.get(id).map(|e| e.transform))
    }
}
