//! Input model: touch-sequence events and the per-sequence gesture state.
//!
//! The platform's gesture recognizers deliver `GestureEvent`s tagged with the
//! `SequenceId` of the touch sequence they belong to. `GestureState` is what
//! the router remembers about one sequence between its `Down` and its `Up`,
//! carrying everything needed to turn the next event into a delta.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geom::Point;
use crate::scene::EntityId;

/// Identifies one touch sequence from `Down` to `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(pub u32);

/// One raw event from the gesture recognizer. Points are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GestureEvent {
    /// Touch began. `pointers` is the number of fingers down in the sequence.
    Down { point: Point, pointers: u8 },
    /// Touch moved.
    Move { point: Point },
    /// Multi-touch pinch; `factor` is relative to the previous pinch event.
    Pinch { factor: f64 },
    /// Multi-touch twist; `angle` is radians since the previous rotate event.
    Rotate { angle: f64 },
    /// Touch released normally.
    Up,
    /// Platform abandoned the sequence.
    Cancel,
}

/// What the router is doing for one touch sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    /// Nothing in progress; waiting for `Down`.
    #[default]
    Idle,
    /// Single finger on an entity body: moves pan it.
    Dragging {
        id: EntityId,
        /// Field position of the previous event.
        last_field: Point,
    },
    /// Two or more fingers on an entity body: moves pan it, pinch and rotate
    /// events scale and turn it.
    Pinching { id: EntityId, last_field: Point },
    /// Dragging the scale handle: distance from the entity center drives scale.
    Scaling { id: EntityId, last_field: Point },
    /// Dragging the rotate handle: angle around the entity center drives rotation.
    Rotating { id: EntityId, last_field: Point },
    /// Draw mode: every move appends a point to the pending stroke.
    Drawing { points: Vec<Point> },
}

impl GestureState {
    /// The entity this sequence is transforming, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Dragging { id, .. }
            | Self::Pinching { id, .. }
            | Self::Scaling { id, .. }
            | Self::Rotating { id, .. } => Some(*id),
            Self::Idle | Self::Drawing { .. } => None,
        }
    }
}
