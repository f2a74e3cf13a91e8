//! Session scripts: a recorded editing session replayed against a pad.
//!
//! A script is JSON: an optional viewport, the roster handed to the pad, and
//! an ordered list of steps. Each step is either a gesture event for a touch
//! sequence or one of the pad's editing operations, tagged by `op`.
//!
//! ```json
//! { "viewport": { "origin_x": 0, "origin_y": 0, "width": 1000, "height": 1000 },
//!   "steps": [
//!     { "op": "add_shape", "kind": "cone" },
//!     { "op": "gesture", "seq": 1, "event": { "type": "down", "point": { "x": 500, "y": 500 }, "pointers": 1 } },
//!     { "op": "capture_frame", "image_ref": "file:///frame-0.png" } ] }
//! ```

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureError;
use crate::config::PadConfig;
use crate::geom::{Point, Viewport};
use crate::input::{GestureEvent, SequenceId};
use crate::pad::TacticalPad;
use crate::roster::{PlayerId, Roster};
use crate::router::Action;
use crate::scene::{EntityId, FieldCategory, Mode, ShapeKind, StrokeStyle, Tool};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    /// A `capture_frame` step was rejected.
    #[error("step {step}: {source}")]
    Capture {
        step: usize,
        #[source]
        source: CaptureError,
    },
}

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Gesture { seq: SequenceId, event: GestureEvent },
    AddShape { kind: ShapeKind },
    PlacePlayer { player_id: PlayerId, at: Point },
    DeleteEntity { id: EntityId },
    ClearAll,
    SetBackground { category: FieldCategory, image_id: u32 },
    SetMode { mode: Mode },
    SetTool { tool: Tool },
    SetStrokeStyle { style: StrokeStyle },
    Select { id: Option<EntityId> },
    DescribeEntity { id: EntityId, note: Option<String> },
    CaptureFrame { image_ref: String },
    DeleteFrame { index: usize },
    SelectFrame { index: usize },
    DescribeFrame { index: usize, text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub roster: Roster,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl SessionScript {
    /// # Errors
    ///
    /// Returns `Parse` for malformed JSON or unknown steps.
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns `Read` if the file cannot be read, `Parse` if it is not a
    /// valid script.
    pub async fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ScriptError::Read { path: path.display().to_string(), source })?;
        Self::from_json(&text)
    }

    /// Build a fresh pad and replay every step on it.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected frame capture.
    pub fn replay(&self, config: PadConfig) -> Result<(TacticalPad, Vec<Action>), ScriptError> {
        let mut pad = TacticalPad::new(config, self.roster.clone());
        let mut actions = Vec::new();
        if let Some(viewport) = self.viewport {
            actions.extend(pad.set_viewport(viewport));
        }
        for (step, op) in self.steps.iter().enumerate() {
            actions.extend(apply_step(&mut pad, op).map_err(|source| ScriptError::Capture { step, source })?);
        }
        tracing::info!(
            steps = self.steps.len(),
            actions = actions.len(),
            entities = pad.scene().len(),
            frames = pad.reel().len(),
            "script replayed"
        );
        Ok((pad, actions))
    }
}

/// Apply one step to `pad`, returning what it emitted.
///
/// # Errors
///
/// Only `capture_frame` can fail.
pub fn apply_step(pad: &mut TacticalPad, step: &Step) -> Result<Vec<Action>, CaptureError> {
    let actions = match step {
        Step::Gesture { seq, event } => pad.handle(*seq, *event),
        Step::AddShape { kind } => pad.add_shape(*kind),
        Step::PlacePlayer { player_id, at } => pad.place_player(*player_id, *at),
        Step::DeleteEntity { id } => pad.delete_entity(*id),
        Step::ClearAll => pad.clear_all(),
        Step::SetBackground { category, image_id } => pad.set_background(*category, *image_id),
        Step::SetMode { mode } => pad.set_mode(*mode),
        Step::SetTool { tool } => {
            pad.set_tool(*tool);
            Vec::new()
        }
        Step::SetStrokeStyle { style } => {
            pad.set_stroke_style(style.clone());
            Vec::new()
        }
        Step::Select { id } => pad.select(*id),
        Step::DescribeEntity { id, note } => {
            if !pad.describe_entity(*id, note.clone()) {
                tracing::debug!(%id, "describe skipped, entity not found");
            }
            Vec::new()
        }
        Step::CaptureFrame { image_ref } => pad.capture_frame(image_ref.as_str())?,
        Step::DeleteFrame { index } => pad.delete_frame(*index),
        Step::SelectFrame { index } => pad.select_frame(*index),
        Step::DescribeFrame { index, text } => pad.describe_frame(*index, text),
    };
    Ok(actions)
}
