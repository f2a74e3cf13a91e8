//! Frame reel: the ordered list of captured frames for one editing session.
//!
//! DESIGN
//! ======
//! A frame is an opaque image reference produced by the host's view-to-image
//! snapshot, plus its position in the reel and a capture timestamp. Capture is
//! one-way: nothing here turns a frame back into editable entities, and
//! selecting a frame only highlights it.
//!
//! Indices are always contiguous from 0. Deleting a frame renumbers the ones
//! after it and keeps the selection pointing at the same frame when possible.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_FRAME_CAP, DEFAULT_FRAME_INTERVAL_MS};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("frame image reference is empty")]
    EmptyImageRef,
    #[error("frame reel is full ({cap} frames)")]
    ReelFull { cap: usize },
}

/// One captured snapshot of the pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    /// Opaque URI of the rendered image.
    pub image_ref: String,
    /// Position in the reel, contiguous from 0.
    pub index: usize,
    pub captured_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One step of a playback run: the frame and when to show it, relative to
/// the start of playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStep<'a> {
    pub frame: &'a Frame,
    pub at: Duration,
}

/// Ordered frames plus the highlight selection.
#[derive(Debug, Clone)]
pub struct FrameReel {
    frames: Vec<Frame>,
    cap: usize,
    selected: Option<usize>,
    interval: Duration,
}

impl Default for FrameReel {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_CAP, Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS))
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl FrameReel {
    #[must_use]
    pub fn new(cap: usize, interval: Duration) -> Self {
        Self { frames: Vec::new(), cap, selected: None, interval }
    }

    /// Append a frame at the end of the reel.
    ///
    /// # Errors
    ///
    /// `EmptyImageRef` for a blank reference, `ReelFull` once `cap` frames
    /// have been captured.
    pub fn capture_frame(&mut self, image_ref: impl Into<String>) -> Result<&Frame, CaptureError> {
        let image_ref = image_ref.into();
        if image_ref.trim().is_empty() {
            return Err(CaptureError::EmptyImageRef);
        }
        if self.frames.len() >= self.cap {
            tracing::warn!(cap = self.cap, "frame capture rejected, reel full");
            return Err(CaptureError::ReelFull { cap: self.cap });
        }
        let index = self.frames.len();
        self.frames.push(Frame { id: Uuid::new_v4(), image_ref, index, captured_at_ms: now_ms(), description: None });
        tracing::debug!(index, "frame captured");
        Ok(&self.frames[index])
    }

    /// Remove the frame at `index` and renumber the rest. Out-of-range
    /// indices are a no-op.
    pub fn delete_frame(&mut self, index: usize) -> Option<Frame> {
        if index >= self.frames.len() {
            return None;
        }
        let removed = self.frames.remove(index);
        for (i, frame) in self.frames.iter_mut().enumerate().skip(index) {
            frame.index = i;
        }
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        tracing::debug!(index, remaining = self.frames.len(), "frame deleted");
        Some(removed)
    }

    /// Highlight a frame. Returns false for an out-of-range index.
    pub fn select_frame(&mut self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Frame> {
        self.selected.and_then(|i| self.frames.get(i))
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Attach (or with blank text, remove) a frame's description.
    pub fn describe_frame(&mut self, index: usize, text: &str) -> bool {
        let Some(frame) = self.frames.get_mut(index) else {
            return false;
        };
        let text = text.trim();
        frame.description = if text.is_empty() { None } else { Some(text.to_owned()) };
        true
    }

    /// Frames in order, each scheduled `interval` after the previous one.
    pub fn playback(&self) -> impl Iterator<Item = PlaybackStep<'_>> {
        let interval = self.interval;
        self.frames.iter().map(move |frame| {
            let step = u32::try_from(frame.index).unwrap_or(u32::MAX);
            PlaybackStep { frame, at: interval.saturating_mul(step) }
        })
    }

    /// Total playback length: the last frame stays up for one interval.
    #[must_use]
    pub fn playback_duration(&self) -> Duration {
        let count = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        self.interval.saturating_mul(count)
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
