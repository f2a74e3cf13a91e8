//! Shared numeric constants for the tactical pad.

// ── Transforms ──────────────────────────────────────────────────

/// Smallest scale a gesture can commit.
pub const MIN_SCALE: f64 = 0.25;

/// Largest scale a gesture can commit.
pub const MAX_SCALE: f64 = 3.0;

/// Field-normalized point where new shapes land when no touch has been seen.
pub const FIELD_CENTER: (f64, f64) = (0.5, 0.5);

/// Side in pixels of the field a pad assumes until the host reports its
/// real viewport.
pub const DEFAULT_VIEWPORT_PX: f64 = 1000.0;

// ── Entity extents (field-normalized, at scale 1.0) ─────────────

/// Radius of a player token.
pub const TOKEN_RADIUS: f64 = 0.03;

/// Half the side of a shape's square footprint.
pub const SHAPE_HALF_EXTENT: f64 = 0.04;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles and thin strokes.
pub const HANDLE_RADIUS_PX: f64 = 12.0;

/// Distance from the entity footprint to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Frames ──────────────────────────────────────────────────────

/// Soft cap on captured frames per session.
pub const DEFAULT_FRAME_CAP: usize = 50;

/// Delay between frames during playback.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 800;

// ── Field backgrounds ───────────────────────────────────────────

/// Number of selectable images in the `normal` field category.
pub const NORMAL_FIELD_IMAGES: u32 = 4;

/// Number of selectable images in the `up` (attacking half) category.
pub const UP_FIELD_IMAGES: u32 = 3;

/// Number of selectable images in the `down` (defending half) category.
pub const DOWN_FIELD_IMAGES: u32 = 3;
