//! Scene model: entities on the pad, the field background, and tool state.
//!
//! This module defines what is on the pad (`SceneEntity`, `EntityKind`), the
//! interaction state that decides how gestures are read (`Mode`, `Tool`,
//! `StrokeStyle`), and the `SceneModel` that owns all of it.
//!
//! `SceneModel` is the single writer of scene state. Its fields are private;
//! the transform engine and gesture router change the scene only through the
//! mutation methods below. Entity order is z-order (bottom first) and always
//! matches id order, because ids come from a counter that never goes back.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DOWN_FIELD_IMAGES, FIELD_CENTER, NORMAL_FIELD_IMAGES, UP_FIELD_IMAGES};
use crate::geom::{Point, ScaleLimits, Transform};
use crate::roster::{PlayerId, RosterPlayer, Team};

// =============================================================================
// IDENTITY
// =============================================================================

/// Stable entity identity (the `counterId`), independent of list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// Training equipment that can be dropped on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Cone,
    Flag,
    Ball,
    Goal,
    Ladder,
    Hurdle,
    Mannequin,
    Pole,
    Disc,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 9] = [
        Self::Cone,
        Self::Flag,
        Self::Ball,
        Self::Goal,
        Self::Ladder,
        Self::Hurdle,
        Self::Mannequin,
        Self::Pole,
        Self::Disc,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cone => "cone",
            Self::Flag => "flag",
            Self::Ball => "ball",
            Self::Goal => "goal",
            Self::Ladder => "ladder",
            Self::Hurdle => "hurdle",
            Self::Mannequin => "mannequin",
            Self::Pole => "pole",
            Self::Disc => "disc",
        }
    }
}

/// A tool id string that names no known shape or stroke tool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool id: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_owned()))
    }
}

/// How a stroke's path is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeTool {
    Line,
    Curve,
    Zigzag,
    Arrow,
    DashedArrow,
    Freehand,
}

impl FromStr for StrokeTool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Self::Line),
            "curve" => Ok(Self::Curve),
            "zigzag" => Ok(Self::Zigzag),
            "arrow" => Ok(Self::Arrow),
            "dashed_arrow" => Ok(Self::DashedArrow),
            "freehand" => Ok(Self::Freehand),
            other => Err(UnknownTool(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Closed outline a stroke can be filled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFill {
    Circle,
    Rect,
    Triangle,
}

/// What a player token shows: the shirt number, or a position label when
/// the roster has no number for that player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenLabel {
    Number(u16),
    Position(String),
}

impl TokenLabel {
    fn for_player(player: &RosterPlayer) -> Self {
        match (player.shirt_number, &player.position) {
            (Some(n), _) => Self::Number(n),
            (None, Some(pos)) => Self::Position(pos.clone()),
            (None, None) => Self::Position(String::from("?")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerToken {
    pub player_id: PlayerId,
    pub team: Team,
    pub label: TokenLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
}

/// A drawn path. `points` are relative to the owning entity's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub tool: StrokeTool,
    pub line_style: LineStyle,
    pub color: String,
    pub width: f64,
    pub points: Vec<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<ShapeFill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityKind {
    Player(PlayerToken),
    Shape(Shape),
    Stroke(Stroke),
}

/// One entity on the pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub id: EntityId,
    pub transform: Transform,
    /// Free-text description attached by the coach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub kind: EntityKind,
}

// =============================================================================
// INTERACTION STATE
// =============================================================================

/// Field background family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    /// Full pitch.
    #[default]
    Normal,
    /// Attacking half.
    Up,
    /// Defending half.
    Down,
}

impl FieldCategory {
    /// Number of selectable images in this category; ids run `0..count`.
    #[must_use]
    pub fn image_count(self) -> u32 {
        match self {
            Self::Normal => NORMAL_FIELD_IMAGES,
            Self::Up => UP_FIELD_IMAGES,
            Self::Down => DOWN_FIELD_IMAGES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Background {
    pub category: FieldCategory,
    pub image_id: u32,
}

/// Current interaction intent. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Draw,
    Erase,
    Move,
    #[default]
    #[serde(rename = "none")]
    Idle,
}

/// Selected tool: equipment to drop, or a stroke tool for draw mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Shape(ShapeKind),
    Stroke(StrokeTool),
}

impl Default for Tool {
    fn default() -> Self {
        Self::Stroke(StrokeTool::Line)
    }
}

/// Stroke sub-state. Only read while the mode is [`Mode::Draw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub line_style: LineStyle,
    pub color: String,
    pub width: f64,
    #[serde(default)]
    pub fill: Option<ShapeFill>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { line_style: LineStyle::Solid, color: String::from("#FFFFFF"), width: 3.0, fill: None }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// The entity was deleted while something still referred to it.
    #[error("stale entity: {0} no longer exists")]
    StaleEntity(EntityId),
    #[error("non-finite position for entity {0}")]
    NonFinite(EntityId),
}

// =============================================================================
// MODEL
// =============================================================================

/// Canonical scene state for one editing session.
#[derive(Debug, Clone)]
pub struct SceneModel {
    background: Background,
    entities: Vec<SceneEntity>,
    next_id: u64,
    mode: Mode,
    tool: Tool,
    stroke_style: StrokeStyle,
    last_touch: Option<Point>,
    limits: ScaleLimits,
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new(ScaleLimits::default())
    }
}

impl SceneModel {
    #[must_use]
    pub fn new(limits: ScaleLimits) -> Self {
        Self {
            background: Background::default(),
            entities: Vec::new(),
            next_id: 1,
            mode: Mode::default(),
            tool: Tool::default(),
            stroke_style: StrokeStyle::default(),
            last_touch: None,
            limits,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// New entities start at scale 1.0, pulled into the configured range.
    fn push(&mut self, transform: Transform, kind: EntityKind) -> SceneEntity {
        let transform = Transform { scale: self.limits.clamp(transform.scale), ..transform };
        let entity = SceneEntity { id: self.allocate_id(), transform, note: None, kind };
        self.entities.push(entity.clone());
        entity
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        // Ids are pushed in increasing order and never reordered.
        match self.entities.binary_search_by_key(&id, |e| e.id) {
            Ok(idx) => Some(idx),
            Err(_) => None,
        }
    }

    // --- Creation ---

    /// Drop a shape at the last touch point (or the field center).
    pub fn add_shape(&mut self, kind: ShapeKind) -> SceneEntity {
        let at = self.last_touch.unwrap_or(Point::new(FIELD_CENTER.0, FIELD_CENTER.1));
        let entity = self.push(Transform::at(at), EntityKind::Shape(Shape { kind }));
        tracing::debug!(id = %entity.id, kind = kind.as_str(), "shape added");
        entity
    }

    /// Place a token for a roster player. Each player can be on the pad once.
    pub fn place_player(&mut self, player: &RosterPlayer, at: Point) -> Option<SceneEntity> {
        if !at.is_finite() {
            tracing::warn!(player = %player.id, "rejected token at non-finite position");
            return None;
        }
        if self.placed_player_ids().any(|id| id == player.id) {
            tracing::debug!(player = %player.id, "player already on the pad");
            return None;
        }
        let token = PlayerToken { player_id: player.id, team: player.team, label: TokenLabel::for_player(player) };
        let entity = self.push(Transform::at(at), EntityKind::Player(token));
        tracing::debug!(id = %entity.id, player = %player.id, "player placed");
        Some(entity)
    }

    /// Commit a drawn path with the current stroke tool and style.
    ///
    /// Points are re-centered on their centroid, which becomes the stroke's
    /// transform origin so later pinch/rotate gestures pivot around the
    /// stroke itself. Returns `None` when too few finite points remain: two
    /// for an open path, one for a filled outline.
    pub fn add_stroke(&mut self, points: &[Point]) -> Option<SceneEntity> {
        let points: Vec<Point> = points.iter().copied().filter(|p| p.is_finite()).collect();
        let style = self.stroke_style.clone();
        let needed = if style.fill.is_some() { 1 } else { 2 };
        if points.len() < needed {
            tracing::debug!(points = points.len(), "stroke too short, discarded");
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let center = Point::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        );
        let local = points.iter().map(|p| Point::new(p.x - center.x, p.y - center.y)).collect();

        let tool = match self.tool {
            Tool::Stroke(tool) => tool,
            Tool::Shape(_) => StrokeTool::Freehand,
        };
        let stroke = Stroke {
            tool,
            line_style: style.line_style,
            color: style.color,
            width: style.width,
            points: local,
            fill: style.fill,
        };
        let entity = self.push(Transform::at(center), EntityKind::Stroke(stroke));
        tracing::debug!(id = %entity.id, ?tool, "stroke added");
        Some(entity)
    }

    // --- Mutation ---

    /// Remove an entity. Returns it if it was present; absent ids are a no-op.
    pub fn delete_entity(&mut self, id: EntityId) -> Option<SceneEntity> {
        let idx = self.index_of(id)?;
        let removed = self.entities.remove(idx);
        tracing::debug!(%id, remaining = self.entities.len(), "entity deleted");
        Some(removed)
    }

    /// Replace an entity's stored transform. Scale is clamped to the limits.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleEntity`] when the entity no longer exists and
    /// [`SceneError::NonFinite`] when the position is not finite. The scene is
    /// unchanged in both cases.
    pub fn update_entity_transform(&mut self, id: EntityId, transform: Transform) -> Result<(), SceneError> {
        if !transform.position().is_finite() || !transform.rotation.is_finite() {
            return Err(SceneError::NonFinite(id));
        }
        let scale = self.limits.clamp(transform.scale);
        let idx = self.index_of(id).ok_or(SceneError::StaleEntity(id))?;
        self.entities[idx].transform = Transform { scale, ..transform };
        Ok(())
    }

    /// Attach or clear a free-text note. Returns false if the entity is gone.
    pub fn describe_entity(&mut self, id: EntityId, note: Option<String>) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.entities[idx].note = note.filter(|n| !n.trim().is_empty());
        true
    }

    /// Switch the field background. Entities keep their field coordinates.
    /// Returns false (and changes nothing) for an id outside the category.
    pub fn set_background(&mut self, category: FieldCategory, image_id: u32) -> bool {
        if image_id >= category.image_count() {
            tracing::warn!(?category, image_id, "unknown field background");
            return false;
        }
        self.background = Background { category, image_id };
        true
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.stroke_style = style;
    }

    pub fn set_last_touch(&mut self, point: Point) {
        if point.is_finite() {
            self.last_touch = Some(point);
        }
    }

    /// Remove every entity. The id counter keeps counting.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.entities.len();
        self.entities.clear();
        tracing::debug!(removed, "scene cleared");
        removed
    }

    // --- Queries ---

    /// Entities bottom-first.
    #[must_use]
    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.index_of(id).map(|idx| &self.entities[idx])
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn background(&self) -> Background {
        self.background
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.stroke_style
    }

    #[must_use]
    pub fn limits(&self) -> ScaleLimits {
        self.limits
    }

    /// Roster ids of every player token, in z-order.
    pub fn placed_player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entities.iter().filter_map(|e| match &e.kind {
            EntityKind::Player(token) => Some(token.player_id),
            _ => None,
        })
    }
}
