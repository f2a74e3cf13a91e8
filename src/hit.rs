#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX, SHAPE_HALF_EXTENT, TOKEN_RADIUS};
use crate::geom::{Point, Transform, Viewport, distance_to_segment};
use crate::scene::{EntityId, EntityKind, SceneEntity, SceneModel, Stroke};
use crate::transform::TransformEngine;

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ScaleHandle,
    RotateHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub entity_id: EntityId,
    pub part: HitPart,
}

/// Screen-space hit tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSlop {
    pub handle_radius_px: f64,
    pub rotate_offset_px: f64,
}

impl Default for HitSlop {
    fn default() -> Self {
        Self { handle_radius_px: HANDLE_RADIUS_PX, rotate_offset_px: ROTATE_HANDLE_OFFSET_PX }
    }
}

/// Test which entity (if any) is under `field_pt`.
///
/// Handles of the selected entity are checked first so they win over any
/// body underneath. Bodies are then checked top-down: the highest id wins.
/// Entities under a live gesture are tested at their live transform.
#[must_use]
pub fn hit_test(
    field_pt: Point,
    scene: &SceneModel,
    engine: &TransformEngine,
    viewport: &Viewport,
    slop: HitSlop,
    selected: Option<EntityId>,
) -> Option<Hit> {
    if !field_pt.is_finite() {
        return None;
    }
    let radius = viewport.screen_dist_to_field(slop.handle_radius_px);

    if let Some(entity) = selected.and_then(|id| scene.get(id)) {
        let t = engine.effective(scene, entity.id).unwrap_or(entity.transform);
        let handles = handle_positions(entity, &t, viewport.screen_dist_to_field(slop.rotate_offset_px));
        if field_pt.distance(handles.rotate) <= radius {
            return Some(Hit { entity_id: entity.id, part: HitPart::RotateHandle });
        }
        if field_pt.distance(handles.scale) <= radius {
            return Some(Hit { entity_id: entity.id, part: HitPart::ScaleHandle });
        }
    }

    scene.entities().iter().rev().find_map(|entity| {
        let t = engine.effective(scene, entity.id).unwrap_or(entity.transform);
        body_contains(entity, &t, field_pt, radius).then_some(Hit { entity_id: entity.id, part: HitPart::Body })
    })
}

/// Field positions of an entity's control handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handles {
    pub scale: Point,
    pub rotate: Point,
}

/// Compute handle positions: the scale handle sits on the bottom-right corner
/// of the footprint, the rotate handle `rotate_offset` beyond its top edge.
#[must_use]
pub fn handle_positions(entity: &SceneEntity, t: &Transform, rotate_offset: f64) -> Handles {
    let h = half_extent(entity);
    let scale = t.apply(Point::new(h, h));
    let top = t.apply(Point::new(0.0, -h));
    let center = t.position();
    let len = center.distance(top);
    let rotate = if len > 0.0 {
        Point::new(
            top.x + (top.x - center.x) / len * rotate_offset,
            top.y + (top.y - center.y) / len * rotate_offset,
        )
    } else {
        Point::new(center.x, center.y - rotate_offset)
    };
    Handles { scale, rotate }
}

/// Half the side of the entity's local footprint, before scaling.
fn half_extent(entity: &SceneEntity) -> f64 {
    match &entity.kind {
        EntityKind::Player(_) => TOKEN_RADIUS,
        EntityKind::Shape(_) => SHAPE_HALF_EXTENT,
        EntityKind::Stroke(stroke) => stroke
            .points
            .iter()
            .map(|p| p.x.abs().max(p.y.abs()))
            .fold(SHAPE_HALF_EXTENT * 0.5, f64::max),
    }
}

fn body_contains(entity: &SceneEntity, t: &Transform, field_pt: Point, radius: f64) -> bool {
    let local = t.invert(field_pt);
    match &entity.kind {
        EntityKind::Player(_) => local.x.hypot(local.y) <= TOKEN_RADIUS,
        EntityKind::Shape(_) => local.x.abs() <= SHAPE_HALF_EXTENT && local.y.abs() <= SHAPE_HALF_EXTENT,
        EntityKind::Stroke(stroke) => stroke_contains(stroke, local, radius / t.scale.max(f64::EPSILON)),
    }
}

fn stroke_contains(stroke: &Stroke, local: Point, tolerance: f64) -> bool {
    if stroke.fill.is_some() {
        let (min_x, max_x, min_y, max_y) = stroke.points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), p| (a.min(p.x), b.max(p.x), c.min(p.y), d.max(p.y)),
        );
        // A single-point outline still has a usable footprint.
        let pad = tolerance.max(SHAPE_HALF_EXTENT * 0.5);
        return local.x >= min_x - pad && local.x <= max_x + pad && local.y >= min_y - pad && local.y <= max_y + pad;
    }
    match stroke.points.as_slice() {
        [] => false,
        [only] => local.distance(*only) <= tolerance,
        points => points
            .windows(2)
            .any(|w| distance_to_segment(local, w[0], w[1]) <= tolerance),
    }
}
