use std::f64::consts::FRAC_PI_4;

use uuid::Uuid;

use super::*;
use crate::roster::{RosterPlayer, Team};
use crate::scene::{ShapeFill, ShapeKind, StrokeStyle};

fn viewport() -> Viewport {
    Viewport::new(0.0, 0.0, 1000.0, 1000.0)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn shape_at(scene: &mut SceneModel, x: f64, y: f64) -> EntityId {
    scene.set_last_touch(pt(x, y));
    scene.add_shape(ShapeKind::Cone).id
}

fn hit(scene: &SceneModel, p: Point, selected: Option<EntityId>) -> Option<Hit> {
    hit_test(p, scene, &TransformEngine::default(), &viewport(), HitSlop::default(), selected)
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn empty_scene_hits_nothing() {
    let scene = SceneModel::default();
    assert!(hit(&scene, pt(0.5, 0.5), None).is_none());
}

#[test]
fn shape_body_hit_at_center() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    assert_eq!(hit(&scene, pt(0.5, 0.5), None), Some(Hit { entity_id: id, part: HitPart::Body }));
}

#[test]
fn shape_body_miss_outside_footprint() {
    let mut scene = SceneModel::default();
    shape_at(&mut scene, 0.5, 0.5);
    assert!(hit(&scene, pt(0.6, 0.5), None).is_none());
}

#[test]
fn non_finite_point_hits_nothing() {
    let mut scene = SceneModel::default();
    shape_at(&mut scene, 0.5, 0.5);
    assert!(hit(&scene, pt(f64::NAN, 0.5), None).is_none());
}

#[test]
fn overlapping_bodies_topmost_wins() {
    let mut scene = SceneModel::default();
    shape_at(&mut scene, 0.5, 0.5);
    let top = shape_at(&mut scene, 0.52, 0.5);
    assert_eq!(hit(&scene, pt(0.51, 0.5), None).map(|h| h.entity_id), Some(top));
}

#[test]
fn rotated_shape_uses_local_frame() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    assert!(hit(&scene, pt(0.545, 0.5), None).is_none());
    scene
        .update_entity_transform(id, Transform { x: 0.5, y: 0.5, scale: 1.0, rotation: FRAC_PI_4 })
        .unwrap();
    assert_eq!(hit(&scene, pt(0.545, 0.5), None).map(|h| h.entity_id), Some(id));
}

#[test]
fn scaled_shape_grows_footprint() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    scene
        .update_entity_transform(id, Transform { x: 0.5, y: 0.5, scale: 2.0, rotation: 0.0 })
        .unwrap();
    assert_eq!(hit(&scene, pt(0.57, 0.5), None).map(|h| h.entity_id), Some(id));
}

#[test]
fn player_token_is_circular() {
    let mut scene = SceneModel::default();
    let player = RosterPlayer { id: Uuid::new_v4(), team: Team::Away, shirt_number: Some(5), position: None };
    let id = scene.place_player(&player, pt(0.5, 0.5)).unwrap().id;
    assert_eq!(hit(&scene, pt(0.52, 0.52), None).map(|h| h.entity_id), Some(id));
    assert!(hit(&scene, pt(0.525, 0.525), None).is_none());
}

#[test]
fn stroke_hit_near_segment() {
    let mut scene = SceneModel::default();
    let id = scene.add_stroke(&[pt(0.2, 0.2), pt(0.4, 0.2)]).unwrap().id;
    assert_eq!(hit(&scene, pt(0.35, 0.205), None).map(|h| h.entity_id), Some(id));
    assert!(hit(&scene, pt(0.35, 0.25), None).is_none());
}

#[test]
fn filled_stroke_hit_inside_bounds() {
    let mut scene = SceneModel::default();
    scene.set_stroke_style(StrokeStyle { fill: Some(ShapeFill::Rect), ..StrokeStyle::default() });
    let id = scene.add_stroke(&[pt(0.2, 0.2), pt(0.4, 0.4)]).unwrap().id;
    assert_eq!(hit(&scene, pt(0.3, 0.31), None).map(|h| h.entity_id), Some(id));
}

#[test]
fn live_transform_moves_hit_region() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    let mut engine = TransformEngine::default();
    engine.begin_gesture(&scene, id);
    engine.apply_pan_delta(id, 0.2, 0.0);
    let slop = HitSlop::default();
    assert!(hit_test(pt(0.5, 0.5), &scene, &engine, &viewport(), slop, None).is_none());
    assert_eq!(
        hit_test(pt(0.7, 0.5), &scene, &engine, &viewport(), slop, None).map(|h| h.entity_id),
        Some(id)
    );
}

// =============================================================
// Handles
// =============================================================

#[test]
fn handle_positions_unrotated() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    let entity = scene.get(id).unwrap();
    let handles = handle_positions(entity, &entity.transform, 0.024);
    assert!((handles.scale.x - 0.54).abs() < 1e-9);
    assert!((handles.scale.y - 0.54).abs() < 1e-9);
    assert!((handles.rotate.x - 0.5).abs() < 1e-9);
    assert!((handles.rotate.y - 0.436).abs() < 1e-9);
}

#[test]
fn handles_only_for_selected_entity() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    assert!(hit(&scene, pt(0.5, 0.436), None).is_none());
    assert_eq!(hit(&scene, pt(0.5, 0.436), Some(id)), Some(Hit { entity_id: id, part: HitPart::RotateHandle }));
}

#[test]
fn handle_beats_body_on_top() {
    let mut scene = SceneModel::default();
    let below = shape_at(&mut scene, 0.5, 0.5);
    let above = shape_at(&mut scene, 0.54, 0.54);
    assert_eq!(hit(&scene, pt(0.54, 0.54), None), Some(Hit { entity_id: above, part: HitPart::Body }));
    assert_eq!(
        hit(&scene, pt(0.54, 0.54), Some(below)),
        Some(Hit { entity_id: below, part: HitPart::ScaleHandle })
    );
}

#[test]
fn stale_selection_falls_back_to_bodies() {
    let mut scene = SceneModel::default();
    let id = shape_at(&mut scene, 0.5, 0.5);
    assert_eq!(hit(&scene, pt(0.5, 0.5), Some(EntityId(999))).map(|h| h.entity_id), Some(id));
}
