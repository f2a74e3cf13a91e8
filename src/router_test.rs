#![allow(clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use super::*;
use crate::scene::{EntityKind, ShapeKind};

// =============================================================
// Helpers
// =============================================================

struct Rig {
    scene: SceneModel,
    engine: TransformEngine,
    router: GestureRouter,
}

impl Rig {
    fn new() -> Self {
        Self {
            scene: SceneModel::default(),
            engine: TransformEngine::default(),
            router: GestureRouter::new(Viewport::new(0.0, 0.0, 1000.0, 1000.0), HitSlop::default()),
        }
    }

    fn shape_at(&mut self, x: f64, y: f64) -> EntityId {
        self.scene.set_last_touch(Point::new(x, y));
        self.scene.add_shape(ShapeKind::Cone).id
    }

    fn send(&mut self, seq: u32, event: GestureEvent) -> Vec<Action> {
        self.router.route(&mut self.scene, &mut self.engine, SequenceId(seq), event)
    }

    fn down(&mut self, seq: u32, x: f64, y: f64) -> Vec<Action> {
        self.send(seq, GestureEvent::Down { point: Point::new(x, y), pointers: 1 })
    }

    fn mv(&mut self, seq: u32, x: f64, y: f64) -> Vec<Action> {
        self.send(seq, GestureEvent::Move { point: Point::new(x, y) })
    }

    fn up(&mut self, seq: u32) -> Vec<Action> {
        self.send(seq, GestureEvent::Up)
    }

    fn transform(&self, id: EntityId) -> Transform {
        self.scene.get(id).unwrap().transform
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn updated(actions: &[Action]) -> Option<(EntityId, Transform)> {
    actions.iter().find_map(|a| match a {
        Action::EntityUpdated { id, transform } => Some((*id, *transform)),
        _ => None,
    })
}

// =============================================================
// Move / none mode
// =============================================================

#[test]
fn drag_body_commits_on_up() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    assert!(matches!(rig.router.state(SequenceId(1)), GestureState::Dragging { .. }));
    rig.mv(1, 550.0, 520.0);
    rig.mv(1, 600.0, 550.0);
    let actions = rig.up(1);
    let (uid, t) = updated(&actions).unwrap();
    assert_eq!(uid, id);
    assert!(approx(t.x, 0.6));
    assert!(approx(t.y, 0.55));
    assert!(approx(rig.transform(id).x, 0.6));
    assert_eq!(rig.router.state(SequenceId(1)), GestureState::Idle);
}

#[test]
fn scene_unchanged_while_dragging() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    let actions = rig.mv(1, 600.0, 500.0);
    assert!(actions.iter().any(|a| matches!(a, Action::EntityPreview { .. })));
    assert_eq!(rig.transform(id).x, 0.5);
}

#[test]
fn move_mode_behaves_like_none() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Move);
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.mv(1, 500.0, 600.0);
    rig.up(1);
    assert!(approx(rig.transform(id).y, 0.6));
}

#[test]
fn down_selects_hit_entity_and_empty_down_clears() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    let actions = rig.down(1, 500.0, 500.0);
    assert!(actions.contains(&Action::SelectionChanged(Some(id))));
    rig.up(1);
    let actions = rig.down(2, 100.0, 100.0);
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(rig.router.selected().is_none());
}

#[test]
fn topmost_entity_wins() {
    let mut rig = Rig::new();
    rig.shape_at(0.5, 0.5);
    let top = rig.shape_at(0.52, 0.5);
    rig.down(1, 510.0, 500.0);
    assert_eq!(rig.router.state(SequenceId(1)).entity(), Some(top));
}

#[test]
fn rotate_handle_turns_entity() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.up(1);
    rig.down(2, 500.0, 436.0);
    assert!(matches!(rig.router.state(SequenceId(2)), GestureState::Rotating { .. }));
    rig.mv(2, 564.0, 500.0);
    rig.up(2);
    assert!(approx(rig.transform(id).rotation, FRAC_PI_2));
    assert_eq!(rig.transform(id).position(), Point::new(0.5, 0.5));
}

#[test]
fn scale_handle_scales_by_distance_ratio() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.up(1);
    rig.down(2, 540.0, 540.0);
    assert!(matches!(rig.router.state(SequenceId(2)), GestureState::Scaling { .. }));
    rig.mv(2, 580.0, 580.0);
    rig.up(2);
    assert!(approx(rig.transform(id).scale, 2.0));
}

#[test]
fn scale_handle_respects_ceiling() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.up(1);
    rig.down(2, 540.0, 540.0);
    rig.mv(2, 900.0, 900.0);
    rig.up(2);
    assert_eq!(rig.transform(id).scale, 3.0);
}

#[test]
fn two_finger_body_takes_pinch_and_rotate() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.send(1, GestureEvent::Down { point: Point::new(500.0, 500.0), pointers: 2 });
    assert!(matches!(rig.router.state(SequenceId(1)), GestureState::Pinching { .. }));
    rig.send(1, GestureEvent::Pinch { factor: 1.5 });
    rig.send(1, GestureEvent::Rotate { angle: 0.2 });
    rig.up(1);
    let t = rig.transform(id);
    assert!(approx(t.scale, 1.5));
    assert!(approx(t.rotation, 0.2));
}

#[test]
fn events_on_unknown_sequence_are_ignored() {
    let mut rig = Rig::new();
    rig.shape_at(0.5, 0.5);
    assert!(rig.mv(9, 1.0, 1.0).is_empty());
    assert!(rig.send(9, GestureEvent::Pinch { factor: 2.0 }).is_empty());
    assert!(rig.send(9, GestureEvent::Rotate { angle: 1.0 }).is_empty());
    assert!(rig.up(9).is_empty());
}

// =============================================================
// Concurrency between sequences
// =============================================================

#[test]
fn concurrent_sequences_on_different_entities() {
    let mut rig = Rig::new();
    let a = rig.shape_at(0.2, 0.2);
    let b = rig.shape_at(0.8, 0.8);
    rig.down(1, 200.0, 200.0);
    rig.down(2, 800.0, 800.0);
    rig.mv(1, 300.0, 200.0);
    rig.mv(2, 800.0, 700.0);
    rig.up(2);
    rig.mv(1, 400.0, 200.0);
    rig.up(1);
    assert!(approx(rig.transform(a).x, 0.4));
    assert!(approx(rig.transform(a).y, 0.2));
    assert!(approx(rig.transform(b).x, 0.8));
    assert!(approx(rig.transform(b).y, 0.7));
}

#[test]
fn second_sequence_on_busy_entity_is_ignored() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.down(2, 500.0, 500.0);
    assert_eq!(rig.router.state(SequenceId(2)), GestureState::Idle);
    assert!(rig.mv(2, 900.0, 900.0).is_empty());
    rig.mv(1, 510.0, 500.0);
    rig.up(1);
    assert!(approx(rig.transform(id).x, 0.51));
}

#[test]
fn repeated_down_commits_interrupted_gesture() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.mv(1, 600.0, 500.0);
    let actions = rig.down(1, 100.0, 100.0);
    assert_eq!(updated(&actions).map(|(uid, _)| uid), Some(id));
    assert!(approx(rig.transform(id).x, 0.6));
    assert!(!rig.engine.is_active(id));
}

#[test]
fn cancel_keeps_last_applied_transform() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.mv(1, 500.0, 300.0);
    rig.send(1, GestureEvent::Cancel);
    assert!(approx(rig.transform(id).y, 0.3));
}

#[test]
fn mode_change_mid_gesture_does_not_interrupt() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.scene.set_mode(Mode::Draw);
    rig.mv(1, 700.0, 500.0);
    rig.up(1);
    assert!(approx(rig.transform(id).x, 0.7));
    assert_eq!(rig.scene.len(), 1);
}

#[test]
fn delete_during_drag_is_tolerated() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.mv(1, 520.0, 500.0);
    rig.scene.set_mode(Mode::Erase);
    // The eraser finds the entity at its live position.
    let erased = rig.down(2, 520.0, 500.0);
    assert!(erased.contains(&Action::EntityDeleted { id }));
    let actions = rig.up(1);
    assert!(updated(&actions).is_none());
    assert!(rig.scene.is_empty());
    assert!(!rig.engine.is_active(id));
}

// =============================================================
// Erase mode
// =============================================================

#[test]
fn erase_deletes_hit_entity() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Erase);
    let id = rig.shape_at(0.5, 0.5);
    let actions = rig.down(1, 500.0, 500.0);
    assert!(actions.contains(&Action::EntityDeleted { id }));
    assert!(rig.scene.is_empty());
    assert_eq!(rig.router.state(SequenceId(1)), GestureState::Idle);
    assert!(rig.up(1).is_empty());
}

#[test]
fn erase_miss_changes_nothing() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Erase);
    rig.shape_at(0.5, 0.5);
    assert!(rig.down(1, 100.0, 100.0).is_empty());
    assert_eq!(rig.scene.len(), 1);
}

#[test]
fn erase_clears_selection_of_deleted_entity() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.up(1);
    rig.scene.set_mode(Mode::Erase);
    let actions = rig.down(2, 500.0, 500.0);
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(actions.contains(&Action::EntityDeleted { id }));
}

// =============================================================
// Draw mode
// =============================================================

#[test]
fn draw_appends_points_and_commits_stroke() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Draw);
    rig.down(1, 100.0, 100.0);
    rig.mv(1, 200.0, 100.0);
    rig.mv(1, 300.0, 100.0);
    assert_eq!(rig.router.pending_strokes().next().map(<[Point]>::len), Some(3));
    let actions = rig.up(1);
    let Some(Action::EntityAdded(entity)) = actions.first() else {
        panic!("expected EntityAdded, got {actions:?}");
    };
    let EntityKind::Stroke(stroke) = &entity.kind else {
        panic!("expected a stroke");
    };
    assert_eq!(stroke.points.len(), 3);
    assert!(approx(entity.transform.x, 0.2));
    assert_eq!(rig.scene.len(), 1);
}

#[test]
fn draw_over_entity_does_not_move_it() {
    let mut rig = Rig::new();
    let id = rig.shape_at(0.5, 0.5);
    rig.scene.set_mode(Mode::Draw);
    rig.down(1, 500.0, 500.0);
    rig.mv(1, 700.0, 700.0);
    rig.up(1);
    assert_eq!(rig.transform(id).position(), Point::new(0.5, 0.5));
    assert_eq!(rig.scene.len(), 2);
}

#[test]
fn draw_cancel_discards_stroke() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Draw);
    rig.down(1, 100.0, 100.0);
    rig.mv(1, 200.0, 200.0);
    rig.send(1, GestureEvent::Cancel);
    assert!(rig.scene.is_empty());
    assert_eq!(rig.router.active_sequences(), 0);
}

#[test]
fn draw_tap_without_fill_adds_nothing() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Draw);
    rig.down(1, 100.0, 100.0);
    let actions = rig.up(1);
    assert!(!actions.iter().any(|a| matches!(a, Action::EntityAdded(_))));
    assert!(rig.scene.is_empty());
}

#[test]
fn down_records_last_touch_for_new_shapes() {
    let mut rig = Rig::new();
    rig.scene.set_mode(Mode::Draw);
    rig.down(1, 250.0, 750.0);
    rig.up(1);
    let entity = rig.scene.add_shape(ShapeKind::Ladder);
    assert!(approx(entity.transform.x, 0.25));
    assert!(approx(entity.transform.y, 0.75));
}

// =============================================================
// Selection / angle helpers
// =============================================================

#[test]
fn select_reports_only_changes() {
    let mut router = GestureRouter::default();
    assert!(router.select(None).is_none());
    assert_eq!(router.select(Some(EntityId(1))), Some(Action::SelectionChanged(Some(EntityId(1)))));
    assert!(router.select(Some(EntityId(1))).is_none());
    assert_eq!(router.forget(EntityId(1)), Some(Action::SelectionChanged(None)));
}

#[test]
fn wrap_angle_folds_into_half_open_range() {
    assert!(approx(wrap_angle(0.5), 0.5));
    assert!(approx(wrap_angle(3.0 * FRAC_PI_2), -FRAC_PI_2));
    assert!(approx(wrap_angle(-3.0 * FRAC_PI_2), FRAC_PI_2));
    assert!(approx(wrap_angle(PI), PI));
    assert!(approx(wrap_angle(-PI), PI));
}

// =============================================================
// Viewport
// =============================================================

#[test]
fn set_viewport_rejects_degenerate_sizes() {
    let mut rig = Rig::new();
    let good = rig.router.viewport();
    assert!(!rig.router.set_viewport(Viewport::new(0.0, 0.0, 0.0, 1000.0)));
    assert!(!rig.router.set_viewport(Viewport::new(0.0, 0.0, -500.0, -500.0)));
    assert!(!rig.router.set_viewport(Viewport::new(0.0, 0.0, f64::NAN, 1000.0)));
    assert_eq!(rig.router.viewport(), good);

    let id = rig.shape_at(0.5, 0.5);
    rig.down(1, 500.0, 500.0);
    rig.mv(1, 600.0, 500.0);
    rig.up(1);
    assert!(approx(rig.transform(id).x, 0.6));
}

#[test]
fn new_with_degenerate_viewport_uses_default() {
    let router = GestureRouter::new(Viewport::new(0.0, 0.0, 0.0, 0.0), HitSlop::default());
    assert_eq!(router.viewport(), Viewport::default());
}
