//! End-to-end scenarios driven through the public engine API.

use std::collections::HashMap;

use cumulus::engine::config::{LayoutConfig, PhysicsConfig, ShapeConfig};
use cumulus::engine::graph::build_nodes;
use cumulus::engine::physics::{PhysicsScratch, StepContext, step_physics};
use cumulus::engine::{Engine, EngineConfig, NodeKind, Unmeasured};
use cumulus::tree::store::{demo_tree, parse_tree};
use eframe::egui::{Pos2, Vec2, vec2};

const FRAME: f32 = 1.0 / 60.0;
const VIEWPORT: Vec2 = Vec2::new(1400.0, 900.0);

fn demo_engine() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.sync_tree(&demo_tree(), VIEWPORT);
    engine
}

fn settle(engine: &mut Engine, sizes: &HashMap<String, Vec2>) {
    for _ in 0..600 {
        engine.tick(FRAME, sizes);
        if engine.is_settled() {
            return;
        }
    }
    panic!("engine did not settle");
}

#[test]
fn overlapping_items_move_apart_in_free_mode() {
    let tree = parse_tree(
        r#"{"groups":[{"id":"g","title":"G","position":[505.0,285.0],
            "items":[{"id":"a","title":"A"},{"id":"b","title":"B"}]}]}"#,
    )
    .expect("tree parses");
    let mut nodes = build_nodes(
        &tree,
        VIEWPORT,
        None,
        &[],
        &LayoutConfig::default(),
        &ShapeConfig::default(),
    );
    for node in nodes.iter_mut().filter(|node| node.kind == NodeKind::Item) {
        node.radius = 45.0;
        node.position = if node.id == "a" {
            Pos2::new(500.0, 500.0)
        } else {
            Pos2::new(510.0, 500.0)
        };
    }

    let context = StepContext {
        delta_seconds: FRAME,
        ..StepContext::default()
    };
    step_physics(
        &mut nodes,
        &context,
        &PhysicsConfig::default(),
        &LayoutConfig::default(),
        &mut PhysicsScratch::default(),
    );

    let a = nodes.iter().find(|node| node.id == "a").expect("a");
    let b = nodes.iter().find(|node| node.id == "b").expect("b");
    assert!(a.position.x.is_finite() && a.position.y.is_finite());
    assert!(b.position.x.is_finite() && b.position.y.is_finite());
    assert!(a.position.distance(b.position) > 10.0);
}

#[test]
fn focus_owned_nodes_hold_still_once_settled() {
    let mut engine = demo_engine();
    let mut sizes = HashMap::new();
    sizes.insert("g-launch".to_owned(), vec2(190.0, 120.0));
    for id in ["i-copy", "i-press", "i-pricing"] {
        sizes.insert(id.to_owned(), vec2(90.0, 30.0));
    }

    assert!(engine.enter_focus("g-launch"));
    settle(&mut engine, &sizes);

    let layout = engine.focus_layout().expect("focus layout").clone();
    assert_eq!(layout.children.len(), 3);
    for (id, slot) in &layout.positions {
        assert_eq!(engine.node(id).expect("owned node").position, *slot);
    }

    for _ in 0..30 {
        engine.tick(FRAME, &sizes);
    }
    for (id, slot) in &layout.positions {
        assert_eq!(engine.node(id).expect("owned node").position, *slot);
    }
}

#[test]
fn focus_ring_clears_the_parent_and_spaces_children_evenly() {
    let mut engine = demo_engine();
    let mut sizes = HashMap::new();
    sizes.insert("i-book".to_owned(), vec2(190.0, 80.0));
    for id in ["s-book-ownership", "s-book-traits", "s-book-async", "s-book-macros"] {
        sizes.insert(id.to_owned(), vec2(70.0, 24.0));
    }

    engine.enter_focus("i-book");
    engine.tick(FRAME, &sizes);
    let layout = engine.focus_layout().expect("focus layout");
    let config = engine.config().layout;
    // coverage 120 for the item, 60 for each step
    assert!(layout.orbit_radius >= 120.0 + config.focus_gap + 60.0);

    let center = engine.node("i-book").expect("item").position;
    let angles = layout
        .children
        .iter()
        .map(|id| {
            let offset = layout.position(id).expect("slot") - center;
            offset.y.atan2(offset.x)
        })
        .collect::<Vec<_>>();
    for pair in angles.windows(2) {
        let gap = (pair[1] - pair[0]).rem_euclid(std::f32::consts::TAU);
        assert!((gap - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }
}

#[test]
fn drag_release_keeps_momentum() {
    let mut engine = demo_engine();
    assert!(engine.start_drag("i-taxes", Pos2::ZERO));
    for step in 1..=4 {
        engine.update_drag(Pos2::new(25.0 * step as f32, 0.0));
    }
    assert_eq!(engine.node("i-taxes").expect("item").position, Pos2::new(100.0, 0.0));

    let release = engine.end_drag();
    assert!(release.x > 0.0);
    assert!(release.length() <= engine.config().physics.max_speed + 1e-4);
    assert_eq!(engine.node("i-taxes").expect("item").velocity, release);
    assert_eq!(engine.end_drag(), Vec2::ZERO);
}

#[test]
fn dragged_ring_member_returns_to_its_slot() {
    let mut engine = demo_engine();
    engine.enter_focus("g-home");
    engine.tick(FRAME, &Unmeasured);
    let slot = engine
        .focus_layout()
        .and_then(|layout| layout.position("i-taxes"))
        .expect("slot");

    engine.start_drag("i-taxes", slot);
    engine.update_drag(slot + vec2(200.0, 0.0));
    engine.tick(FRAME, &Unmeasured);
    assert_eq!(engine.node("i-taxes").expect("item").position, slot + vec2(200.0, 0.0));

    assert!(engine.end_drag().x > 0.0);
    for _ in 0..300 {
        engine.tick(FRAME, &Unmeasured);
    }
    let position = engine.node("i-taxes").expect("item").position;
    assert!(position.distance(slot) <= engine.config().morph.epsilon * 2.0);
}

#[test]
fn rebuilding_an_unchanged_tree_is_bit_identical() {
    let tree = demo_tree();
    let layout = LayoutConfig::default();
    let shape = ShapeConfig::default();

    let fresh = build_nodes(&tree, VIEWPORT, Some("i-copy"), &[], &layout, &shape);
    let again = build_nodes(&tree, VIEWPORT, Some("i-copy"), &[], &layout, &shape);
    let rebuilt = build_nodes(&tree, VIEWPORT, Some("i-copy"), &fresh, &layout, &shape);
    let rebuilt_again = build_nodes(&tree, VIEWPORT, Some("i-copy"), &fresh, &layout, &shape);

    for nodes in [&again, &rebuilt, &rebuilt_again] {
        assert_eq!(nodes.len(), fresh.len());
        for (left, right) in fresh.iter().zip(nodes.iter()) {
            assert_eq!(left.id, right.id);
            assert_eq!(left.position.x.to_bits(), right.position.x.to_bits());
            assert_eq!(left.position.y.to_bits(), right.position.y.to_bits());
        }
    }
}

#[test]
fn zero_delta_ticks_leave_overlapping_items_in_place() {
    let mut engine = demo_engine();
    let anchor = engine.node("i-press").expect("item").position;
    let start = engine.node("i-copy").expect("item").position;
    assert!(engine.start_drag("i-copy", start));
    engine.update_drag(anchor + vec2(10.0, 0.0));
    engine.end_drag();

    let copy = engine.node("i-copy").expect("item").position;
    let press = engine.node("i-press").expect("item").position;
    for _ in 0..10 {
        engine.tick(0.0, &Unmeasured);
    }
    assert_eq!(engine.node("i-copy").expect("item").position, copy);
    assert_eq!(engine.node("i-press").expect("item").position, press);
}

#[test]
fn independent_engines_do_not_share_drag_state() {
    let mut first = demo_engine();
    let second = demo_engine();
    assert!(first.start_drag("i-copy", Pos2::ZERO));
    assert_eq!(first.dragged_id(), Some("i-copy"));
    assert!(second.dragged_id().is_none());
}
