//! Per-frame blending of puff sets and focus positions toward their targets.

use eframe::egui::{Pos2, Vec2};

use super::config::{MorphConfig, ShapeConfig};
use super::graph::{Node, Presentation};
use super::rng::{seed_from_key, shape_seed};
use super::shape::{Puff, ShapeMode, resting_puffs, sanitize_size, synthesize};
use crate::util::quantize;

const MAX_FRAME_SECONDS: f32 = 0.25;

/// Identifies a synthesized target so it is only regenerated when the
/// profile or the quantized content size changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeKey {
    pub mode: ShapeMode,
    pub width: i32,
    pub height: i32,
}

impl ShapeKey {
    pub fn new(mode: ShapeMode, size: Vec2) -> Self {
        let size = sanitize_size(size);
        Self {
            mode,
            width: quantize(size.x, 1.0),
            height: quantize(size.y, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShapeState {
    pub base: Vec<Puff>,
    pub current: Vec<Puff>,
    pub target: Vec<Puff>,
    pub presentation: Presentation,
    pub key: Option<ShapeKey>,
    /// Last measured content size for the active presentation.
    pub content_size: Option<Vec2>,
    pub coverage_radius: f32,
    resting_radius: f32,
}

impl ShapeState {
    pub fn resting(id: &str, radius: f32, config: &ShapeConfig) -> Self {
        let base = resting_puffs(radius, seed_from_key(id), config);
        Self {
            current: base.clone(),
            target: base.clone(),
            base,
            presentation: Presentation::Resting,
            key: None,
            content_size: None,
            coverage_radius: radius,
            resting_radius: radius,
        }
    }

    /// Regenerates the base shape for a new node radius with the node's seed.
    pub fn rebase(&mut self, id: &str, radius: f32, config: &ShapeConfig) {
        self.base = resting_puffs(radius, seed_from_key(id), config);
        self.resting_radius = radius;
        if self.presentation == Presentation::Resting {
            self.target = self.base.clone();
            self.coverage_radius = radius;
        }
    }

    pub fn show_resting(&mut self) {
        if self.presentation == Presentation::Resting && self.key.is_none() {
            return;
        }
        self.presentation = Presentation::Resting;
        self.key = None;
        self.content_size = None;
        self.target = self.base.clone();
        self.coverage_radius = self.resting_radius;
    }

    /// Points the target at the `mode` profile for `size`. Returns `true` when
    /// a new target was synthesized.
    pub fn retarget(&mut self, id: &str, mode: ShapeMode, size: Vec2, config: &ShapeConfig) -> bool {
        let presentation = match mode {
            ShapeMode::Standalone => Presentation::Standalone,
            ShapeMode::Member => Presentation::Member,
        };
        let size = sanitize_size(size);
        let key = ShapeKey::new(mode, size);
        self.presentation = presentation;
        self.content_size = Some(size);
        if self.key == Some(key) {
            return false;
        }

        let seed = shape_seed(id, mode.name(), size.x, size.y);
        let synthesis = synthesize(size, mode, seed, self.base.len(), config);
        self.target = synthesis.puffs;
        self.coverage_radius = synthesis.coverage_radius;
        self.key = Some(key);
        true
    }
}

fn blend_fraction(config: &MorphConfig, delta_seconds: f32) -> f32 {
    let rate = config.rate.clamp(0.0, 1.0);
    let frames = delta_seconds.clamp(0.0, MAX_FRAME_SECONDS) * 60.0;
    1.0 - (1.0 - rate).powf(frames)
}

fn approach(current: &mut f32, target: f32, fraction: f32, epsilon: f32) -> bool {
    let delta = target - *current;
    if delta.abs() <= epsilon {
        *current = target;
        return true;
    }
    *current += delta * fraction;
    false
}

fn approach_puff(current: &mut Puff, target: Puff, fraction: f32, epsilon: f32) -> bool {
    let x = approach(&mut current.offset.x, target.offset.x, fraction, epsilon);
    let y = approach(&mut current.offset.y, target.offset.y, fraction, epsilon);
    let r = approach(&mut current.radius, target.radius, fraction, epsilon);
    x && y && r
}

fn approach_position(current: &mut Pos2, target: Pos2, fraction: f32, epsilon: f32) -> bool {
    let x = approach(&mut current.x, target.x, fraction, epsilon);
    let y = approach(&mut current.y, target.y, fraction, epsilon);
    x && y
}

/// Moves `node`'s current puffs and position one frame toward their targets.
/// Returns whether the node is settled afterwards.
pub fn advance(node: &mut Node, delta_seconds: f32, config: &MorphConfig) -> bool {
    let fraction = blend_fraction(config, delta_seconds);
    let epsilon = config.epsilon.max(0.0);
    let shape = &mut node.shape;

    let matched = shape.target.len();
    while shape.current.len() < matched {
        shape.current.push(Puff::SEED);
    }

    let mut settled = true;
    for (current, target) in shape.current.iter_mut().zip(&shape.target) {
        settled &= approach_puff(current, *target, fraction, epsilon);
    }

    if shape.current.len() > matched {
        let mut collapsed = true;
        for extra in &mut shape.current[matched..] {
            collapsed &= approach_puff(extra, Puff::SEED, fraction, epsilon);
        }
        if collapsed {
            shape.current.truncate(matched);
        } else {
            settled = false;
        }
    }

    if let Some(target) = node.position_target {
        settled &= approach_position(&mut node.position, target, fraction, epsilon);
    }

    settled
}

pub fn is_settled(node: &Node, config: &MorphConfig) -> bool {
    let epsilon = config.epsilon.max(0.0);
    let shape = &node.shape;
    let puffs_settled = shape.current.len() == shape.target.len()
        && shape
            .current
            .iter()
            .zip(&shape.target)
            .all(|(current, target)| {
                (current.offset.x - target.offset.x).abs() <= epsilon
                    && (current.offset.y - target.offset.y).abs() <= epsilon
                    && (current.radius - target.radius).abs() <= epsilon
            });
    let position_settled = node.position_target.is_none_or(|target| {
        (node.position.x - target.x).abs() <= epsilon
            && (node.position.y - target.y).abs() <= epsilon
    });
    puffs_settled && position_settled
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::engine::config::LayoutConfig;
    use crate::engine::graph::build_nodes;
    use crate::tree::store::demo_tree;

    const FRAME: f32 = 1.0 / 60.0;

    fn item_node() -> Node {
        let tree = demo_tree();
        build_nodes(
            &tree,
            vec2(800.0, 600.0),
            None,
            &[],
            &LayoutConfig::default(),
            &ShapeConfig::default(),
        )
        .into_iter()
        .find(|node| node.id == "i-copy")
        .expect("item exists")
    }

    #[test]
    fn fresh_node_is_settled_on_its_base_shape() {
        let node = item_node();
        assert!(is_settled(&node, &MorphConfig::default()));
        assert_eq!(node.shape.current, node.shape.base);
    }

    #[test]
    fn new_puffs_are_born_at_origin_with_zero_radius() {
        let config = MorphConfig::default();
        let mut node = item_node();
        let resting_len = node.shape.current.len();
        assert!(node.shape.retarget(&node.id.clone(), ShapeMode::Standalone, vec2(200.0, 80.0), &ShapeConfig::default()));

        advance(&mut node, FRAME, &config);
        let target_len = node.shape.target.len();
        assert_eq!(node.shape.current.len(), target_len);
        let fraction = blend_fraction(&config, FRAME);
        for (index, puff) in node.shape.current.iter().enumerate().skip(resting_len) {
            let target = node.shape.target[index];
            // one frame of growth from zero, never the full size
            assert!((puff.radius - target.radius * fraction).abs() < 1e-3);
            assert!(puff.radius < target.radius);
        }
    }

    #[test]
    fn surplus_puffs_shrink_before_removal() {
        let config = MorphConfig::default();
        let shape_config = ShapeConfig::default();
        let mut node = item_node();
        let id = node.id.clone();
        node.shape.retarget(&id, ShapeMode::Standalone, vec2(240.0, 90.0), &shape_config);
        for _ in 0..600 {
            if advance(&mut node, FRAME, &config) {
                break;
            }
        }
        let grown = node.shape.current.len();

        node.shape.show_resting();
        let resting = node.shape.target.len();
        assert!(grown > resting);

        advance(&mut node, FRAME, &config);
        assert_eq!(node.shape.current.len(), grown);
        let mut ticks = 0;
        while !advance(&mut node, FRAME, &config) {
            assert!(node.shape.current.len() >= resting);
            ticks += 1;
            assert!(ticks < 600, "shape never settled");
        }
        assert_eq!(node.shape.current.len(), resting);
    }

    #[test]
    fn settles_in_bounded_ticks_and_stays_settled() {
        let config = MorphConfig::default();
        let mut node = item_node();
        let id = node.id.clone();
        node.shape.retarget(&id, ShapeMode::Member, vec2(150.0, 40.0), &ShapeConfig::default());
        node.position_target = Some(node.position + vec2(300.0, -120.0));

        // remaining distance shrinks by (1 - rate) per frame
        let bound = ((config.epsilon / 400.0).ln() / (1.0 - config.rate).ln()).ceil() as usize + 2;
        let mut ticks = 0;
        while !advance(&mut node, FRAME, &config) {
            ticks += 1;
            assert!(ticks <= bound, "not settled after {ticks} ticks");
        }
        assert!(is_settled(&node, &config));
        let snapshot = node.shape.current.clone();
        let position = node.position;
        for _ in 0..10 {
            assert!(advance(&mut node, FRAME, &config));
        }
        assert_eq!(node.shape.current, snapshot);
        assert_eq!(node.position, position);
    }

    #[test]
    fn blending_is_frame_rate_independent() {
        let config = MorphConfig::default();
        let full = blend_fraction(&config, 2.0 * FRAME);
        let half = blend_fraction(&config, FRAME);
        let compounded = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((full - compounded).abs() < 1e-5);
        assert_eq!(blend_fraction(&config, 0.0), 0.0);
    }

    #[test]
    fn retarget_skips_unchanged_keys() {
        let shape_config = ShapeConfig::default();
        let mut node = item_node();
        let id = node.id.clone();
        assert!(node.shape.retarget(&id, ShapeMode::Member, vec2(120.0, 40.0), &shape_config));
        assert!(!node.shape.retarget(&id, ShapeMode::Member, vec2(120.2, 40.1), &shape_config));
        assert!(node.shape.retarget(&id, ShapeMode::Standalone, vec2(120.0, 40.0), &shape_config));
        assert_eq!(node.shape.presentation, Presentation::Standalone);
    }
}
