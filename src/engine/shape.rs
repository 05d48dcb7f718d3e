//! Procedural puff-cloud shapes.
//!
//! A shape is a list of overlapping circles ("puffs") in node-local
//! coordinates. Every profile is a pure function of its inputs and seed.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use eframe::egui::{Vec2, vec2};

use super::config::ShapeConfig;
use super::rng::SeededRng;

const RING_DISTANCE: (f32, f32) = (0.50, 0.55);
const RING_RADIUS: f32 = 0.42;
const RING_VARIANCE: f32 = 0.30;
const RING_ANGLE_NOISE: f32 = 0.18;
const INTERIOR_SPREAD: f32 = 0.45;
const INTERIOR_RADIUS: f32 = 0.30;
const INTERIOR_VARIANCE: f32 = 0.40;
const CENTER_RADIUS: f32 = 0.55;

const MEMBER_RING_DISTANCE: f32 = 0.50;
const MEMBER_DISTANCE_NOISE: f32 = 0.03;
const MEMBER_ANGLE_NOISE: f32 = 0.05;
const MEMBER_RADIUS_VARIANCE: f32 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Puff {
    pub offset: Vec2,
    pub radius: f32,
}

impl Puff {
    pub fn new(offset: Vec2, radius: f32) -> Self {
        Self { offset, radius }
    }

    pub const SEED: Self = Self {
        offset: Vec2::ZERO,
        radius: 0.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeMode {
    /// The node itself is the subject of attention.
    Standalone,
    /// The node is a child of the subject of attention.
    Member,
}

impl ShapeMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Member => "member",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Synthesis {
    pub puffs: Vec<Puff>,
    pub coverage_radius: f32,
}

/// Clamps negative or non-finite measurements to zero.
pub fn sanitize_size(size: Vec2) -> Vec2 {
    let clean = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };
    vec2(clean(size.x), clean(size.y))
}

pub fn coverage_radius(size: Vec2, config: &ShapeConfig) -> f32 {
    let size = sanitize_size(size);
    (size.x * 0.5).max(size.y * 0.5) + config.margin
}

/// Radii of the interaction ellipse for a node showing content of `size`.
pub fn hit_ellipse(size: Vec2, config: &ShapeConfig) -> Vec2 {
    let size = sanitize_size(size);
    vec2(size.x * 0.5 + config.margin, size.y * 0.5 + config.margin)
}

pub fn ellipse_contains(radii: Vec2, local: Vec2) -> bool {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    let nx = local.x / radii.x;
    let ny = local.y / radii.y;
    nx * nx + ny * ny <= 1.0
}

pub fn synthesize(
    size: Vec2,
    mode: ShapeMode,
    seed: u32,
    resting_puffs: usize,
    config: &ShapeConfig,
) -> Synthesis {
    let size = sanitize_size(size);
    let coverage_radius = coverage_radius(size, config);
    let mut rng = SeededRng::new(seed);

    let puffs = match mode {
        ShapeMode::Standalone => standalone_puffs(size, coverage_radius, &mut rng, config),
        ShapeMode::Member => member_puffs(coverage_radius, resting_puffs, &mut rng, config),
    };

    Synthesis {
        puffs,
        coverage_radius,
    }
}

fn standalone_puffs(
    size: Vec2,
    coverage: f32,
    rng: &mut SeededRng,
    config: &ShapeConfig,
) -> Vec<Puff> {
    let min = config.standalone_min_puffs;
    let max = config.standalone_max_puffs.max(min);
    let extra = if config.area_per_extra_puff > 0.0 {
        ((size.x * size.y) / config.area_per_extra_puff) as usize
    } else {
        0
    };
    let count = min.saturating_add(extra).clamp(min, max);
    let ring_count = count / 2;
    let interior_count = count - ring_count;

    let mut puffs = Vec::with_capacity(count + 5);

    for index in 0..ring_count {
        let angle = (index as f32 / ring_count as f32) * TAU + rng.signed() * RING_ANGLE_NOISE;
        let distance = coverage * rng.range(RING_DISTANCE.0, RING_DISTANCE.1);
        let radius = coverage * RING_RADIUS * (1.0 + rng.signed() * RING_VARIANCE);
        puffs.push(Puff::new(Vec2::angled(angle) * distance, radius));
    }

    for _ in 0..interior_count {
        let angle = rng.next_f32() * TAU;
        let distance = rng.next_f32().sqrt() * coverage * INTERIOR_SPREAD;
        let radius = coverage * INTERIOR_RADIUS * (1.0 + rng.signed() * INTERIOR_VARIANCE);
        puffs.push(Puff::new(Vec2::angled(angle) * distance, radius));
    }

    // Corner anchors reach the content rectangle's corners.
    let half_diagonal = (size * 0.5).length();
    let anchor_distance = (half_diagonal * 0.75).min(coverage * 0.9);
    let anchor_radius =
        (coverage * 0.4).max(half_diagonal - anchor_distance + config.margin * 0.5);
    for quadrant in 0..4 {
        let angle = FRAC_PI_4 + quadrant as f32 * FRAC_PI_2;
        puffs.push(Puff::new(
            Vec2::angled(angle) * anchor_distance,
            anchor_radius,
        ));
    }

    puffs.push(Puff::new(Vec2::ZERO, coverage * CENTER_RADIUS));
    puffs
}

fn member_puffs(
    coverage: f32,
    resting_puffs: usize,
    rng: &mut SeededRng,
    config: &ShapeConfig,
) -> Vec<Puff> {
    let count = (resting_puffs * 2).max(config.member_min_puffs).max(2);
    let ring_count = count - 1;

    let mut puffs = Vec::with_capacity(count);
    let mut max_ring_radius = 0.0_f32;
    for index in 0..ring_count {
        let angle =
            (index as f32 / ring_count as f32) * TAU + rng.signed() * MEMBER_ANGLE_NOISE;
        let distance =
            coverage * (MEMBER_RING_DISTANCE + rng.signed() * MEMBER_DISTANCE_NOISE);
        let radius = (coverage * RING_RADIUS * (1.0 + rng.signed() * MEMBER_RADIUS_VARIANCE))
            .min(coverage - distance);
        max_ring_radius = max_ring_radius.max(radius);
        puffs.push(Puff::new(Vec2::angled(angle) * distance, radius));
    }

    let center_radius = (max_ring_radius * 1.2)
        .max(coverage * 0.5)
        .min(coverage);
    puffs.push(Puff::new(Vec2::ZERO, center_radius));
    puffs
}

/// The node's resting cloud: a small ring plus a center puff, all inside
/// `node_radius`.
pub fn resting_puffs(node_radius: f32, seed: u32, config: &ShapeConfig) -> Vec<Puff> {
    let node_radius = if node_radius.is_finite() {
        node_radius.max(1.0)
    } else {
        1.0
    };
    let mut rng = SeededRng::new(seed);
    let min = config.resting_min_puffs.max(2);
    let max = config.resting_max_puffs.max(min);
    let count = (min + (rng.next_f32() * (max - min + 1) as f32) as usize).min(max);
    let ring_count = count - 1;

    let mut puffs = Vec::with_capacity(count);
    for index in 0..ring_count {
        let angle = (index as f32 / ring_count as f32) * TAU + rng.signed() * 0.25;
        let distance = node_radius * rng.range(0.38, 0.5);
        let radius = (node_radius * rng.range(0.42, 0.55)).min(node_radius - distance);
        puffs.push(Puff::new(Vec2::angled(angle) * distance, radius));
    }
    puffs.push(Puff::new(Vec2::ZERO, node_radius * 0.62));
    puffs
}
