use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub layout: LayoutConfig,
    pub shape: ShapeConfig,
    pub morph: MorphConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid engine config JSON in {}", path.display()))
    }
}

/// Values of [`PhysicsConfig::intensity`] the simulator honours.
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.2..=2.5;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Scales every force; the viewer exposes it as a single slider.
    pub intensity: f32,
    pub repulsion_strength: f32,
    /// Extra clearance added to the sum of radii before two nodes repel.
    pub repulsion_padding: f32,
    pub drag_shove_multiplier: f32,
    /// During a drag, pairs farther than this from the pointer skip repulsion.
    pub drag_cull_radius: f32,
    pub spring_strength: f32,
    pub parent_pull: f32,
    pub sub_item_force_scale: f32,
    pub push_radius: f32,
    pub push_strength: f32,
    pub wake_fraction: f32,
    pub jitter_threshold: f32,
    pub jitter_amount: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub damping: f32,
    pub background_damping: f32,
    pub drag_velocity_smoothing: f32,
    pub release_momentum: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            repulsion_strength: 0.9,
            repulsion_padding: 20.0,
            drag_shove_multiplier: 3.0,
            drag_cull_radius: 420.0,
            spring_strength: 0.006,
            parent_pull: 0.04,
            sub_item_force_scale: 0.35,
            push_radius: 170.0,
            push_strength: 0.6,
            wake_fraction: 0.22,
            jitter_threshold: 0.05,
            jitter_amount: 0.04,
            max_force: 9.0,
            max_speed: 12.0,
            damping: 0.9,
            background_damping: 0.85,
            drag_velocity_smoothing: 0.45,
            release_momentum: 0.8,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub group_radius: f32,
    pub item_base_radius: f32,
    pub per_sub_item_radius: f32,
    pub sub_item_radius: f32,
    pub item_orbit_min: f32,
    pub item_orbit_max: f32,
    pub sub_item_orbit: f32,
    /// Fraction of the smaller viewport side used for the initial group ring.
    pub group_ring_fraction: f32,
    /// Clearance between the focused node's coverage and the child ring.
    pub focus_gap: f32,
    /// Minimum spacing between neighbouring child coverages on the ring.
    pub focus_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            group_radius: 70.0,
            item_base_radius: 38.0,
            per_sub_item_radius: 4.0,
            sub_item_radius: 22.0,
            item_orbit_min: 170.0,
            item_orbit_max: 260.0,
            sub_item_orbit: 95.0,
            group_ring_fraction: 0.3,
            focus_gap: 40.0,
            focus_spacing: 24.0,
        }
    }
}

impl LayoutConfig {
    pub fn item_orbit_ideal(&self) -> f32 {
        (self.item_orbit_min + self.item_orbit_max) * 0.5
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShapeConfig {
    pub margin: f32,
    pub standalone_min_puffs: usize,
    pub standalone_max_puffs: usize,
    /// Content area that buys one puff above the standalone minimum.
    pub area_per_extra_puff: f32,
    pub member_min_puffs: usize,
    pub resting_min_puffs: usize,
    pub resting_max_puffs: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            margin: 25.0,
            standalone_min_puffs: 24,
            standalone_max_puffs: 34,
            area_per_extra_puff: 6_000.0,
            member_min_puffs: 10,
            resting_min_puffs: 6,
            resting_max_puffs: 9,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MorphConfig {
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub rate: f32,
    pub epsilon: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            rate: 0.18,
            epsilon: 0.05,
        }
    }
}
