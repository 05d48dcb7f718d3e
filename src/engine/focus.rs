//! Analytic placement of a focused node's direct children.
//!
//! While a layout exists it is the only authority for the positions of the
//! ids it contains; the physics step leaves those nodes alone.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Pos2, Vec2};

use super::config::{LayoutConfig, ShapeConfig};
use super::graph::Node;
use super::shape::{ShapeMode, coverage_radius};
use crate::util::quantize;

/// Supplies measured content bounds. `None` means "not measured yet".
pub trait ContentSizeProvider {
    fn content_size(&self, id: &str, mode: ShapeMode) -> Option<Vec2>;
}

/// Same size for every mode, keyed by node id.
impl ContentSizeProvider for HashMap<String, Vec2> {
    fn content_size(&self, id: &str, _mode: ShapeMode) -> Option<Vec2> {
        self.get(id).copied()
    }
}

/// Provider for callers that have not measured anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unmeasured;

impl ContentSizeProvider for Unmeasured {
    fn content_size(&self, _id: &str, _mode: ShapeMode) -> Option<Vec2> {
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FocusLayout {
    pub focused_id: String,
    pub center: Pos2,
    pub orbit_radius: f32,
    /// Children in placement order, starting at the top going clockwise.
    pub children: Vec<String>,
    pub positions: HashMap<String, Pos2>,
    signature: Vec<i32>,
}

impl FocusLayout {
    pub fn owns(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn position(&self, id: &str) -> Option<Pos2> {
        self.positions.get(id).copied()
    }

    /// Whether the coverages this layout was built from still hold.
    pub fn matches(&self, signature: &[i32]) -> bool {
        self.signature == signature
    }
}

/// Ring radius that clears the focused node and keeps `child_count`
/// children of `max_child_coverage` from overlapping one another.
pub fn orbit_radius(
    parent_coverage: f32,
    max_child_coverage: f32,
    child_count: usize,
    config: &LayoutConfig,
) -> f32 {
    let clearance = parent_coverage + config.focus_gap + max_child_coverage;
    let density =
        (child_count as f32 * (2.0 * max_child_coverage + config.focus_spacing)) / TAU;
    clearance.max(density)
}

fn measured_coverage(
    sizes: &dyn ContentSizeProvider,
    id: &str,
    mode: ShapeMode,
    config: &ShapeConfig,
) -> f32 {
    coverage_radius(sizes.content_size(id, mode).unwrap_or(Vec2::ZERO), config)
}

/// Quantized coverages of the focused node and its children, in order.
pub fn layout_signature(
    focused: &Node,
    children: &[&Node],
    sizes: &dyn ContentSizeProvider,
    config: &ShapeConfig,
) -> Vec<i32> {
    std::iter::once(measured_coverage(sizes, &focused.id, ShapeMode::Standalone, config))
        .chain(
            children
                .iter()
                .map(|child| measured_coverage(sizes, &child.id, ShapeMode::Member, config)),
        )
        .map(|coverage| quantize(coverage, 1.0))
        .collect()
}

pub fn compute_focus_layout(
    focused: &Node,
    children: &[&Node],
    sizes: &dyn ContentSizeProvider,
    layout: &LayoutConfig,
    shape: &ShapeConfig,
) -> FocusLayout {
    let center = focused.position;
    let mut positions = HashMap::with_capacity(children.len() + 1);
    positions.insert(focused.id.clone(), center);
    let signature = layout_signature(focused, children, sizes, shape);

    if children.is_empty() {
        return FocusLayout {
            focused_id: focused.id.clone(),
            center,
            orbit_radius: 0.0,
            children: Vec::new(),
            positions,
            signature,
        };
    }

    let parent_coverage = measured_coverage(sizes, &focused.id, ShapeMode::Standalone, shape);
    let max_child_coverage = children
        .iter()
        .map(|child| measured_coverage(sizes, &child.id, ShapeMode::Member, shape))
        .fold(0.0_f32, f32::max);
    let orbit = orbit_radius(parent_coverage, max_child_coverage, children.len(), layout);

    let step = TAU / children.len() as f32;
    for (index, child) in children.iter().enumerate() {
        let angle = -FRAC_PI_2 + index as f32 * step;
        positions.insert(child.id.clone(), center + Vec2::angled(angle) * orbit);
    }

    FocusLayout {
        focused_id: focused.id.clone(),
        center,
        orbit_radius: orbit,
        children: children.iter().map(|child| child.id.clone()).collect(),
        positions,
        signature,
    }
}
