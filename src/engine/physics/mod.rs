mod forces;

use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2};
use log::warn;
use rand::Rng;

use super::config::{INTENSITY_RANGE, LayoutConfig, PhysicsConfig};
use super::drag::DragState;
use super::focus::FocusLayout;
use super::graph::{Node, NodeKind};
use forces::{clamp_length, drag_push, parent_attraction, repulsion_between};

/// Everything a physics step needs to know about focus and drag.
#[derive(Clone, Copy, Default)]
pub struct StepContext<'a> {
    pub focused_id: Option<&'a str>,
    pub focus: Option<&'a FocusLayout>,
    pub drag: Option<&'a DragState>,
    pub delta_seconds: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyRole {
    Dragged,
    /// Position belongs to the focus layout.
    Owned,
    /// Outside the focused subtree while focus mode is on.
    Background,
    Free,
}

#[derive(Default)]
pub struct PhysicsScratch {
    forces: Vec<Vec2>,
    roles: Vec<BodyRole>,
    parents: Vec<Option<usize>>,
}

fn body_role(node: &Node, context: &StepContext<'_>) -> BodyRole {
    if context.drag.is_some_and(|drag| drag.node_id == node.id) {
        return BodyRole::Dragged;
    }
    if context.focus.is_some_and(|focus| focus.owns(&node.id)) {
        return BodyRole::Owned;
    }
    if let Some(focused_id) = context.focused_id {
        let in_subtree =
            node.id == focused_id || node.parent_id.as_deref() == Some(focused_id);
        if !in_subtree {
            return BodyRole::Background;
        }
    }
    BodyRole::Free
}

fn is_finite(position: Pos2, velocity: Vec2) -> bool {
    position.x.is_finite()
        && position.y.is_finite()
        && velocity.x.is_finite()
        && velocity.y.is_finite()
}

/// Advances every node not owned by the focus layout or the drag by one
/// frame. Returns the highest speed observed.
///
/// A non-positive `delta_seconds` freezes the graph: nothing moves and the
/// current peak speed is reported unchanged.
pub fn step_physics(
    nodes: &mut [Node],
    context: &StepContext<'_>,
    config: &PhysicsConfig,
    layout: &LayoutConfig,
    scratch: &mut PhysicsScratch,
) -> f32 {
    let node_count = nodes.len();
    if node_count == 0 {
        return 0.0;
    }
    if context.delta_seconds <= 0.0 {
        return nodes
            .iter()
            .map(|node| node.velocity.length())
            .fold(0.0, f32::max);
    }

    let time_step_scale = (context.delta_seconds * 60.0).clamp(0.25, 3.0);
    let intensity = config
        .intensity
        .clamp(*INTENSITY_RANGE.start(), *INTENSITY_RANGE.end());
    let damping_factor = config.damping.clamp(0.0, 0.999).powf(time_step_scale);
    let background_factor = config
        .background_damping
        .clamp(0.0, 0.999)
        .powf(time_step_scale);
    let max_force = config.max_force * intensity;
    let drag_pointer = context.drag.map(|drag| drag.pointer);
    let drag_velocity = context.drag.map_or(Vec2::ZERO, |drag| drag.velocity);

    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect::<HashMap<_, _>>();

    scratch.roles.clear();
    scratch.parents.clear();
    for node in nodes.iter() {
        scratch.roles.push(body_role(node, context));
        scratch.parents.push(
            node.parent_id
                .as_deref()
                .and_then(|parent| index_by_id.get(parent).copied()),
        );
    }

    let dragged_index = scratch
        .roles
        .iter()
        .position(|role| *role == BodyRole::Dragged);
    let within_cull = |position: Pos2| {
        drag_pointer.is_none_or(|pointer| {
            config.drag_cull_radius <= 0.0 || pointer.distance(position) <= config.drag_cull_radius
        })
    };

    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    let mut jitter_rng = rand::thread_rng();

    for index in 0..node_count {
        if scratch.roles[index] != BodyRole::Free {
            continue;
        }
        let node = &nodes[index];
        let mut force = Vec2::ZERO;

        if let Some(parent_index) = scratch.parents[index]
            && node.kind != NodeKind::Group
        {
            let (ideal, scale) = match node.kind {
                NodeKind::SubItem => (layout.sub_item_orbit, config.sub_item_force_scale),
                _ => (layout.item_orbit_ideal(), 1.0),
            };
            force += parent_attraction(
                nodes[parent_index].position - node.position,
                ideal,
                config.spring_strength,
                config.parent_pull,
                scale,
            );
        }

        let node_in_cull = within_cull(node.position);
        for (other_index, other) in nodes.iter().enumerate() {
            if other_index == index {
                continue;
            }
            if !node_in_cull && !within_cull(other.position) {
                continue;
            }
            let reach = node.radius + other.radius + config.repulsion_padding;
            let mut strength = config.repulsion_strength;
            if dragged_index == Some(index) || dragged_index == Some(other_index) {
                strength *= config.drag_shove_multiplier;
            }
            if let Some(push) = repulsion_between(node.position - other.position, reach, strength) {
                force += push;
            }
        }

        if let Some(pointer) = drag_pointer {
            force += drag_push(
                node.position - pointer,
                drag_velocity,
                config.push_radius,
                config.push_strength,
                config.wake_fraction,
            );
        }

        if node.kind != NodeKind::Group && node.velocity.length() > config.jitter_threshold {
            force += Vec2::new(
                jitter_rng.gen_range(-1.0_f32..1.0),
                jitter_rng.gen_range(-1.0_f32..1.0),
            ) * config.jitter_amount;
        }

        scratch.forces[index] = clamp_length(force * intensity, max_force);
    }

    let mut max_speed_observed = 0.0_f32;
    for (index, node) in nodes.iter_mut().enumerate() {
        match scratch.roles[index] {
            BodyRole::Dragged => {
                if let Some(pointer) = drag_pointer {
                    node.position = pointer;
                }
                node.velocity = Vec2::ZERO;
                max_speed_observed = max_speed_observed.max(drag_velocity.length());
            }
            BodyRole::Owned => {
                node.velocity = Vec2::ZERO;
            }
            BodyRole::Background => {
                let velocity = node.velocity * background_factor;
                let position = node.position + velocity * time_step_scale;
                if is_finite(position, velocity) {
                    node.position = position;
                    node.velocity = velocity;
                } else {
                    node.velocity = Vec2::ZERO;
                }
                max_speed_observed = max_speed_observed.max(node.velocity.length());
            }
            BodyRole::Free => {
                let force = scratch.forces[index];
                // groups only move while something pushes them
                let carried = if node.kind == NodeKind::Group {
                    Vec2::ZERO
                } else {
                    node.velocity
                };
                let velocity =
                    clamp_length(carried + force * time_step_scale, config.max_speed);
                let speed = velocity.length();
                let position = node.position + velocity * time_step_scale;
                let velocity = velocity * damping_factor;

                if is_finite(position, velocity) {
                    node.position = position;
                    node.velocity = velocity;
                    max_speed_observed = max_speed_observed.max(speed);
                } else {
                    warn!("discarding non-finite physics update for node `{}`", node.id);
                    node.velocity = Vec2::ZERO;
                }
            }
        }
    }

    max_speed_observed
}
