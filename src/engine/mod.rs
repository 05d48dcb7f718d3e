//! Renderer-agnostic layout engine.
//!
//! [`Engine`] owns the node graph, the focus layout and the drag state and
//! advances them once per frame in a fixed order: focus layout, physics,
//! shape targets, morph.

pub mod config;
pub mod drag;
pub mod focus;
pub mod graph;
pub mod morph;
pub mod physics;
pub mod rng;
pub mod shape;

use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2};
use log::{debug, warn};

use crate::tree::EntityTree;

pub use config::EngineConfig;
use drag::DragState;
pub use focus::{ContentSizeProvider, FocusLayout, Unmeasured};
use focus::{compute_focus_layout, layout_signature};
pub use graph::{Node, NodeKind, Presentation};
use graph::{build_nodes, index_nodes};
use morph::advance;
use physics::{PhysicsScratch, StepContext, step_physics};
pub use shape::{Puff, ShapeMode};
use shape::{ellipse_contains, hit_ellipse};

/// What a renderer needs to draw one node this frame.
#[derive(Clone, Copy, Debug)]
pub struct NodeFrame<'a> {
    pub id: &'a str,
    pub kind: NodeKind,
    pub title: &'a str,
    pub position: Pos2,
    pub radius: f32,
    pub presentation: Presentation,
    pub coverage_radius: f32,
    pub puffs: &'a [Puff],
}

pub struct Engine {
    config: EngineConfig,
    tree: EntityTree,
    viewport: Vec2,
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
    drag: Option<DragState>,
    focused_id: Option<String>,
    focus: Option<FocusLayout>,
    focus_dirty: bool,
    max_velocity: f32,
    settled: bool,
    scratch: PhysicsScratch,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            tree: EntityTree::default(),
            viewport: Vec2::ZERO,
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            drag: None,
            focused_id: None,
            focus: None,
            focus_dirty: false,
            max_velocity: 0.0,
            settled: true,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused_id.as_deref()
    }

    pub fn focus_layout(&self) -> Option<&FocusLayout> {
        self.focus.as_ref()
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.drag.as_ref().map(|drag| drag.node_id.as_str())
    }

    /// Highest node speed seen by the last [`Engine::tick`].
    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Whether every node's shape and focus slot have converged.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Reconciles the node graph with a new entity tree.
    pub fn sync_tree(&mut self, tree: &EntityTree, viewport: Vec2) {
        self.tree = tree.clone();
        self.viewport = viewport;

        if let Some(focused_id) = &self.focused_id
            && self.tree.title_of(focused_id).is_none()
        {
            debug!("focused node `{focused_id}` left the tree; leaving focus mode");
            self.focused_id = None;
            self.focus = None;
            self.clear_position_targets();
        }

        self.rebuild();

        if let Some(drag) = &self.drag
            && !self.index_by_id.contains_key(&drag.node_id)
        {
            debug!("dragged node `{}` left the tree; dropping drag", drag.node_id);
            self.drag = None;
        }
        if self.focused_id.is_some() {
            self.focus_dirty = true;
        }
    }

    fn rebuild(&mut self) {
        self.nodes = build_nodes(
            &self.tree,
            self.viewport,
            self.focused_id.as_deref(),
            &self.nodes,
            &self.config.layout,
            &self.config.shape,
        );
        self.index_by_id = index_nodes(&self.nodes);
        self.settled = false;
    }

    fn clear_position_targets(&mut self) {
        for node in &mut self.nodes {
            node.position_target = None;
        }
    }

    /// Runs one frame and returns the highest node speed observed.
    pub fn tick(&mut self, delta_seconds: f32, sizes: &dyn ContentSizeProvider) -> f32 {
        self.update_focus_layout(sizes);
        self.apply_focus_targets();

        let context = StepContext {
            focused_id: self.focused_id.as_deref(),
            focus: self.focus.as_ref(),
            drag: self.drag.as_ref(),
            delta_seconds,
        };
        self.max_velocity = step_physics(
            &mut self.nodes,
            &context,
            &self.config.physics,
            &self.config.layout,
            &mut self.scratch,
        );

        self.update_shape_targets(sizes);

        let mut settled = true;
        for node in &mut self.nodes {
            settled &= advance(node, delta_seconds, &self.config.morph);
        }
        self.settled = settled;

        self.max_velocity
    }

    fn focus_children(&self, focused_id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| node.parent_id.as_deref() == Some(focused_id))
            .collect()
    }

    fn update_focus_layout(&mut self, sizes: &dyn ContentSizeProvider) {
        let Some(focused_id) = self.focused_id.as_deref() else {
            return;
        };
        let Some(focused) = self.node(focused_id) else {
            return;
        };
        let children = self.focus_children(focused_id);

        let stale = self.focus_dirty
            || self.focus.as_ref().is_none_or(|layout| {
                layout.center != focused.position
                    || !layout.matches(&layout_signature(
                        focused,
                        &children,
                        sizes,
                        &self.config.shape,
                    ))
            });
        if !stale {
            return;
        }

        let layout = compute_focus_layout(
            focused,
            &children,
            sizes,
            &self.config.layout,
            &self.config.shape,
        );
        debug!(
            "focus layout for `{}`: {} children on orbit {:.1}",
            layout.focused_id,
            layout.children.len(),
            layout.orbit_radius
        );
        self.focus = Some(layout);
        self.focus_dirty = false;
    }

    fn apply_focus_targets(&mut self) {
        let dragged = self.drag.as_ref().map(|drag| drag.node_id.as_str());
        for node in &mut self.nodes {
            let slot = self
                .focus
                .as_ref()
                .and_then(|layout| layout.position(&node.id))
                .filter(|_| dragged != Some(node.id.as_str()));
            node.position_target = slot;
            if slot.is_some() {
                node.velocity = Vec2::ZERO;
            }
        }
    }

    fn update_shape_targets(&mut self, sizes: &dyn ContentSizeProvider) {
        let focused_id = self.focused_id.as_deref();
        for node in &mut self.nodes {
            let mode = match focused_id {
                Some(focused) if node.id == focused => Some(ShapeMode::Standalone),
                Some(focused) if node.parent_id.as_deref() == Some(focused) => {
                    Some(ShapeMode::Member)
                }
                _ => None,
            };

            match mode {
                Some(mode) => {
                    // unmeasured content keeps the current target until a size arrives
                    if let Some(size) = sizes.content_size(&node.id, mode)
                        && node.shape.retarget(&node.id, mode, size, &self.config.shape)
                    {
                        debug!("regenerated {} shape for `{}`", mode.name(), node.id);
                    }
                }
                None => node.shape.show_resting(),
            }
        }
    }

    /// Recomputes the focus layout immediately. Idempotent.
    pub fn refresh_focus_layout(&mut self, sizes: &dyn ContentSizeProvider) {
        if self.focused_id.is_none() {
            return;
        }
        self.focus_dirty = true;
        self.update_focus_layout(sizes);
        self.apply_focus_targets();
    }

    pub fn enter_focus(&mut self, id: &str) -> bool {
        if self.tree.title_of(id).is_none() {
            warn!("cannot focus unknown node `{id}`");
            return false;
        }
        if self.focused_id.as_deref() == Some(id) {
            return true;
        }

        debug!("entering focus on `{id}`");
        self.focused_id = Some(id.to_owned());
        self.focus = None;
        self.focus_dirty = true;
        self.clear_position_targets();
        self.rebuild();
        true
    }

    pub fn exit_focus(&mut self) {
        let Some(focused_id) = self.focused_id.take() else {
            return;
        };
        debug!("leaving focus on `{focused_id}`");
        self.focus = None;
        self.focus_dirty = false;
        for node in &mut self.nodes {
            if node.position_target.take().is_some() {
                node.velocity = Vec2::ZERO;
            }
        }
        self.rebuild();
    }

    /// Grabs `id` at `pointer`. Refuses when another drag is active or the id
    /// is unknown.
    pub fn start_drag(&mut self, id: &str, pointer: Pos2) -> bool {
        if let Some(active) = &self.drag {
            warn!("ignoring drag of `{id}` while `{}` is held", active.node_id);
            return false;
        }
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };

        let node = &mut self.nodes[index];
        node.velocity = Vec2::ZERO;
        node.position_target = None;
        self.drag = Some(DragState::start(
            id,
            pointer,
            self.config.physics.drag_velocity_smoothing,
        ));
        debug!("drag started on `{id}`");
        true
    }

    pub fn update_drag(&mut self, pointer: Pos2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.update(pointer);
        if let Some(&index) = self.index_by_id.get(&drag.node_id) {
            self.nodes[index].position = drag.pointer;
            self.nodes[index].velocity = Vec2::ZERO;
        }
    }

    /// Releases the held node and returns its release velocity, which free
    /// nodes keep as momentum. Groups carry no momentum, so releasing one
    /// returns zero, as does a call without an active drag.
    pub fn end_drag(&mut self) -> Vec2 {
        let Some(drag) = self.drag.take() else {
            return Vec2::ZERO;
        };

        let physics = &self.config.physics;
        let release = drag.velocity * physics.release_momentum;
        let release = if release.length() > physics.max_speed {
            release.normalized() * physics.max_speed
        } else {
            release
        };
        let index = self.index_by_id.get(&drag.node_id).copied();
        let release = match index {
            Some(index) if self.nodes[index].kind == NodeKind::Group => Vec2::ZERO,
            _ => release,
        };

        if let Some(index) = index {
            let owned = self
                .focus
                .as_ref()
                .is_some_and(|layout| layout.owns(&drag.node_id));
            let node = &mut self.nodes[index];
            node.velocity = if owned { Vec2::ZERO } else { release };
        }
        self.settled = false;
        debug!(
            "drag released on `{}` with velocity ({:.2}, {:.2})",
            drag.node_id, release.x, release.y
        );
        release
    }

    /// Topmost node under `position`. Nodes showing measured content use
    /// their content ellipse, the rest their circle.
    pub fn find_node_at(&self, position: Pos2, extra_padding: f32) -> Option<&str> {
        let padding = extra_padding.max(0.0);
        self.nodes
            .iter()
            .rev()
            .find(|node| {
                let local = position - node.position;
                match (node.shape.presentation, node.shape.content_size) {
                    (Presentation::Standalone | Presentation::Member, Some(size)) => {
                        let radii = hit_ellipse(size, &self.config.shape) + Vec2::splat(padding);
                        ellipse_contains(radii, local)
                    }
                    _ => local.length() <= node.radius + padding,
                }
            })
            .map(|node| node.id.as_str())
    }

    pub fn frame(&self) -> impl Iterator<Item = NodeFrame<'_>> {
        self.nodes.iter().map(|node| NodeFrame {
            id: &node.id,
            kind: node.kind,
            title: &node.title,
            position: node.position,
            radius: node.radius,
            presentation: node.shape.presentation,
            coverage_radius: node.shape.coverage_radius,
            puffs: &node.shape.current,
        })
    }
}
