use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Pos2, Vec2};
use log::debug;

use crate::tree::{EntityTree, Item};

use super::config::{LayoutConfig, ShapeConfig};
use super::morph::ShapeState;
use super::rng::SeededRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Item,
    SubItem,
}

/// How a node is currently being shown, which picks its shape profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Presentation {
    #[default]
    Resting,
    Standalone,
    Member,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub position: Pos2,
    pub velocity: Vec2,
    pub radius: f32,
    pub parent_id: Option<String>,
    pub shape: ShapeState,
    /// Slot assigned by the focus layout; the morph pulls `position` toward it.
    pub position_target: Option<Pos2>,
}

impl Node {
    fn new(
        id: &str,
        kind: NodeKind,
        title: &str,
        position: Pos2,
        radius: f32,
        parent_id: Option<&str>,
        shape_config: &ShapeConfig,
    ) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            title: title.to_owned(),
            position,
            velocity: Vec2::ZERO,
            radius,
            parent_id: parent_id.map(str::to_owned),
            shape: ShapeState::resting(id, radius, shape_config),
            position_target: None,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

pub fn item_radius(item: &Item, config: &LayoutConfig) -> f32 {
    config.item_base_radius + config.per_sub_item_radius * item.incomplete_sub_items() as f32
}

/// Id of the item whose sub-items are visible for the given focus.
pub fn expanded_item<'a>(tree: &'a EntityTree, focused_id: Option<&str>) -> Option<&'a str> {
    let focused_id = focused_id?;
    if let Some(item) = tree.find_item(focused_id) {
        return Some(item.id.as_str());
    }
    tree.sub_item_owner(focused_id)
}

fn group_ring_position(index: usize, count: usize, viewport: Vec2, config: &LayoutConfig) -> Pos2 {
    let center = (viewport * 0.5).to_pos2();
    if count <= 1 {
        return center;
    }
    let ring = viewport.x.min(viewport.y).max(0.0) * config.group_ring_fraction;
    let angle = -FRAC_PI_2 + (index as f32 / count as f32) * TAU;
    center + Vec2::angled(angle) * ring
}

/// Reconciles the visible entity tree against `previous`.
///
/// Nodes whose id already existed keep position, velocity and in-flight
/// shape state; new nodes are placed deterministically from their id.
pub fn build_nodes(
    tree: &EntityTree,
    viewport: Vec2,
    focused_id: Option<&str>,
    previous: &[Node],
    layout: &LayoutConfig,
    shape_config: &ShapeConfig,
) -> Vec<Node> {
    let prior = previous
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect::<HashMap<_, _>>();
    let expanded = expanded_item(tree, focused_id);

    let reuse = |id: &str,
                 kind: NodeKind,
                 title: &str,
                 radius: f32,
                 parent_id: Option<&str>|
     -> Option<Node> {
        let mut node = (*prior.get(id)?).clone();
        node.kind = kind;
        node.title = title.to_owned();
        node.parent_id = parent_id.map(str::to_owned);
        if (node.radius - radius).abs() > f32::EPSILON {
            node.radius = radius;
            node.shape.rebase(&node.id, radius, shape_config);
        }
        Some(node)
    };

    let mut nodes = Vec::with_capacity(tree.entity_count());
    let mut created = 0usize;
    let group_count = tree.groups.len();

    for (group_index, group) in tree.groups.iter().enumerate() {
        let group_node = reuse(&group.id, NodeKind::Group, &group.title, layout.group_radius, None)
            .unwrap_or_else(|| {
                created += 1;
                let position = group
                    .position
                    .map(|[x, y]| Pos2::new(x, y))
                    .unwrap_or_else(|| {
                        group_ring_position(group_index, group_count, viewport, layout)
                    });
                Node::new(
                    &group.id,
                    NodeKind::Group,
                    &group.title,
                    position,
                    layout.group_radius,
                    None,
                    shape_config,
                )
            });
        let group_position = group_node.position;
        nodes.push(group_node);

        for item in &group.items {
            let radius = item_radius(item, layout);
            let item_node = reuse(&item.id, NodeKind::Item, &item.title, radius, Some(&group.id))
                .unwrap_or_else(|| {
                    created += 1;
                    let mut rng = SeededRng::from_key(&item.id);
                    let angle = rng.next_f32() * TAU;
                    let orbit = rng.range(layout.item_orbit_min, layout.item_orbit_max);
                    Node::new(
                        &item.id,
                        NodeKind::Item,
                        &item.title,
                        group_position + Vec2::angled(angle) * orbit,
                        radius,
                        Some(&group.id),
                        shape_config,
                    )
                });
            let item_position = item_node.position;
            nodes.push(item_node);

            if expanded != Some(item.id.as_str()) {
                continue;
            }

            for sub_item in &item.sub_items {
                let sub_node = reuse(
                    &sub_item.id,
                    NodeKind::SubItem,
                    &sub_item.title,
                    layout.sub_item_radius,
                    Some(&item.id),
                )
                .unwrap_or_else(|| {
                    created += 1;
                    let angle = SeededRng::from_key(&sub_item.id).next_f32() * TAU;
                    Node::new(
                        &sub_item.id,
                        NodeKind::SubItem,
                        &sub_item.title,
                        item_position + Vec2::angled(angle) * layout.sub_item_orbit,
                        layout.sub_item_radius,
                        Some(&item.id),
                        shape_config,
                    )
                });
                nodes.push(sub_node);
            }
        }
    }

    let reused = nodes.len() - created;
    debug!(
        "reconciled node graph: {} nodes ({} new, {} dropped)",
        nodes.len(),
        created,
        previous.len().saturating_sub(reused)
    );
    nodes
}

pub fn index_nodes(nodes: &[Node]) -> HashMap<String, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.clone(), index))
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::tree::store::demo_tree;

    fn build(tree: &EntityTree, focused: Option<&str>, previous: &[Node]) -> Vec<Node> {
        build_nodes(
            tree,
            vec2(1200.0, 800.0),
            focused,
            previous,
            &LayoutConfig::default(),
            &ShapeConfig::default(),
        )
    }

    fn find<'a>(nodes: &'a [Node], id: &str) -> &'a Node {
        nodes.iter().find(|node| node.id == id).expect("node exists")
    }

    #[test]
    fn rebuild_with_same_previous_is_bit_identical() {
        let tree = demo_tree();
        let first = build(&tree, None, &[]);
        let a = build(&tree, None, &first);
        let b = build(&tree, None, &first);
        assert_eq!(a.len(), b.len());
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.id, right.id);
            assert_eq!(left.position.x.to_bits(), right.position.x.to_bits());
            assert_eq!(left.position.y.to_bits(), right.position.y.to_bits());
        }
    }

    #[test]
    fn existing_nodes_keep_their_in_memory_state() {
        let tree = demo_tree();
        let mut first = build(&tree, None, &[]);
        for node in &mut first {
            node.position += vec2(13.0, -7.0);
            node.velocity = vec2(0.5, 0.25);
        }
        let second = build(&tree, None, &first);
        for node in &second {
            let before = find(&first, &node.id);
            assert_eq!(node.position, before.position);
            assert_eq!(node.velocity, before.velocity);
        }
    }

    #[test]
    fn groups_use_persisted_position_then_ring() {
        let mut tree = demo_tree();
        tree.set_group_position("g-home", [10.0, 20.0]);
        let nodes = build(&tree, None, &[]);
        assert_eq!(find(&nodes, "g-home").position, Pos2::new(10.0, 20.0));

        let launch = find(&nodes, "g-launch").position;
        let center = Pos2::new(600.0, 400.0);
        assert!((launch.distance(center) - 800.0 * 0.3).abs() < 1e-3);
        // the first group starts at the top of the ring
        assert!(launch.y < center.y);
    }

    #[test]
    fn items_start_on_their_orbit_band() {
        let tree = demo_tree();
        let layout = LayoutConfig::default();
        let nodes = build(&tree, None, &[]);
        let group = find(&nodes, "g-launch");
        for id in ["i-copy", "i-press", "i-pricing"] {
            let item = find(&nodes, id);
            let distance = item.position.distance(group.position);
            assert!(distance >= layout.item_orbit_min - 1e-3);
            assert!(distance <= layout.item_orbit_max + 1e-3);
            assert_eq!(item.parent_id.as_deref(), Some("g-launch"));
        }
    }

    #[test]
    fn item_radius_grows_with_incomplete_sub_items() {
        let tree = demo_tree();
        let layout = LayoutConfig::default();
        let nodes = build(&tree, None, &[]);
        // two of three sub-items are still open
        let copy = find(&nodes, "i-copy");
        assert_eq!(copy.radius, layout.item_base_radius + 2.0 * layout.per_sub_item_radius);
        assert_eq!(find(&nodes, "i-pricing").radius, layout.item_base_radius);
    }

    #[test]
    fn sub_items_follow_focus() {
        let tree = demo_tree();
        let free = build(&tree, None, &[]);
        assert!(free.iter().all(|node| node.kind != NodeKind::SubItem));

        let focused = build(&tree, Some("i-copy"), &free);
        let subs = focused
            .iter()
            .filter(|node| node.kind == NodeKind::SubItem)
            .collect::<Vec<_>>();
        assert_eq!(subs.len(), 3);
        assert!(subs.iter().all(|node| node.parent_id.as_deref() == Some("i-copy")));

        let on_sub_item = build(&tree, Some("s-copy-review"), &focused);
        assert_eq!(
            on_sub_item
                .iter()
                .filter(|node| node.kind == NodeKind::SubItem)
                .count(),
            3
        );

        let elsewhere = build(&tree, Some("g-home"), &on_sub_item);
        assert!(elsewhere.iter().all(|node| node.kind != NodeKind::SubItem));
    }

    #[test]
    fn removed_entities_drop_out() {
        let mut tree = demo_tree();
        let first = build(&tree, None, &[]);
        tree.groups.remove(1);
        let second = build(&tree, None, &first);
        assert!(second.iter().all(|node| node.id != "g-home" && node.id != "i-garden"));
        assert_eq!(second.len(), first.len() - 3);
    }
}
