use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui::{Color32, FontId, Galley, Painter, Vec2};

use cumulus::engine::{ContentSizeProvider, Engine, ShapeMode};
use cumulus::tree::{EntityRef, EntityTree};

pub(super) const CONTENT_FONT_SIZE: f32 = 14.0;
const STANDALONE_WRAP: f32 = 260.0;
const MEMBER_WRAP: f32 = 150.0;

/// Text shown inside a node while it presents `mode`.
pub(super) fn content_text(tree: &EntityTree, id: &str, mode: ShapeMode) -> Option<String> {
    let entity = tree.find(id)?;
    let mut lines = vec![entity.title().to_owned()];

    match (mode, entity) {
        (ShapeMode::Standalone, EntityRef::Group(group)) => {
            let open = group.items.iter().filter(|item| !item.completed).count();
            lines.push(format!("{} items, {open} open", group.items.len()));
        }
        (ShapeMode::Standalone, EntityRef::Item(item)) => {
            let done = item.sub_items.len() - item.incomplete_sub_items();
            if !item.sub_items.is_empty() {
                lines.push(format!("{done}/{} steps done", item.sub_items.len()));
            }
        }
        (ShapeMode::Standalone, EntityRef::SubItem(sub_item)) => {
            lines.push(if sub_item.completed { "done" } else { "open" }.to_owned());
        }
        (ShapeMode::Member, EntityRef::Item(item)) if !item.sub_items.is_empty() => {
            lines.push(format!("{} open steps", item.incomplete_sub_items()));
        }
        (ShapeMode::Member, _) => {}
    }

    if mode == ShapeMode::Standalone {
        if let Some(due_date) = entity.due_date() {
            lines.push(format!("due {due_date}"));
        }
        if entity.importance() > 0 {
            lines.push("!".repeat(usize::from(entity.importance().min(3))));
        }
    }
    Some(lines.join("\n"))
}

pub(super) fn layout_content(
    painter: &Painter,
    text: String,
    mode: ShapeMode,
    scale: f32,
) -> Arc<Galley> {
    let wrap = match mode {
        ShapeMode::Standalone => STANDALONE_WRAP,
        ShapeMode::Member => MEMBER_WRAP,
    };
    painter.layout(
        text,
        FontId::proportional(CONTENT_FONT_SIZE * scale),
        Color32::from_gray(24),
        wrap * scale,
    )
}

/// Unscaled content bounds of the focused node and its children, measured
/// from laid-out text.
#[derive(Default)]
pub(super) struct MeasuredSizes {
    sizes: HashMap<String, (ShapeMode, Vec2)>,
}

impl MeasuredSizes {
    pub(super) fn measure(painter: &Painter, engine: &Engine, tree: &EntityTree) -> Self {
        let Some(focused_id) = engine.focused_id() else {
            return Self::default();
        };

        let mut sizes = HashMap::new();
        let targets = std::iter::once((focused_id, ShapeMode::Standalone)).chain(
            engine
                .nodes()
                .iter()
                .filter(|node| node.parent_id.as_deref() == Some(focused_id))
                .map(|node| (node.id.as_str(), ShapeMode::Member)),
        );
        for (id, mode) in targets {
            if let Some(text) = content_text(tree, id, mode) {
                let galley = layout_content(painter, text, mode, 1.0);
                sizes.insert(id.to_owned(), (mode, galley.size()));
            }
        }
        Self { sizes }
    }
}

impl ContentSizeProvider for MeasuredSizes {
    fn content_size(&self, id: &str, mode: ShapeMode) -> Option<Vec2> {
        self.sizes
            .get(id)
            .filter(|(measured_mode, _)| *measured_mode == mode)
            .map(|(_, size)| *size)
    }
}

#[cfg(test)]
mod tests {
    use cumulus::tree::store::demo_tree;

    use super::*;

    #[test]
    fn standalone_text_carries_details() {
        let tree = demo_tree();
        let text = content_text(&tree, "i-copy", ShapeMode::Standalone).expect("item");
        assert!(text.lines().count() >= 2);
        assert!(text.contains("steps done"));

        let member = content_text(&tree, "i-copy", ShapeMode::Member).expect("item");
        assert!(!member.contains("steps done"));
        assert!(content_text(&tree, "nope", ShapeMode::Member).is_none());
    }
}
