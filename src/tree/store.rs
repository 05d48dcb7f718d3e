use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::info;

use super::model::{EntityTree, Group, Item, SubItem};

pub fn parse_tree(raw: &str) -> Result<EntityTree> {
    let tree: EntityTree = serde_json::from_str(raw).context("invalid entity tree JSON")?;
    validate_tree(&tree)?;
    Ok(tree)
}

pub fn load_tree(path: &Path) -> Result<EntityTree> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read entity tree from {}", path.display()))?;
    let tree = parse_tree(&raw)
        .with_context(|| format!("failed to parse entity tree at {}", path.display()))?;
    info!(
        "loaded {} groups ({} entities) from {}",
        tree.groups.len(),
        tree.entity_count(),
        path.display()
    );
    Ok(tree)
}

pub fn save_tree(path: &Path, tree: &EntityTree) -> Result<()> {
    let raw = serde_json::to_string_pretty(tree).context("failed to serialize entity tree")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write entity tree to {}", path.display()))
}

fn validate_tree(tree: &EntityTree) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    let ids = tree.groups.iter().flat_map(|group| {
        std::iter::once(group.id.as_str()).chain(group.items.iter().flat_map(|item| {
            std::iter::once(item.id.as_str())
                .chain(item.sub_items.iter().map(|sub_item| sub_item.id.as_str()))
        }))
    });

    for id in ids {
        if id.is_empty() {
            return Err(anyhow!("entity tree contains an empty id"));
        }
        if !seen.insert(id) {
            return Err(anyhow!("entity id `{id}` appears more than once"));
        }
    }

    Ok(())
}

/// Small built-in tree used when no file is given on the command line.
pub fn demo_tree() -> EntityTree {
    fn sub(id: &str, title: &str, completed: bool) -> SubItem {
        SubItem {
            id: id.to_owned(),
            title: title.to_owned(),
            importance: 1,
            due_date: None,
            completed,
        }
    }

    fn item(id: &str, title: &str, sub_items: Vec<SubItem>) -> Item {
        Item {
            id: id.to_owned(),
            title: title.to_owned(),
            importance: 2,
            due_date: None,
            completed: false,
            sub_items,
        }
    }

    let groups = vec![
        Group {
            id: "g-launch".to_owned(),
            title: "Product launch".to_owned(),
            importance: 3,
            due_date: Some("2026-12-01".to_owned()),
            position: None,
            items: vec![
                item(
                    "i-copy",
                    "Write landing page copy",
                    vec![
                        sub("s-copy-draft", "First draft", true),
                        sub("s-copy-review", "Review with design", false),
                        sub("s-copy-final", "Final polish", false),
                    ],
                ),
                item("i-press", "Press kit", vec![sub("s-press-shots", "Screenshots", false)]),
                item("i-pricing", "Decide pricing tiers", Vec::new()),
            ],
        },
        Group {
            id: "g-home".to_owned(),
            title: "Home".to_owned(),
            importance: 1,
            due_date: None,
            position: None,
            items: vec![
                item(
                    "i-garden",
                    "Plant the garden",
                    vec![
                        sub("s-garden-soil", "Buy soil", false),
                        sub("s-garden-seeds", "Pick seeds", false),
                    ],
                ),
                item("i-taxes", "File taxes", Vec::new()),
            ],
        },
        Group {
            id: "g-study".to_owned(),
            title: "Learn Rust".to_owned(),
            importance: 2,
            due_date: None,
            position: None,
            items: vec![
                item(
                    "i-book",
                    "Finish the book",
                    vec![
                        sub("s-book-ownership", "Ownership chapter", true),
                        sub("s-book-traits", "Traits chapter", false),
                        sub("s-book-async", "Async chapter", false),
                        sub("s-book-macros", "Macros chapter", false),
                    ],
                ),
                item("i-project", "Ship a side project", Vec::new()),
            ],
        },
    ];

    EntityTree { groups }
}
