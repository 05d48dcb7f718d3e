use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EntityTree {
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Group {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub importance: u8,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Persisted canvas coordinates; `None` until the group is first placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 2]>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub importance: u8,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, rename = "subItems")]
    pub sub_items: Vec<SubItem>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SubItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub importance: u8,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Borrowed view of any entity in the tree.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    Group(&'a Group),
    Item(&'a Item),
    SubItem(&'a SubItem),
}

impl<'a> EntityRef<'a> {
    pub fn title(self) -> &'a str {
        match self {
            Self::Group(group) => &group.title,
            Self::Item(item) => &item.title,
            Self::SubItem(sub_item) => &sub_item.title,
        }
    }

    pub fn due_date(self) -> Option<&'a str> {
        match self {
            Self::Group(group) => group.due_date.as_deref(),
            Self::Item(item) => item.due_date.as_deref(),
            Self::SubItem(sub_item) => sub_item.due_date.as_deref(),
        }
    }

    pub fn importance(self) -> u8 {
        match self {
            Self::Group(group) => group.importance,
            Self::Item(item) => item.importance,
            Self::SubItem(sub_item) => sub_item.importance,
        }
    }
}

impl Item {
    pub fn incomplete_sub_items(&self) -> usize {
        self.sub_items
            .iter()
            .filter(|sub_item| !sub_item.completed)
            .count()
    }
}

impl EntityTree {
    pub fn entity_count(&self) -> usize {
        self.groups
            .iter()
            .map(|group| {
                1 + group
                    .items
                    .iter()
                    .map(|item| 1 + item.sub_items.len())
                    .sum::<usize>()
            })
            .sum()
    }

    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.id == id)
    }

    /// Returns the id of the item owning the sub-item `id`.
    pub fn sub_item_owner(&self, id: &str) -> Option<&str> {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.sub_items.iter().any(|sub_item| sub_item.id == id))
            .map(|item| item.id.as_str())
    }

    pub fn find(&self, id: &str) -> Option<EntityRef<'_>> {
        for group in &self.groups {
            if group.id == id {
                return Some(EntityRef::Group(group));
            }
            for item in &group.items {
                if item.id == id {
                    return Some(EntityRef::Item(item));
                }
                if let Some(sub_item) = item.sub_items.iter().find(|sub_item| sub_item.id == id) {
                    return Some(EntityRef::SubItem(sub_item));
                }
            }
        }
        None
    }

    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.find(id).map(EntityRef::title)
    }

    /// Stores `position` on the group `id`. Returns `false` for unknown ids.
    pub fn set_group_position(&mut self, id: &str, position: [f32; 2]) -> bool {
        match self.groups.iter_mut().find(|group| group.id == id) {
            Some(group) => {
                group.position = Some(position);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityTree {
        serde_json::from_str(
            r#"{
                "groups": [{
                    "id": "g1",
                    "title": "Launch",
                    "position": [120.0, 80.0],
                    "items": [{
                        "id": "i1",
                        "title": "Write copy",
                        "dueDate": "2026-11-02",
                        "subItems": [
                            { "id": "s1", "title": "Draft" },
                            { "id": "s2", "title": "Review", "completed": true }
                        ]
                    }]
                }]
            }"#,
        )
        .expect("sample tree parses")
    }

    #[test]
    fn counts_incomplete_sub_items() {
        let tree = sample();
        let item = tree.find_item("i1").expect("item exists");
        assert_eq!(item.incomplete_sub_items(), 1);
        assert_eq!(item.due_date.as_deref(), Some("2026-11-02"));
    }

    #[test]
    fn resolves_sub_item_owner_and_titles() {
        let tree = sample();
        assert_eq!(tree.sub_item_owner("s2"), Some("i1"));
        assert_eq!(tree.sub_item_owner("i1"), None);
        assert_eq!(tree.title_of("s1"), Some("Draft"));
        assert_eq!(tree.entity_count(), 4);
    }

    #[test]
    fn find_returns_typed_entity() {
        let tree = sample();
        assert!(matches!(tree.find("g1"), Some(EntityRef::Group(_))));
        assert!(matches!(tree.find("s2"), Some(EntityRef::SubItem(sub)) if sub.completed));
        let item = tree.find("i1").expect("item exists");
        assert_eq!(item.due_date(), Some("2026-11-02"));
        assert_eq!(item.importance(), 0);
        assert!(tree.find("nope").is_none());
    }

    #[test]
    fn updates_group_position() {
        let mut tree = sample();
        assert!(tree.set_group_position("g1", [1.0, 2.0]));
        assert!(!tree.set_group_position("missing", [0.0, 0.0]));
        assert_eq!(tree.groups[0].position, Some([1.0, 2.0]));
    }
}
