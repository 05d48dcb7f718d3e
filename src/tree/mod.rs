mod model;
pub mod store;

pub use model::{EntityRef, EntityTree, Group, Item, SubItem};
