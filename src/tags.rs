//! Tag store and tag editor contracts.

use std::cell::RefCell;

use tracing::debug;

use crate::core::{OffsetRange, Tag, TagType};

/// Read-only tag queries used by the frame's tag cursor.
pub trait TagStore {
    /// Every tag in the document, in no particular order.
    fn tags(&self) -> Vec<Tag>;

    /// Tags ordered by ascending address; ties keep insertion order.
    fn sorted_tags(&self) -> Vec<Tag> {
        let mut tags = self.tags();
        tags.sort_by_key(|t| t.address);
        tags
    }

    fn tags_in(&self, range: OffsetRange) -> Vec<Tag> {
        self.sorted_tags()
            .into_iter()
            .filter(|t| range.contains(t.address))
            .collect()
    }
}

/// External editor invoked for a single tag. Returns `true` if the tag
/// was changed.
pub trait TagEditor {
    fn edit_tag(&self, tag: &Tag) -> bool;
}

/// In-memory tag store.
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    tags: RefCell<Vec<Tag>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new tag and return its id.
    pub fn add_tag(&self, address: u64, tag_type: TagType, data: impl Into<String>) -> String {
        let tag = Tag::new(address, tag_type, data);
        let id = tag.id.clone();
        debug!(address, id = %id, "add tag");
        self.tags.borrow_mut().push(tag);
        id
    }

    pub fn remove_tag(&self, id: &str) -> bool {
        let mut tags = self.tags.borrow_mut();
        let before = tags.len();
        tags.retain(|t| t.id != id);
        tags.len() != before
    }

    /// Replace the data of an existing tag.
    pub fn set_data(&self, id: &str, data: impl Into<String>) -> bool {
        match self.tags.borrow_mut().iter_mut().find(|t| t.id == id) {
            Some(tag) => {
                tag.data = data.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<Tag> {
        self.tags.borrow().iter().find(|t| t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tags.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.borrow().is_empty()
    }
}

impl TagStore for MemoryTagStore {
    fn tags(&self) -> Vec<Tag> {
        self.tags.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark() -> TagType {
        TagType::new("Bookmarks", "*")
    }

    #[test]
    fn test_sorted_by_address() {
        let store = MemoryTagStore::new();
        store.add_tag(0x30, bookmark(), "c");
        store.add_tag(0x10, bookmark(), "a");
        store.add_tag(0x20, bookmark(), "b");
        let data: Vec<String> = store.sorted_tags().into_iter().map(|t| t.data).collect();
        assert_eq!(data, vec!["a", "b", "c"]);
        assert_eq!(store.tags_in(OffsetRange::new(0x10, 0x30)).len(), 2);
    }

    #[test]
    fn test_update_and_remove() {
        let store = MemoryTagStore::new();
        let id = store.add_tag(0x10, bookmark(), "old");
        assert!(store.set_data(&id, "new"));
        assert_eq!(store.get(&id).map(|t| t.data), Some("new".into()));
        assert!(store.remove_tag(&id));
        assert!(!store.remove_tag(&id));
        assert!(store.is_empty());
    }
}
