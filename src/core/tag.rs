//! Address tags (bookmarks, notes, warnings) traversed by the tag cursor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category of tags, e.g. "Bookmarks" or "Bugs".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagType {
    pub name: String,
    /// Short glyph shown next to tagged lines
    pub icon: String,
}

impl TagType {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// A tag attached to a document offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Stable identifier
    pub id: String,
    pub address: u64,
    pub tag_type: TagType,
    pub data: String,
}

impl Tag {
    pub fn new(address: u64, tag_type: TagType, data: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            address,
            tag_type,
            data: data.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}@{:#x}: {}",
            self.tag_type.icon, self.tag_type.name, self.address, self.data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_get_unique_ids() {
        let ty = TagType::new("Bookmarks", "*");
        let a = Tag::new(0x1000, ty.clone(), "entry");
        let b = Tag::new(0x1000, ty, "entry");
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn test_display() {
        let t = Tag::new(0x1000, TagType::new("Bugs", "!"), "overflow");
        assert_eq!(t.to_string(), "! Bugs@0x1000: overflow");
    }
}
