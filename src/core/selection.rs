//! Selection types shared between surfaces and the cross-reference cursor.
//!
//! `OffsetRange` is the half-open `[start, end)` byte selection every surface
//! reports, and `XrefSelection` is the tagged descriptor a surface hands to
//! the frame when cross references are recomputed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open `[start, end)` range of document offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OffsetRange {
    /// First offset of the range (inclusive)
    pub start: u64,
    /// End of the range (exclusive)
    pub end: u64,
}

impl OffsetRange {
    /// Create a range, swapping the bounds if they are reversed.
    pub fn new(start: u64, end: u64) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Empty range positioned at `offset` (a caret, not a selection).
    pub fn at(offset: u64) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `offset` falls inside the range.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check whether two ranges share at least one offset.
    pub fn overlaps(&self, other: &OffsetRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

/// A possibly namespaced type name such as `std::string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// Parse a `::`-separated name.
    pub fn parse(name: &str) -> Self {
        Self::new(name.split("::").filter(|s| !s.is_empty()))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("::"))
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

/// What the user has selected, as far as cross references are concerned.
///
/// At most one variant is active. `None` is the "nothing valid" state: it
/// compares unequal to everything, itself included, so `PartialEq` is not
/// reflexive here and the type deliberately does not implement `Eq`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum XrefSelection {
    /// No valid selection
    #[default]
    None,
    /// Address range `[start, end)`
    Address(OffsetRange),
    /// A whole type
    Type(QualifiedName),
    /// A single field of a type, identified by its byte offset
    TypeField { ty: QualifiedName, offset: u64 },
}

impl XrefSelection {
    pub fn address(start: u64, end: u64) -> Self {
        XrefSelection::Address(OffsetRange::new(start, end))
    }

    pub fn ty(name: impl Into<QualifiedName>) -> Self {
        XrefSelection::Type(name.into())
    }

    pub fn type_field(name: impl Into<QualifiedName>, offset: u64) -> Self {
        XrefSelection::TypeField {
            ty: name.into(),
            offset,
        }
    }

    /// Selection derived from a surface's byte selection. An empty range
    /// selects the single byte under the caret.
    pub fn from_range(range: OffsetRange) -> Self {
        let end = if range.is_empty() {
            range.start.saturating_add(1)
        } else {
            range.end
        };
        XrefSelection::Address(OffsetRange::new(range.start, end))
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, XrefSelection::None)
    }

    pub fn address_range(&self) -> Option<OffsetRange> {
        match self {
            XrefSelection::Address(range) => Some(*range),
            _ => None,
        }
    }
}

impl PartialEq for XrefSelection {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (XrefSelection::Address(a), XrefSelection::Address(b)) => a == b,
            (XrefSelection::Type(a), XrefSelection::Type(b)) => a == b,
            (
                XrefSelection::TypeField { ty: a, offset: oa },
                XrefSelection::TypeField { ty: b, offset: ob },
            ) => a == b && oa == ob,
            _ => false,
        }
    }
}
