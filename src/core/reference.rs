//! Cross-reference entries as seen by the frame's reference cursor.
//!
//! A `CrossReference` is a directed edge between two document offsets, plus
//! the direction relative to the selection it was computed for. The cursor
//! navigates to the *other* end of the edge.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Enum representing the kind of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Function call reference
    Call,
    /// Unconditional jump reference
    Jump,
    /// Conditional branch reference
    Branch,
    /// Memory read reference
    Read,
    /// Memory write reference
    Write,
    /// Data reference
    DataRef,
    /// Use of a type or one of its fields
    TypeUse,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ReferenceKind::Call => "call",
            ReferenceKind::Jump => "jump",
            ReferenceKind::Branch => "branch",
            ReferenceKind::Read => "read",
            ReferenceKind::Write => "write",
            ReferenceKind::DataRef => "data_ref",
            ReferenceKind::TypeUse => "type_use",
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(
            self,
            ReferenceKind::Call | ReferenceKind::Jump | ReferenceKind::Branch
        )
    }
}

/// Direction of a reference relative to the selection it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceDirection {
    /// Something refers to the selection (a caller)
    Incoming,
    /// The selection refers to something (a target)
    Outgoing,
}

/// Represents a cross-reference between two document offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub direction: ReferenceDirection,
    pub kind: ReferenceKind,
    /// Offset where the reference originates
    pub source: u64,
    /// Offset the reference points at
    pub target: u64,
    /// Name of the function containing `source`, when known
    pub function: Option<String>,
}

impl CrossReference {
    pub fn incoming(kind: ReferenceKind, source: u64, target: u64) -> Self {
        Self {
            direction: ReferenceDirection::Incoming,
            kind,
            source,
            target,
            function: None,
        }
    }

    pub fn outgoing(kind: ReferenceKind, source: u64, target: u64) -> Self {
        Self {
            direction: ReferenceDirection::Outgoing,
            kind,
            source,
            target,
            function: None,
        }
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    /// The end of the edge a cursor should move to.
    pub fn navigation_offset(&self) -> u64 {
        match self.direction {
            ReferenceDirection::Incoming => self.source,
            ReferenceDirection::Outgoing => self.target,
        }
    }
}

impl Ord for CrossReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.direction
            .cmp(&other.direction)
            .then(self.navigation_offset().cmp(&other.navigation_offset()))
            .then(self.kind.cmp(&other.kind))
            .then(self.source.cmp(&other.source))
            .then(self.target.cmp(&other.target))
    }
}

impl PartialOrd for CrossReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CrossReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            ReferenceDirection::Incoming => "<-",
            ReferenceDirection::Outgoing => "->",
        };
        write!(
            f,
            "{:#x} {} {:#x} ({})",
            self.target,
            arrow,
            self.source,
            self.kind.as_str()
        )?;
        if let Some(func) = &self.function {
            write!(f, " in {}", func)?;
        }
        Ok(())
    }
}
