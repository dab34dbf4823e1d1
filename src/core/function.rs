//! Function descriptors reported by a document.
//!
//! A `Function` is the document's view of one function: its entry, its
//! blocks and the ordered instruction addresses used for instruction-index
//! navigation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::basic_block::BasicBlock;

/// Kind of function in binary analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FunctionKind {
    /// Normal function defined in the binary
    #[default]
    Normal,
    /// Imported function from external library
    Imported,
    /// Thunk function that jumps to another function
    Thunk,
    /// Library function (e.g., runtime library)
    Library,
}

impl FunctionKind {
    pub fn value(&self) -> &str {
        match self {
            FunctionKind::Normal => "normal",
            FunctionKind::Imported => "imported",
            FunctionKind::Thunk => "thunk",
            FunctionKind::Library => "library",
        }
    }
}

/// Represents a function in the analyzed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Entry point offset
    pub entry: u64,
    /// Function kind
    pub kind: FunctionKind,
    /// Basic blocks in the function
    pub basic_blocks: Vec<BasicBlock>,
    /// Instruction start offsets, in instruction-index order
    pub instructions: Vec<u64>,
}

impl Function {
    pub fn new(name: impl Into<String>, entry: u64) -> Self {
        Self {
            name: name.into(),
            entry,
            kind: FunctionKind::Normal,
            basic_blocks: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: FunctionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_block(mut self, block: BasicBlock) -> Self {
        self.basic_blocks.push(block);
        self.basic_blocks.sort_by_key(|b| b.start);
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<u64>) -> Self {
        self.instructions = instructions;
        self
    }

    /// True if any block of this function covers `offset`.
    pub fn contains(&self, offset: u64) -> bool {
        if self.basic_blocks.is_empty() {
            return offset == self.entry;
        }
        self.basic_blocks.iter().any(|b| b.contains(offset))
    }

    pub fn block_at(&self, offset: u64) -> Option<&BasicBlock> {
        self.basic_blocks.iter().find(|b| b.contains(offset))
    }

    /// Lowest and highest offsets covered by the function's blocks.
    pub fn bounds(&self) -> (u64, u64) {
        let start = self
            .basic_blocks
            .iter()
            .map(|b| b.start)
            .min()
            .unwrap_or(self.entry);
        let end = self
            .basic_blocks
            .iter()
            .map(|b| b.end)
            .max()
            .unwrap_or(self.entry.saturating_add(1));
        (start, end)
    }

    /// Index of the instruction covering `offset`.
    pub fn instruction_index_at(&self, offset: u64) -> Option<usize> {
        match self.instructions.binary_search(&offset) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) if self.contains(offset) => Some(i - 1),
            Err(_) => None,
        }
    }

    pub fn instruction_address(&self, index: usize) -> Option<u64> {
        self.instructions.get(index).copied()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.name, self.entry)
    }
}
