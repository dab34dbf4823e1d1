//! BasicBlock type for representing straight-line code regions.
//!
//! Blocks are what a document reports for an offset; the frame uses them to
//! derive the current block after navigation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::selection::OffsetRange;

/// A straight-line code region with a single entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Starting offset of the block
    pub start: u64,
    /// Ending offset of the block (exclusive)
    pub end: u64,
    /// Number of instructions in this block
    pub instruction_count: u32,
    /// Start offsets of successor blocks
    pub successors: Vec<u64>,
}

impl BasicBlock {
    pub fn new(start: u64, end: u64, instruction_count: u32) -> Self {
        Self {
            start,
            end,
            instruction_count,
            successors: Vec::new(),
        }
    }

    pub fn with_successors(mut self, successors: Vec<u64>) -> Self {
        self.successors = successors;
        self
    }

    pub fn range(&self) -> OffsetRange {
        OffsetRange::new(self.start, self.end)
    }

    /// Size of the block in bytes
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start && offset < self.end
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BasicBlock({:#x}-{:#x}, {} instructions)",
            self.start, self.end, self.instruction_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_block_creation() {
        let block = BasicBlock::new(0x401000, 0x401010, 4).with_successors(vec![0x401020]);
        assert_eq!(block.size(), 0x10);
        assert!(block.contains(0x401000));
        assert!(!block.contains(0x401010));
        assert_eq!(block.successors, vec![0x401020]);
    }

    #[test]
    fn test_display() {
        let block = BasicBlock::new(0x1000, 0x1008, 2);
        assert_eq!(block.to_string(), "BasicBlock(0x1000-0x1008, 2 instructions)");
    }
}
