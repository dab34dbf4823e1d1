//! Back/forward stacks of history entries.

use tracing::debug;

use crate::surface::HistoryEntryRef;

#[derive(Debug, Default)]
pub struct History {
    back: Vec<HistoryEntryRef>,
    forward: Vec<HistoryEntryRef>,
    /// Maximum back-stack depth; 0 means unbounded
    max: usize,
}

impl History {
    pub fn new(max: usize) -> Self {
        Self {
            back: Vec::new(),
            forward: Vec::new(),
            max,
        }
    }

    /// Push onto the back stack, dropping the oldest entries past the bound.
    pub fn push_back(&mut self, entry: HistoryEntryRef) {
        debug!(view_type = %entry.view_type(), offset = entry.offset(), "history push");
        self.back.push(entry);
        if self.max > 0 && self.back.len() > self.max {
            let excess = self.back.len() - self.max;
            self.back.drain(..excess);
        }
    }

    pub fn push_forward(&mut self, entry: HistoryEntryRef) {
        self.forward.push(entry);
    }

    pub fn pop_back(&mut self) -> Option<HistoryEntryRef> {
        self.back.pop()
    }

    pub fn pop_forward(&mut self) -> Option<HistoryEntryRef> {
        self.forward.pop()
    }

    pub fn clear_forward(&mut self) {
        self.forward.clear();
    }

    pub fn clear(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Back stack, oldest first.
    pub fn back_entries(&self) -> &[HistoryEntryRef] {
        &self.back
    }

    /// Forward stack, oldest first.
    pub fn forward_entries(&self) -> &[HistoryEntryRef] {
        &self.forward
    }
}
