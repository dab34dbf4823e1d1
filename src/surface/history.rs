//! History entries: shared, surface-produced state snapshots.
//!
//! The frame only stores and replays entries; what goes into the optional
//! `state` payload is up to the surface that produced it. Entries are
//! reference counted because the same snapshot can sit on a history stack
//! and be held by its surface at the same time.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{IlViewType, OffsetRange, ViewLocation, INVALID_INSTR_INDEX};

/// Shared handle to a history entry.
pub type HistoryEntryRef = Rc<HistoryEntry>;

#[derive(Debug)]
pub struct HistoryEntry {
    view_type: RefCell<String>,
    offset: u64,
    selection: OffsetRange,
    il_view_type: IlViewType,
    instr_index: usize,
    state: Option<Box<dyn Any>>,
}

impl HistoryEntry {
    pub fn new(offset: u64) -> Self {
        Self {
            view_type: RefCell::new(String::new()),
            offset,
            selection: OffsetRange::at(offset),
            il_view_type: IlViewType::Normal,
            instr_index: INVALID_INSTR_INDEX,
            state: None,
        }
    }

    pub fn with_selection(mut self, selection: OffsetRange) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_il_view_type(mut self, il_view_type: IlViewType) -> Self {
        self.il_view_type = il_view_type;
        self
    }

    pub fn with_instr_index(mut self, index: usize) -> Self {
        self.instr_index = index;
        self
    }

    /// Attach a surface-specific payload.
    pub fn with_state<T: Any>(mut self, state: T) -> Self {
        self.state = Some(Box::new(state));
        self
    }

    pub fn into_ref(self) -> HistoryEntryRef {
        Rc::new(self)
    }

    /// Name of the view type that produced this entry.
    pub fn view_type(&self) -> String {
        self.view_type.borrow().clone()
    }

    /// Tag the entry with its producing view type. Called by the frame.
    pub fn set_view_type(&self, view_type: &str) {
        *self.view_type.borrow_mut() = view_type.to_string();
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn selection(&self) -> OffsetRange {
        self.selection
    }

    pub fn il_view_type(&self) -> IlViewType {
        self.il_view_type
    }

    pub fn instr_index(&self) -> usize {
        self.instr_index
    }

    /// Downcast the payload to the surface's own state type.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_ref()?.downcast_ref::<T>()
    }

    /// Location-equivalent part of the snapshot.
    pub fn location(&self) -> ViewLocation {
        ViewLocation::with_instruction(
            self.view_type(),
            self.offset,
            self.il_view_type,
            self.instr_index,
        )
    }
}
