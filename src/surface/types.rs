//! Type layout rendering.
//!
//! In the default navigation mode an offset is a document offset and must
//! land on a typed data variable; code offsets are rejected. In the
//! `"type"` mode the offset indexes the document's list of defined types.

use std::rc::Rc;

use super::{into_surface_ref, HistoryEntry, HistoryEntryRef, RenderingSurface, SurfaceRef, SurfaceState};
use crate::core::{OffsetRange, QualifiedName, XrefSelection};
use crate::document::Document;
use crate::error::Result;
use crate::registry::ViewType;

/// Navigation mode in which offsets index the defined-type list.
pub const TYPE_INDEX_MODE: &str = "type";

/// Type-specific part of a history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeState {
    pub name: QualifiedName,
    pub field: Option<u64>,
    pub mode: String,
}

#[derive(Debug)]
pub struct TypeSurface {
    state: SurfaceState,
    mode: String,
    selected: Option<QualifiedName>,
    field: Option<u64>,
}

impl TypeSurface {
    pub fn new(document: Rc<dyn Document>, dynamic_widgets: bool) -> Self {
        Self {
            state: SurfaceState::new(document, dynamic_widgets),
            mode: String::new(),
            selected: None,
            field: None,
        }
    }

    pub fn selected_type(&self) -> Option<&QualifiedName> {
        self.selected.as_ref()
    }

    /// Select a field of the displayed type by byte offset.
    pub fn select_field(&mut self, offset: u64) {
        if self.selected.is_some() {
            self.field = Some(offset);
        }
    }

    pub fn clear_field(&mut self) {
        self.field = None;
    }
}

impl RenderingSurface for TypeSurface {
    fn document(&self) -> Rc<dyn Document> {
        Rc::clone(&self.state.document)
    }

    fn current_offset(&self) -> u64 {
        self.state.offset
    }

    fn selection_offsets(&self) -> OffsetRange {
        self.state.selection
    }

    fn set_selection_offsets(&mut self, range: OffsetRange) {
        self.state.selection = range;
    }

    fn selection_for_xref(&self) -> XrefSelection {
        match (&self.selected, self.field) {
            (Some(ty), Some(field)) => XrefSelection::type_field(ty.clone(), field),
            (Some(ty), None) => XrefSelection::ty(ty.clone()),
            (None, _) => XrefSelection::None,
        }
    }

    fn navigate(&mut self, offset: u64) -> bool {
        let document = Rc::clone(&self.state.document);
        if self.mode == TYPE_INDEX_MODE {
            let Some(ty) = usize::try_from(offset)
                .ok()
                .and_then(|i| document.defined_types().into_iter().nth(i))
            else {
                return false;
            };
            self.selected = Some(ty);
            self.field = None;
            self.state.offset = offset;
            self.state.selection = OffsetRange::at(offset);
            return true;
        }

        if document.is_code(offset) {
            return false;
        }
        let Some((ty, delta)) = document.type_at(offset) else {
            return false;
        };
        self.selected = Some(ty);
        self.field = (delta > 0).then_some(delta);
        self.state.move_to(offset);
        true
    }

    fn produce_history_entry(&self) -> HistoryEntryRef {
        let entry = HistoryEntry::new(self.state.offset).with_selection(self.state.selection);
        match &self.selected {
            Some(name) => entry
                .with_state(TypeState {
                    name: name.clone(),
                    field: self.field,
                    mode: self.mode.clone(),
                })
                .into_ref(),
            None => entry.into_ref(),
        }
    }

    fn restore_history_entry(&mut self, entry: &HistoryEntryRef) -> bool {
        let saved = entry.state::<TypeState>().cloned();
        let previous_mode = self.mode.clone();
        if let Some(saved) = &saved {
            self.mode = saved.mode.clone();
        }
        if !self.navigate(entry.offset()) {
            self.mode = previous_mode;
            return false;
        }
        if let Some(saved) = saved {
            self.field = saved.field;
        }
        true
    }

    fn navigation_mode(&self) -> String {
        self.mode.clone()
    }

    fn set_navigation_mode(&mut self, mode: &str) {
        if mode.is_empty() || mode == TYPE_INDEX_MODE {
            self.mode = mode.to_string();
        }
    }

    fn navigation_modes(&self) -> Vec<String> {
        vec![String::new(), TYPE_INDEX_MODE.to_string()]
    }

    fn shown(&mut self) {
        self.state.visible = true;
    }

    fn hidden(&mut self) {
        self.state.visible = false;
    }
}

/// Descriptor for type layouts; applies when the document defines types.
#[derive(Debug, Default)]
pub struct TypeViewType;

impl ViewType for TypeViewType {
    fn name(&self) -> &str {
        "types"
    }

    fn long_name(&self) -> &str {
        "Types"
    }

    fn priority(&self) -> i32 {
        3
    }

    fn applicable(&self, document: &dyn Document) -> bool {
        !document.defined_types().is_empty()
    }

    fn create(&self, document: Rc<dyn Document>, create_dynamic_widgets: bool) -> Result<SurfaceRef> {
        Ok(into_surface_ref(TypeSurface::new(
            document,
            create_dynamic_widgets,
        )))
    }
}
