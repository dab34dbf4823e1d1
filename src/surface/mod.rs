//! The rendering-surface contract and the built-in renderings.
//!
//! A surface is one stateful presentation of a document: a linear
//! disassembly listing, a function graph, a hex dump, a type layout. The
//! frame talks to every rendering through `RenderingSurface` only. Every
//! operation besides offset/selection/navigate has a default, so a
//! rendering overrides exactly what it supports; unsupported edit
//! operations are no-ops and their capability flags report `false`.

pub mod edit;
pub mod graph;
pub mod hex;
pub mod history;
pub mod linear;
pub mod mode;
pub mod types;

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{
    DisassemblySettings, Function, IlViewType, OffsetRange, XrefSelection, INVALID_INSTR_INDEX,
};
use crate::document::Document;
use crate::find::{FindEngine, FindFlags, FindPattern, Progress};

pub use edit::{Clipboard, ClipboardData, HexTransform, IntegerDisplayType, MemoryClipboard, Transform};
pub use graph::{GraphSurface, GraphViewType};
pub use hex::{HexSurface, HexViewType};
pub use history::{HistoryEntry, HistoryEntryRef};
pub use linear::{LinearSurface, LinearViewType};
pub use mode::NavigationModeGuard;
pub use types::{TypeSurface, TypeViewType};

/// Shared handle to a surface. The frame's cache holds these strongly;
/// extended-view caches hold `Weak` counterparts.
pub type SurfaceRef = Rc<RefCell<dyn RenderingSurface>>;

/// Wrap a concrete surface into a shared handle.
pub fn into_surface_ref<S: RenderingSurface + 'static>(surface: S) -> SurfaceRef {
    Rc::new(RefCell::new(surface))
}

/// Capability set every rendering implements.
pub trait RenderingSurface {
    /// Document this surface is bound to for its whole lifetime.
    fn document(&self) -> Rc<dyn Document>;

    fn current_offset(&self) -> u64;

    fn selection_offsets(&self) -> OffsetRange;

    fn set_selection_offsets(&mut self, range: OffsetRange);

    /// Selection as cross-reference input. Derived from the selected range
    /// unless the rendering knows better (e.g. a type layout).
    fn selection_for_xref(&self) -> XrefSelection {
        XrefSelection::from_range(self.selection_offsets())
    }

    /// Move the displayed position. Returns `false`, leaving state
    /// untouched, when the offset is outside the document or meaningless
    /// for this rendering.
    fn navigate(&mut self, offset: u64) -> bool;

    fn navigate_to_function(&mut self, _function: &Function, offset: u64) -> bool {
        self.navigate(offset)
    }

    fn go_to_reference(&mut self, _function: Option<&Function>, _source: u64, target: u64) -> bool {
        self.navigate(target)
    }

    /// Navigate to instruction `index` of `function` in the current IL.
    fn navigate_to_function_index(&mut self, _function: &Function, _index: usize) -> bool {
        false
    }

    /// True if this rendering can display a function as a unit.
    fn displays_functions(&self) -> bool {
        false
    }

    fn il_view_type(&self) -> IlViewType {
        IlViewType::Normal
    }

    fn set_il_view_type(&mut self, _il_view_type: IlViewType) {}

    fn current_il_instruction_index(&self) -> usize {
        INVALID_INSTR_INDEX
    }

    fn current_function(&self) -> Option<Function> {
        self.document()
            .functions_containing(self.current_offset())
            .into_iter()
            .next()
    }

    /// Snapshot the rendering state. The default captures only the
    /// location-equivalent fields.
    fn produce_history_entry(&self) -> HistoryEntryRef {
        HistoryEntry::new(self.current_offset())
            .with_selection(self.selection_offsets())
            .with_il_view_type(self.il_view_type())
            .with_instr_index(self.current_il_instruction_index())
            .into_ref()
    }

    /// Replay a snapshot. Returns `false`, restoring the previous IL mode,
    /// when the entry's offset is rejected.
    fn restore_history_entry(&mut self, entry: &HistoryEntryRef) -> bool {
        let previous_il = self.il_view_type();
        self.set_il_view_type(entry.il_view_type());
        if !self.navigate(entry.offset()) {
            self.set_il_view_type(previous_il);
            return false;
        }
        if !entry.selection().is_empty() {
            self.set_selection_offsets(entry.selection());
        }
        true
    }

    fn disassembly_settings(&self) -> DisassemblySettings {
        DisassemblySettings::default()
    }

    /// Search `[start, end)` of the bound document. `None` means either no
    /// match or a cancelled scan.
    fn find(
        &self,
        engine: &FindEngine,
        pattern: &FindPattern,
        start: u64,
        end: u64,
        flags: FindFlags,
        progress: &mut Progress<'_>,
    ) -> Option<u64> {
        let document = self.document();
        engine
            .find(
                document.as_ref(),
                pattern,
                start,
                end,
                flags,
                &self.disassembly_settings(),
                progress,
            )
            .address()
    }

    /// Current navigation mode; the empty string is the default mode.
    fn navigation_mode(&self) -> String {
        String::new()
    }

    fn set_navigation_mode(&mut self, _mode: &str) {}

    fn navigation_modes(&self) -> Vec<String> {
        Vec::new()
    }

    /// True if an arbitrary document offset is a meaningful target.
    fn is_binary_data_navigable(&self) -> bool {
        false
    }

    fn shown(&mut self) {}

    fn hidden(&mut self) {}

    /// Asked before the owning frame closes; `false` vetoes the close.
    fn close_request(&mut self) -> bool {
        true
    }

    fn closing(&mut self) {}

    // Editing capabilities

    fn can_assemble(&self) -> bool {
        false
    }

    fn can_compile(&self) -> bool {
        false
    }

    fn can_undo(&self) -> bool {
        false
    }

    fn can_redo(&self) -> bool {
        false
    }

    fn can_cut(&self) -> bool {
        false
    }

    fn can_copy(&self) -> bool {
        false
    }

    fn can_copy_with_transform(&self) -> bool {
        false
    }

    fn can_copy_address(&self) -> bool {
        true
    }

    fn can_paste(&self) -> bool {
        false
    }

    fn can_paste_with_transform(&self) -> bool {
        false
    }

    fn can_transform(&self) -> bool {
        false
    }

    fn can_display_as(&self, _display: IntegerDisplayType) -> bool {
        false
    }

    fn undo(&mut self) {}

    fn redo(&mut self) {}

    fn cut(&mut self, _clipboard: &mut dyn Clipboard) {}

    fn copy(&mut self, _clipboard: &mut dyn Clipboard, _transform: Option<&dyn Transform>) {}

    fn copy_address(&mut self, clipboard: &mut dyn Clipboard) {
        clipboard.set(ClipboardData::Text(format!("{:#x}", self.current_offset())));
    }

    fn paste(&mut self, _clipboard: &dyn Clipboard, _transform: Option<&dyn Transform>) {}

    fn transform(&mut self, _transform: &dyn Transform, _encode: bool) {}

    fn write_data(&mut self, _data: &[u8]) {}

    fn display_as(&mut self, _display: IntegerDisplayType) {}
}

/// Navigation state shared by the built-in surfaces.
#[derive(Clone)]
pub struct SurfaceState {
    pub document: Rc<dyn Document>,
    pub offset: u64,
    pub selection: OffsetRange,
    pub il_view_type: IlViewType,
    pub instr_index: usize,
    pub visible: bool,
    pub dynamic_widgets: bool,
}

impl SurfaceState {
    pub fn new(document: Rc<dyn Document>, dynamic_widgets: bool) -> Self {
        let offset = document.start();
        Self {
            document,
            offset,
            selection: OffsetRange::at(offset),
            il_view_type: IlViewType::Normal,
            instr_index: INVALID_INSTR_INDEX,
            visible: false,
            dynamic_widgets,
        }
    }

    /// Move to `offset`, collapsing the selection onto it and recomputing
    /// the instruction index within the containing function.
    pub fn move_to(&mut self, offset: u64) {
        self.offset = offset;
        self.selection = OffsetRange::at(offset);
        self.instr_index = self
            .document
            .functions_containing(offset)
            .first()
            .and_then(|f| f.instruction_index_at(offset))
            .unwrap_or(INVALID_INSTR_INDEX);
    }

    pub fn selected_bytes(&self) -> Vec<u8> {
        let range = self.selection;
        if range.is_empty() {
            return Vec::new();
        }
        self.document.read(range.start, range.len() as usize)
    }
}

impl std::fmt::Debug for SurfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceState")
            .field("data_type", &self.document.data_type())
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("selection", &self.selection)
            .field("il_view_type", &self.il_view_type)
            .field("instr_index", &self.instr_index)
            .finish()
    }
}
