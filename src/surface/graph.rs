//! Function graph rendering.
//!
//! A graph only has something to show when the offset lies inside a
//! function; any other offset is rejected. The graph keeps the function it
//! displays and a zoom level, and both survive a history round trip through
//! the entry's state payload.

use std::rc::Rc;

use tracing::trace;

use super::edit::{Clipboard, ClipboardData, Transform};
use super::linear::render_range;
use super::{into_surface_ref, HistoryEntry, HistoryEntryRef, RenderingSurface, SurfaceRef, SurfaceState};
use crate::core::{disassembly_text, BasicBlock, DisassemblySettings, Function, IlViewType, OffsetRange};
use crate::document::Document;
use crate::error::{NavError, Result};
use crate::registry::ViewType;

/// Zoom used for new graphs, in percent.
pub const DEFAULT_ZOOM: u32 = 100;

/// Zoom used by the overview ("minigraph") extended view.
pub const OVERVIEW_ZOOM: u32 = 25;

/// Graph-specific part of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphState {
    pub function: u64,
    pub zoom: u32,
}

#[derive(Debug)]
pub struct GraphSurface {
    state: SurfaceState,
    function: Option<Function>,
    zoom: u32,
    settings: DisassemblySettings,
}

impl GraphSurface {
    pub fn new(document: Rc<dyn Document>, dynamic_widgets: bool) -> Self {
        Self {
            state: SurfaceState::new(document, dynamic_widgets),
            function: None,
            zoom: DEFAULT_ZOOM,
            settings: DisassemblySettings::default(),
        }
    }

    /// Zoomed-out graph used as an auxiliary overview.
    pub fn overview(document: Rc<dyn Document>) -> Self {
        Self {
            zoom: OVERVIEW_ZOOM,
            ..Self::new(document, false)
        }
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: u32) {
        self.zoom = zoom.clamp(1, 400);
    }

    /// Function currently laid out, if any.
    pub fn function(&self) -> Option<&Function> {
        self.function.as_ref()
    }

    pub fn current_basic_block(&self) -> Option<&BasicBlock> {
        self.function.as_ref()?.block_at(self.state.offset)
    }

    fn show(&mut self, function: Function, offset: u64) {
        self.function = Some(function);
        self.state.move_to(offset);
    }
}

impl RenderingSurface for GraphSurface {
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

    fn navigate(&mut self, offset: u64) -> bool {
        // Stay in the displayed function when it still covers the offset
        if let Some(current) = self.function.as_ref().filter(|f| f.contains(offset)) {
            let current = current.clone();
            self.show(current, offset);
            return true;
        }
        match self.state.document.functions_containing(offset).into_iter().next() {
            Some(function) => {
                self.show(function, offset);
                true
            }
            None => {
                trace!(offset, "graph: no function at offset");
                false
            }
        }
    }

    fn navigate_to_function(&mut self, function: &Function, offset: u64) -> bool {
        if !function.contains(offset) {
            return false;
        }
        self.show(function.clone(), offset);
        true
    }

    fn go_to_reference(&mut self, function: Option<&Function>, _source: u64, target: u64) -> bool {
        match function {
            Some(f) if f.contains(target) => self.navigate_to_function(f, target),
            _ => self.navigate(target),
        }
    }

    fn navigate_to_function_index(&mut self, function: &Function, index: usize) -> bool {
        match function.instruction_address(index) {
            Some(addr) if function.contains(addr) => {
                self.show(function.clone(), addr);
                self.state.instr_index = index;
                true
            }
            _ => false,
        }
    }

    fn displays_functions(&self) -> bool {
        true
    }

    fn il_view_type(&self) -> IlViewType {
        self.state.il_view_type
    }

    fn set_il_view_type(&mut self, il_view_type: IlViewType) {
        self.state.il_view_type = il_view_type;
    }

    fn current_il_instruction_index(&self) -> usize {
        self.state.instr_index
    }

    fn current_function(&self) -> Option<Function> {
        self.function.clone()
    }

    fn produce_history_entry(&self) -> HistoryEntryRef {
        let mut entry = HistoryEntry::new(self.state.offset)
            .with_selection(self.state.selection)
            .with_il_view_type(self.state.il_view_type)
            .with_instr_index(self.state.instr_index);
        if let Some(function) = &self.function {
            entry = entry.with_state(GraphState {
                function: function.entry,
                zoom: self.zoom,
            });
        }
        entry.into_ref()
    }

    fn restore_history_entry(&mut self, entry: &HistoryEntryRef) -> bool {
        let saved = entry.state::<GraphState>().copied();
        let function = saved.and_then(|s| self.state.document.function_at(s.function));
        let previous_il = self.state.il_view_type;
        self.state.il_view_type = entry.il_view_type();

        let ok = match &function {
            Some(f) => self.navigate_to_function(f, entry.offset()),
            None => self.navigate(entry.offset()),
        };
        if !ok {
            self.state.il_view_type = previous_il;
            return false;
        }
        self.state.instr_index = entry.instr_index();
        if let Some(saved) = saved {
            self.zoom = saved.zoom;
        }
        true
    }

    fn disassembly_settings(&self) -> DisassemblySettings {
        self.settings.clone()
    }

    fn shown(&mut self) {
        self.state.visible = true;
    }

    fn hidden(&mut self) {
        self.state.visible = false;
    }

    fn can_copy(&self) -> bool {
        self.function.is_some()
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard, _transform: Option<&dyn Transform>) {
        // Copies the basic block under the caret
        let Some(block) = self.current_basic_block().map(BasicBlock::range) else {
            return;
        };
        let lines = render_range(self.state.document.as_ref(), block, &self.settings);
        clipboard.set(ClipboardData::Text(disassembly_text(&lines)));
    }
}

/// Descriptor for function graphs; applies when the document has functions.
#[derive(Debug, Default)]
pub struct GraphViewType;

impl ViewType for GraphViewType {
    fn name(&self) -> &str {
        "graph"
    }

    fn long_name(&self) -> &str {
        "Graph"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn applicable(&self, document: &dyn Document) -> bool {
        !document.functions().is_empty()
    }

    fn displays_functions(&self) -> bool {
        true
    }

    fn is_graph(&self) -> bool {
        true
    }

    fn create(&self, document: Rc<dyn Document>, create_dynamic_widgets: bool) -> Result<SurfaceRef> {
        Ok(into_surface_ref(GraphSurface::new(
            document,
            create_dynamic_widgets,
        )))
    }

    fn create_extended(&self, name: &str, document: Rc<dyn Document>) -> Result<SurfaceRef> {
        match name {
            "minigraph" => Ok(into_surface_ref(GraphSurface::overview(document))),
            other => Err(NavError::ExtendedViewUnavailable(format!(
                "{}:{}",
                self.name(),
                other
            ))),
        }
    }
}
