//! Linear disassembly listing.

use std::rc::Rc;

use tracing::trace;

use super::edit::{Clipboard, ClipboardData, Transform};
use super::{into_surface_ref, RenderingSurface, SurfaceRef, SurfaceState};
use crate::core::{
    disassembly_text, DisassemblySettings, DisassemblyTextLine, Function, IlViewType, OffsetRange,
};
use crate::document::Document;
use crate::error::Result;
use crate::registry::ViewType;

/// Render every item overlapping `range`; an empty range renders the item
/// under its start.
pub(crate) fn render_range(
    document: &dyn Document,
    range: OffsetRange,
    settings: &DisassemblySettings,
) -> Vec<DisassemblyTextLine> {
    let end = if range.is_empty() {
        range.start.saturating_add(1)
    } else {
        range.end
    };
    let mut lines = Vec::new();
    let mut pos = range.start;
    while pos < end {
        match document.render(pos, settings) {
            Some(item) => {
                lines.extend(item.lines);
                pos = pos.saturating_add(item.length);
            }
            None => break,
        }
    }
    lines
}

/// Scrolling listing of every item in the document, code and data alike.
#[derive(Debug)]
pub struct LinearSurface {
    state: SurfaceState,
    settings: DisassemblySettings,
}

impl LinearSurface {
    pub fn new(document: Rc<dyn Document>, dynamic_widgets: bool) -> Self {
        Self {
            state: SurfaceState::new(document, dynamic_widgets),
            settings: DisassemblySettings::default(),
        }
    }

    pub fn set_disassembly_settings(&mut self, settings: DisassemblySettings) {
        self.settings = settings;
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// Lines currently selected (or under the caret).
    pub fn selected_lines(&self) -> Vec<DisassemblyTextLine> {
        render_range(
            self.state.document.as_ref(),
            self.state.selection,
            &self.settings,
        )
    }
}

impl RenderingSurface for LinearSurface {
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
        if !self.state.document.is_valid_offset(offset) {
            trace!(offset, "linear: offset outside document");
            return false;
        }
        self.state.move_to(offset);
        true
    }

    fn navigate_to_function_index(&mut self, function: &Function, index: usize) -> bool {
        match function.instruction_address(index) {
            Some(addr) if self.state.document.is_valid_offset(addr) => {
                self.state.move_to(addr);
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

    fn disassembly_settings(&self) -> DisassemblySettings {
        self.settings.clone()
    }

    fn is_binary_data_navigable(&self) -> bool {
        true
    }

    fn shown(&mut self) {
        self.state.visible = true;
    }

    fn hidden(&mut self) {
        self.state.visible = false;
    }

    fn can_copy(&self) -> bool {
        true
    }

    fn can_copy_with_transform(&self) -> bool {
        true
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard, transform: Option<&dyn Transform>) {
        let text = disassembly_text(&self.selected_lines());
        match transform {
            None => clipboard.set(ClipboardData::Text(text)),
            Some(t) => match t.encode(text.as_bytes()) {
                Ok(bytes) => clipboard.set(ClipboardData::Binary(bytes)),
                Err(e) => tracing::warn!(transform = t.name(), error = %e, "copy transform failed"),
            },
        }
    }
}

/// Descriptor for the linear listing; applies to every non-empty document.
#[derive(Debug, Default)]
pub struct LinearViewType;

impl ViewType for LinearViewType {
    fn name(&self) -> &str {
        "linear"
    }

    fn long_name(&self) -> &str {
        "Linear Disassembly"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn applicable(&self, document: &dyn Document) -> bool {
        !document.is_empty()
    }

    fn displays_functions(&self) -> bool {
        true
    }

    fn create(&self, document: Rc<dyn Document>, create_dynamic_widgets: bool) -> Result<SurfaceRef> {
        Ok(into_surface_ref(LinearSurface::new(
            document,
            create_dynamic_widgets,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BasicBlock;
    use crate::document::{Architecture, MemoryDocument};
    use crate::surface::MemoryClipboard;

    fn doc() -> Rc<dyn Document> {
        let bytes = vec![0x55, 0x48, 0x89, 0xe5, 0xc3, 0x00];
        Rc::new(
            MemoryDocument::new("Raw", 0x1000, bytes)
                .with_arch(Architecture::X86_64)
                .with_function(
                    Function::new("f", 0x1000)
                        .with_block(BasicBlock::new(0x1000, 0x1005, 3))
                        .with_instructions(vec![0x1000, 0x1001, 0x1004]),
                ),
        )
    }

    #[test]
    fn test_navigate_tracks_instruction_index() {
        let mut s = LinearSurface::new(doc(), false);
        assert!(s.navigate(0x1001));
        assert_eq!(s.current_il_instruction_index(), 1);
        assert!(s.navigate(0x1005));
        assert_eq!(s.current_il_instruction_index(), crate::core::INVALID_INSTR_INDEX);
        assert!(!s.navigate(0x2000));
        assert_eq!(s.current_offset(), 0x1005);
    }

    #[test]
    fn test_navigate_to_function_index() {
        let d = doc();
        let f = d.function_at(0x1000).unwrap();
        let mut s = LinearSurface::new(d, false);
        assert!(s.navigate_to_function_index(&f, 2));
        assert_eq!(s.current_offset(), 0x1004);
        assert_eq!(s.current_il_instruction_index(), 2);
        assert!(!s.navigate_to_function_index(&f, 9));
    }

    #[test]
    fn test_copy_selected_lines() {
        let mut s = LinearSurface::new(doc(), false);
        s.set_selection_offsets(OffsetRange::new(0x1001, 0x1005));
        let mut clip = MemoryClipboard::default();
        s.copy(&mut clip, None);
        let Some(ClipboardData::Text(text)) = clip.get() else {
            panic!("expected text");
        };
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("rbp, rsp"));
        assert!(text.ends_with("ret"));
    }
}
