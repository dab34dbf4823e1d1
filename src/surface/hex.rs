//! Hex dump rendering with byte-level editing.
//!
//! Every document offset is a valid target. Writes go straight to the
//! document and are recorded so they can be undone and redone.

use std::rc::Rc;

use tracing::{debug, warn};

use super::edit::{Clipboard, ClipboardData, Transform};
use super::{into_surface_ref, RenderingSurface, SurfaceRef, SurfaceState};
use crate::core::OffsetRange;
use crate::document::Document;
use crate::error::Result;
use crate::registry::ViewType;

#[derive(Debug, Clone)]
struct ByteEdit {
    offset: u64,
    before: Vec<u8>,
    after: Vec<u8>,
}

#[derive(Debug)]
pub struct HexSurface {
    state: SurfaceState,
    undo: Vec<ByteEdit>,
    redo: Vec<ByteEdit>,
}

impl HexSurface {
    pub fn new(document: Rc<dyn Document>, dynamic_widgets: bool) -> Self {
        Self {
            state: SurfaceState::new(document, dynamic_widgets),
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Range an edit applies to: the selection, or the caret byte.
    fn target(&self) -> OffsetRange {
        let sel = self.state.selection;
        if sel.is_empty() {
            OffsetRange::new(self.state.offset, self.state.offset.saturating_add(1))
        } else {
            sel
        }
    }

    /// Write `data` at `offset`, recording the change. Returns bytes written.
    fn apply(&mut self, offset: u64, data: &[u8]) -> usize {
        let document = Rc::clone(&self.state.document);
        let before = document.read(offset, data.len());
        let written = document.write(offset, &data[..before.len()]);
        if written > 0 {
            self.undo.push(ByteEdit {
                offset,
                before: before[..written].to_vec(),
                after: data[..written].to_vec(),
            });
            self.redo.clear();
            debug!(offset, written, "hex: wrote bytes");
        }
        written
    }
}

impl RenderingSurface for HexSurface {
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
            return false;
        }
        self.state.move_to(offset);
        true
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

    fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    fn can_copy(&self) -> bool {
        true
    }

    fn can_copy_with_transform(&self) -> bool {
        true
    }

    fn can_paste(&self) -> bool {
        self.state.document.is_writable()
    }

    fn can_paste_with_transform(&self) -> bool {
        self.can_paste()
    }

    fn can_transform(&self) -> bool {
        self.state.document.is_writable() && !self.state.selection.is_empty()
    }

    fn undo(&mut self) {
        let Some(edit) = self.undo.pop() else {
            return;
        };
        self.state.document.write(edit.offset, &edit.before);
        self.redo.push(edit);
    }

    fn redo(&mut self) {
        let Some(edit) = self.redo.pop() else {
            return;
        };
        self.state.document.write(edit.offset, &edit.after);
        self.undo.push(edit);
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard, transform: Option<&dyn Transform>) {
        let range = self.target();
        let bytes = self.state.document.read(range.start, range.len() as usize);
        let bytes = match transform {
            Some(t) => match t.encode(&bytes) {
                Ok(encoded) => encoded,
                Err(e) => {
                    warn!(transform = t.name(), error = %e, "copy transform failed");
                    return;
                }
            },
            None => bytes,
        };
        clipboard.set(ClipboardData::Binary(bytes));
    }

    fn paste(&mut self, clipboard: &dyn Clipboard, transform: Option<&dyn Transform>) {
        if !self.can_paste() {
            return;
        }
        let Some(data) = clipboard.get() else {
            return;
        };
        let bytes = match transform {
            Some(t) => match t.decode(data.as_bytes()) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(transform = t.name(), error = %e, "paste transform failed");
                    return;
                }
            },
            None => data.as_bytes().to_vec(),
        };
        let at = self.target().start;
        self.apply(at, &bytes);
    }

    fn transform(&mut self, transform: &dyn Transform, encode: bool) {
        if !self.can_transform() {
            return;
        }
        let range = self.state.selection;
        let input = self.state.document.read(range.start, range.len() as usize);
        let output = if encode {
            transform.encode(&input)
        } else {
            transform.decode(&input)
        };
        match output {
            Ok(bytes) => {
                self.apply(range.start, &bytes);
            }
            Err(e) => warn!(transform = transform.name(), error = %e, "transform failed"),
        }
    }

    fn write_data(&mut self, data: &[u8]) {
        let at = self.state.offset;
        self.apply(at, data);
    }
}

/// Descriptor for the hex dump; applies to every non-empty document.
#[derive(Debug, Default)]
pub struct HexViewType;

impl ViewType for HexViewType {
    fn name(&self) -> &str {
        "hex"
    }

    fn long_name(&self) -> &str {
        "Hex Editor"
    }

    fn priority(&self) -> i32 {
        2
    }

    fn applicable(&self, document: &dyn Document) -> bool {
        !document.is_empty()
    }

    fn create(&self, document: Rc<dyn Document>, create_dynamic_widgets: bool) -> Result<SurfaceRef> {
        Ok(into_surface_ref(HexSurface::new(
            document,
            create_dynamic_widgets,
        )))
    }
}
