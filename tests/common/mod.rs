//! Common test utilities and helpers.
//!
//! Fixture documents and frames shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use glaurung_nav::core::{BasicBlock, Function, ReferenceKind, TagType};
use glaurung_nav::error::Result;
use glaurung_nav::surface::SurfaceRef;
use glaurung_nav::{
    Architecture, Document, FileContext, FrameConfig, MemoryDocument, MemoryTagStore,
    MemoryXrefIndex, ViewFrame, ViewType, ViewTypeRegistry,
};

/// Layout of the sample document.
pub mod layout {
    pub const BASE: u64 = 0x1000;
    pub const SIZE: usize = 0x1100;
    /// "hello world" in the data area
    pub const GREETING: u64 = 0x1400;
    /// Typed data variable `Point` (8 bytes)
    pub const POINT: u64 = 0x1800;
    /// push rbp; mov rbp, rsp; call CALLEE; ret
    pub const MAIN: u64 = 0x2000;
    pub const MAIN_CALL: u64 = 0x2004;
    pub const MAIN_END: u64 = 0x200a;
    /// ret
    pub const CALLEE: u64 = 0x200e;
}

use layout::*;

/// An x86-64 document with two functions, a string and a typed variable.
pub fn sample_document() -> Rc<dyn Document> {
    let mut bytes = vec![0u8; SIZE];
    let greeting = b"hello world";
    let at = (GREETING - BASE) as usize;
    bytes[at..at + greeting.len()].copy_from_slice(greeting);

    let code: [u8; 10] = [
        0x55, // push rbp
        0x48, 0x89, 0xe5, // mov rbp, rsp
        0xe8, 0x05, 0x00, 0x00, 0x00, // call 0x200e
        0xc3, // ret
    ];
    let at = (MAIN - BASE) as usize;
    bytes[at..at + code.len()].copy_from_slice(&code);
    bytes[(CALLEE - BASE) as usize] = 0xc3;

    Rc::new(
        MemoryDocument::new("ELF", BASE, bytes)
            .with_arch(Architecture::X86_64)
            .writable()
            .with_function(
                Function::new("main", MAIN)
                    .with_block(BasicBlock::new(MAIN, MAIN_END, 4))
                    .with_instructions(vec![MAIN, 0x2001, MAIN_CALL, 0x2009]),
            )
            .with_function(
                Function::new("callee", CALLEE)
                    .with_block(BasicBlock::new(CALLEE, CALLEE + 1, 1))
                    .with_instructions(vec![CALLEE]),
            )
            .with_data_variable(POINT, "Point", 8),
    )
}

/// A second, unrelated document of the same file.
pub fn raw_document() -> Rc<dyn Document> {
    Rc::new(MemoryDocument::new("Raw", 0, (0u8..=255).collect()))
}

/// Two references into `callee`: a data reference from the greeting and
/// the call from `main`.
pub fn sample_xrefs() -> Rc<MemoryXrefIndex> {
    let mut index = MemoryXrefIndex::new();
    index.add_reference(ReferenceKind::Call, MAIN_CALL, CALLEE);
    index.add_reference(ReferenceKind::DataRef, GREETING, CALLEE);
    index.add_type_use("Point", 4, POINT, 0x2001);
    Rc::new(index)
}

pub fn sample_tags() -> Rc<MemoryTagStore> {
    let store = MemoryTagStore::new();
    let bookmark = TagType::new("Bookmarks", "*");
    store.add_tag(CALLEE, bookmark.clone(), "callee");
    store.add_tag(GREETING, bookmark.clone(), "greeting");
    store.add_tag(MAIN, bookmark, "main");
    Rc::new(store)
}

/// Frame over the sample document with the built-in view types.
pub fn sample_frame() -> ViewFrame {
    frame_with(ViewTypeRegistry::with_builtin(), FrameConfig::default())
}

pub fn frame_with(registry: ViewTypeRegistry, config: FrameConfig) -> ViewFrame {
    let context = FileContext::new(sample_document(), registry)
        .with_document(raw_document())
        .with_xref_index(sample_xrefs())
        .with_tag_store(sample_tags());
    ViewFrame::new(context, config).expect("default config is valid")
}

/// Wraps a view type and counts how many surfaces it builds.
pub struct CountingViewType {
    inner: Rc<dyn ViewType>,
    created: Rc<Cell<usize>>,
}

impl CountingViewType {
    pub fn wrap(inner: Rc<dyn ViewType>) -> (Rc<dyn ViewType>, Rc<Cell<usize>>) {
        let created = Rc::new(Cell::new(0));
        let wrapped = Rc::new(Self {
            inner,
            created: Rc::clone(&created),
        });
        (wrapped, created)
    }
}

impl ViewType for CountingViewType {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn long_name(&self) -> &str {
        self.inner.long_name()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    fn applicable(&self, document: &dyn Document) -> bool {
        self.inner.applicable(document)
    }

    fn displays_functions(&self) -> bool {
        self.inner.displays_functions()
    }

    fn is_graph(&self) -> bool {
        self.inner.is_graph()
    }

    fn create(&self, document: Rc<dyn Document>, create_dynamic_widgets: bool) -> Result<SurfaceRef> {
        self.created.set(self.created.get() + 1);
        self.inner.create(document, create_dynamic_widgets)
    }

    fn create_extended(&self, name: &str, document: Rc<dyn Document>) -> Result<SurfaceRef> {
        self.inner.create_extended(name, document)
    }
}

/// Builtin registry with every view type wrapped in a counter. Returns the
/// counters by view name.
pub fn counting_registry() -> (ViewTypeRegistry, Vec<(String, Rc<Cell<usize>>)>) {
    let builtin = ViewTypeRegistry::with_builtin();
    let mut registry = ViewTypeRegistry::new();
    let mut counters = Vec::new();
    for view in builtin.ordered() {
        let name = view.name().to_string();
        let (wrapped, counter) = CountingViewType::wrap(view);
        registry.register(wrapped);
        counters.push((name, counter));
    }
    (registry, counters)
}

pub fn count_for(counters: &[(String, Rc<Cell<usize>>)], name: &str) -> usize {
    counters
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, c)| c.get())
        .unwrap_or(0)
}

/// Progress callback that never cancels.
pub fn no_cancel() -> impl FnMut(u64, u64) -> bool {
    |_, _| true
}
