//! The view frame: the controller that decides which rendering is shown.
//!
//! A frame belongs to one `FileContext` (a primary document, optionally
//! other documents of the same file, the view-type registry and the
//! read-only collaborators). It keeps one surface per view type in a cache,
//! switches between them transactionally, and records back/forward history
//! as surface-produced snapshots.
//!
//! View-type names come in two forms. A bare name such as `"graph"` is bound
//! to the primary document; `"graph:ELF"` is bound to the document whose
//! data type is `ELF`. Cache keys always use the canonical form, so
//! `"graph:<primary data type>"` and `"graph"` name the same surface.
//!
//! Every navigation either commits completely or leaves the frame exactly
//! as it was: surface cache, current surface, both history stacks and the
//! cursors are only touched after the target surface has accepted the move.

pub mod cursor;
pub mod deferred;
pub mod feature_map;
pub mod history;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::config::FrameConfig;
use crate::core::{
    disassembly_text, BasicBlock, CrossReference, Function, OffsetRange, Tag, ViewLocation,
};
use crate::document::Document;
use crate::error::{NavError, Result};
use crate::expression::{AddressPrompt, ExpressionResolver};
use crate::find::{FindEngine, FindFlags, FindPattern, Progress};
use crate::registry::{ViewType, ViewTypeRegistry};
use crate::surface::linear::render_range;
use crate::surface::{
    Clipboard, HistoryEntryRef, IntegerDisplayType, RenderingSurface, SurfaceRef, Transform,
};
use crate::tags::{TagEditor, TagStore};
use crate::xref::CrossReferenceIndex;

pub use cursor::Cursor;
pub use deferred::{DeferredQueue, DeferredTask, FrameEvent};
pub use feature_map::{FeatureBin, FeatureMap};
pub use history::History;

/// Documents and collaborators shared by the frames of one open file.
#[derive(Clone)]
pub struct FileContext {
    documents: Vec<Rc<dyn Document>>,
    registry: ViewTypeRegistry,
    xrefs: Option<Rc<dyn CrossReferenceIndex>>,
    tags: Option<Rc<dyn TagStore>>,
    tag_editor: Option<Rc<dyn TagEditor>>,
}

impl FileContext {
    pub fn new(primary: Rc<dyn Document>, registry: ViewTypeRegistry) -> Self {
        Self {
            documents: vec![primary],
            registry,
            xrefs: None,
            tags: None,
            tag_editor: None,
        }
    }

    /// Add a secondary document. A document with the same data type as an
    /// existing one replaces it, except for the primary.
    pub fn with_document(mut self, document: Rc<dyn Document>) -> Self {
        let existing = self
            .documents
            .iter()
            .skip(1)
            .position(|d| d.data_type() == document.data_type());
        match existing {
            Some(i) => self.documents[i + 1] = document,
            None if self.documents[0].data_type() != document.data_type() => {
                self.documents.push(document)
            }
            None => {}
        }
        self
    }

    pub fn with_xref_index(mut self, index: Rc<dyn CrossReferenceIndex>) -> Self {
        self.xrefs = Some(index);
        self
    }

    pub fn with_tag_store(mut self, store: Rc<dyn TagStore>) -> Self {
        self.tags = Some(store);
        self
    }

    pub fn with_tag_editor(mut self, editor: Rc<dyn TagEditor>) -> Self {
        self.tag_editor = Some(editor);
        self
    }

    pub fn primary(&self) -> Rc<dyn Document> {
        Rc::clone(&self.documents[0])
    }

    pub fn document(&self, data_type: &str) -> Option<Rc<dyn Document>> {
        self.documents
            .iter()
            .find(|d| d.data_type() == data_type)
            .cloned()
    }

    pub fn documents(&self) -> &[Rc<dyn Document>] {
        &self.documents
    }

    pub fn registry(&self) -> &ViewTypeRegistry {
        &self.registry
    }
}

/// A resolved navigation target: the view type, its document and the
/// canonical cache key.
struct Target {
    key: String,
    view: Rc<dyn ViewType>,
    document: Rc<dyn Document>,
}

/// Direction of a history replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    Back,
    Forward,
}

/// Controller owning the current surface, the surface caches and history.
pub struct ViewFrame {
    context: FileContext,
    config: FrameConfig,
    find_engine: FindEngine,
    current: Option<(String, SurfaceRef)>,
    cache: BTreeMap<String, SurfaceRef>,
    extended: HashMap<(String, String), Weak<RefCell<dyn RenderingSurface>>>,
    history: History,
    xrefs: Cursor<CrossReference>,
    pinned_xrefs: Vec<CrossReference>,
    tags: Cursor<Tag>,
    current_function: Option<Function>,
    current_block: Option<BasicBlock>,
    feature_map: Option<FeatureMap>,
    deferred: DeferredQueue,
    events: Vec<FrameEvent>,
}

impl ViewFrame {
    pub fn new(context: FileContext, config: FrameConfig) -> Result<Self> {
        config.validate()?;
        info!(
            data_type = context.primary().data_type(),
            view_types = ?context.registry().names(),
            "view frame created"
        );
        Ok(Self {
            find_engine: FindEngine::new(config.find.clone()),
            history: History::new(config.max_history),
            context,
            config,
            current: None,
            cache: BTreeMap::new(),
            extended: HashMap::new(),
            xrefs: Cursor::default(),
            pinned_xrefs: Vec::new(),
            tags: Cursor::default(),
            current_function: None,
            current_block: None,
            feature_map: None,
            deferred: DeferredQueue::new(),
            events: Vec::new(),
        })
    }

    pub fn context(&self) -> &FileContext {
        &self.context
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    // ----- view-type names -----

    /// Split `"view:dataType"` into its parts.
    fn split_type(name: &str) -> (&str, Option<&str>) {
        match name.split_once(':') {
            Some((view, data_type)) => (view, Some(data_type)),
            None => (name, None),
        }
    }

    /// Canonical cache key for a view bound to `document`.
    fn qualify(&self, view: &str, document: &dyn Document) -> String {
        if document.data_type() == self.context.primary().data_type() {
            view.to_string()
        } else {
            format!("{}:{}", view, document.data_type())
        }
    }

    /// Data type a (possibly qualified) view-type name is bound to.
    pub fn get_data_type_for_view(&self, view_type: &str) -> String {
        match Self::split_type(view_type) {
            (_, Some(data_type)) => data_type.to_string(),
            (_, None) => self.context.primary().data_type().to_string(),
        }
    }

    fn document_for_type(&self, view_type: &str) -> Result<Rc<dyn Document>> {
        match Self::split_type(view_type) {
            (_, None) => Ok(self.context.primary()),
            (_, Some(data_type)) => self
                .context
                .document(data_type)
                .ok_or_else(|| NavError::UnsupportedViewType(view_type.to_string())),
        }
    }

    fn priority_order(&self) -> Vec<Rc<dyn ViewType>> {
        self.context
            .registry()
            .ordered_with(&self.config.view_type_priority)
    }

    /// Resolve a requested view kind against `document`: the requested kind
    /// if it applies, otherwise the first applicable kind in priority order.
    fn resolve_for(&self, view: &str, document: Rc<dyn Document>) -> Result<Target> {
        let requested = if view.is_empty() {
            None
        } else {
            self.context.registry().get(view)
        };
        let chosen = match requested {
            Some(t) if t.applicable(document.as_ref()) => Some(t),
            _ => self
                .priority_order()
                .into_iter()
                .find(|t| t.applicable(document.as_ref())),
        };
        let Some(view) = chosen else {
            return Err(NavError::UnsupportedViewType(format!(
                "{} (no applicable view for {})",
                view,
                document.data_type()
            )));
        };
        Ok(Target {
            key: self.qualify(view.name(), document.as_ref()),
            view,
            document,
        })
    }

    /// Resolve a frame-level type name. Empty means "keep the current type".
    fn resolve(&self, view_type: &str) -> Result<Target> {
        let requested = if view_type.is_empty() {
            self.current_view_type().unwrap_or_default()
        } else {
            view_type.to_string()
        };
        let (view, _) = Self::split_type(&requested);
        let document = self.document_for_type(&requested)?;
        self.resolve_for(view, document)
    }

    /// Resolve without falling back: the named kind must apply.
    fn resolve_exact(&self, view_type: &str) -> Result<Target> {
        let target = self.resolve(view_type)?;
        let (view, _) = Self::split_type(view_type);
        if target.view.name() != view {
            return Err(NavError::UnsupportedViewType(view_type.to_string()));
        }
        Ok(target)
    }

    /// View types applicable to some document of the context, qualified.
    pub fn get_available_types(&self) -> Vec<String> {
        let mut out = Vec::new();
        for document in self.context.documents() {
            for view in self.priority_order() {
                if view.applicable(document.as_ref()) {
                    out.push(self.qualify(view.name(), document.as_ref()));
                }
            }
        }
        out
    }

    // ----- surface cache -----

    /// Cached surface for `target`, or a new one. The flag is true when the
    /// surface was just built and is not yet in the cache.
    fn acquire(&self, target: &Target) -> Result<(SurfaceRef, bool)> {
        if let Some(surface) = self.cache.get(&target.key) {
            debug!(view_type = %target.key, "surface cache hit");
            return Ok((Rc::clone(surface), false));
        }
        debug!(view_type = %target.key, "surface cache miss");
        let surface = target
            .view
            .create(Rc::clone(&target.document), self.config.create_dynamic_widgets)
            .map_err(|e| {
                warn!(view_type = %target.key, error = %e, "view factory failed");
                NavError::UnsupportedViewType(target.key.clone())
            })?;
        Ok((surface, true))
    }

    /// Make `surface` current under `key`, hiding the previous one.
    fn show(&mut self, key: String, surface: SurfaceRef) {
        let switching = match &self.current {
            Some((_, previous)) => !Rc::ptr_eq(previous, &surface),
            None => true,
        };
        if switching {
            if let Some((_, previous)) = &self.current {
                previous.borrow_mut().hidden();
            }
            surface.borrow_mut().shown();
        }
        let offset = surface.borrow().current_offset();
        self.events.push(FrameEvent::ViewChanged {
            view_type: key.clone(),
            offset,
        });
        self.current = Some((key, surface));
    }

    fn snapshot_current(&self) -> Option<HistoryEntryRef> {
        let (key, surface) = self.current.as_ref()?;
        let entry = surface.borrow().produce_history_entry();
        entry.set_view_type(key);
        Some(entry)
    }

    /// Resolve-acquire-navigate-commit. `action` moves the target surface;
    /// nothing in the frame changes unless it returns true.
    fn switch_to(
        &mut self,
        target: Target,
        update_info: bool,
        add_history: bool,
        action: impl FnOnce(&mut dyn RenderingSurface) -> bool,
    ) -> Result<()> {
        let span = crate::span_trace!("switch_to", view_type = %target.key);
        let _guard = span.enter();
        let (surface, created) = self.acquire(&target)?;
        let previous = if add_history {
            self.snapshot_current()
        } else {
            None
        };

        let accepted = action(&mut *surface.borrow_mut());
        if !accepted {
            let offset = surface.borrow().current_offset();
            warn!(view_type = %target.key, "navigation rejected");
            return Err(NavError::NavigationRejected {
                view_type: target.key,
                offset,
            });
        }

        if created {
            self.cache.insert(target.key.clone(), Rc::clone(&surface));
        }
        if let Some(entry) = previous {
            self.history.push_back(entry);
        }
        self.history.clear_forward();
        self.show(target.key, surface);

        if update_info {
            self.update_info();
        } else {
            self.refresh_function_context();
        }
        Ok(())
    }

    // ----- navigation -----

    /// Navigate to `offset` in `view_type` (empty keeps the current type).
    pub fn navigate(
        &mut self,
        view_type: &str,
        offset: u64,
        update_info: bool,
        add_history: bool,
    ) -> Result<()> {
        debug!(view_type, offset, "navigate");
        let target = self.resolve(view_type)?;
        let result = self.switch_to(target, update_info, add_history, |s| s.navigate(offset));
        match result {
            Err(NavError::NavigationRejected { view_type, .. }) => {
                Err(NavError::NavigationRejected { view_type, offset })
            }
            other => other,
        }
    }

    /// Navigate within another document of the context, keeping the current
    /// view kind when it applies there.
    pub fn navigate_document(
        &mut self,
        document: &Rc<dyn Document>,
        offset: u64,
        update_info: bool,
        add_history: bool,
    ) -> Result<()> {
        let document = self
            .context
            .document(document.data_type())
            .ok_or_else(|| NavError::UnsupportedViewType(document.data_type().to_string()))?;
        let view = self
            .current_view_type()
            .map(|t| Self::split_type(&t).0.to_string())
            .unwrap_or_default();
        let target = self.resolve_for(&view, document)?;
        self.switch_to(target, update_info, add_history, |s| s.navigate(offset))
    }

    /// Navigate with a caller-supplied handler deciding the surface state.
    pub fn navigate_with(
        &mut self,
        view_type: &str,
        handler: impl FnOnce(&mut dyn RenderingSurface) -> bool,
        update_info: bool,
        add_history: bool,
    ) -> Result<()> {
        let target = self.resolve(view_type)?;
        self.switch_to(target, update_info, add_history, handler)
    }

    /// View type to use for function-level navigation: a function-capable
    /// type, preferring a graph when the frame is set to.
    fn function_target(&self) -> Result<Target> {
        let document = match &self.current {
            Some((key, _)) => self.document_for_type(key)?,
            None => self.context.primary(),
        };
        let candidates: Vec<Rc<dyn ViewType>> = self
            .priority_order()
            .into_iter()
            .filter(|t| t.displays_functions() && t.applicable(document.as_ref()))
            .collect();
        let current_view = self
            .current_view_type()
            .map(|t| Self::split_type(&t).0.to_string());

        let chosen = if self.config.graph_view_preferred {
            candidates
                .iter()
                .find(|t| t.is_graph())
                .or_else(|| candidates.first())
        } else {
            candidates
                .iter()
                .find(|t| Some(t.name()) == current_view.as_deref())
                .or_else(|| candidates.iter().find(|t| !t.is_graph()))
                .or_else(|| candidates.first())
        };
        match chosen {
            Some(view) => self.resolve_for(view.name(), document),
            None => self.resolve_for("", document),
        }
    }

    pub fn navigate_to_function(&mut self, function: &Function, offset: u64) -> Result<()> {
        let target = self.function_target()?;
        self.switch_to(target, true, true, |s| s.navigate_to_function(function, offset))
    }

    pub fn go_to_reference(
        &mut self,
        function: Option<&Function>,
        source: u64,
        target_offset: u64,
    ) -> Result<()> {
        let target = self.function_target()?;
        self.switch_to(target, true, true, |s| {
            s.go_to_reference(function, source, target_offset)
        })
    }

    /// Navigate to instruction `index` of `function`.
    pub fn navigate_to_function_index(&mut self, function: &Function, index: usize) -> Result<()> {
        let target = self.function_target()?;
        self.switch_to(target, true, true, |s| {
            s.navigate_to_function_index(function, index)
        })
    }

    pub fn set_graph_view_preferred(&mut self, preferred: bool) {
        self.config.graph_view_preferred = preferred;
    }

    pub fn is_graph_view_preferred(&self) -> bool {
        self.config.graph_view_preferred
    }

    // ----- history -----

    fn replay(&mut self, direction: Replay) -> Result<bool> {
        let popped = match direction {
            Replay::Back => self.history.pop_back(),
            Replay::Forward => self.history.pop_forward(),
        };
        let Some(entry) = popped else {
            return Ok(false);
        };
        let put_back = |history: &mut History, entry: HistoryEntryRef| match direction {
            Replay::Back => history.push_back(entry),
            Replay::Forward => history.push_forward(entry),
        };

        let view_type = entry.view_type();
        let acquired = self
            .resolve(&view_type)
            .and_then(|target| self.acquire(&target).map(|(s, created)| (target, s, created)));
        let (target, surface, created) = match acquired {
            Ok(found) => found,
            Err(e) => {
                put_back(&mut self.history, entry);
                return Err(crate::log_error!(e, "history replay"));
            }
        };

        let current_entry = self.snapshot_current();
        let restored = surface.borrow_mut().restore_history_entry(&entry);
        if !restored {
            warn!(view_type = %view_type, offset = entry.offset(), "history restore rejected");
            put_back(&mut self.history, Rc::clone(&entry));
            return Err(NavError::NavigationRejected {
                view_type,
                offset: entry.offset(),
            });
        }

        if created {
            self.cache.insert(target.key.clone(), Rc::clone(&surface));
        }
        if let Some(current_entry) = current_entry {
            match direction {
                Replay::Back => self.history.push_forward(current_entry),
                Replay::Forward => self.history.push_back(current_entry),
            }
        }
        debug!(?direction, view_type = %target.key, offset = entry.offset(), "history replay");
        self.show(target.key, surface);
        self.update_info();
        Ok(true)
    }

    /// Step back. `Ok(false)` when there is nothing to go back to.
    pub fn back(&mut self) -> Result<bool> {
        self.replay(Replay::Back)
    }

    /// Step forward. `Ok(false)` when there is nothing to go forward to.
    pub fn forward(&mut self) -> Result<bool> {
        self.replay(Replay::Forward)
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ----- location -----

    pub fn get_current_view(&self) -> Option<SurfaceRef> {
        self.current.as_ref().map(|(_, s)| Rc::clone(s))
    }

    /// Canonical name of the displayed view type.
    pub fn current_view_type(&self) -> Option<String> {
        self.current.as_ref().map(|(key, _)| key.clone())
    }

    pub fn current_offset(&self) -> Option<u64> {
        self.current
            .as_ref()
            .map(|(_, s)| s.borrow().current_offset())
    }

    pub fn get_view_location(&self) -> ViewLocation {
        match &self.current {
            Some((key, surface)) => {
                let s = surface.borrow();
                ViewLocation::with_instruction(
                    key.clone(),
                    s.current_offset(),
                    s.il_view_type(),
                    s.current_il_instruction_index(),
                )
            }
            None => ViewLocation::default(),
        }
    }

    /// Reproduce `location`. Fails without touching the frame when the
    /// location is invalid, its type is unavailable, or the surface cannot
    /// show the exact IL mode and instruction index it names.
    pub fn set_view_location(&mut self, location: &ViewLocation) -> Result<()> {
        if !location.is_valid() {
            return Err(NavError::UnsupportedViewType("<invalid location>".into()));
        }
        if *location == self.get_view_location() {
            return Ok(());
        }
        let target = self.resolve_exact(location.view_type())?;
        let location = location.clone();
        self.switch_to(target, true, true, move |s| {
            let saved = s.produce_history_entry();
            s.set_il_view_type(location.il_view_type());
            let by_index = if location.has_instr_index() {
                s.document()
                    .functions_containing(location.offset())
                    .into_iter()
                    .find(|f| f.instruction_address(location.instr_index()) == Some(location.offset()))
            } else {
                None
            };
            let accepted = match by_index {
                Some(function) => s.navigate_to_function_index(&function, location.instr_index()),
                None => s.navigate(location.offset()),
            };
            let reproduced = accepted
                && s.il_view_type() == location.il_view_type()
                && (!location.has_instr_index()
                    || s.current_il_instruction_index() == location.instr_index());
            if !reproduced {
                if accepted {
                    debug!(location = %location.view_type(), offset = location.offset(), "location not reproduced");
                    s.restore_history_entry(&saved);
                }
                s.set_il_view_type(saved.il_view_type());
            }
            reproduced
        })
    }

    // ----- function context -----

    fn refresh_function_context(&mut self) {
        let Some((_, surface)) = &self.current else {
            self.current_function = None;
            self.current_block = None;
            return;
        };
        let (function, offset) = {
            let s = surface.borrow();
            (s.current_function(), s.current_offset())
        };
        self.current_block = function.as_ref().and_then(|f| f.block_at(offset).cloned());
        self.current_function = function;
    }

    pub fn set_current_function(&mut self, function: Option<Function>) {
        let offset = self.current_offset().unwrap_or_default();
        self.current_block = function.as_ref().and_then(|f| f.block_at(offset).cloned());
        self.current_function = function;
    }

    pub fn current_function(&self) -> Option<&Function> {
        self.current_function.as_ref()
    }

    pub fn current_basic_block(&self) -> Option<&BasicBlock> {
        self.current_block.as_ref()
    }

    // ----- cross references and tags -----

    /// Recompute function context, the cross-reference list and the tag list.
    pub fn update_info(&mut self) {
        self.refresh_function_context();
        self.refresh_cross_references();
        self.refresh_tags();
    }

    pub fn refresh_cross_references(&mut self) {
        let references = match (&self.current, &self.context.xrefs) {
            (Some((_, surface)), Some(index)) => {
                let selection = surface.borrow().selection_for_xref();
                index.references_for(&selection)
            }
            _ => Vec::new(),
        };
        debug!(count = references.len(), "cross references updated");
        self.xrefs.reset(references);
    }

    pub fn refresh_tags(&mut self) {
        let tags = self
            .context
            .tags
            .as_ref()
            .map(|store| store.sorted_tags())
            .unwrap_or_default();
        self.tags.reset(tags);
    }

    pub fn cross_references(&self) -> &[CrossReference] {
        self.xrefs.items()
    }

    pub fn cross_reference_index(&self) -> Option<usize> {
        self.xrefs.index()
    }

    /// Keep a copy of the current cross-reference list.
    pub fn pin_cross_references(&mut self) {
        self.pinned_xrefs = self.xrefs.items().to_vec();
    }

    pub fn pinned_cross_references(&self) -> &[CrossReference] {
        &self.pinned_xrefs
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.items()
    }

    pub fn tag_index(&self) -> Option<usize> {
        self.tags.index()
    }

    /// Move to `offset` on behalf of a cursor: history is recorded, the
    /// lists themselves are left alone.
    fn navigate_cursor(&mut self, offset: u64) -> Result<()> {
        self.navigate("", offset, false, true)
    }

    fn step_xref(&mut self, forward: bool) -> Result<bool> {
        let saved = self.xrefs.index();
        let next = if forward {
            self.xrefs.next()
        } else {
            self.xrefs.prev()
        };
        let Some(offset) = next.map(CrossReference::navigation_offset) else {
            return Ok(false);
        };
        if let Err(e) = self.navigate_cursor(offset) {
            self.xrefs.set_index(saved);
            return Err(e);
        }
        Ok(true)
    }

    fn step_tag(&mut self, forward: bool) -> Result<bool> {
        let saved = self.tags.index();
        let next = if forward {
            self.tags.next()
        } else {
            self.tags.prev()
        };
        let Some(offset) = next.map(|t| t.address) else {
            return Ok(false);
        };
        if let Err(e) = self.navigate_cursor(offset) {
            self.tags.set_index(saved);
            return Err(e);
        }
        Ok(true)
    }

    /// Go to the next cross reference, wrapping around. `Ok(false)` on an
    /// empty list.
    pub fn next_cross_reference(&mut self) -> Result<bool> {
        self.step_xref(true)
    }

    pub fn prev_cross_reference(&mut self) -> Result<bool> {
        self.step_xref(false)
    }

    pub fn next_tag(&mut self) -> Result<bool> {
        self.step_tag(true)
    }

    pub fn prev_tag(&mut self) -> Result<bool> {
        self.step_tag(false)
    }

    /// Hand `tag` to the tag editor. Navigation state is not touched.
    pub fn edit_tag(&self, tag: &Tag) -> bool {
        match &self.context.tag_editor {
            Some(editor) => editor.edit_tag(tag),
            None => false,
        }
    }

    // ----- extended views -----

    /// Auxiliary surface `name` of the current view type. The frame only
    /// holds a weak reference; a dropped surface counts as absent.
    pub fn get_extended_view(&mut self, name: &str, create: bool) -> Result<Option<SurfaceRef>> {
        let Some((key, surface)) = &self.current else {
            return Err(NavError::ExtendedViewUnavailable(name.to_string()));
        };
        let slot = (key.clone(), name.to_string());
        if let Some(existing) = self.extended.get(&slot).and_then(Weak::upgrade) {
            return Ok(Some(existing));
        }
        self.extended.remove(&slot);
        if !create {
            return Ok(None);
        }

        let (view, _) = Self::split_type(key);
        let view_type = self
            .context
            .registry()
            .get(view)
            .ok_or_else(|| NavError::ExtendedViewUnavailable(format!("{}:{}", key, name)))?;
        let document = surface.borrow().document();
        let created = view_type.create_extended(name, document)?;
        debug!(view_type = %key, name, "extended view created");
        self.extended.insert(slot, Rc::downgrade(&created));
        Ok(Some(created))
    }

    // ----- find -----

    /// Search the current document. `None` covers both "no match" and a
    /// cancelled scan.
    pub fn find(
        &self,
        pattern: &FindPattern,
        start: u64,
        end: u64,
        flags: FindFlags,
        progress: &mut Progress<'_>,
    ) -> Option<u64> {
        let (_, surface) = self.current.as_ref()?;
        let s = surface.borrow();
        s.find(&self.find_engine, pattern, start, end, flags, progress)
    }

    /// Find the next match after the current offset and go there.
    pub fn find_next(
        &mut self,
        pattern: &FindPattern,
        flags: FindFlags,
        progress: &mut Progress<'_>,
    ) -> Result<Option<u64>> {
        let Some(offset) = self.current_offset() else {
            return Ok(None);
        };
        let end = match &self.current {
            Some((_, s)) => s.borrow().document().end(),
            None => return Ok(None),
        };
        match self.find(pattern, offset.saturating_add(1), end, flags, progress) {
            Some(found) => {
                self.navigate("", found, true, true)?;
                Ok(Some(found))
            }
            None => Ok(None),
        }
    }

    pub fn find_engine(&self) -> &FindEngine {
        &self.find_engine
    }

    // ----- address entry -----

    /// Resolve expression text against the current document.
    pub fn address_from_string(&self, resolver: &dyn ExpressionResolver, text: &str) -> Result<u64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NavError::InvalidExpression("empty expression".into()));
        }
        let document = match &self.current {
            Some((_, s)) => s.borrow().document(),
            None => self.context.primary(),
        };
        let here = self.current_offset().unwrap_or_else(|| document.start());
        resolver.resolve(document.as_ref(), text, here)
    }

    /// Ask `prompt` for an address. `Ok(None)` when the user cancels or
    /// enters nothing.
    pub fn address_from_input(
        &self,
        prompt: &mut dyn AddressPrompt,
        resolver: &dyn ExpressionResolver,
    ) -> Result<Option<u64>> {
        let default = self
            .current_offset()
            .map(|o| format!("{:#x}", o))
            .unwrap_or_default();
        match prompt.prompt("Go to Address", &default) {
            Some(text) if !text.trim().is_empty() => {
                self.address_from_string(resolver, &text).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Prompt for an address and navigate there. `Ok(false)` if cancelled.
    pub fn go_to_address(
        &mut self,
        prompt: &mut dyn AddressPrompt,
        resolver: &dyn ExpressionResolver,
    ) -> Result<bool> {
        match self.address_from_input(prompt, resolver)? {
            Some(offset) => {
                self.navigate("", offset, true, true)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ----- rendering helpers -----

    /// Plain text of the current surface's rendering of `range`.
    pub fn get_disassembly_text(&self, range: OffsetRange) -> String {
        match &self.current {
            Some((_, surface)) => {
                let s = surface.borrow();
                disassembly_text(&render_range(
                    s.document().as_ref(),
                    range,
                    &s.disassembly_settings(),
                ))
            }
            None => String::new(),
        }
    }

    // ----- editing -----

    fn can(&self, f: impl FnOnce(&dyn RenderingSurface) -> bool) -> bool {
        match &self.current {
            Some((_, surface)) => f(&*surface.borrow()),
            None => false,
        }
    }

    /// Run `op` on the current surface if `allowed` says so. Reports whether
    /// it ran.
    fn run_edit(
        &mut self,
        allowed: impl FnOnce(&dyn RenderingSurface) -> bool,
        op: impl FnOnce(&mut dyn RenderingSurface),
    ) -> bool {
        let Some((_, surface)) = &self.current else {
            return false;
        };
        let mut s = surface.borrow_mut();
        if !allowed(&*s) {
            return false;
        }
        op(&mut *s);
        true
    }

    pub fn can_assemble(&self) -> bool {
        self.can(|s| s.can_assemble())
    }

    pub fn can_compile(&self) -> bool {
        self.can(|s| s.can_compile())
    }

    pub fn can_undo(&self) -> bool {
        self.can(|s| s.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.can(|s| s.can_redo())
    }

    pub fn can_cut(&self) -> bool {
        self.can(|s| s.can_cut())
    }

    pub fn can_copy(&self) -> bool {
        self.can(|s| s.can_copy())
    }

    pub fn can_copy_address(&self) -> bool {
        self.can(|s| s.can_copy_address())
    }

    pub fn can_paste(&self) -> bool {
        self.can(|s| s.can_paste())
    }

    pub fn can_transform(&self) -> bool {
        self.can(|s| s.can_transform())
    }

    pub fn can_display_as(&self, display: IntegerDisplayType) -> bool {
        self.can(|s| s.can_display_as(display))
    }

    pub fn undo(&mut self) -> bool {
        self.run_edit(|s| s.can_undo(), |s| s.undo())
    }

    pub fn redo(&mut self) -> bool {
        self.run_edit(|s| s.can_redo(), |s| s.redo())
    }

    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        self.run_edit(|s| s.can_cut(), |s| s.cut(clipboard))
    }

    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, transform: Option<&dyn Transform>) -> bool {
        let with_transform = transform.is_some();
        self.run_edit(
            |s| {
                if with_transform {
                    s.can_copy_with_transform()
                } else {
                    s.can_copy()
                }
            },
            |s| s.copy(clipboard, transform),
        )
    }

    pub fn copy_address(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        self.run_edit(|s| s.can_copy_address(), |s| s.copy_address(clipboard))
    }

    pub fn paste(&mut self, clipboard: &dyn Clipboard, transform: Option<&dyn Transform>) -> bool {
        let with_transform = transform.is_some();
        self.run_edit(
            |s| {
                if with_transform {
                    s.can_paste_with_transform()
                } else {
                    s.can_paste()
                }
            },
            |s| s.paste(clipboard, transform),
        )
    }

    pub fn transform(&mut self, transform: &dyn Transform, encode: bool) -> bool {
        self.run_edit(|s| s.can_transform(), |s| s.transform(transform, encode))
    }

    /// Write raw bytes at the current offset. Only surfaces that can paste
    /// accept writes.
    pub fn write_data(&mut self, data: &[u8]) -> bool {
        self.run_edit(|s| s.can_paste(), |s| s.write_data(data))
    }

    pub fn display_as(&mut self, display: IntegerDisplayType) -> bool {
        self.run_edit(|s| s.can_display_as(display), |s| s.display_as(display))
    }

    // ----- feature map -----

    fn current_document(&self) -> Rc<dyn Document> {
        match &self.current {
            Some((_, s)) => s.borrow().document(),
            None => self.context.primary(),
        }
    }

    /// Build the feature map if it does not exist yet.
    pub fn create_feature_map(&mut self) -> &FeatureMap {
        let document = self.current_document();
        let config = &self.config.feature_map;
        self.feature_map
            .get_or_insert_with(|| FeatureMap::build(document.as_ref(), config))
    }

    /// Rebuild an existing feature map from current document contents.
    pub fn refresh_feature_map(&mut self) {
        if self.feature_map.is_some() {
            let document = self.current_document();
            self.feature_map = Some(FeatureMap::build(document.as_ref(), &self.config.feature_map));
        }
    }

    pub fn feature_map(&self) -> Option<&FeatureMap> {
        self.feature_map.as_ref()
    }

    /// Request the feature map to be torn down (and rebuilt if `recreate`)
    /// at the next `process_deferred`.
    pub fn close_feature_map(&mut self, recreate: bool) {
        self.deferred
            .schedule(DeferredTask::CloseFeatureMap { recreate });
    }

    pub fn has_deferred_work(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Run postponed work. Call from the host's event loop at a point where
    /// no frame operation is on the stack.
    pub fn process_deferred(&mut self) {
        for task in self.deferred.drain() {
            match task {
                DeferredTask::CloseFeatureMap { recreate } => {
                    self.feature_map = None;
                    if recreate {
                        self.create_feature_map();
                    }
                    debug!(recreate, "feature map closed");
                    self.events
                        .push(FrameEvent::FeatureMapClosed { recreated: recreate });
                }
            }
        }
    }

    /// Navigate to the start of feature-map bin `index`.
    pub fn navigate_to_feature(&mut self, index: usize) -> Result<()> {
        let offset = self
            .feature_map
            .as_ref()
            .and_then(|m| m.offset_for_bin(index))
            .ok_or_else(|| NavError::NavigationRejected {
                view_type: "feature map".into(),
                offset: index as u64,
            })?;
        self.navigate("", offset, true, true)
    }

    // ----- events and lifecycle -----

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Cached view types, canonical names.
    pub fn cached_view_types(&self) -> Vec<String> {
        self.cache.keys().cloned().collect()
    }

    /// Ask every cached surface whether the frame may close.
    pub fn close_request(&mut self) -> bool {
        self.cache
            .values()
            .all(|surface| surface.borrow_mut().close_request())
    }

    /// Notify every cached surface and drop all frame state.
    pub fn closing(&mut self) {
        for surface in self.cache.values() {
            surface.borrow_mut().closing();
        }
        info!(surfaces = self.cache.len(), "view frame closing");
        self.current = None;
        self.cache.clear();
        self.extended.clear();
        self.history.clear();
        self.xrefs.reset(Vec::new());
        self.tags.reset(Vec::new());
        self.pinned_xrefs.clear();
        self.current_function = None;
        self.current_block = None;
        self.feature_map = None;
        self.deferred.drain();
    }
}

impl std::fmt::Debug for ViewFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewFrame")
            .field("current", &self.current_view_type())
            .field("cached", &self.cached_view_types())
            .field("back", &self.history.back_entries().len())
            .field("forward", &self.history.forward_entries().len())
            .finish()
    }
}
