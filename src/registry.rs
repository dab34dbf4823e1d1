//! View type descriptors and their registry.
//!
//! A view type is a named factory for one kind of rendering. The registry
//! keeps them in priority order: ascending `priority()` value first, ties
//! broken by registration order. Frames walk this order when a requested
//! type does not apply to a document.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::document::Document;
use crate::error::{NavError, Result};
use crate::surface::{GraphViewType, HexViewType, LinearViewType, SurfaceRef, TypeViewType};

/// Descriptor and factory for one kind of rendering.
pub trait ViewType {
    /// Short unique name, e.g. "linear"
    fn name(&self) -> &str;

    /// Human-readable name
    fn long_name(&self) -> &str {
        self.name()
    }

    /// Lower values are preferred.
    fn priority(&self) -> i32;

    fn applicable(&self, document: &dyn Document) -> bool;

    /// True if this rendering shows a function as a unit (listing, graph).
    fn displays_functions(&self) -> bool {
        false
    }

    fn is_graph(&self) -> bool {
        false
    }

    fn create(&self, document: Rc<dyn Document>, create_dynamic_widgets: bool) -> Result<SurfaceRef>;

    /// Build an auxiliary surface such as an overview.
    fn create_extended(&self, name: &str, _document: Rc<dyn Document>) -> Result<SurfaceRef> {
        Err(NavError::ExtendedViewUnavailable(format!(
            "{}:{}",
            self.name(),
            name
        )))
    }
}

/// Ordered set of view types.
#[derive(Default, Clone)]
pub struct ViewTypeRegistry {
    types: Vec<Rc<dyn ViewType>>,
}

impl ViewTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the linear, graph, hex and type renderings.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Rc::new(LinearViewType));
        registry.register(Rc::new(GraphViewType));
        registry.register(Rc::new(HexViewType));
        registry.register(Rc::new(TypeViewType));
        registry
    }

    /// Add a view type. A type with the same name replaces the old one in
    /// place.
    pub fn register(&mut self, view_type: Rc<dyn ViewType>) {
        debug!(name = view_type.name(), priority = view_type.priority(), "register view type");
        if let Some(slot) = self
            .types
            .iter_mut()
            .find(|t| t.name() == view_type.name())
        {
            *slot = view_type;
            return;
        }
        // Stable position: after every type with priority <= the new one
        let at = self
            .types
            .iter()
            .position(|t| t.priority() > view_type.priority())
            .unwrap_or(self.types.len());
        self.types.insert(at, view_type);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn ViewType>> {
        self.types.iter().find(|t| t.name() == name).cloned()
    }

    /// Every type in priority order.
    pub fn ordered(&self) -> Vec<Rc<dyn ViewType>> {
        self.types.clone()
    }

    /// Priority order with an explicit override list in front. Unknown
    /// names in the override are skipped.
    pub fn ordered_with(&self, overrides: &[String]) -> Vec<Rc<dyn ViewType>> {
        let mut out: Vec<Rc<dyn ViewType>> =
            overrides.iter().filter_map(|name| self.get(name)).collect();
        for t in &self.types {
            if !out.iter().any(|o| o.name() == t.name()) {
                out.push(Rc::clone(t));
            }
        }
        out
    }

    /// Types applicable to `document`, in priority order.
    pub fn applicable(&self, document: &dyn Document) -> Vec<Rc<dyn ViewType>> {
        self.types
            .iter()
            .filter(|t| t.applicable(document))
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for ViewTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}
