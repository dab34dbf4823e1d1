//! View navigation for a binary-analysis workbench.
//!
//! A `ViewFrame` shows one document through one of several renderings
//! (linear listing, function graph, hex editor, type layout). It picks the
//! rendering for a request, caches one surface per view type, records
//! back/forward history as surface snapshots, and drives the cross-reference
//! and tag cursors, the find engine and the feature map.
//!
//! The crate is single-threaded: surfaces are shared as
//! `Rc<RefCell<dyn RenderingSurface>>` and every frame operation runs to
//! completion on the caller's thread.

/// Frame configuration
pub mod config;
/// Core value types
pub mod core;
/// Document model and the in-memory document
pub mod document;
pub mod error;
/// Address expression parsing
pub mod expression;
/// Data, text and constant search
pub mod find;
/// The view frame controller
pub mod frame;
pub mod logging;
/// View type registry
pub mod registry;
/// Rendering surfaces
pub mod surface;
pub mod tags;
/// Cross-reference index
pub mod xref;

pub use config::{FeatureMapConfig, FindConfig, FrameConfig};
pub use core::{
    CrossReference, Function, IlViewType, OffsetRange, QualifiedName, Tag, ViewLocation,
    XrefSelection,
};
pub use document::{Architecture, Document, MemoryDocument};
pub use error::{NavError, Result};
pub use expression::{AddressPrompt, ExpressionResolver, SimpleResolver};
pub use find::{FindEngine, FindFlags, FindOutcome, FindPattern};
pub use frame::{FileContext, FrameEvent, ViewFrame};
pub use registry::{ViewType, ViewTypeRegistry};
pub use surface::{HistoryEntry, HistoryEntryRef, RenderingSurface, SurfaceRef};
pub use tags::{MemoryTagStore, TagEditor, TagStore};
pub use xref::{CrossReferenceIndex, MemoryXrefIndex};
