//! Cross-reference index consumed by the frame's reference cursor.
//!
//! The frame only ever asks one question: "what references belong to this
//! selection?". `MemoryXrefIndex` answers it from an explicit edge list,
//! which can be filled by hand or derived from a document by scanning the
//! rendered operands of every function for address-valued tokens.

use tracing::debug;

use crate::core::{
    CrossReference, DisassemblySettings, OffsetRange, QualifiedName, ReferenceKind, TokenKind,
    XrefSelection,
};
use crate::document::Document;

/// Read-only reference queries.
pub trait CrossReferenceIndex {
    /// References whose target lies in `range` (callers of the range).
    fn references_to(&self, range: OffsetRange) -> Vec<CrossReference>;

    /// References originating in `range` (targets of the range).
    fn references_from(&self, range: OffsetRange) -> Vec<CrossReference>;

    /// Every use of a type.
    fn type_references(&self, ty: &QualifiedName) -> Vec<CrossReference>;

    /// Uses of the field at byte `offset` of a type.
    fn type_field_references(&self, ty: &QualifiedName, offset: u64) -> Vec<CrossReference>;

    /// Ordered reference list for a selection. An invalid selection has no
    /// references.
    fn references_for(&self, selection: &XrefSelection) -> Vec<CrossReference> {
        let mut refs = match selection {
            XrefSelection::None => Vec::new(),
            XrefSelection::Address(range) => {
                let mut refs = self.references_to(*range);
                refs.extend(self.references_from(*range));
                refs
            }
            XrefSelection::Type(ty) => self.type_references(ty),
            XrefSelection::TypeField { ty, offset } => self.type_field_references(ty, *offset),
        };
        refs.sort();
        refs.dedup();
        refs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    kind: ReferenceKind,
    source: u64,
    target: u64,
    function: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeUse {
    ty: QualifiedName,
    field: u64,
    variable: u64,
    source: u64,
    function: Option<String>,
}

/// In-memory reference index.
#[derive(Debug, Clone, Default)]
pub struct MemoryXrefIndex {
    edges: Vec<Edge>,
    type_uses: Vec<TypeUse>,
}

impl MemoryXrefIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reference(&mut self, kind: ReferenceKind, source: u64, target: u64) {
        self.edges.push(Edge {
            kind,
            source,
            target,
            function: None,
        });
    }

    /// Record that `source` uses field `field` of a variable of type `ty`
    /// located at `variable`.
    pub fn add_type_use(
        &mut self,
        ty: impl Into<QualifiedName>,
        field: u64,
        variable: u64,
        source: u64,
    ) {
        self.type_uses.push(TypeUse {
            ty: ty.into(),
            field,
            variable,
            source,
            function: None,
        });
    }

    pub fn len(&self) -> usize {
        self.edges.len() + self.type_uses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Derive references from every function in `document`.
    ///
    /// Each instruction is rendered and its constant tokens inspected:
    /// branch targets become call/jump/branch edges, in-document immediates
    /// become data references, and immediates that land on a typed data
    /// variable also become type uses. At most `max_xrefs` references are
    /// collected.
    pub fn scan_document(document: &dyn Document, max_xrefs: usize) -> Self {
        let settings = DisassemblySettings::default();
        let mut index = Self::new();

        'functions: for function in document.functions() {
            for block in &function.basic_blocks {
                let mut pos = block.start;
                while pos < block.end {
                    if index.len() >= max_xrefs {
                        break 'functions;
                    }
                    let Some(item) = document.render(pos, &settings) else {
                        break;
                    };
                    for line in item.lines.iter().filter(|l| l.has_instruction_token()) {
                        let mnemonic = line
                            .tokens
                            .iter()
                            .find(|t| t.kind == TokenKind::Instruction)
                            .map(|t| t.text.to_ascii_lowercase())
                            .unwrap_or_default();
                        for token in line.tokens.iter().filter(|t| t.kind.is_address()) {
                            let kind = match token.kind {
                                TokenKind::CodeRelativeAddress => branch_kind(&mnemonic),
                                _ => ReferenceKind::DataRef,
                            };
                            index.edges.push(Edge {
                                kind,
                                source: line.address,
                                target: token.value,
                                function: Some(function.name.clone()),
                            });
                            if let Some((ty, field)) = document.type_at(token.value) {
                                index.type_uses.push(TypeUse {
                                    ty,
                                    field,
                                    variable: token.value - field,
                                    source: line.address,
                                    function: Some(function.name.clone()),
                                });
                            }
                        }
                    }
                    pos = pos.saturating_add(item.length);
                }
            }
        }

        debug!(
            edges = index.edges.len(),
            type_uses = index.type_uses.len(),
            "scanned document references"
        );
        index
    }

    fn type_use_ref(type_use: &TypeUse) -> CrossReference {
        let target = type_use.variable + type_use.field;
        with_function(
            CrossReference::incoming(ReferenceKind::TypeUse, type_use.source, target),
            &type_use.function,
        )
    }
}

fn branch_kind(mnemonic: &str) -> ReferenceKind {
    if mnemonic.starts_with("call") {
        ReferenceKind::Call
    } else if mnemonic == "jmp" {
        ReferenceKind::Jump
    } else {
        ReferenceKind::Branch
    }
}

fn with_function(xref: CrossReference, function: &Option<String>) -> CrossReference {
    match function {
        Some(name) => xref.with_function(name.clone()),
        None => xref,
    }
}

impl CrossReferenceIndex for MemoryXrefIndex {
    fn references_to(&self, range: OffsetRange) -> Vec<CrossReference> {
        self.edges
            .iter()
            .filter(|e| range.contains(e.target))
            .map(|e| with_function(CrossReference::incoming(e.kind, e.source, e.target), &e.function))
            .collect()
    }

    fn references_from(&self, range: OffsetRange) -> Vec<CrossReference> {
        self.edges
            .iter()
            .filter(|e| range.contains(e.source))
            .map(|e| with_function(CrossReference::outgoing(e.kind, e.source, e.target), &e.function))
            .collect()
    }

    fn type_references(&self, ty: &QualifiedName) -> Vec<CrossReference> {
        self.type_uses
            .iter()
            .filter(|u| &u.ty == ty)
            .map(Self::type_use_ref)
            .collect()
    }

    fn type_field_references(&self, ty: &QualifiedName, offset: u64) -> Vec<CrossReference> {
        self.type_uses
            .iter()
            .filter(|u| &u.ty == ty && u.field == offset)
            .map(Self::type_use_ref)
            .collect()
    }
}
