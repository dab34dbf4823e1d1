//! Core value types for glaurung-nav.
//!
//! These are the leaf types shared by documents, surfaces and the frame:
//! selections, locations, function descriptors, rendered disassembly,
//! references and tags. None of them own or reference a surface.

pub mod basic_block;
pub mod disassembly;
pub mod function;
pub mod location;
pub mod reference;
pub mod selection;
pub mod tag;

pub use basic_block::BasicBlock;
pub use disassembly::{
    disassembly_text, line_has_instruction_token, DisassemblySettings, DisassemblyTextLine,
    DisassemblyToken, RenderedItem, TokenKind,
};
pub use function::{Function, FunctionKind};
pub use location::{IlViewType, ViewLocation, INVALID_INSTR_INDEX};
pub use reference::{CrossReference, ReferenceDirection, ReferenceKind};
pub use selection::{OffsetRange, QualifiedName, XrefSelection};
pub use tag::{Tag, TagType};
