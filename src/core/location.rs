//! Lightweight, comparable view locations.
//!
//! A `ViewLocation` is the cheap, serializable counterpart of a history
//! entry: view type, offset, IL graph type and instruction index, nothing
//! surface-specific.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for "no instruction index".
pub const INVALID_INSTR_INDEX: usize = usize::MAX;

/// Which function graph (disassembly or one of the IL forms) a surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IlViewType {
    /// Plain disassembly
    #[default]
    Normal,
    LowLevelIl,
    LiftedIl,
    LowLevelIlSsa,
    MediumLevelIl,
    MediumLevelIlSsa,
    MappedMediumLevelIl,
    HighLevelIl,
    HighLevelIlSsa,
}

impl IlViewType {
    pub fn as_str(&self) -> &str {
        match self {
            IlViewType::Normal => "normal",
            IlViewType::LowLevelIl => "llil",
            IlViewType::LiftedIl => "lifted",
            IlViewType::LowLevelIlSsa => "llil-ssa",
            IlViewType::MediumLevelIl => "mlil",
            IlViewType::MediumLevelIlSsa => "mlil-ssa",
            IlViewType::MappedMediumLevelIl => "mapped-mlil",
            IlViewType::HighLevelIl => "hlil",
            IlViewType::HighLevelIlSsa => "hlil-ssa",
        }
    }

    /// True for every form other than plain disassembly.
    pub fn is_il(&self) -> bool {
        !matches!(self, IlViewType::Normal)
    }
}

impl fmt::Display for IlViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A displayed position: view type, offset, IL graph type, instruction index.
///
/// Two locations are equal only if every field matches, validity included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewLocation {
    valid: bool,
    view_type: String,
    offset: u64,
    il_view_type: IlViewType,
    instr_index: usize,
}

impl Default for ViewLocation {
    fn default() -> Self {
        Self {
            valid: false,
            view_type: String::new(),
            offset: 0,
            il_view_type: IlViewType::Normal,
            instr_index: INVALID_INSTR_INDEX,
        }
    }
}

impl ViewLocation {
    pub fn new(view_type: impl Into<String>, offset: u64) -> Self {
        Self {
            valid: true,
            view_type: view_type.into(),
            offset,
            ..Self::default()
        }
    }

    pub fn with_il(view_type: impl Into<String>, offset: u64, il_view_type: IlViewType) -> Self {
        Self {
            il_view_type,
            ..Self::new(view_type, offset)
        }
    }

    pub fn with_instruction(
        view_type: impl Into<String>,
        offset: u64,
        il_view_type: IlViewType,
        instr_index: usize,
    ) -> Self {
        Self {
            il_view_type,
            instr_index,
            ..Self::new(view_type, offset)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn view_type(&self) -> &str {
        &self.view_type
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn il_view_type(&self) -> IlViewType {
        self.il_view_type
    }

    pub fn instr_index(&self) -> usize {
        self.instr_index
    }

    pub fn has_instr_index(&self) -> bool {
        self.instr_index != INVALID_INSTR_INDEX
    }

    pub fn set_view_type(&mut self, view_type: impl Into<String>) {
        self.view_type = view_type.into();
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub fn set_il_view_type(&mut self, il_view_type: IlViewType) {
        self.il_view_type = il_view_type;
    }

    pub fn set_instr_index(&mut self, index: usize) {
        self.instr_index = index;
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }

    /// Deserialize from JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        serde_json::from_str(json_str).map_err(|e| e.to_string())
    }
}

impl fmt::Display for ViewLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return write!(f, "<invalid>");
        }
        write!(f, "{}@{:#x}", self.view_type, self.offset)?;
        if self.il_view_type.is_il() {
            write!(f, " [{}]", self.il_view_type)?;
        }
        if self.has_instr_index() {
            write!(f, " #{}", self.instr_index)?;
        }
        Ok(())
    }
}
