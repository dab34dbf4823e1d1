//! Editing collaborators: clipboard, data transforms and integer display.
//!
//! These are external to the navigation core; surfaces receive them as
//! arguments and gate every operation on a capability flag.

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Clipboard payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardData {
    Text(String),
    Binary(Vec<u8>),
}

impl ClipboardData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ClipboardData::Text(text) => text.as_bytes(),
            ClipboardData::Binary(bytes) => bytes,
        }
    }
}

pub trait Clipboard {
    fn set(&mut self, data: ClipboardData);
    fn get(&self) -> Option<ClipboardData>;
}

/// Process-local clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<ClipboardData>,
}

impl Clipboard for MemoryClipboard {
    fn set(&mut self, data: ClipboardData) {
        self.contents = Some(data);
    }

    fn get(&self) -> Option<ClipboardData> {
        self.contents.clone()
    }
}

/// A reversible data transform (encoding, compression, ...).
pub trait Transform {
    fn name(&self) -> &str;
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>>;
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Raw bytes <-> lowercase hex text.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexTransform;

impl Transform for HexTransform {
    fn name(&self) -> &str {
        "RawHex"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(hex::encode(input).into_bytes())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let compact: Vec<u8> = input
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        hex::decode(compact).map_err(|e| NavError::InvalidExpression(e.to_string()))
    }
}

/// How an integer operand is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntegerDisplayType {
    #[default]
    Default,
    Binary,
    SignedOctal,
    UnsignedOctal,
    SignedDecimal,
    UnsignedDecimal,
    SignedHex,
    UnsignedHex,
    Character,
    Pointer,
}
