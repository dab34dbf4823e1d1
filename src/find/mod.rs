//! In-document search: raw data, rendered text and constant operands.
//!
//! All three searches scan `[start, end)` forward and stop at the first hit.
//! Progress is reported through a caller-supplied callback; returning
//! `false` from it stops the scan. Internally the engine distinguishes a
//! cancelled scan from an exhausted one (`FindOutcome`), but the surface
//! contract only exposes `Option<u64>`, where `None` covers both.

pub mod data;
pub mod text;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::FindConfig;
use crate::core::DisassemblySettings;
use crate::document::Document;
use crate::error::{NavError, Result};

bitflags! {
    /// Matching options shared by data and text search.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FindFlags: u32 {
        /// ASCII case-insensitive matching
        const CASE_INSENSITIVE = 0b0001;
        /// Ignore whitespace in both pattern and rendered text (text search only)
        const IGNORE_WHITESPACE = 0b0010;
    }
}

/// Progress callback: `(current, total) -> keep going`.
pub type Progress<'a> = dyn FnMut(u64, u64) -> bool + 'a;

/// Which kind of search a pattern requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindKind {
    Data,
    Text,
    Constant,
}

/// A search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindPattern {
    /// Byte-for-byte match against document bytes
    Data(Vec<u8>),
    /// Literal substring of rendered disassembly text
    Text(String),
    /// Numeric value of an operand or constant token
    Constant(u64),
}

impl FindPattern {
    pub fn kind(&self) -> FindKind {
        match self {
            FindPattern::Data(_) => FindKind::Data,
            FindPattern::Text(_) => FindKind::Text,
            FindPattern::Constant(_) => FindKind::Constant,
        }
    }

    /// Parse a hex byte string such as `"90 90 c3"` into a data pattern.
    pub fn from_hex(text: &str) -> Result<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(&compact)
            .map(FindPattern::Data)
            .map_err(|e| NavError::InvalidExpression(format!("bad hex pattern: {}", e)))
    }

    /// Parse an escaped string (`\xNN`, `\n`, `\t`, `\\`, `\0`) into a data pattern.
    pub fn from_escaped(text: &str) -> Result<Self> {
        let mut out = Vec::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                continue;
            }
            match chars.next() {
                Some('n') => out.push(b'\n'),
                Some('r') => out.push(b'\r'),
                Some('t') => out.push(b'\t'),
                Some('0') => out.push(0),
                Some('\\') => out.push(b'\\'),
                Some('x') => {
                    let digits: String = chars.by_ref().take(2).collect();
                    let byte = u8::from_str_radix(&digits, 16).map_err(|_| {
                        NavError::InvalidExpression(format!("bad escape \\x{}", digits))
                    })?;
                    out.push(byte);
                }
                Some(other) => {
                    return Err(NavError::InvalidExpression(format!(
                        "unknown escape \\{}",
                        other
                    )))
                }
                None => {
                    return Err(NavError::InvalidExpression(
                        "trailing backslash".to_string(),
                    ))
                }
            }
        }
        Ok(FindPattern::Data(out))
    }
}

/// Result of a scan, keeping cancellation distinct from exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    Found(u64),
    NotFound,
    Cancelled,
}

impl FindOutcome {
    /// Offset of the hit, if any. Cancelled and exhausted both give `None`.
    pub fn address(&self) -> Option<u64> {
        match self {
            FindOutcome::Found(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FindOutcome::Cancelled)
    }

    /// Strict form for callers that want cancellation as an error.
    pub fn into_result(self) -> Result<Option<u64>> {
        match self {
            FindOutcome::Found(addr) => Ok(Some(addr)),
            FindOutcome::NotFound => Ok(None),
            FindOutcome::Cancelled => Err(NavError::SearchCancelled),
        }
    }
}

/// Clamp `[start, end)` to the document, returning `None` if empty.
pub(crate) fn clamp_range(document: &dyn Document, start: u64, end: u64) -> Option<(u64, u64)> {
    let start = start.max(document.start());
    let end = end.min(document.end());
    (start < end).then_some((start, end))
}

/// Search driver bound to a `FindConfig`.
#[derive(Debug, Clone, Default)]
pub struct FindEngine {
    config: FindConfig,
}

impl FindEngine {
    pub fn new(config: FindConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FindConfig {
        &self.config
    }

    /// Dispatch on the pattern kind.
    #[allow(clippy::too_many_arguments)]
    pub fn find(
        &self,
        document: &dyn Document,
        pattern: &FindPattern,
        start: u64,
        end: u64,
        flags: FindFlags,
        settings: &DisassemblySettings,
        progress: &mut Progress<'_>,
    ) -> FindOutcome {
        tracing::debug!(kind = ?pattern.kind(), start, end, "find");
        match pattern {
            FindPattern::Data(bytes) => {
                self.find_next_data(document, start, end, bytes, flags, progress)
            }
            FindPattern::Text(text) => {
                self.find_next_text(document, start, end, text, settings, flags, progress)
            }
            FindPattern::Constant(value) => {
                self.find_next_constant(document, start, end, *value, settings, progress)
            }
        }
    }

    pub fn find_next_data(
        &self,
        document: &dyn Document,
        start: u64,
        end: u64,
        data: &[u8],
        flags: FindFlags,
        progress: &mut Progress<'_>,
    ) -> FindOutcome {
        data::find_next_data(&self.config, document, start, end, data, flags, progress)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn find_next_text(
        &self,
        document: &dyn Document,
        start: u64,
        end: u64,
        text: &str,
        settings: &DisassemblySettings,
        flags: FindFlags,
        progress: &mut Progress<'_>,
    ) -> FindOutcome {
        text::find_next_text(
            &self.config,
            document,
            start,
            end,
            text,
            settings,
            flags,
            progress,
        )
    }

    pub fn find_next_constant(
        &self,
        document: &dyn Document,
        start: u64,
        end: u64,
        constant: u64,
        settings: &DisassemblySettings,
        progress: &mut Progress<'_>,
    ) -> FindOutcome {
        text::find_next_constant(&self.config, document, start, end, constant, settings, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_pattern() {
        assert_eq!(
            FindPattern::from_hex("90 90 c3").unwrap(),
            FindPattern::Data(vec![0x90, 0x90, 0xc3])
        );
        assert!(FindPattern::from_hex("9").is_err());
    }

    #[test]
    fn test_escaped_pattern() {
        assert_eq!(
            FindPattern::from_escaped(r"ab\x00\n\\").unwrap(),
            FindPattern::Data(vec![b'a', b'b', 0, b'\n', b'\\'])
        );
        assert!(FindPattern::from_escaped(r"\q").is_err());
        assert!(FindPattern::from_escaped(r"\xZZ").is_err());
        assert!(FindPattern::from_escaped("\\").is_err());
    }

    #[test]
    fn test_outcome_conflates_cancel_and_miss() {
        assert_eq!(FindOutcome::Found(0x10).address(), Some(0x10));
        assert_eq!(FindOutcome::NotFound.address(), None);
        assert_eq!(FindOutcome::Cancelled.address(), None);
        assert!(FindOutcome::Cancelled.is_cancelled());
        assert!(matches!(
            FindOutcome::Cancelled.into_result(),
            Err(NavError::SearchCancelled)
        ));
        assert_eq!(FindOutcome::NotFound.into_result().unwrap(), None);
    }

    #[test]
    fn test_pattern_kind() {
        assert_eq!(FindPattern::Constant(1).kind(), FindKind::Constant);
        assert_eq!(FindPattern::Text("x".into()).kind(), FindKind::Text);
    }
}
