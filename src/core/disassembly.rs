//! Rendered disassembly: tokens, lines and the settings that shape them.
//!
//! The find engine matches text and constants against these tokens rather
//! than raw bytes, so the token stream is the contract between a document's
//! renderer and the search code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a token within a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Free text and whitespace
    Text,
    /// Address column
    AddressDisplay,
    /// Raw opcode bytes column
    Opcode,
    /// Instruction mnemonic
    Instruction,
    /// Prefix such as `lock` or `rep`
    Prefix,
    OperandSeparator,
    Register,
    /// Integer literal
    Integer,
    /// Integer literal that lands inside the document
    PossibleAddress,
    /// Branch or call target
    CodeRelativeAddress,
    BeginMemoryOperand,
    EndMemoryOperand,
    Keyword,
    CodeSymbol,
    DataSymbol,
    TypeName,
    FieldName,
    Annotation,
}

impl TokenKind {
    /// Token kinds that carry a meaningful numeric `value`.
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer | TokenKind::PossibleAddress | TokenKind::CodeRelativeAddress
        )
    }

    /// Token kinds whose value refers to another location in the document.
    pub fn is_address(&self) -> bool {
        matches!(
            self,
            TokenKind::PossibleAddress | TokenKind::CodeRelativeAddress
        )
    }
}

/// A single rendered token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassemblyToken {
    pub kind: TokenKind,
    pub text: String,
    /// Numeric value for constant tokens, 0 otherwise
    pub value: u64,
}

impl DisassemblyToken {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value: 0,
        }
    }

    pub fn constant(kind: TokenKind, text: impl Into<String>, value: u64) -> Self {
        Self {
            kind,
            text: text.into(),
            value,
        }
    }
}

/// One rendered line, owned by the instruction or data item at `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassemblyTextLine {
    pub address: u64,
    pub tokens: Vec<DisassemblyToken>,
}

impl DisassemblyTextLine {
    pub fn new(address: u64, tokens: Vec<DisassemblyToken>) -> Self {
        Self { address, tokens }
    }

    /// Concatenated token text.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn has_instruction_token(&self) -> bool {
        line_has_instruction_token(self)
    }
}

impl fmt::Display for DisassemblyTextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// A run of lines rendered for one item plus the bytes that item spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub lines: Vec<DisassemblyTextLine>,
    /// Number of bytes the item covers; at least 1
    pub length: u64,
}

/// Options controlling how lines are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisassemblySettings {
    /// Prefix each line with its address
    pub show_address: bool,
    /// Include raw opcode bytes after the address
    pub show_opcode_bytes: bool,
    /// Render hex literals in upper case
    pub uppercase_hex: bool,
}

impl Default for DisassemblySettings {
    fn default() -> Self {
        Self {
            show_address: false,
            show_opcode_bytes: false,
            uppercase_hex: true,
        }
    }
}

/// True if any token on the line is an instruction mnemonic.
pub fn line_has_instruction_token(line: &DisassemblyTextLine) -> bool {
    line.tokens.iter().any(|t| t.kind == TokenKind::Instruction)
}

/// Join rendered lines into plain text, one line per row.
pub fn disassembly_text(lines: &[DisassemblyTextLine]) -> String {
    lines
        .iter()
        .map(DisassemblyTextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mov_line() -> DisassemblyTextLine {
        DisassemblyTextLine::new(
            0x1000,
            vec![
                DisassemblyToken::new(TokenKind::Instruction, "mov"),
                DisassemblyToken::new(TokenKind::Text, " "),
                DisassemblyToken::new(TokenKind::Register, "eax"),
                DisassemblyToken::new(TokenKind::OperandSeparator, ","),
                DisassemblyToken::constant(TokenKind::Integer, "10h", 0x10),
            ],
        )
    }

    #[test]
    fn test_line_text() {
        assert_eq!(mov_line().text(), "mov eax,10h");
    }

    #[test]
    fn test_instruction_token_detection() {
        assert!(line_has_instruction_token(&mov_line()));
        let label = DisassemblyTextLine::new(
            0x1000,
            vec![DisassemblyToken::new(TokenKind::CodeSymbol, "main:")],
        );
        assert!(!label.has_instruction_token());
    }

    #[test]
    fn test_disassembly_text_joins_lines() {
        let label = DisassemblyTextLine::new(
            0x1000,
            vec![DisassemblyToken::new(TokenKind::CodeSymbol, "main:")],
        );
        assert_eq!(disassembly_text(&[label, mov_line()]), "main:\nmov eax,10h");
        assert_eq!(disassembly_text(&[]), "");
    }

    #[test]
    fn test_constant_kinds() {
        assert!(TokenKind::Integer.is_constant());
        assert!(TokenKind::CodeRelativeAddress.is_address());
        assert!(!TokenKind::Register.is_constant());
    }
}
