//! The document contract consumed by surfaces, the frame and the find engine.
//!
//! A document is one analyzed artifact: an addressable byte range plus
//! whatever analysis is available for it (functions, symbols, data
//! variables, types) and a renderer that turns an offset into disassembly
//! lines. `MemoryDocument` is a self-contained implementation over an
//! in-memory buffer that renders x86/x86-64 code through iced-x86.

use std::cell::RefCell;
use std::collections::BTreeMap;

use iced_x86::{
    Decoder, DecoderOptions, Formatter, FormatterOutput, FormatterTextKind, IntelFormatter,
    NumberKind,
};

use crate::core::{
    BasicBlock, DisassemblySettings, DisassemblyTextLine, DisassemblyToken, Function, OffsetRange,
    QualifiedName, RenderedItem, TokenKind,
};

/// Bounded, read-mostly view over an analyzed artifact.
pub trait Document {
    /// Name of the document's data type, e.g. "Raw" or "ELF"
    fn data_type(&self) -> &str;

    /// First addressable offset
    fn start(&self) -> u64;

    /// One past the last addressable offset
    fn end(&self) -> u64;

    fn len(&self) -> u64 {
        self.end().saturating_sub(self.start())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_valid_offset(&self, offset: u64) -> bool {
        offset >= self.start() && offset < self.end()
    }

    /// Read up to `len` bytes at `offset`. Short reads stop at the first
    /// unmapped byte; an invalid offset yields an empty buffer.
    fn read(&self, offset: u64, len: usize) -> Vec<u8>;

    /// First mapped offset at or after `offset`.
    fn next_valid_offset(&self, offset: u64) -> Option<u64> {
        let candidate = offset.max(self.start());
        (candidate < self.end()).then_some(candidate)
    }

    fn is_writable(&self) -> bool {
        false
    }

    /// Overwrite bytes at `offset`; returns how many bytes were written.
    fn write(&self, _offset: u64, _data: &[u8]) -> usize {
        0
    }

    /// True if `offset` holds code rather than data.
    fn is_code(&self, offset: u64) -> bool {
        !self.functions_containing(offset).is_empty()
    }

    fn functions(&self) -> Vec<Function>;

    fn functions_containing(&self, offset: u64) -> Vec<Function> {
        self.functions()
            .into_iter()
            .filter(|f| f.contains(offset))
            .collect()
    }

    fn function_at(&self, entry: u64) -> Option<Function> {
        self.functions().into_iter().find(|f| f.entry == entry)
    }

    fn basic_block_at(&self, offset: u64) -> Option<BasicBlock> {
        self.functions_containing(offset)
            .iter()
            .find_map(|f| f.block_at(offset).cloned())
    }

    fn symbol_address(&self, _name: &str) -> Option<u64> {
        None
    }

    fn symbol_at(&self, _offset: u64) -> Option<String> {
        None
    }

    /// Every type the document defines.
    fn defined_types(&self) -> Vec<QualifiedName> {
        Vec::new()
    }

    /// Type of the data variable starting at or covering `offset`, with the
    /// offset into that type.
    fn type_at(&self, _offset: u64) -> Option<(QualifiedName, u64)> {
        None
    }

    /// Render the item (instruction or data unit) at `offset`.
    fn render(&self, offset: u64, settings: &DisassemblySettings) -> Option<RenderedItem>;
}

/// Instruction set used to render code in a `MemoryDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// x86 (32-bit)
    X86,
    /// x86-64 (64-bit)
    X86_64,
}

impl Architecture {
    pub fn address_bits(&self) -> u32 {
        match self {
            Architecture::X86 => 32,
            Architecture::X86_64 => 64,
        }
    }
}

#[derive(Debug, Clone)]
struct DataVariable {
    ty: QualifiedName,
    size: u64,
}

/// An in-memory document over a byte buffer mapped at `base`.
#[derive(Debug)]
pub struct MemoryDocument {
    data_type: String,
    base: u64,
    bytes: RefCell<Vec<u8>>,
    writable: bool,
    arch: Option<Architecture>,
    executable: Vec<OffsetRange>,
    functions: Vec<Function>,
    symbols: BTreeMap<String, u64>,
    data_vars: BTreeMap<u64, DataVariable>,
    types: Vec<QualifiedName>,
}

impl MemoryDocument {
    pub fn new(data_type: impl Into<String>, base: u64, bytes: Vec<u8>) -> Self {
        Self {
            data_type: data_type.into(),
            base,
            bytes: RefCell::new(bytes),
            writable: false,
            arch: None,
            executable: Vec::new(),
            functions: Vec::new(),
            symbols: BTreeMap::new(),
            data_vars: BTreeMap::new(),
            types: Vec::new(),
        }
    }

    /// Load a raw file as a "Raw" document mapped at offset 0.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        Ok(Self::new("Raw", 0, std::fs::read(path)?))
    }

    pub fn with_arch(mut self, arch: Architecture) -> Self {
        self.arch = Some(arch);
        self
    }

    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    /// Mark a range as executable code.
    pub fn with_executable(mut self, start: u64, end: u64) -> Self {
        self.executable.push(OffsetRange::new(start, end));
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.symbols
            .entry(function.name.clone())
            .or_insert(function.entry);
        self.functions.push(function);
        self.functions.sort_by_key(|f| f.entry);
        self
    }

    pub fn with_symbol(mut self, name: impl Into<String>, offset: u64) -> Self {
        self.symbols.insert(name.into(), offset);
        self
    }

    pub fn with_type(mut self, name: impl Into<QualifiedName>) -> Self {
        let name = name.into();
        if !self.types.contains(&name) {
            self.types.push(name);
        }
        self
    }

    /// Declare a typed data variable; the type is registered as well.
    pub fn with_data_variable(
        mut self,
        offset: u64,
        ty: impl Into<QualifiedName>,
        size: u64,
    ) -> Self {
        let ty = ty.into();
        self = self.with_type(ty.clone());
        self.data_vars.insert(offset, DataVariable { ty, size });
        self
    }

    pub fn arch(&self) -> Option<Architecture> {
        self.arch
    }

    fn index(&self, offset: u64) -> Option<usize> {
        if !self.is_valid_offset(offset) {
            return None;
        }
        usize::try_from(offset - self.base).ok()
    }

    fn render_instruction(
        &self,
        arch: Architecture,
        offset: u64,
        settings: &DisassemblySettings,
    ) -> Option<(Vec<DisassemblyToken>, u64, Vec<u8>)> {
        let bytes = self.read(offset, 15);
        if bytes.is_empty() {
            return None;
        }
        let mut decoder = Decoder::new(arch.address_bits(), &bytes, DecoderOptions::NONE);
        decoder.set_ip(offset);
        let instr = decoder.decode();
        if instr.is_invalid() {
            return None;
        }

        let mut formatter = IntelFormatter::new();
        formatter
            .options_mut()
            .set_uppercase_hex(settings.uppercase_hex);
        formatter
            .options_mut()
            .set_space_after_operand_separator(true);
        let mut output = TokenOutput {
            tokens: Vec::new(),
            document: OffsetRange::new(self.start(), self.end()),
        };
        formatter.format(&instr, &mut output);

        let len = instr.len();
        Some((output.tokens, len as u64, bytes[..len.min(bytes.len())].to_vec()))
    }

    fn render_data(&self, offset: u64, settings: &DisassemblySettings) -> Option<(Vec<DisassemblyToken>, u64, Vec<u8>)> {
        let bytes = self.read(offset, 1);
        let byte = *bytes.first()?;
        let text = if settings.uppercase_hex {
            format!("{:02X}h", byte)
        } else {
            format!("{:02x}h", byte)
        };
        let mut tokens = Vec::new();
        if let Some(var) = self.data_vars.get(&offset) {
            tokens.push(DisassemblyToken::new(TokenKind::TypeName, var.ty.to_string()));
            tokens.push(DisassemblyToken::new(TokenKind::Text, " "));
        }
        tokens.push(DisassemblyToken::new(TokenKind::Keyword, "db"));
        tokens.push(DisassemblyToken::new(TokenKind::Text, " "));
        tokens.push(DisassemblyToken::constant(
            TokenKind::Integer,
            text,
            byte as u64,
        ));
        Some((tokens, 1, bytes))
    }
}

/// Collects iced-x86 formatter output as document tokens.
struct TokenOutput {
    tokens: Vec<DisassemblyToken>,
    document: OffsetRange,
}

impl FormatterOutput for TokenOutput {
    fn write(&mut self, text: &str, kind: FormatterTextKind) {
        let kind = match kind {
            FormatterTextKind::Mnemonic => TokenKind::Instruction,
            FormatterTextKind::Prefix => TokenKind::Prefix,
            FormatterTextKind::Register => TokenKind::Register,
            FormatterTextKind::Keyword | FormatterTextKind::Directive => TokenKind::Keyword,
            FormatterTextKind::Label | FormatterTextKind::Function => TokenKind::CodeSymbol,
            FormatterTextKind::Data => TokenKind::DataSymbol,
            FormatterTextKind::Punctuation => match text {
                "," => TokenKind::OperandSeparator,
                "[" => TokenKind::BeginMemoryOperand,
                "]" => TokenKind::EndMemoryOperand,
                _ => TokenKind::Text,
            },
            _ => TokenKind::Text,
        };
        self.tokens.push(DisassemblyToken::new(kind, text));
    }

    fn write_number(
        &mut self,
        _instruction: &iced_x86::Instruction,
        _operand: u32,
        _instruction_operand: Option<u32>,
        text: &str,
        value: u64,
        _number_kind: NumberKind,
        kind: FormatterTextKind,
    ) {
        let kind = match kind {
            FormatterTextKind::LabelAddress | FormatterTextKind::FunctionAddress => {
                TokenKind::CodeRelativeAddress
            }
            _ if self.document.contains(value) => TokenKind::PossibleAddress,
            _ => TokenKind::Integer,
        };
        self.tokens
            .push(DisassemblyToken::constant(kind, text, value));
    }
}

impl Document for MemoryDocument {
    fn data_type(&self) -> &str {
        &self.data_type
    }

    fn start(&self) -> u64 {
        self.base
    }

    fn end(&self) -> u64 {
        self.base.saturating_add(self.bytes.borrow().len() as u64)
    }

    fn read(&self, offset: u64, len: usize) -> Vec<u8> {
        let Some(start) = self.index(offset) else {
            return Vec::new();
        };
        let bytes = self.bytes.borrow();
        let end = start.saturating_add(len).min(bytes.len());
        bytes[start..end].to_vec()
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn write(&self, offset: u64, data: &[u8]) -> usize {
        if !self.writable {
            return 0;
        }
        let Some(start) = self.index(offset) else {
            return 0;
        };
        let mut bytes = self.bytes.borrow_mut();
        let end = start.saturating_add(data.len()).min(bytes.len());
        let count = end - start;
        bytes[start..end].copy_from_slice(&data[..count]);
        count
    }

    fn is_code(&self, offset: u64) -> bool {
        if self.executable.iter().any(|r| r.contains(offset)) {
            return true;
        }
        self.functions.iter().any(|f| f.contains(offset))
    }

    fn functions(&self) -> Vec<Function> {
        self.functions.clone()
    }

    fn functions_containing(&self, offset: u64) -> Vec<Function> {
        self.functions
            .iter()
            .filter(|f| f.contains(offset))
            .cloned()
            .collect()
    }

    fn symbol_address(&self, name: &str) -> Option<u64> {
        self.symbols.get(name).copied()
    }

    fn symbol_at(&self, offset: u64) -> Option<String> {
        self.symbols
            .iter()
            .find(|(_, &addr)| addr == offset)
            .map(|(name, _)| name.clone())
    }

    fn defined_types(&self) -> Vec<QualifiedName> {
        self.types.clone()
    }

    fn type_at(&self, offset: u64) -> Option<(QualifiedName, u64)> {
        let (&start, var) = self.data_vars.range(..=offset).next_back()?;
        let delta = offset - start;
        (delta < var.size.max(1)).then(|| (var.ty.clone(), delta))
    }

    fn render(&self, offset: u64, settings: &DisassemblySettings) -> Option<RenderedItem> {
        if !self.is_valid_offset(offset) {
            return None;
        }
        let code = match self.arch {
            Some(arch) if self.is_code(offset) => self.render_instruction(arch, offset, settings),
            _ => None,
        };
        let (body, length, bytes) = match code {
            Some(rendered) => rendered,
            None => self.render_data(offset, settings)?,
        };

        let mut lines = Vec::new();
        if let Some(name) = self.symbol_at(offset) {
            lines.push(DisassemblyTextLine::new(
                offset,
                vec![DisassemblyToken::new(
                    TokenKind::CodeSymbol,
                    format!("{}:", name),
                )],
            ));
        }

        let mut tokens = Vec::new();
        if settings.show_address {
            tokens.push(DisassemblyToken::constant(
                TokenKind::AddressDisplay,
                format!("{:08x}", offset),
                offset,
            ));
            tokens.push(DisassemblyToken::new(TokenKind::Text, "  "));
        }
        if settings.show_opcode_bytes {
            tokens.push(DisassemblyToken::new(TokenKind::Opcode, hex::encode(&bytes)));
            tokens.push(DisassemblyToken::new(TokenKind::Text, "  "));
        }
        tokens.extend(body);
        lines.push(DisassemblyTextLine::new(offset, tokens));

        Some(RenderedItem {
            lines,
            length: length.max(1),
        })
    }
}
