//! Address expressions typed by the user.
//!
//! The frame never parses addresses itself; it hands the text to an
//! `ExpressionResolver` and navigates to whatever comes back.
//! `SimpleResolver` covers the common forms:
//!
//! - `0x401000`, `401000`, `401000h`: hexadecimal
//! - `#4198400`: decimal
//! - `$here` or `.`: the current offset
//! - `main`: a symbol of the document (symbols win over bare hex)
//! - `main+0x10-4`: `+`/`-` chains of the above
//! - `+0x10`, `-8`: relative to the current offset

use crate::document::Document;
use crate::error::{NavError, Result};

/// Resolves expression text to a document offset.
pub trait ExpressionResolver {
    fn resolve(&self, document: &dyn Document, expression: &str, here: u64) -> Result<u64>;
}

/// Source of address text, typically a dialog. `None` means the user
/// cancelled.
pub trait AddressPrompt {
    fn prompt(&mut self, title: &str, default: &str) -> Option<String>;
}

impl<F> AddressPrompt for F
where
    F: FnMut(&str, &str) -> Option<String>,
{
    fn prompt(&mut self, title: &str, default: &str) -> Option<String> {
        self(title, default)
    }
}

/// Resolver for hex/decimal literals, symbols and `+`/`-` chains.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleResolver;

impl SimpleResolver {
    fn term(document: &dyn Document, term: &str, here: u64) -> Result<u64> {
        let term = term.trim();
        if term.is_empty() {
            return Err(NavError::InvalidExpression("missing operand".into()));
        }
        if term == "$here" || term == "." {
            return Ok(here);
        }
        if let Some(dec) = term.strip_prefix('#') {
            return dec
                .parse::<u64>()
                .map_err(|_| NavError::InvalidExpression(format!("bad decimal '{}'", term)));
        }
        if let Some(hex) = term
            .strip_prefix("0x")
            .or_else(|| term.strip_prefix("0X"))
        {
            return parse_hex(hex, term);
        }
        if let Some(addr) = document.symbol_address(term) {
            return Ok(addr);
        }
        if let Some(hex) = term.strip_suffix('h').or_else(|| term.strip_suffix('H')) {
            if let Ok(v) = parse_hex(hex, term) {
                return Ok(v);
            }
        }
        parse_hex(term, term)
            .map_err(|_| NavError::InvalidExpression(format!("unknown symbol '{}'", term)))
    }
}

fn parse_hex(digits: &str, original: &str) -> Result<u64> {
    if digits.is_empty() {
        return Err(NavError::InvalidExpression(format!("bad hex '{}'", original)));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|_| NavError::InvalidExpression(format!("bad hex '{}'", original)))
}

impl ExpressionResolver for SimpleResolver {
    fn resolve(&self, document: &dyn Document, expression: &str, here: u64) -> Result<u64> {
        let text = expression.trim();
        if text.is_empty() {
            return Err(NavError::InvalidExpression("empty expression".into()));
        }

        // A leading sign makes the whole chain relative to `here`
        let (mut acc, rest) = match text.chars().next() {
            Some('+') | Some('-') => (here, text),
            _ => (0, text),
        };

        let mut op = '+';
        let mut start = 0;
        let bytes = rest.as_bytes();
        let mut i = 0;
        // Skip the leading sign so it acts as the first operator
        if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
            op = bytes[0] as char;
            start = 1;
            i = 1;
        }
        loop {
            let at_end = i == bytes.len();
            if at_end || bytes[i] == b'+' || bytes[i] == b'-' {
                let value = Self::term(document, &rest[start..i], here)?;
                acc = match op {
                    '+' => acc.checked_add(value),
                    _ => acc.checked_sub(value),
                }
                .ok_or_else(|| NavError::InvalidExpression(format!("'{}' overflows", text)))?;
                if at_end {
                    break;
                }
                op = bytes[i] as char;
                start = i + 1;
            }
            i += 1;
        }
        Ok(acc)
    }
}
