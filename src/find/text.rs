//! Searches over rendered disassembly lines: text tokens and constants.
//!
//! Both walk the document item by item, asking it to render each item with
//! the caller's settings. A hit reports the address of the owning line.

use tracing::trace;

use super::{clamp_range, FindFlags, FindOutcome, Progress};
use crate::config::FindConfig;
use crate::core::{DisassemblySettings, DisassemblyTextLine};
use crate::document::Document;

fn normalize(text: &str, flags: FindFlags) -> String {
    let text: String = if flags.contains(FindFlags::IGNORE_WHITESPACE) {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        text.to_string()
    };
    if flags.contains(FindFlags::CASE_INSENSITIVE) {
        text.to_lowercase()
    } else {
        text
    }
}

/// Walk rendered lines in `[start, end)`, returning the first line address
/// accepted by `matches`.
fn scan_lines(
    config: &FindConfig,
    document: &dyn Document,
    start: u64,
    end: u64,
    settings: &DisassemblySettings,
    progress: &mut Progress<'_>,
    mut matches: impl FnMut(&DisassemblyTextLine) -> bool,
) -> FindOutcome {
    let Some((start, end)) = clamp_range(document, start, end) else {
        return FindOutcome::NotFound;
    };
    let total = end - start;
    let interval = config.progress_interval_lines.max(1);
    let mut pos = start;
    let mut items = 0usize;

    while pos < end {
        if !document.is_valid_offset(pos) {
            match document.next_valid_offset(pos) {
                Some(next) if next < end => pos = next,
                _ => break,
            }
        }

        let step = match document.render(pos, settings) {
            Some(item) => {
                if let Some(line) = item
                    .lines
                    .iter()
                    .find(|line| line.address >= start && line.address < end && matches(line))
                {
                    return FindOutcome::Found(line.address);
                }
                item.length.min(config.max_line_bytes as u64).max(1)
            }
            None => 1,
        };
        pos = pos.saturating_add(step);

        items += 1;
        if items % interval == 0 && !progress(pos.min(end) - start, total) {
            trace!(offset = pos, "line search cancelled");
            return FindOutcome::Cancelled;
        }
    }

    if items % interval != 0 && !progress(total, total) {
        return FindOutcome::Cancelled;
    }
    FindOutcome::NotFound
}

/// First line in `[start, end)` whose rendered text contains `text`.
#[allow(clippy::too_many_arguments)]
pub fn find_next_text(
    config: &FindConfig,
    document: &dyn Document,
    start: u64,
    end: u64,
    text: &str,
    settings: &DisassemblySettings,
    flags: FindFlags,
    progress: &mut Progress<'_>,
) -> FindOutcome {
    let needle = normalize(text, flags);
    if needle.is_empty() {
        return FindOutcome::NotFound;
    }
    scan_lines(config, document, start, end, settings, progress, |line| {
        normalize(&line.text(), flags).contains(&needle)
    })
}

/// First line in `[start, end)` with a constant token whose value is `constant`.
///
/// Matches on the token value, so `10h`, `0x10` and `16` all match 16.
pub fn find_next_constant(
    config: &FindConfig,
    document: &dyn Document,
    start: u64,
    end: u64,
    constant: u64,
    settings: &DisassemblySettings,
    progress: &mut Progress<'_>,
) -> FindOutcome {
    scan_lines(config, document, start, end, settings, progress, |line| {
        line.tokens
            .iter()
            .any(|t| t.kind.is_constant() && t.value == constant)
    })
}
