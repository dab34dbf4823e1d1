//! Byte-pattern search over document bytes.
//!
//! The range is scanned in `chunk_size` pieces that overlap by
//! `pattern.len() - 1` bytes, so a match straddling two chunks is still
//! found. Case-sensitive search uses `memchr::memmem`; ASCII
//! case-insensitive search goes through an `aho-corasick` automaton.

use aho_corasick::AhoCorasick;
use memchr::memmem;
use tracing::trace;

use super::{clamp_range, FindFlags, FindOutcome, Progress};
use crate::config::FindConfig;
use crate::document::Document;

enum Matcher<'p> {
    Exact(memmem::Finder<'p>),
    Folded(AhoCorasick),
}

impl<'p> Matcher<'p> {
    fn new(pattern: &'p [u8], flags: FindFlags) -> Option<Self> {
        if flags.contains(FindFlags::CASE_INSENSITIVE) {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build([pattern])
                .ok()
                .map(Matcher::Folded)
        } else {
            Some(Matcher::Exact(memmem::Finder::new(pattern)))
        }
    }

    fn find(&self, haystack: &[u8]) -> Option<usize> {
        match self {
            Matcher::Exact(finder) => finder.find(haystack),
            Matcher::Folded(ac) => ac.find(haystack).map(|m| m.start()),
        }
    }
}

/// First offset in `[start, end)` where `pattern` occurs.
pub fn find_next_data(
    config: &FindConfig,
    document: &dyn Document,
    start: u64,
    end: u64,
    pattern: &[u8],
    flags: FindFlags,
    progress: &mut Progress<'_>,
) -> FindOutcome {
    if pattern.is_empty() {
        return FindOutcome::NotFound;
    }
    let Some((start, end)) = clamp_range(document, start, end) else {
        return FindOutcome::NotFound;
    };
    let Some(matcher) = Matcher::new(pattern, flags) else {
        return FindOutcome::NotFound;
    };

    let total = end - start;
    let overlap = pattern.len() - 1;
    let chunk = config.chunk_size.max(1);
    let mut pos = start;

    while pos < end {
        if !document.is_valid_offset(pos) {
            match document.next_valid_offset(pos) {
                Some(next) if next < end => pos = next,
                _ => break,
            }
        }

        let want = ((end - pos) as usize).min(chunk.saturating_add(overlap));
        let buf = document.read(pos, want);
        if buf.is_empty() {
            pos += 1;
            continue;
        }

        if let Some(i) = matcher.find(&buf) {
            trace!(offset = pos + i as u64, "data match");
            return FindOutcome::Found(pos + i as u64);
        }

        // A full read may hide the head of a match in its tail; a short read
        // ended at a gap, so nothing can straddle it.
        let advance = if buf.len() == want && buf.len() > overlap && pos + (want as u64) < end {
            buf.len() - overlap
        } else {
            buf.len()
        };
        pos += advance as u64;

        if !progress(pos.min(end) - start, total) {
            trace!(offset = pos, "data search cancelled");
            return FindOutcome::Cancelled;
        }
    }

    FindOutcome::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    fn doc(bytes: &[u8]) -> MemoryDocument {
        MemoryDocument::new("Raw", 0x1000, bytes.to_vec())
    }

    fn small_chunks() -> FindConfig {
        FindConfig {
            chunk_size: 4,
            ..FindConfig::default()
        }
    }

    #[test]
    fn test_finds_first_match_at_or_after_start() {
        let d = doc(b"xxABCxxABC");
        let cfg = FindConfig::default();
        let mut keep_going = |_: u64, _: u64| true;
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"ABC", FindFlags::empty(), &mut keep_going),
            FindOutcome::Found(0x1002)
        );
        assert_eq!(
            find_next_data(&cfg, &d, 0x1003, u64::MAX, b"ABC", FindFlags::empty(), &mut keep_going),
            FindOutcome::Found(0x1007)
        );
    }

    #[test]
    fn test_match_straddling_chunks() {
        let d = doc(b"0123456789ABCDEF");
        let cfg = small_chunks();
        let mut keep_going = |_: u64, _: u64| true;
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"3456", FindFlags::empty(), &mut keep_going),
            FindOutcome::Found(0x1003)
        );
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"DEF", FindFlags::empty(), &mut keep_going),
            FindOutcome::Found(0x100d)
        );
    }

    #[test]
    fn test_match_must_end_before_range_end() {
        let d = doc(b"xxABCxx");
        let cfg = FindConfig::default();
        let mut keep_going = |_: u64, _: u64| true;
        assert_eq!(
            find_next_data(&cfg, &d, 0x1000, 0x1004, b"ABC", FindFlags::empty(), &mut keep_going),
            FindOutcome::NotFound
        );
    }

    #[test]
    fn test_case_insensitive() {
        let d = doc(b"..Hello..");
        let cfg = FindConfig::default();
        let mut keep_going = |_: u64, _: u64| true;
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"hello", FindFlags::empty(), &mut keep_going),
            FindOutcome::NotFound
        );
        assert_eq!(
            find_next_data(
                &cfg,
                &d,
                0,
                u64::MAX,
                b"hello",
                FindFlags::CASE_INSENSITIVE,
                &mut keep_going
            ),
            FindOutcome::Found(0x1002)
        );
    }

    #[test]
    fn test_progress_reported_and_cancellable() {
        let d = doc(&[0u8; 64]);
        let cfg = small_chunks();
        let mut calls = Vec::new();
        let mut record = |cur: u64, total: u64| {
            calls.push((cur, total));
            true
        };
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"\x01", FindFlags::empty(), &mut record),
            FindOutcome::NotFound
        );
        assert_eq!(calls.len(), 16);
        assert_eq!(calls.last(), Some(&(64, 64)));

        let mut stop = |_: u64, _: u64| false;
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"\x01", FindFlags::empty(), &mut stop),
            FindOutcome::Cancelled
        );
    }

    #[test]
    fn test_empty_pattern_or_range() {
        let d = doc(b"abc");
        let cfg = FindConfig::default();
        let mut keep_going = |_: u64, _: u64| true;
        assert_eq!(
            find_next_data(&cfg, &d, 0, u64::MAX, b"", FindFlags::empty(), &mut keep_going),
            FindOutcome::NotFound
        );
        assert_eq!(
            find_next_data(&cfg, &d, 0x2000, 0x3000, b"a", FindFlags::empty(), &mut keep_going),
            FindOutcome::NotFound
        );
    }
}
