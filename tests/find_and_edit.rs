//! Integration tests for search, editing and address entry through the
//! frame.

mod common;

use common::layout::*;
use common::*;
use glaurung_nav::surface::{
    Clipboard, ClipboardData, HexTransform, IntegerDisplayType, MemoryClipboard,
};
use glaurung_nav::{FindFlags, FindPattern, NavError, OffsetRange, SimpleResolver};

#[test]
fn test_find_data_text_and_constant() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let end = frame.context().primary().end();
    let mut progress = no_cancel();

    let data = FindPattern::Data(b"hello".to_vec());
    assert_eq!(
        frame.find(&data, 0x1000, end, FindFlags::empty(), &mut progress),
        Some(GREETING)
    );
    let upper = FindPattern::Data(b"WORLD".to_vec());
    assert_eq!(
        frame.find(&upper, 0x1000, end, FindFlags::empty(), &mut progress),
        None
    );
    assert_eq!(
        frame.find(&upper, 0x1000, end, FindFlags::CASE_INSENSITIVE, &mut progress),
        Some(GREETING + 6)
    );

    let text = FindPattern::Text("push rbp".into());
    assert_eq!(
        frame.find(&text, 0x1000, end, FindFlags::empty(), &mut progress),
        Some(MAIN)
    );

    // 'h' rendered as a data byte
    let constant = FindPattern::Constant(0x68);
    assert_eq!(
        frame.find(&constant, 0x1000, end, FindFlags::empty(), &mut progress),
        Some(GREETING)
    );
}

#[test]
fn test_find_does_not_navigate() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let mut progress = no_cancel();
    let pattern = FindPattern::from_hex("c3").unwrap();
    assert_eq!(
        frame.find(&pattern, MAIN, CALLEE + 1, FindFlags::empty(), &mut progress),
        Some(0x2009)
    );
    assert_eq!(frame.current_offset(), Some(0x1000));
}

#[test]
fn test_cancelled_search_reports_nothing() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let end = frame.context().primary().end();
    let mut calls = 0;
    let mut cancel = |_: u64, _: u64| {
        calls += 1;
        false
    };
    let text = FindPattern::Text("push rbp".into());
    assert_eq!(
        frame.find(&text, 0x1000, end, FindFlags::empty(), &mut cancel),
        None
    );
    assert!(calls > 0);
}

#[test]
fn test_find_without_view() {
    let frame = sample_frame();
    let mut progress = no_cancel();
    let data = FindPattern::Data(b"hello".to_vec());
    assert_eq!(
        frame.find(&data, 0, u64::MAX, FindFlags::empty(), &mut progress),
        None
    );
}

#[test]
fn test_find_next_navigates() {
    let mut frame = sample_frame();
    frame.navigate("hex", 0x1000, true, true).unwrap();
    let mut progress = no_cancel();
    let pattern = FindPattern::from_escaped("hello").unwrap();

    assert_eq!(
        frame.find_next(&pattern, FindFlags::empty(), &mut progress).unwrap(),
        Some(GREETING)
    );
    assert_eq!(frame.current_offset(), Some(GREETING));
    assert!(frame.can_go_back());

    assert_eq!(
        frame.find_next(&pattern, FindFlags::empty(), &mut progress).unwrap(),
        None
    );
    assert_eq!(frame.current_offset(), Some(GREETING));
}

#[test]
fn test_copy_respects_capabilities() {
    let mut frame = sample_frame();
    let mut clipboard = MemoryClipboard::default();

    // Nothing displayed yet.
    assert!(!frame.copy(&mut clipboard, None));
    assert!(!frame.can_copy());

    frame.navigate("hex", GREETING, true, true).unwrap();
    let surface = frame.get_current_view().unwrap();
    surface
        .borrow_mut()
        .set_selection_offsets(OffsetRange::new(GREETING, GREETING + 5));

    assert!(frame.copy(&mut clipboard, None));
    assert_eq!(clipboard.get(), Some(ClipboardData::Binary(b"hello".to_vec())));

    assert!(frame.copy(&mut clipboard, Some(&HexTransform)));
    assert_eq!(
        clipboard.get(),
        Some(ClipboardData::Binary(b"68656c6c6f".to_vec()))
    );

    assert!(frame.copy_address(&mut clipboard));
    assert_eq!(clipboard.get(), Some(ClipboardData::Text("0x1400".into())));

    assert!(!frame.can_display_as(IntegerDisplayType::UnsignedDecimal));
    assert!(!frame.display_as(IntegerDisplayType::UnsignedDecimal));
    assert!(!frame.cut(&mut clipboard));
}

#[test]
fn test_write_undo_redo() {
    let mut frame = sample_frame();
    let document = frame.context().primary();
    frame.navigate("hex", GREETING, true, true).unwrap();

    assert!(!frame.can_undo());
    assert!(frame.write_data(b"HE"));
    assert_eq!(document.read(GREETING, 5), b"HEllo");
    assert!(frame.can_undo());

    assert!(frame.undo());
    assert_eq!(document.read(GREETING, 5), b"hello");
    assert!(!frame.undo());

    assert!(frame.redo());
    assert_eq!(document.read(GREETING, 5), b"HEllo");
}

#[test]
fn test_paste_and_transform() {
    let mut frame = sample_frame();
    let document = frame.context().primary();
    frame.navigate("hex", GREETING, true, true).unwrap();

    let mut clipboard = MemoryClipboard::default();
    clipboard.set(ClipboardData::Text("4a 4b".into()));
    assert!(frame.paste(&clipboard, Some(&HexTransform)));
    assert_eq!(document.read(GREETING, 3), b"JKl");

    // Transforms need a selection.
    assert!(!frame.can_transform());
    assert!(!frame.transform(&HexTransform, true));
}

#[test]
fn test_listing_is_read_only() {
    let mut frame = sample_frame();
    let document = frame.context().primary();
    frame.navigate("linear", GREETING, true, true).unwrap();

    assert!(!frame.can_paste());
    assert!(!frame.write_data(b"zz"));
    assert_eq!(document.read(GREETING, 2), b"he");

    let mut clipboard = MemoryClipboard::default();
    assert!(frame.copy(&mut clipboard, None));
    match clipboard.get() {
        Some(ClipboardData::Text(text)) => assert!(text.contains("db 68h")),
        other => panic!("unexpected clipboard contents: {:?}", other),
    }
}

#[test]
fn test_address_from_string() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let resolver = SimpleResolver;

    assert_eq!(frame.address_from_string(&resolver, "main+4").unwrap(), MAIN_CALL);
    assert_eq!(frame.address_from_string(&resolver, "+0x10").unwrap(), 0x1010);
    assert_eq!(frame.address_from_string(&resolver, " 0x200e ").unwrap(), CALLEE);
    assert!(matches!(
        frame.address_from_string(&resolver, "   "),
        Err(NavError::InvalidExpression(_))
    ));
    assert!(frame.address_from_string(&resolver, "nosuchsymbol").is_err());
}

#[test]
fn test_go_to_address() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let resolver = SimpleResolver;

    let mut seen_default = String::new();
    let mut prompt = |_: &str, default: &str| {
        seen_default = default.to_string();
        Some("callee".to_string())
    };
    assert!(frame.go_to_address(&mut prompt, &resolver).unwrap());
    assert_eq!(seen_default, "0x1000");
    assert_eq!(frame.current_offset(), Some(CALLEE));
    assert!(frame.can_go_back());

    let mut cancel = |_: &str, _: &str| -> Option<String> { None };
    assert!(!frame.go_to_address(&mut cancel, &resolver).unwrap());
    let mut blank = |_: &str, _: &str| Some(String::new());
    assert_eq!(frame.address_from_input(&mut blank, &resolver).unwrap(), None);
    assert_eq!(frame.current_offset(), Some(CALLEE));
}
