//! Integration tests for view resolution, the surface cache and the
//! transactional switch.

mod common;

use common::layout::*;
use common::*;
use glaurung_nav::core::IlViewType;
use glaurung_nav::{FrameConfig, FrameEvent, NavError, ViewLocation, ViewTypeRegistry};

#[test]
fn test_linear_graph_round_trip() {
    let mut frame = sample_frame();

    frame.navigate("", 0x1000, true, true).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("linear"));
    assert_eq!(frame.current_offset(), Some(0x1000));
    assert!(!frame.can_go_back());

    frame.navigate("graph", MAIN, true, true).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("graph"));
    assert_eq!(frame.history().back_entries().len(), 1);
    assert!(!frame.can_go_forward());

    assert!(frame.back().unwrap());
    assert_eq!(frame.current_view_type().as_deref(), Some("linear"));
    assert_eq!(frame.current_offset(), Some(0x1000));
    assert!(frame.can_go_forward());

    assert!(frame.forward().unwrap());
    assert_eq!(frame.current_view_type().as_deref(), Some("graph"));
    assert_eq!(frame.current_offset(), Some(MAIN));
    assert!(!frame.can_go_forward());
}

#[test]
fn test_empty_type_keeps_current_type() {
    let mut frame = sample_frame();
    frame.navigate("hex", GREETING, true, true).unwrap();
    frame.navigate("", POINT, true, true).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("hex"));
}

#[test]
fn test_inapplicable_type_falls_back_to_priority_order() {
    let mut frame = sample_frame();
    let raw = frame.context().document("Raw").unwrap();
    // The raw document has no functions, so no graph applies.
    frame.navigate("graph:Raw", 0x10, true, true).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("linear:Raw"));
    assert_eq!(frame.get_data_type_for_view("linear:Raw"), raw.data_type());
}

#[test]
fn test_configured_priority_overrides_registry_order() {
    let config = FrameConfig {
        view_type_priority: vec!["hex".into()],
        ..FrameConfig::default()
    };
    let mut frame = frame_with(ViewTypeRegistry::with_builtin(), config);
    frame.navigate("", GREETING, true, true).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("hex"));
}

#[test]
fn test_no_applicable_type() {
    let mut frame = frame_with(ViewTypeRegistry::new(), FrameConfig::default());
    let err = frame.navigate("", 0x1000, true, true).unwrap_err();
    assert!(matches!(err, NavError::UnsupportedViewType(_)));
    assert!(frame.get_current_view().is_none());
}

#[test]
fn test_unknown_document_is_unsupported() {
    let mut frame = sample_frame();
    let err = frame.navigate("linear:Missing", 0, true, true).unwrap_err();
    assert!(matches!(err, NavError::UnsupportedViewType(_)));
}

#[test]
fn test_cache_reuse_constructs_each_type_once() {
    let (registry, counters) = counting_registry();
    let mut frame = frame_with(registry, FrameConfig::default());

    frame.navigate("linear", 0x1000, true, true).unwrap();
    frame.navigate("hex", GREETING, true, true).unwrap();
    frame.navigate("linear", MAIN, true, true).unwrap();
    frame.navigate("hex", POINT, true, true).unwrap();
    assert!(frame.back().unwrap());
    assert!(frame.back().unwrap());

    assert_eq!(count_for(&counters, "linear"), 1);
    assert_eq!(count_for(&counters, "hex"), 1);
    assert_eq!(count_for(&counters, "graph"), 0);
    assert_eq!(frame.cached_view_types(), vec!["hex", "linear"]);
}

#[test]
fn test_rejected_navigation_leaves_frame_untouched() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    frame.navigate("hex", GREETING, true, true).unwrap();
    frame.navigate("linear", POINT, true, true).unwrap();
    assert!(frame.back().unwrap());
    frame.drain_events();

    let view = frame.current_view_type();
    let offset = frame.current_offset();
    let cached = frame.cached_view_types();
    let back: Vec<u64> = frame.history().back_entries().iter().map(|e| e.offset()).collect();
    let forward: Vec<u64> = frame.history().forward_entries().iter().map(|e| e.offset()).collect();

    // Graphs only accept offsets inside functions.
    let err = frame.navigate("graph", GREETING, true, true).unwrap_err();
    assert!(matches!(
        err,
        NavError::NavigationRejected { offset, .. } if offset == GREETING
    ));
    // Outside the document.
    assert!(frame.navigate("linear", 0xdead_0000, true, true).is_err());

    assert_eq!(frame.current_view_type(), view);
    assert_eq!(frame.current_offset(), offset);
    assert_eq!(frame.cached_view_types(), cached);
    let back_after: Vec<u64> = frame.history().back_entries().iter().map(|e| e.offset()).collect();
    let forward_after: Vec<u64> = frame.history().forward_entries().iter().map(|e| e.offset()).collect();
    assert_eq!(back_after, back);
    assert_eq!(forward_after, forward);
    assert!(frame.drain_events().is_empty());
}

#[test]
fn test_navigation_without_history_still_clears_forward() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    frame.navigate("linear", GREETING, true, true).unwrap();
    assert!(frame.back().unwrap());
    assert!(frame.can_go_forward());

    frame.navigate("linear", POINT, true, false).unwrap();
    assert!(!frame.can_go_forward());
    assert!(!frame.can_go_back());
}

#[test]
fn test_view_changed_events() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    frame.navigate("hex", GREETING, true, true).unwrap();
    assert_eq!(
        frame.drain_events(),
        vec![
            FrameEvent::ViewChanged {
                view_type: "linear".into(),
                offset: 0x1000
            },
            FrameEvent::ViewChanged {
                view_type: "hex".into(),
                offset: GREETING
            },
        ]
    );
    assert!(frame.drain_events().is_empty());
}

#[test]
fn test_navigate_with_handler() {
    let mut frame = sample_frame();
    frame
        .navigate_with("hex", |surface| surface.navigate(GREETING + 3), true, true)
        .unwrap();
    assert_eq!(frame.current_offset(), Some(GREETING + 3));

    let err = frame
        .navigate_with("linear", |_| false, true, true)
        .unwrap_err();
    assert!(matches!(err, NavError::NavigationRejected { .. }));
    assert_eq!(frame.current_view_type().as_deref(), Some("hex"));
    assert!(!frame.cached_view_types().contains(&"linear".to_string()));
}

#[test]
fn test_view_location_round_trip() {
    let mut frame = sample_frame();
    frame.navigate("graph", MAIN_CALL, true, true).unwrap();
    let location = frame.get_view_location();
    assert!(location.is_valid());
    assert_eq!(location.view_type(), "graph");
    assert_eq!(location.offset(), MAIN_CALL);
    assert_eq!(location.instr_index(), 2);

    let depth = frame.history().back_entries().len();
    frame.set_view_location(&location).unwrap();
    assert_eq!(frame.get_view_location(), location);
    assert_eq!(frame.history().back_entries().len(), depth);
}

#[test]
fn test_set_view_location_uses_instruction_index() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();

    let location = ViewLocation::with_instruction("graph", 0x2009, IlViewType::Normal, 3);
    frame.set_view_location(&location).unwrap();
    assert_eq!(frame.get_view_location(), location);

    let hex = ViewLocation::new("hex", GREETING);
    frame.set_view_location(&hex).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("hex"));
    assert_eq!(frame.current_offset(), Some(GREETING));
}

#[test]
fn test_set_view_location_failures_leave_state() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let before = frame.get_view_location();

    assert!(frame.set_view_location(&ViewLocation::default()).is_err());
    // No graph applies to the raw document; no fallback for locations.
    assert!(frame
        .set_view_location(&ViewLocation::new("graph:Raw", 0x10))
        .is_err());
    assert!(frame
        .set_view_location(&ViewLocation::new("graph", GREETING))
        .is_err());

    assert_eq!(frame.get_view_location(), before);
    assert!(!frame.can_go_back());
}

#[test]
fn test_set_view_location_requires_il_mode() {
    let mut frame = sample_frame();
    frame.navigate("linear", 0x1000, true, true).unwrap();
    let before = frame.get_view_location();
    frame.drain_events();

    // The hex editor has no IL modes.
    let location = ViewLocation::with_il("hex", GREETING, IlViewType::MediumLevelIl);
    let err = frame.set_view_location(&location).unwrap_err();
    assert!(matches!(err, NavError::NavigationRejected { .. }));
    assert_eq!(frame.get_view_location(), before);
    assert!(!frame.can_go_back());
    assert!(!frame.cached_view_types().contains(&"hex".to_string()));
    assert!(frame.drain_events().is_empty());

    // Listings do, and the mode sticks.
    let il = ViewLocation::with_il("linear", GREETING, IlViewType::MediumLevelIl);
    frame.set_view_location(&il).unwrap();
    assert_eq!(frame.get_view_location().il_view_type(), IlViewType::MediumLevelIl);
}

#[test]
fn test_set_view_location_requires_matching_instruction_index() {
    let mut frame = sample_frame();
    frame.navigate("linear", MAIN, true, true).unwrap();
    let before = frame.get_view_location();

    // MAIN_CALL is instruction 2 of main, not 0.
    let location = ViewLocation::with_instruction("linear", MAIN_CALL, IlViewType::Normal, 0);
    assert!(frame.set_view_location(&location).is_err());
    assert_eq!(frame.get_view_location(), before);
    assert_eq!(frame.current_offset(), Some(MAIN));
    assert!(!frame.can_go_back());

    let location = ViewLocation::with_instruction("linear", MAIN_CALL, IlViewType::Normal, 2);
    frame.set_view_location(&location).unwrap();
    assert_eq!(frame.get_view_location(), location);
}

#[test]
fn test_function_navigation_honours_graph_preference() {
    let mut frame = sample_frame();
    let document = frame.context().primary();
    let main = document.function_at(MAIN).unwrap();

    frame.navigate_to_function(&main, MAIN_CALL).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("linear"));
    assert_eq!(frame.current_function().map(|f| f.name.as_str()), Some("main"));

    frame.set_graph_view_preferred(true);
    frame.go_to_reference(Some(&main), MAIN_CALL, CALLEE).unwrap();
    assert_eq!(frame.current_view_type().as_deref(), Some("graph"));
    assert_eq!(frame.current_offset(), Some(CALLEE));
    assert_eq!(frame.current_function().map(|f| f.name.as_str()), Some("callee"));
}

#[test]
fn test_available_types() {
    let frame = sample_frame();
    assert_eq!(
        frame.get_available_types(),
        vec!["linear", "graph", "hex", "types", "linear:Raw", "hex:Raw"]
    );
}
