#![no_main]
use glaurung_nav::{ExpressionResolver, MemoryDocument, SimpleResolver};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let doc = MemoryDocument::new("Raw", 0x1000, vec![0; 64]).with_symbol("main", 0x1010);
        let _ = SimpleResolver.resolve(&doc, text, 0x1000);
    }
});
