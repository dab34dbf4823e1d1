#![no_main]
use glaurung_nav::{FindConfig, FindEngine, FindFlags, MemoryDocument};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let split = (data[0] as usize) % data.len();
    let (needle, haystack) = data[1..].split_at(split.min(data.len() - 1));
    let config = FindConfig {
        chunk_size: 7,
        ..FindConfig::default()
    };
    let doc = MemoryDocument::new("Raw", 0x400, haystack.to_vec());
    let engine = FindEngine::new(config);
    for flags in [FindFlags::empty(), FindFlags::CASE_INSENSITIVE] {
        if let Some(found) = engine
            .find_next_data(&doc, 0, u64::MAX, needle, flags, &mut |_, _| true)
            .address()
        {
            assert!(found >= 0x400);
        }
    }
});
