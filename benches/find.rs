use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use glaurung_nav::core::DisassemblySettings;
use glaurung_nav::{FindConfig, FindEngine, FindFlags, FindPattern, MemoryDocument};

fn document(len: usize) -> MemoryDocument {
    // Pseudo-random filler with the needle near the end
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let mut bytes: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect();
    let at = len - 64;
    bytes[at..at + 11].copy_from_slice(b"hello world");
    MemoryDocument::new("Raw", 0, bytes)
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    let engine = FindEngine::new(FindConfig::default());
    let settings = DisassemblySettings::default();

    for len in [64 * 1024, 1024 * 1024] {
        let doc = document(len);
        group.throughput(Throughput::Bytes(len as u64));
        for (name, flags) in [
            ("data", FindFlags::empty()),
            ("data_nocase", FindFlags::CASE_INSENSITIVE),
        ] {
            let pattern = FindPattern::Data(b"HELLO world".to_vec());
            group.bench_function(format!("{}/{}", name, len), |b| {
                b.iter(|| {
                    engine.find(&doc, &pattern, 0, len as u64, flags, &settings, &mut |_, _| true)
                })
            });
        }
    }

    // Text search renders every line, so keep the input small.
    let doc = document(16 * 1024);
    let pattern = FindPattern::Text("nomatch".into());
    group.throughput(Throughput::Bytes(16 * 1024));
    group.bench_function("text/16384", |b| {
        b.iter(|| {
            engine.find(
                &doc,
                &pattern,
                0,
                16 * 1024,
                FindFlags::empty(),
                &settings,
                &mut |_, _| true,
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_find);
criterion_main!(benches);
