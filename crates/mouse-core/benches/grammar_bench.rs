//! Criterion benchmarks for the control-channel command grammar.
//!
//! Every line a client sends goes through `parse_line`, so the grammar sits on
//! the hot path of pointer movement.
//!
//! Run with:
//! ```bash
//! cargo bench --package mouse-core --bench grammar_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mouse_core::parse_line;

// ── Line fixtures ─────────────────────────────────────────────────────────────

const LINES: [(&str, &str); 6] = [
    ("move", "MOVE 12 -7"),
    ("left_click", "LEFT_CLICK"),
    ("scroll", "SCROLL -120"),
    ("press", "PRESS Enter"),
    ("keyboard", "KEYBOARD the quick brown fox jumps over the lazy dog"),
    ("unknown", "TELEPORT 1 2"),
];

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");
    for (name, line) in LINES {
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, line| {
            b.iter(|| {
                let _ = black_box(parse_line(black_box(line)));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_line);
criterion_main!(benches);
