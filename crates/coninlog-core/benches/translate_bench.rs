//! Criterion benchmarks for the key record translator.
//!
//! The translator runs once per keystroke on the reader thread, between the
//! blocking console read and the channel send.
//!
//! Run with:
//! ```bash
//! cargo bench --package coninlog-core --bench translate_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use coninlog_core::{translate_key, translate_record, KeyRecord, RawInputRecord};

fn sample_records() -> Vec<RawInputRecord> {
    let mut records = Vec::with_capacity(64);
    for vk in 0x41u16..0x5B {
        let key = KeyRecord {
            key_down: 1,
            repeat_count: 1,
            virtual_key_code: vk,
            virtual_scan_code: vk - 0x23,
            unicode_char: vk,
            control_key_state: 0x0020,
        };
        records.push(RawInputRecord::Key(key));
        records.push(RawInputRecord::Key(KeyRecord { key_down: 0, ..key }));
    }
    records.push(RawInputRecord::Mouse);
    records.push(RawInputRecord::Focus);
    records
}

fn bench_translate_key(c: &mut Criterion) {
    let record = KeyRecord {
        key_down: 1,
        repeat_count: 1,
        virtual_key_code: 0x41,
        virtual_scan_code: 0x1E,
        unicode_char: 0x41,
        control_key_state: 0,
    };
    c.bench_function("translate_key", |b| b.iter(|| translate_key(black_box(&record))));
}

fn bench_translate_mixed_stream(c: &mut Criterion) {
    let records = sample_records();
    c.bench_function("translate_record/mixed_stream", |b| {
        b.iter(|| {
            records
                .iter()
                .filter_map(|r| translate_record(black_box(r)))
                .count()
        })
    });
}

criterion_group!(benches, bench_translate_key, bench_translate_mixed_stream);
criterion_main!(benches);
