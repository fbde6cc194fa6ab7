//! Debug line reassembly benchmarks.
//!
//! The page path runs once per poll while a transfer drains, so its cost
//! bounds how fast a caller can sweep the full line array.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use simbus_client::DebugLineSet;

const PAGE_LINES: usize = 4096;

/// Pack a page the way the server lays it out: from-points, to-points,
/// colors, back to back.
fn pack_page(lines: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(lines * 36);
    for section in 0..3u32 {
        for i in 0..lines {
            for axis in 0..3u32 {
                let v = (section * 1000 + axis) as f32 + i as f32 * 0.25;
                bytes.extend_from_slice(&v.to_ne_bytes());
            }
        }
    }
    bytes
}

fn bench_apply_page(c: &mut Criterion) {
    let page = pack_page(PAGE_LINES);

    c.bench_function("apply_page_fresh_4096", |b| {
        b.iter(|| {
            let mut set = DebugLineSet::default();
            set.apply_page(black_box(&page), 0, PAGE_LINES);
            black_box(set.len())
        })
    });

    c.bench_function("apply_page_overwrite_4096", |b| {
        let mut set = DebugLineSet::default();
        set.apply_page(&page, 0, PAGE_LINES);
        b.iter(|| {
            set.apply_page(black_box(&page), 0, PAGE_LINES);
            black_box(set.len())
        })
    });

    c.bench_function("apply_page_tail_of_64k", |b| {
        let mut set = DebugLineSet::default();
        set.apply_page(&page, 65536 - PAGE_LINES, PAGE_LINES);
        b.iter(|| {
            set.apply_page(black_box(&page), 65536 - PAGE_LINES, PAGE_LINES);
            black_box(set.len())
        })
    });
}

criterion_group!(benches, bench_apply_page);
criterion_main!(benches);
