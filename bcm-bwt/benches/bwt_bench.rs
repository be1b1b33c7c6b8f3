//! Performance benchmarks for bcm-bwt.
//!
//! Measures forward transform and both inverse engines across data patterns
//! and block sizes, with throughput reporting.

use bcm_bwt::{invert, invert_packed, transform};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - no patterns (worst case for the suffix sort early exit)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Text-like data - realistic scenario
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! ";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            let chunk_size = remaining.min(text.len());
            data.extend_from_slice(&text[..chunk_size]);
        }
        data
    }

    /// Uniform data - the doubling sort's slowest convergence
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }
}

const SIZES: [(&str, usize); 3] = [
    ("1KB", 1024),
    ("16KB", 16 * 1024),
    ("256KB", 256 * 1024),
];

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt_forward");

    for (size_name, size) in SIZES {
        let data = test_data::text_like(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| {
                let mut block = data.clone();
                let primary = transform(black_box(&mut block));
                black_box((block, primary));
            });
        });
    }

    group.finish();
}

fn bench_forward_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt_forward_patterns");

    let size = 64 * 1024;
    let patterns: [(&str, Vec<u8>); 3] = [
        ("random", test_data::random(size)),
        ("text", test_data::text_like(size)),
        ("uniform", test_data::uniform(size)),
    ];

    for (name, data) in patterns {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let mut block = data.clone();
                let primary = transform(black_box(&mut block));
                black_box((block, primary));
            });
        });
    }

    group.finish();
}

fn bench_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt_inverse");

    for (size_name, size) in SIZES {
        let mut block = test_data::text_like(size);
        let primary = transform(&mut block);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("separate", size_name),
            &(block.clone(), primary),
            |b, (block, primary)| {
                b.iter(|| {
                    let mut next = vec![0u32; block.len()];
                    let restored: Vec<u8> =
                        invert(black_box(block), &mut next, *primary).collect();
                    black_box(restored);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("packed", size_name),
            &(block, primary),
            |b, (block, primary)| {
                b.iter(|| {
                    let mut slots: Vec<u32> = block.iter().map(|&x| u32::from(x)).collect();
                    let restored: Vec<u8> =
                        invert_packed(black_box(&mut slots), *primary).collect();
                    black_box(restored);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_forward, bench_forward_patterns, bench_inverse);
criterion_main!(benches);
