//! Benchmarks for sine synthesis into 8-bit PCM.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pcmtune::dsp::synthesize;

use crate::NOTE_LENGTHS_MS;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &ms in NOTE_LENGTHS_MS {
        // A4 at the default amplitude
        group.bench_with_input(BenchmarkId::new("sine", ms), &ms, |b, &ms| {
            b.iter(|| synthesize(black_box(440.0), black_box(ms), 20.0, 44_100))
        });

        // Zero frequency short-circuits to a zeroed buffer
        group.bench_with_input(BenchmarkId::new("silence", ms), &ms, |b, &ms| {
            b.iter(|| synthesize(black_box(0.0), black_box(ms), 20.0, 44_100))
        });
    }

    group.finish();
}
