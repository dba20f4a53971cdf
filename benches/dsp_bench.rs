//! Benchmarks for synthesis and pitch lookup.
//!
//! Run with: cargo bench
//!
//! A note has to be synthesized before its wait starts, so rendering time
//! is added to the gap between notes. Reference lengths at 44.1 kHz:
//!   - 100 ms  =  4_410 samples
//!   - 300 ms  = 13_230 samples
//!   - 1000 ms = 44_100 samples

use criterion::{criterion_group, criterion_main};

mod dsp;

/// Note lengths (ms) exercised by the synthesis benchmarks.
pub const NOTE_LENGTHS_MS: &[u32] = &[100, 300, 1000];

criterion_group!(benches, dsp::bench_oscillator, dsp::bench_frequency);
criterion_main!(benches);
