//! Benchmarks for low-level DSP primitives.

mod frequency;
mod oscillator;

pub use frequency::bench_frequency;
pub use oscillator::bench_oscillator;
