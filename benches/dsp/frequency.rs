//! Benchmarks for equal-tempered pitch lookup.

use std::hint::black_box;

use criterion::Criterion;
use pcmtune::sequencing::{frequency::equal_tempered, FrequencyTable, PitchClass, MAX_OCTAVE};

pub fn bench_frequency(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/frequency");
    let table = FrequencyTable::new();

    group.bench_function("table_build", |b| b.iter(FrequencyTable::new));

    group.bench_function("table_lookup", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for octave in 0..=MAX_OCTAVE {
                for pc in PitchClass::ALL {
                    sum += table.frequency(black_box(pc), black_box(octave)).unwrap_or(0.0);
                }
            }
            sum
        })
    });

    // The closed form the table caches
    group.bench_function("closed_form", |b| {
        b.iter(|| (0..108u32).map(|n| equal_tempered(black_box(n))).sum::<f64>())
    });

    group.finish();
}
