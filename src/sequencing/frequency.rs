/*
Equal-Tempered Frequency Table
==============================

Equal temperament splits the octave into 12 semitones with a constant ratio
between neighbours:

    r = 2^(1/12) ≈ 1.059463

Counting semitones upward from C0 (16.35 Hz), a note `n` semitones above the
base sits at:

    f(n) = 16.35 * r^n        where n = semitone + 12 * octave

Twelve semitones is exactly one factor of two, so every octave doubles the
frequency:

    C0 = 16.35 Hz    C1 = 32.70 Hz    C4 = 261.6 Hz    A4 ≈ 440.0 Hz

The table below caches this formula for octaves 0..=8 (9 x 12 = 108 entries).
It is built once and never mutated, so a shared reference can be read from
any thread. The formula is the source of truth; the table is only a cache.

Note that the top octaves (7, 8) land above 2 kHz. At 44.1 kHz with 8-bit
samples they are audible but coarse, and nothing here band-limits them.
*/

use super::pitch::PitchClass;

/// Frequency of C in octave 0.
pub const BASE_FREQUENCY_HZ: f64 = 16.35;

/// Highest octave covered by the table.
pub const MAX_OCTAVE: u8 = 8;

const OCTAVES: usize = MAX_OCTAVE as usize + 1;
const SEMITONES: usize = 12;

/// Lookup outside octaves 0..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("octave {octave} is outside the supported range 0..={max}", max = MAX_OCTAVE)]
pub struct OutOfRangeError {
    pub octave: u8,
}

/// Closed-form equal temperament frequency for a semitone offset above C0.
#[inline]
pub fn equal_tempered(semitones_above_base: u32) -> f64 {
    BASE_FREQUENCY_HZ * 2.0_f64.powf(semitones_above_base as f64 / SEMITONES as f64)
}

/// Precomputed (pitch class, octave) -> Hz lookup.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    entries: [[f64; SEMITONES]; OCTAVES],
}

impl FrequencyTable {
    /// Build the full table. Every entry is populated before this returns.
    pub fn new() -> Self {
        let mut entries = [[0.0; SEMITONES]; OCTAVES];
        for (octave, row) in entries.iter_mut().enumerate() {
            for (semitone, slot) in row.iter_mut().enumerate() {
                *slot = equal_tempered((semitone + SEMITONES * octave) as u32);
            }
        }
        Self { entries }
    }

    /// Frequency in Hz of `pitch_class` in `octave`.
    pub fn frequency(&self, pitch_class: PitchClass, octave: u8) -> Result<f64, OutOfRangeError> {
        self.entries
            .get(octave as usize)
            .map(|row| row[pitch_class.semitone()])
            .ok_or(OutOfRangeError { octave })
    }

    /// Number of cached entries (always 108).
    pub fn len(&self) -> usize {
        OCTAVES * SEMITONES
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
