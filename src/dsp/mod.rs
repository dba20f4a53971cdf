//! Low-level DSP primitives.
//!
//! Everything here is a pure function of its inputs: no shared state, no
//! device access. The sequencer calls into it once per note and hands the
//! result to the audio sink.

/// Sine synthesis into quantized 8-bit PCM buffers.
pub mod oscillator;

pub use oscillator::{synthesize, PcmBuffer};
