/*
Sine Synthesis to 8-bit PCM
===========================

A note becomes a block of signed 8-bit samples:

    sample_count = floor(sample_rate * duration_ms / 1000)

    for i in 0..sample_count:
        t      = i / sample_rate                  seconds since note start
        raw    = sin(2π * frequency * t) * amplitude
        sample = clamp(round(raw), -128, 127)

Amplitude is in sample units, not 0.0-1.0. At amplitude 127 the sine touches
full scale; anything louder is clamped, not rescaled, which squares off the
peaks. Callers keep |amplitude| <= 127.

    127 ┤   ╭─╮           amplitude = 127
        │  ╱   ╲
      0 ┼─╱─────╲─────╱──→ t
        │        ╲   ╱
   -128 ┤         ╰─╯

Phase restarts at zero for every note. Each call depends only on its
arguments, so buffers for different notes can be rendered on any thread.

A frequency of 0 Hz renders silence of the requested length.
*/

use std::f64::consts::TAU;

/// Largest amplitude that does not clip.
pub const MAX_AMPLITUDE: f64 = i8::MAX as f64;

/// One note's worth of signed 8-bit mono samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i8>,
}

impl PcmBuffer {
    pub fn new(samples: Vec<i8>) -> Self {
        Self { samples }
    }

    /// Buffer of `len` zero samples
    pub fn silence(len: usize) -> Self {
        Self {
            samples: vec![0; len],
        }
    }

    pub fn samples(&self) -> &[i8] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw bytes as they go onto the device queue (two's complement).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.samples.iter().map(|&s| s as u8).collect()
    }

    /// Append another buffer's samples
    pub fn extend(&mut self, other: &PcmBuffer) {
        self.samples.extend_from_slice(&other.samples);
    }

    /// Largest absolute sample value (0 for an empty buffer)
    pub fn peak(&self) -> u8 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Number of samples a note of `duration_ms` occupies at `sample_rate_hz`.
#[inline]
pub fn sample_count(duration_ms: u32, sample_rate_hz: u32) -> usize {
    (sample_rate_hz as u64 * duration_ms as u64 / 1000) as usize
}

/// Render a sine tone as quantized signed 8-bit PCM.
pub fn synthesize(
    frequency_hz: f64,
    duration_ms: u32,
    amplitude: f64,
    sample_rate_hz: u32,
) -> PcmBuffer {
    let len = sample_count(duration_ms, sample_rate_hz);
    if len == 0 {
        return PcmBuffer::default();
    }
    if frequency_hz == 0.0 || amplitude == 0.0 {
        return PcmBuffer::silence(len);
    }

    let sample_rate = sample_rate_hz as f64;
    let samples = (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let raw = (TAU * frequency_hz * t).sin() * amplitude;
            quantize(raw)
        })
        .collect();

    PcmBuffer { samples }
}

/// Round to the nearest step and clamp into the i8 range.
#[inline]
fn quantize(raw: f64) -> i8 {
    raw.round().clamp(i8::MIN as f64, i8::MAX as f64) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44_100;

    #[test]
    fn sample_count_is_floor_of_rate_times_duration() {
        assert_eq!(synthesize(440.0, 300, 20.0, SR).len(), 13_230);
        assert_eq!(synthesize(440.0, 1, 20.0, SR).len(), 44);
        assert_eq!(synthesize(440.0, 7, 20.0, 8_000).len(), 56);
        // 22_050 * 333 / 1000 = 7342.65 -> 7342
        assert_eq!(synthesize(440.0, 333, 20.0, 22_050).len(), 7_342);
    }

    #[test]
    fn zero_duration_is_empty() {
        assert!(synthesize(440.0, 0, 20.0, SR).is_empty());
    }

    #[test]
    fn zero_frequency_is_silence_of_full_length() {
        let buf = synthesize(0.0, 100, 100.0, SR);
        assert_eq!(buf.len(), 4_410);
        assert!(buf.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn zero_amplitude_is_silence() {
        let buf = synthesize(440.0, 50, 0.0, SR);
        assert_eq!(buf.len(), 2_205);
        assert_eq!(buf.peak(), 0);
    }

    #[test]
    fn samples_stay_within_amplitude() {
        for amplitude in [1.0, 20.0, 64.0, 127.0] {
            let buf = synthesize(261.63, 200, amplitude, SR);
            assert!(
                buf.samples().iter().all(|&s| (s as f64).abs() <= amplitude),
                "sample exceeded amplitude {amplitude}"
            );
        }
    }

    #[test]
    fn loud_input_is_clamped() {
        let buf = synthesize(100.0, 100, 1_000.0, SR);
        assert!(buf.samples().contains(&127));
        assert!(buf.samples().contains(&-128));
    }

    #[test]
    fn matches_rounded_sine() {
        let freq = 440.0;
        let buf = synthesize(freq, 10, 100.0, SR);
        for i in [0usize, 1, 25, 100, 400] {
            let t = i as f64 / SR as f64;
            let expected = ((TAU * freq * t).sin() * 100.0).round() as i8;
            assert_eq!(buf.samples()[i], expected, "sample {i}");
        }
        assert_eq!(buf.samples()[0], 0);
    }

    #[test]
    fn deterministic_across_calls() {
        let a = synthesize(329.63, 300, 20.0, SR);
        let b = synthesize(329.63, 300, 20.0, SR);
        assert_eq!(a, b);
    }

    #[test]
    fn bytes_are_twos_complement() {
        let buf = PcmBuffer::new(vec![0, 1, -1, 127, -128]);
        assert_eq!(buf.to_bytes(), vec![0x00, 0x01, 0xFF, 0x7F, 0x80]);
        assert_eq!(buf.peak(), 128);
    }
}
