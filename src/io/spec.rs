#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// On-the-wire sample encoding. Only signed 8-bit PCM is produced.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    #[default]
    S8,
}

impl SampleFormat {
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::S8 => 1,
        }
    }
}

/// Requested (or granted) device configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate_hz: u32,
    pub format: SampleFormat,
    /// 1 = mono
    pub channels: u16,
    /// Device-side buffer size in sample frames
    pub buffer_samples: u16,
}

impl AudioSpec {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;
    pub const DEFAULT_BUFFER_SAMPLES: u16 = 1024;

    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            ..Self::default()
        }
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_buffer_samples(mut self, buffer_samples: u16) -> Self {
        self.buffer_samples = buffer_samples;
        self
    }

    /// Bytes the device consumes per second of playback.
    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate_hz as usize * self.channels as usize * self.format.bytes_per_sample()
    }
}

impl Default for AudioSpec {
    fn default() -> Self {
        Self {
            sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            format: SampleFormat::S8,
            channels: 1,
            buffer_samples: Self::DEFAULT_BUFFER_SAMPLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_cd_rate_mono_s8() {
        let spec = AudioSpec::default();
        assert_eq!(spec.sample_rate_hz, 44_100);
        assert_eq!(spec.format, SampleFormat::S8);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.buffer_samples, 1024);
    }

    #[test]
    fn bytes_per_second_scales_with_channels() {
        let spec = AudioSpec::new(8_000).with_channels(2);
        assert_eq!(spec.bytes_per_second(), 16_000);
    }
}
