//! Command-line options

use std::path::PathBuf;

use clap::Parser;
use pcmtune::{
    io::AudioSpec,
    sequencing::Score,
    session::{SessionConfig, DEFAULT_AMPLITUDE},
};

/// Play a melody of sine tones through an audio device.
///
/// Scores are whitespace-separated tokens: a bare number is a rest in
/// milliseconds, anything else is `pitch[:octave[:ms]]` (e.g. `e`, `as:3:300`).
#[derive(Parser, Debug)]
#[command(name = "pcmtune", version)]
pub struct Cli {
    /// Output device name (default device when omitted)
    #[arg(long)]
    pub device: Option<String>,

    /// Peak sample value
    #[arg(long, default_value_t = DEFAULT_AMPLITUDE, value_parser = clap::value_parser!(u8).range(0..=127))]
    pub amplitude: u8,

    #[arg(long, default_value_t = AudioSpec::DEFAULT_SAMPLE_RATE_HZ)]
    pub sample_rate: u32,

    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Device buffer size in sample frames
    #[arg(long, default_value_t = AudioSpec::DEFAULT_BUFFER_SAMPLES)]
    pub buffer_samples: u16,

    /// Score to play (built-in tune when omitted)
    #[arg(long)]
    pub score: Option<Score>,

    /// Run the session against an offline device: no sound, no sleeping
    #[arg(long, conflicts_with = "bounce")]
    pub dry_run: bool,

    /// Write the score as raw signed 8-bit mono PCM to PATH instead of playing
    #[arg(long, value_name = "PATH")]
    pub bounce: Option<PathBuf>,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        let spec = AudioSpec::new(self.sample_rate)
            .with_channels(self.channels)
            .with_buffer_samples(self.buffer_samples);

        let config = SessionConfig::new()
            .with_spec(spec)
            .with_amplitude(self.amplitude);

        match &self.device {
            Some(name) => config.with_device(name.clone()),
            None => config,
        }
    }

    pub fn score(&self) -> Score {
        self.score.clone().unwrap_or_else(Score::default_tune)
    }
}
