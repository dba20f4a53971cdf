//! One playback session, start to finish.
//!
//! ```ignore
//! use pcmtune::{session, io::CpalBackend, sequencing::Score};
//!
//! let config = session::SessionConfig::new().with_amplitude(30);
//! let report = session::run(CpalBackend::new(), &config, &Score::default_tune())?;
//! ```

use crate::dsp::oscillator::MAX_AMPLITUDE;
use crate::io::{AudioBackend, AudioSpec, AudioSubsystem, DeviceOpenError, SubsystemError};
use crate::sequencing::{FrequencyTable, PlaybackReport, Score, Sequencer};

/// Peak sample value used when none is configured.
pub const DEFAULT_AMPLITUDE: u8 = 20;

/// Rejected session settings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("amplitude {0} exceeds {max}", max = MAX_AMPLITUDE)]
    AmplitudeTooLarge(u8),
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("channel count must be positive")]
    ZeroChannels,
    #[error("buffer size must be positive")]
    ZeroBufferSamples,
}

/// Fatal session failures. Queue errors are not here: they drop one note.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Subsystem(#[from] SubsystemError),
    #[error(transparent)]
    DeviceOpen(#[from] DeviceOpenError),
}

/// Where and how loud to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Output device name; `None` picks the default device
    pub device_name: Option<String>,
    pub spec: AudioSpec,
    /// Peak sample value, 0-127
    pub amplitude: u8,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            device_name: None,
            spec: AudioSpec::default(),
            amplitude: DEFAULT_AMPLITUDE,
        }
    }

    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn with_spec(mut self, spec: AudioSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_amplitude(mut self, amplitude: u8) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amplitude as f64 > MAX_AMPLITUDE {
            return Err(ConfigError::AmplitudeTooLarge(self.amplitude));
        }
        if self.spec.sample_rate_hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.spec.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.spec.buffer_samples == 0 {
            return Err(ConfigError::ZeroBufferSamples);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Init the subsystem, open a device, play `score`, then close and quit.
///
/// Close and quit happen on every path that acquired them, including an
/// early return on a failed open.
pub fn run<B: AudioBackend>(
    backend: B,
    config: &SessionConfig,
    score: &Score,
) -> Result<PlaybackReport, SessionError> {
    config.validate()?;
    let table = FrequencyTable::new();

    let mut subsystem = AudioSubsystem::init(backend)?;
    let mut sink = subsystem
        .open_device(config.device_name.as_deref(), &config.spec)
        .inspect_err(|e| log::error!(target: "pcmtune::session", "{e}"))?;

    // Devices open paused
    if let Err(e) = sink.set_paused(false) {
        log::error!(target: "pcmtune::session", "could not unpause {}: {e}", sink.handle());
    }

    log::info!(
        target: "pcmtune::session",
        "playing {} entries ({} ms) on {}",
        score.len(),
        score.total_duration_ms(),
        config.device_name.as_deref().unwrap_or("default device")
    );

    let sequencer = Sequencer::new(&table, sink.spec(), config.amplitude as f64);
    let report = sequencer.play(score, &mut sink);
    sink.close();

    if report.is_clean() {
        log::info!(
            target: "pcmtune::session",
            "played {} notes, {} rests",
            report.notes_played,
            report.rests
        );
    } else {
        log::warn!(
            target: "pcmtune::session",
            "played {} notes, {} rests, dropped {}",
            report.notes_played,
            report.rests,
            report.dropped.len()
        );
    }

    Ok(report)
}
