//! Sequencer - real-time score playback
//!
//! Walks a score in order. Each note is looked up, synthesized, queued on the
//! sink, then held for its duration with a wall-clock wait. Rests only wait.
//! An entry never starts before the previous entry's wait has returned.

use crate::dsp::{synthesize, PcmBuffer};
use crate::io::{AudioBackend, AudioSink, AudioSpec};

use super::frequency::{FrequencyTable, OutOfRangeError};
use super::notes::{Note, ScoreEntry};
use super::score::Score;

/// What happened during one pass over a score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Notes whose audio reached the device queue
    pub notes_played: usize,
    pub rests: usize,
    /// Score indices of notes whose audio was dropped
    pub dropped: Vec<usize>,
    pub bytes_queued: usize,
}

impl PlaybackReport {
    /// True when every note made it onto the queue
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Drives a score through an audio sink.
pub struct Sequencer<'t> {
    table: &'t FrequencyTable,
    sample_rate_hz: u32,
    /// Peak sample value, 0-127
    amplitude: f64,
}

impl<'t> Sequencer<'t> {
    pub fn new(table: &'t FrequencyTable, spec: &AudioSpec, amplitude: f64) -> Self {
        Self {
            table,
            sample_rate_hz: spec.sample_rate_hz,
            amplitude,
        }
    }

    /// Synthesize one note at the sequencer's rate and amplitude.
    pub fn render_note(&self, note: &Note) -> Result<PcmBuffer, OutOfRangeError> {
        let frequency = self.table.frequency(note.pitch_class(), note.octave())?;
        Ok(synthesize(
            frequency,
            note.duration_ms(),
            self.amplitude,
            self.sample_rate_hz,
        ))
    }

    /// Play `score` through `sink`, pacing every entry in real time.
    ///
    /// A note that cannot be queued is logged and skipped; its duration is
    /// still waited out so later entries keep their timing.
    pub fn play<B: AudioBackend>(&self, score: &Score, sink: &mut AudioSink<'_, B>) -> PlaybackReport {
        let mut report = PlaybackReport::default();

        for (index, entry) in score.iter().enumerate() {
            match entry {
                ScoreEntry::Rest(rest) => {
                    log::debug!(target: "pcmtune::sequencer", "[{index}] rest {} ms", rest.duration_ms());
                    report.rests += 1;
                    sink.wait(rest.duration_ms());
                }
                ScoreEntry::Note(note) => {
                    log::debug!(target: "pcmtune::sequencer", "[{index}] note {note}");
                    let queued = self
                        .render_note(note)
                        .map_err(|e| e.to_string())
                        .and_then(|buffer| sink.enqueue(&buffer).map_err(|e| e.to_string()));

                    match queued {
                        Ok(bytes) => {
                            report.notes_played += 1;
                            report.bytes_queued += bytes;
                        }
                        Err(e) => {
                            log::warn!(
                                target: "pcmtune::sequencer",
                                "dropped audio for entry {index} ({note}): {e}"
                            );
                            report.dropped.push(index);
                        }
                    }
                    sink.wait(note.duration_ms());
                }
            }
        }

        report
    }

    /// Synthesize every note ahead of time. Rests map to `None`.
    pub fn prerender(&self, score: &Score) -> Result<Vec<Option<PcmBuffer>>, OutOfRangeError> {
        score
            .iter()
            .map(|entry| match entry {
                ScoreEntry::Note(note) => self.render_note(note).map(Some),
                ScoreEntry::Rest(_) => Ok(None),
            })
            .collect()
    }

    /// Render the whole score into one continuous buffer. Rests become silence.
    pub fn bounce(&self, score: &Score) -> Result<PcmBuffer, OutOfRangeError> {
        let mut out = PcmBuffer::default();
        for entry in score {
            match entry {
                ScoreEntry::Note(note) => out.extend(&self.render_note(note)?),
                ScoreEntry::Rest(rest) => out.extend(&synthesize(
                    0.0,
                    rest.duration_ms(),
                    0.0,
                    self.sample_rate_hz,
                )),
            }
        }
        Ok(out)
    }
}
