use std::str::FromStr;

use super::notes::{Note, NoteError, Rest, ScoreEntry};
use super::pitch::PitchClass;

const DEFAULT_RIFF: [ScoreEntry; 6] = [
    ScoreEntry::Note(Note::new(PitchClass::E)),
    ScoreEntry::Note(Note::from_parts(PitchClass::E, 3, 300)),
    ScoreEntry::Note(Note::from_parts(PitchClass::E, 4, 300)),
    ScoreEntry::Note(Note::from_parts(PitchClass::As, 3, 300)),
    ScoreEntry::Note(Note::from_parts(PitchClass::A, 3, 300)),
    ScoreEntry::Rest(Rest::from_millis(500)),
];

/// An ordered list of notes and rests. Order is playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    entries: Vec<ScoreEntry>,
}

impl Score {
    /// Start building a score with the fluent API
    pub fn builder() -> ScoreBuilder {
        ScoreBuilder::new()
    }

    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        Self { entries }
    }

    /// The built-in melody: a short riff played twice.
    pub fn default_tune() -> Self {
        Score::builder()
            .entries(DEFAULT_RIFF)
            .repeat(2)
            .build()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wall-clock length of the whole score in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.entries.iter().map(|e| e.duration_ms() as u64).sum()
    }
}

impl<'a> IntoIterator for &'a Score {
    type Item = &'a ScoreEntry;
    type IntoIter = std::slice::Iter<'a, ScoreEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builder for constructing scores with a fluent API
#[derive(Debug, Clone, Default)]
pub struct ScoreBuilder {
    entries: Vec<ScoreEntry>,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note with the default octave and duration
    pub fn note(mut self, pitch_class: PitchClass) -> Self {
        self.entries.push(Note::new(pitch_class).into());
        self
    }

    /// Add a note with an explicit octave and duration
    pub fn note_at(
        mut self,
        pitch_class: PitchClass,
        octave: u8,
        duration_ms: u32,
    ) -> Result<Self, NoteError> {
        let note = Note::try_new(pitch_class, Some(octave), Some(duration_ms))?;
        self.entries.push(note.into());
        Ok(self)
    }

    /// Add a rest (silence) of the given length
    pub fn rest(mut self, duration_ms: u32) -> Result<Self, NoteError> {
        self.entries.push(Rest::new(duration_ms)?.into());
        Ok(self)
    }

    /// Add an already constructed entry
    pub fn entry(mut self, entry: impl Into<ScoreEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Add several entries at once
    pub fn entries(mut self, entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Repeat everything added so far `n` times in total
    pub fn repeat(mut self, n: usize) -> Self {
        let once = std::mem::take(&mut self.entries);
        self.entries = once.iter().copied().cycle().take(once.len() * n).collect();
        self
    }

    pub fn build(self) -> Score {
        Score {
            entries: self.entries,
        }
    }
}

/// A token in a text score that failed to parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("score token {index} ({token:?}): {source}")]
pub struct ScoreParseError {
    /// 0-based position of the token
    pub index: usize,
    pub token: String,
    #[source]
    pub source: NoteError,
}

impl FromStr for Score {
    type Err = ScoreParseError;

    /// Parse whitespace- or comma-separated entry tokens, e.g. `"e as:3:300 500"`.
    ///
    /// A rest token of `0` waits for nothing and is skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .enumerate()
            .filter(|(_, token)| token.parse::<u32>() != Ok(0))
            .map(|(index, token)| {
                token.parse::<ScoreEntry>().map_err(|source| ScoreParseError {
                    index,
                    token: token.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Score { entries })
    }
}
