/*
Notes and Rests
===============

A score is built from two kinds of entry:

  Note   pitch class + octave + duration. Synthesized and queued.
  Rest   duration only. Nothing is synthesized; playback just waits.

Omitted fields fall back to defaults: octave 3, 500 ms. Values are validated
when a note is constructed, so a `Note` held anywhere is always playable:

  octave     0..=8   (the range of the frequency table)
  duration   > 0 ms

Text form (one token per entry):

  500          rest, 500 ms
  e            note e, octave 3, 500 ms
  as:3:300     note a#, octave 3, 300 ms
  c#:4         note c#, octave 4, 500 ms
*/

use std::fmt;
use std::str::FromStr;

use super::frequency::MAX_OCTAVE;
use super::pitch::PitchClass;

/// Octave used when a note does not name one.
pub const DEFAULT_OCTAVE: u8 = 3;
/// Duration used when a note does not name one.
pub const DEFAULT_DURATION_MS: u32 = 500;

/// Errors raised while constructing or parsing notes and rests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("unknown pitch class {0:?}")]
    UnknownPitchClass(String),
    #[error("octave {0} is outside 0..={max}", max = MAX_OCTAVE)]
    InvalidOctave(u8),
    #[error("duration must be a positive number of milliseconds")]
    InvalidDuration,
    #[error("malformed score entry {0:?}")]
    Malformed(String),
}

/// A pitched entry: what to synthesize and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pitch_class: PitchClass,
    octave: u8,
    duration_ms: u32,
}

impl Note {
    /// Note with the default octave and duration.
    pub const fn new(pitch_class: PitchClass) -> Self {
        Self {
            pitch_class,
            octave: DEFAULT_OCTAVE,
            duration_ms: DEFAULT_DURATION_MS,
        }
    }

    /// Construct from values already known to be in range.
    pub(crate) const fn from_parts(pitch_class: PitchClass, octave: u8, duration_ms: u32) -> Self {
        Self {
            pitch_class,
            octave,
            duration_ms,
        }
    }

    /// Note with explicit fields; `None` takes the default.
    pub fn try_new(
        pitch_class: PitchClass,
        octave: Option<u8>,
        duration_ms: Option<u32>,
    ) -> Result<Self, NoteError> {
        let mut note = Self::new(pitch_class);
        if let Some(octave) = octave {
            note = note.with_octave(octave)?;
        }
        if let Some(duration_ms) = duration_ms {
            note = note.with_duration_ms(duration_ms)?;
        }
        Ok(note)
    }

    pub fn with_octave(mut self, octave: u8) -> Result<Self, NoteError> {
        if octave > MAX_OCTAVE {
            return Err(NoteError::InvalidOctave(octave));
        }
        self.octave = octave;
        Ok(self)
    }

    pub fn with_duration_ms(mut self, duration_ms: u32) -> Result<Self, NoteError> {
        if duration_ms == 0 {
            return Err(NoteError::InvalidDuration);
        }
        self.duration_ms = duration_ms;
        Ok(self)
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.pitch_class, self.octave, self.duration_ms)
    }
}

/// Silence of a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rest {
    duration_ms: u32,
}

impl Rest {
    pub fn new(duration_ms: u32) -> Result<Self, NoteError> {
        if duration_ms == 0 {
            return Err(NoteError::InvalidDuration);
        }
        Ok(Self { duration_ms })
    }

    pub(crate) const fn from_millis(duration_ms: u32) -> Self {
        Self { duration_ms }
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

/// One step of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEntry {
    Note(Note),
    Rest(Rest),
}

impl ScoreEntry {
    /// How long this entry occupies the timeline.
    pub fn duration_ms(&self) -> u32 {
        match self {
            ScoreEntry::Note(note) => note.duration_ms(),
            ScoreEntry::Rest(rest) => rest.duration_ms(),
        }
    }
}

impl From<Note> for ScoreEntry {
    fn from(note: Note) -> Self {
        ScoreEntry::Note(note)
    }
}

impl From<Rest> for ScoreEntry {
    fn from(rest: Rest) -> Self {
        ScoreEntry::Rest(rest)
    }
}

impl From<PitchClass> for ScoreEntry {
    fn from(pitch_class: PitchClass) -> Self {
        ScoreEntry::Note(Note::new(pitch_class))
    }
}

impl fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreEntry::Note(note) => fmt::Display::fmt(note, f),
            ScoreEntry::Rest(rest) => write!(f, "{}", rest.duration_ms),
        }
    }
}

impl FromStr for ScoreEntry {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(NoteError::Malformed(s.to_string()));
        }

        // Bare integer = rest
        if token.chars().all(|c| c.is_ascii_digit()) {
            let ms = token
                .parse::<u32>()
                .map_err(|_| NoteError::Malformed(s.to_string()))?;
            return Rest::new(ms).map(ScoreEntry::Rest);
        }

        let mut fields = token.split(':');
        let pitch_class = fields
            .next()
            .ok_or_else(|| NoteError::Malformed(s.to_string()))?
            .parse::<PitchClass>()?;
        let octave = fields
            .next()
            .map(|f| f.parse::<u8>().map_err(|_| NoteError::Malformed(s.to_string())))
            .transpose()?;
        let duration_ms = fields
            .next()
            .map(|f| f.parse::<u32>().map_err(|_| NoteError::Malformed(s.to_string())))
            .transpose()?;
        if fields.next().is_some() {
            return Err(NoteError::Malformed(s.to_string()));
        }

        Note::try_new(pitch_class, octave, duration_ms).map(ScoreEntry::Note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let note = Note::new(PitchClass::E);
        assert_eq!(note.octave(), 3);
        assert_eq!(note.duration_ms(), 500);
    }

    #[test]
    fn try_new_fills_only_missing_fields() {
        let note = Note::try_new(PitchClass::As, Some(4), None).unwrap();
        assert_eq!(note.octave(), 4);
        assert_eq!(note.duration_ms(), DEFAULT_DURATION_MS);

        let note = Note::try_new(PitchClass::As, None, Some(300)).unwrap();
        assert_eq!(note.octave(), DEFAULT_OCTAVE);
        assert_eq!(note.duration_ms(), 300);
    }

    #[test]
    fn rejects_out_of_range_octave() {
        assert_eq!(
            Note::new(PitchClass::C).with_octave(9),
            Err(NoteError::InvalidOctave(9))
        );
        assert!(Note::new(PitchClass::C).with_octave(8).is_ok());
    }

    #[test]
    fn rejects_zero_durations() {
        assert_eq!(
            Note::new(PitchClass::C).with_duration_ms(0),
            Err(NoteError::InvalidDuration)
        );
        assert_eq!(Rest::new(0), Err(NoteError::InvalidDuration));
    }

    #[test]
    fn parses_rest_tokens() {
        let entry: ScoreEntry = "250".parse().unwrap();
        assert_eq!(entry, ScoreEntry::Rest(Rest::new(250).unwrap()));
        assert_eq!(entry.duration_ms(), 250);
    }

    #[test]
    fn parses_note_tokens() {
        let entry: ScoreEntry = "e".parse().unwrap();
        assert_eq!(entry, ScoreEntry::Note(Note::new(PitchClass::E)));

        let entry: ScoreEntry = "as:3:300".parse().unwrap();
        let expected = Note::try_new(PitchClass::As, Some(3), Some(300)).unwrap();
        assert_eq!(entry, ScoreEntry::Note(expected));

        let entry: ScoreEntry = "C#:4".parse().unwrap();
        let expected = Note::try_new(PitchClass::Cs, Some(4), None).unwrap();
        assert_eq!(entry, ScoreEntry::Note(expected));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            "e:3:300:1".parse::<ScoreEntry>(),
            Err(NoteError::Malformed(_))
        ));
        assert!(matches!(
            "e:x".parse::<ScoreEntry>(),
            Err(NoteError::Malformed(_))
        ));
        assert!(matches!(
            "e:9".parse::<ScoreEntry>(),
            Err(NoteError::InvalidOctave(9))
        ));
        assert!(matches!(
            "q:3".parse::<ScoreEntry>(),
            Err(NoteError::UnknownPitchClass(_))
        ));
        assert!(matches!(
            "-5".parse::<ScoreEntry>(),
            Err(NoteError::UnknownPitchClass(_))
        ));
    }

    #[test]
    fn display_uses_token_syntax() {
        let entry: ScoreEntry = "fs:2:125".parse().unwrap();
        assert_eq!(entry.to_string(), "fs:2:125");
        assert_eq!("125".parse::<ScoreEntry>().unwrap().to_string(), "125");
    }
}
