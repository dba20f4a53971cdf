pub mod frequency;
pub mod notes;
pub mod pitch;
pub mod score;
pub mod sequencer;

pub use frequency::{FrequencyTable, OutOfRangeError, MAX_OCTAVE};
pub use notes::{Note, NoteError, Rest, ScoreEntry, DEFAULT_DURATION_MS, DEFAULT_OCTAVE};
pub use pitch::PitchClass;
pub use score::{Score, ScoreBuilder, ScoreParseError};
pub use sequencer::{PlaybackReport, Sequencer};
