pub mod dsp; // Sine synthesis into 8-bit PCM
pub mod io; // Platform audio API and the device sink
pub mod sequencing; // Pitches, notes, scores and playback ordering
pub mod session;

pub use dsp::PcmBuffer;
pub use io::{AudioSpec, DeviceHandle};
pub use sequencing::{FrequencyTable, Note, PitchClass, Rest, Score, ScoreEntry, Sequencer};
