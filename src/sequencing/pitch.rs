/*
Pitch Classes
=============

The twelve semitone names of the chromatic scale, in ascending order from C.
The position of a name in this ordering is its semitone index, which is what
the frequency table uses to place a note inside an octave.

  index:  0   1   2   3   4   5   6   7   8   9   10  11
  name:   c   c#  d   d#  e   f   f#  g   g#  a   a#  b

Naming Convention:
- Natural notes: c, d, e, ...
- Sharps are written with an `s` suffix (cs, ds, ...). `#` and `♯` are
  accepted on input as well, so `c#` and `c♯` parse to the same class.
- Flats are not part of the vocabulary.
*/

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::notes::NoteError;

/// One of the twelve semitone names, ordered from C.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All pitch classes in semitone order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// 0-based position of this class in the chromatic ordering starting at C.
    pub const fn semitone(self) -> usize {
        self as usize
    }

    /// Short lowercase name, as accepted by the score parser.
    pub const fn name(self) -> &'static str {
        match self {
            PitchClass::C => "c",
            PitchClass::Cs => "cs",
            PitchClass::D => "d",
            PitchClass::Ds => "ds",
            PitchClass::E => "e",
            PitchClass::F => "f",
            PitchClass::Fs => "fs",
            PitchClass::G => "g",
            PitchClass::Gs => "gs",
            PitchClass::A => "a",
            PitchClass::As => "as",
            PitchClass::B => "b",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        // Normalise the sharp spellings to the `s` suffix
        let normalised = lowered.replace('#', "s").replace('♯', "s");

        PitchClass::ALL
            .iter()
            .copied()
            .find(|pc| pc.name() == normalised)
            .ok_or_else(|| NoteError::UnknownPitchClass(s.to_string()))
    }
}
