mod color;
mod geometry;
mod note;

pub use color::{Rgb, TextColor};
pub use geometry::{Position, Size, WorkArea, DEFAULT_SIZE, MIN_HEIGHT, MIN_WIDTH};
pub use note::{Interaction, Note, NoteState, DEFAULT_FONT_SIZE, FONT_SIZE_STEP};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense zero-based note index, also the file-name stem of the note's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u32);

impl NoteId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NoteId)
    }
}
