//! Key cell parsing: `"ROOT MODE"`, e.g. `G major`, `B- minor`, `F# dorian`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;
use crate::pitch::{PitchClass, Spelling};

/// Mode named in a piece's key.
///
/// Major/Ionian and Minor/Aeolian stay distinct: the corpus labels them
/// separately and the per-mode report follows the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl Mode {
    /// Parse mode from string (case-insensitive, allows abbreviations)
    pub fn parse(s: &str) -> Option<Mode> {
        let s = s.to_lowercase();
        match s.as_str() {
            "maj" | "major" => Some(Mode::Major),
            "min" | "minor" | "m" => Some(Mode::Minor),
            "ion" | "ionian" => Some(Mode::Ionian),
            "dor" | "dorian" => Some(Mode::Dorian),
            "phr" | "phrygian" => Some(Mode::Phrygian),
            "lyd" | "lydian" => Some(Mode::Lydian),
            "mix" | "mixolydian" => Some(Mode::Mixolydian),
            "aeo" | "aeolian" => Some(Mode::Aeolian),
            "loc" | "locrian" => Some(Mode::Locrian),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
        };
        f.write_str(name)
    }
}

/// Parsed key of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceKey {
    /// Root as spelled in the corpus (`B-`, `F#`).
    pub spelling: Spelling,
    /// Pitch class of the tonic; the transposition reference.
    pub root: PitchClass,
    pub mode: Mode,
}

impl PieceKey {
    /// Parse a `key` cell.
    ///
    /// Exactly two whitespace-separated words are accepted. Nothing is
    /// imputed: a key without a usable root or mode is an error and the
    /// caller excludes the record.
    pub fn parse(text: &str) -> Result<PieceKey, KeyError> {
        let trimmed = text.trim();
        let mut words = trimmed.split_whitespace();

        let root_word = words.next().ok_or(KeyError::Empty)?;
        let mode_word = words
            .next()
            .ok_or_else(|| KeyError::MissingMode(trimmed.to_string()))?;
        if words.next().is_some() {
            return Err(KeyError::Trailing(trimmed.to_string()));
        }

        let spelling = Spelling::parse(root_word).ok_or_else(|| KeyError::Root {
            key: trimmed.to_string(),
            root: root_word.to_string(),
        })?;
        let mode = Mode::parse(mode_word).ok_or_else(|| KeyError::Mode {
            key: trimmed.to_string(),
            mode: mode_word.to_string(),
        })?;

        Ok(PieceKey {
            spelling,
            root: spelling.pitch_class(),
            mode,
        })
    }
}

impl fmt::Display for PieceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.spelling, self.mode)
    }
}
