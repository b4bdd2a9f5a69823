//! Spelled pitches and pitch classes.
//!
//! A spelled pitch is a diatonic step letter, zero or more sharps (`#`),
//! zero or more flats (`-`), and an octave number: `C4`, `F#3`, `B-5`,
//! `E--2`. The pitch class discards the octave and collapses enharmonic
//! spellings, so `F#4` and `G-4` both land on 6.

use std::fmt;

use serde::{Deserialize, Serialize};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::error::ParseError;

type PResult<T> = winnow::ModalResult<T>;

/// Number of pitch classes in an octave.
pub const PITCH_CLASSES: usize = 12;

const NOTE_NAMES_SHARP: [&str; PITCH_CLASSES] =
    ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Integer pitch class in `0..12`, with C = 0.
///
/// Every constructor reduces with Euclidean remainder, so a value outside
/// the octave cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Reduce a signed semitone offset from C into the octave.
    pub fn new(semitones: i64) -> Self {
        PitchClass(semitones.rem_euclid(PITCH_CLASSES as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Bin index into a 12-element profile.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The pitch class that undoes a rotation by `self`.
    pub fn inverse(self) -> Self {
        PitchClass::new(-(self.0 as i64))
    }

    /// Sharp-preferring note name, for display only.
    pub fn name(self) -> &'static str {
        NOTE_NAMES_SHARP[self.index()]
    }

    /// All twelve pitch classes in ascending order.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..PITCH_CLASSES as u8).map(PitchClass)
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < PITCH_CLASSES {
            Ok(PitchClass(value))
        } else {
            Err(format!("pitch class {} out of range 0..12", value))
        }
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> u8 {
        pc.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diatonic step letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// Semitone offset of the natural step from C.
    pub fn to_semitone(self) -> i64 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    pub fn letter(self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

/// A step letter with its accidentals, without octave.
///
/// This is also the grammar of a key root (`B-`, `F#`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spelling {
    pub step: NoteName,
    pub sharps: usize,
    pub flats: usize,
}

impl Spelling {
    /// Net accidentals applied to the step, reduced mod 12.
    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::new(self.step.to_semitone() + self.sharps as i64 - self.flats as i64)
    }

    /// Parse a complete spelling with nothing trailing.
    pub fn parse(text: &str) -> Option<Self> {
        let mut input = text;
        let spelling = parse_spelling(&mut input).ok()?;
        input.is_empty().then_some(spelling)
    }
}

impl fmt::Display for Spelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step.letter())?;
        for _ in 0..self.sharps {
            f.write_str("#")?;
        }
        for _ in 0..self.flats {
            f.write_str("-")?;
        }
        Ok(())
    }
}

/// A note name with accidentals and octave, e.g. `E-4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpelledPitch {
    pub spelling: Spelling,
    pub octave: u8,
}

impl SpelledPitch {
    /// Parse a whole token. Anything left over after the octave is an error.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let mut input = token;
        let pitch = parse_spelled_pitch(&mut input).map_err(|_| ParseError::pitch(token))?;
        if !input.is_empty() {
            return Err(ParseError::pitch(token));
        }
        Ok(pitch)
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.spelling.pitch_class()
    }
}

impl fmt::Display for SpelledPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.spelling, self.octave)
    }
}

/// Map a spelled-pitch token straight to its pitch class.
pub fn pitch_class(token: &str) -> Result<PitchClass, ParseError> {
    SpelledPitch::parse(token).map(|p| p.pitch_class())
}

/// Parse a diatonic step letter (uppercase only).
pub fn parse_step(input: &mut &str) -> PResult<NoteName> {
    let c = one_of(['C', 'D', 'E', 'F', 'G', 'A', 'B']).parse_next(input)?;
    match c {
        'C' => Ok(NoteName::C),
        'D' => Ok(NoteName::D),
        'E' => Ok(NoteName::E),
        'F' => Ok(NoteName::F),
        'G' => Ok(NoteName::G),
        'A' => Ok(NoteName::A),
        'B' => Ok(NoteName::B),
        _ => unreachable!(), // one_of already validated the character
    }
}

/// Parse sharps then flats, returning `(sharps, flats)`.
pub fn parse_accidentals(input: &mut &str) -> PResult<(usize, usize)> {
    let sharps: &str = take_while(0.., '#').parse_next(input)?;
    let flats: &str = take_while(0.., '-').parse_next(input)?;
    Ok((sharps.len(), flats.len()))
}

/// Parse a step letter and its accidentals.
pub fn parse_spelling(input: &mut &str) -> PResult<Spelling> {
    let step = parse_step(input)?;
    let (sharps, flats) = parse_accidentals(input)?;
    Ok(Spelling {
        step,
        sharps,
        flats,
    })
}

/// Parse the octave number.
pub fn parse_octave(input: &mut &str) -> PResult<u8> {
    take_while(1.., |c: char| c.is_ascii_digit())
        .try_map(|digits: &str| digits.parse::<u8>())
        .parse_next(input)
}

/// Parse a full spelled pitch.
pub fn parse_spelled_pitch(input: &mut &str) -> PResult<SpelledPitch> {
    let spelling = parse_spelling(input)?;
    let octave = parse_octave(input)?;
    Ok(SpelledPitch { spelling, octave })
}
