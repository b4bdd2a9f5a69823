//! Pitch-class histograms, normalization, and transposition.
//!
//! All profiles are dense 12-bin arrays indexed by [`PitchClass`], so
//! iteration order is always C, C#, ..., B.

use serde::{Deserialize, Serialize};

use crate::error::EmptyPiece;
use crate::pitch::{PitchClass, SpelledPitch, PITCH_CLASSES};

/// Rotate a profile left by `root` bins: `out[i] = bins[(i + root) % 12]`.
///
/// The bin for `root` lands at index 0. Rotating by `root.inverse()`
/// restores the input exactly, since values are only moved.
pub fn transpose<T: Copy>(bins: &[T; PITCH_CLASSES], root: PitchClass) -> [T; PITCH_CLASSES] {
    std::array::from_fn(|i| bins[(i + root.index()) % PITCH_CLASSES])
}

/// Note counts per pitch class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchClassCounts([u32; PITCH_CLASSES]);

impl PitchClassCounts {
    pub fn from_pitch_classes(classes: impl IntoIterator<Item = PitchClass>) -> Self {
        let mut counts = PitchClassCounts::default();
        for pc in classes {
            counts.add(pc);
        }
        counts
    }

    pub fn from_pitches<'a>(pitches: impl IntoIterator<Item = &'a SpelledPitch>) -> Self {
        Self::from_pitch_classes(pitches.into_iter().map(SpelledPitch::pitch_class))
    }

    pub fn add(&mut self, pc: PitchClass) {
        self.0[pc.index()] += 1;
    }

    pub fn get(&self, pc: PitchClass) -> u32 {
        self.0[pc.index()]
    }

    pub fn as_array(&self) -> &[u32; PITCH_CLASSES] {
        &self.0
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Relative frequencies. A piece with no notes has none.
    pub fn normalize(&self) -> Result<NormalizedDistribution, EmptyPiece> {
        let total = self.total();
        if total == 0 {
            return Err(EmptyPiece);
        }
        let total = total as f64;
        Ok(NormalizedDistribution(std::array::from_fn(|i| {
            self.0[i] as f64 / total
        })))
    }

    pub fn transposed(&self, root: PitchClass) -> PitchClassCounts {
        PitchClassCounts(transpose(&self.0, root))
    }
}

/// Relative frequency per pitch class; sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDistribution([f64; PITCH_CLASSES]);

impl NormalizedDistribution {
    pub fn get(&self, pc: PitchClass) -> f64 {
        self.0[pc.index()]
    }

    pub fn as_array(&self) -> &[f64; PITCH_CLASSES] {
        &self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Rotate so `root` sits at bin 0.
    pub fn transpose(&self, root: PitchClass) -> TransposedDistribution {
        TransposedDistribution {
            root,
            bins: transpose(&self.0, root),
        }
    }
}

/// A normalized distribution expressed relative to its root.
///
/// Bin 0 is the tonic, bin 7 the fifth above it, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransposedDistribution {
    root: PitchClass,
    bins: [f64; PITCH_CLASSES],
}

impl TransposedDistribution {
    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Frequency at `interval` semitones above the root.
    pub fn get(&self, interval: PitchClass) -> f64 {
        self.bins[interval.index()]
    }

    pub fn as_array(&self) -> &[f64; PITCH_CLASSES] {
        &self.bins
    }

    /// Total mass, summed in absolute pitch-class order.
    pub fn sum(&self) -> f64 {
        self.untransposed().sum()
    }

    /// Undo the rotation.
    pub fn untransposed(&self) -> NormalizedDistribution {
        NormalizedDistribution(transpose(&self.bins, self.root.inverse()))
    }
}
