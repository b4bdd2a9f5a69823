//! Per-mode aggregation of transposed profiles.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::corpus::AnalyzedPiece;
use crate::key::Mode;
use crate::pitch::{PitchClass, PITCH_CLASSES};

/// Mean root-relative profile of all pieces in one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSummary {
    pub mode: Mode,
    pub pieces: usize,
    /// Bin `i` is the mean frequency `i` semitones above the root.
    pub mean: [f64; PITCH_CLASSES],
}

impl ModeSummary {
    /// Group pieces by mode and average their transposed distributions.
    ///
    /// Modes come out in declaration order (major, minor, then the church
    /// modes); modes with no pieces are omitted.
    pub fn from_pieces(pieces: &[AnalyzedPiece]) -> Vec<ModeSummary> {
        let mut groups: BTreeMap<Mode, (usize, [f64; PITCH_CLASSES])> = BTreeMap::new();

        for piece in pieces {
            let (count, sums) = groups
                .entry(piece.key.mode)
                .or_insert((0, [0.0; PITCH_CLASSES]));
            *count += 1;
            for (sum, bin) in sums.iter_mut().zip(piece.transposed.as_array()) {
                *sum += bin;
            }
        }

        groups
            .into_iter()
            .map(|(mode, (count, sums))| ModeSummary {
                mode,
                pieces: count,
                mean: sums.map(|s| s / count as f64),
            })
            .collect()
    }

    /// Intervals above the root, heaviest first. Ties keep ascending order.
    pub fn ranked(&self) -> Vec<(PitchClass, f64)> {
        let mut ranked: Vec<_> = PitchClass::all().map(|pc| (pc, self.mean[pc.index()])).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
