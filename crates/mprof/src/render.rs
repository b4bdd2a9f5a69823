//! Text bar charts for per-mode profiles.

use melody_profile::{ModeSummary, PitchClass};

/// Scale degree labels for semitones above the root.
const INTERVALS: [&str; 12] = ["1", "b2", "2", "b3", "3", "4", "#4", "5", "b6", "6", "b7", "7"];

/// One line per interval, bars scaled so the heaviest bin is `width` long.
pub fn mode_chart(summary: &ModeSummary, width: usize) -> String {
    let plural = if summary.pieces == 1 { "piece" } else { "pieces" };
    let mut out = format!("{} ({} {})\n", summary.mode, summary.pieces, plural);

    let max = summary.mean.iter().copied().fold(0.0_f64, f64::max);
    for pc in PitchClass::all() {
        let value = summary.mean[pc.index()];
        let len = if max > 0.0 {
            (value / max * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:>3} {:<2} {:<w$} {:.3}\n",
            pc.value(),
            INTERVALS[pc.index()],
            "#".repeat(len),
            value,
            w = width
        ));
    }
    out
}
