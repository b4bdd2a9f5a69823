//! Writing analyzed corpora for downstream tools.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::corpus::{AnalyzedPiece, Corpus, CorpusAnalysis};
use crate::error::CorpusError;
use crate::pitch::PitchClass;

/// Which profile fills the `0`..`11` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionView {
    /// Root at bin 0.
    #[default]
    Transposed,
    /// Bins are absolute pitch classes.
    Absolute,
}

impl DistributionView {
    fn bins(self, piece: &AnalyzedPiece) -> &[f64; 12] {
        match self {
            DistributionView::Transposed => piece.transposed.as_array(),
            DistributionView::Absolute => piece.distribution.as_array(),
        }
    }
}

/// Write the original columns, then `root`, `mode`, and one column per bin.
///
/// Excluded rows are not written.
pub fn write_csv<W: Write>(
    corpus: &Corpus,
    analysis: &CorpusAnalysis,
    view: DistributionView,
    writer: W,
) -> Result<(), CorpusError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = corpus.headers().to_vec();
    header.push("root".to_string());
    header.push("mode".to_string());
    header.extend(PitchClass::all().map(|pc| pc.to_string()));
    wtr.write_record(&header).map_err(CorpusError::WriteTable)?;

    for piece in &analysis.pieces {
        let mut fields: Vec<String> = corpus
            .record(piece.row)
            .map(|r| r.iter().map(str::to_string).collect())
            .unwrap_or_default();
        fields.push(piece.key.root.to_string());
        fields.push(piece.key.mode.to_string());
        fields.extend(view.bins(piece).iter().map(|f| f.to_string()));
        wtr.write_record(&fields).map_err(CorpusError::WriteTable)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write analyzed pieces as a JSON array.
pub fn write_json<W: Write>(analysis: &CorpusAnalysis, mut writer: W) -> Result<(), CorpusError> {
    serde_json::to_writer_pretty(&mut writer, &analysis.pieces)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusOptions;
    use std::io::{self, BufWriter};

    /// Accepts nothing, like a full disk.
    struct Full;

    impl Write for Full {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const TABLE: &str = "\
title,key,spelled_pitches
Tune,G major,\"['G4', 'G4', 'B4', 'D5']\"
Broken,,\"['G4']\"
";

    fn analyzed() -> (Corpus, CorpusAnalysis) {
        let corpus = Corpus::from_reader(TABLE.as_bytes(), &CorpusOptions::default()).unwrap();
        let analysis = corpus.analyze().unwrap();
        (corpus, analysis)
    }

    #[test]
    fn test_csv_transposed() {
        let (corpus, analysis) = analyzed();
        let mut out = Vec::new();
        write_csv(&corpus, &analysis, DistributionView::Transposed, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "title,key,spelled_pitches,root,mode,0,1,2,3,4,5,6,7,8,9,10,11"
        );
        assert_eq!(
            lines[1],
            "Tune,G major,\"['G4', 'G4', 'B4', 'D5']\",7,major,0.5,0,0,0,0.25,0,0,0.25,0,0,0,0"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_csv_absolute() {
        let (corpus, analysis) = analyzed();
        let mut out = Vec::new();
        write_csv(&corpus, &analysis, DistributionView::Absolute, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(",7,major,0,0,0.25,0,0,0,0,0.5,0,0,0,0.25\n"));
    }

    #[test]
    fn test_json_output() {
        let (_, analysis) = analyzed();
        let mut out = Vec::new();
        write_json(&analysis, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let piece = &value[0];
        assert_eq!(piece["id"], "row 1");
        assert_eq!(piece["key"]["mode"], "major");
        assert_eq!(piece["key"]["root"], 7);
        assert_eq!(piece["transposed"]["bins"][0], 0.5);

        let back: Vec<AnalyzedPiece> = serde_json::from_slice(&out).unwrap();
        assert_eq!(back, analysis.pieces);
    }

    #[test]
    fn test_json_reports_buffered_write_failure() {
        let (_, analysis) = analyzed();
        let err = write_json(&analysis, BufWriter::new(Full)).unwrap_err();
        assert!(matches!(err, CorpusError::Write(_)), "{err:?}");
    }

    #[test]
    fn test_csv_write_failure_is_not_a_read_error() {
        let mut table = String::from("key,spelled_pitches\n");
        for _ in 0..500 {
            table.push_str("G major,\"['G4', 'G4', 'B4', 'D5']\"\n");
        }
        let corpus = Corpus::from_reader(table.as_bytes(), &CorpusOptions::default()).unwrap();
        let analysis = corpus.analyze().unwrap();

        let err = write_csv(&corpus, &analysis, DistributionView::Transposed, Full).unwrap_err();
        assert!(matches!(err, CorpusError::WriteTable(_)), "{err:?}");
        assert!(err.to_string().starts_with("failed to write output table"), "{err}");
    }
}
