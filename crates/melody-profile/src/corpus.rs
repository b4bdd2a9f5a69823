//! Corpus loading and per-piece derivation.
//!
//! A corpus is a delimited table with a header row. Two columns matter:
//! the key (`"G major"`) and the spelled pitches (`"['G4', 'B4']"`). All
//! other columns are carried through untouched for output.
//!
//! Per row:
//! 1. Parse the key. Failure excludes the row; no root is imputed.
//! 2. Tokenize the pitches. Failure aborts the run with the piece id.
//! 3. Count, normalize, transpose. An empty piece is excluded.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::distribution::{NormalizedDistribution, PitchClassCounts, TransposedDistribution};
use crate::error::{CorpusError, EmptyPiece, KeyError};
use crate::key::PieceKey;
use crate::pitch::SpelledPitch;
use crate::tokenize::tokenize;

/// How to read the corpus table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusOptions {
    pub delimiter: u8,
    pub key_column: String,
    pub pitches_column: String,
    /// Column identifying pieces in messages and output. Rows are
    /// identified as `row <n>` when unset.
    pub id_column: Option<String>,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            key_column: "key".to_string(),
            pitches_column: "spelled_pitches".to_string(),
            id_column: None,
        }
    }
}

/// One piece with a usable key and its tokenized melody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceRecord {
    pub id: String,
    /// 1-based data row (the header is row 0).
    pub row: usize,
    pub key: PieceKey,
    pub pitches: Vec<SpelledPitch>,
}

impl PieceRecord {
    pub fn counts(&self) -> PitchClassCounts {
        PitchClassCounts::from_pitches(&self.pitches)
    }

    pub fn distribution(&self) -> Result<NormalizedDistribution, EmptyPiece> {
        self.counts().normalize()
    }

    /// Derive counts, relative frequencies, and the root-relative profile.
    pub fn analyze(&self) -> Result<AnalyzedPiece, EmptyPiece> {
        let counts = self.counts();
        let distribution = counts.normalize()?;
        let transposed = distribution.transpose(self.key.root);

        Ok(AnalyzedPiece {
            id: self.id.clone(),
            row: self.row,
            key: self.key,
            notes: counts.total(),
            counts,
            distribution,
            transposed,
        })
    }
}

/// Everything derived for one piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPiece {
    pub id: String,
    pub row: usize,
    pub key: PieceKey,
    pub notes: u32,
    pub counts: PitchClassCounts,
    pub distribution: NormalizedDistribution,
    pub transposed: TransposedDistribution,
}

/// Why a row was left out of the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    Key(KeyError),
    Empty,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Key(e) => write!(f, "{}", e),
            ExclusionReason::Empty => write!(f, "{}", EmptyPiece),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub id: String,
    pub row: usize,
    pub reason: ExclusionReason,
}

/// A table row after key and pitch parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    Piece(PieceRecord),
    Excluded(Exclusion),
}

/// Result of analyzing a whole corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusAnalysis {
    pub pieces: Vec<AnalyzedPiece>,
    pub excluded: Vec<Exclusion>,
}

struct Columns {
    key: usize,
    pitches: usize,
    id: Option<usize>,
}

/// A loaded corpus table.
pub struct Corpus {
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
    columns: Columns,
}

impl Corpus {
    /// Open and read a corpus file.
    pub fn open(path: &Path, options: &CorpusOptions) -> Result<Self, CorpusError> {
        let file = File::open(path).map_err(|e| CorpusError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let corpus = Self::from_reader(file, options)?;
        info!(path = %path.display(), rows = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    /// Read a corpus table from any reader.
    pub fn from_reader<R: Read>(reader: R, options: &CorpusOptions) -> Result<Self, CorpusError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| CorpusError::MissingColumn(name.to_string()))
        };

        let columns = Columns {
            key: find(&options.key_column)?,
            pitches: find(&options.pitches_column)?,
            id: options.id_column.as_deref().map(find).transpose()?,
        };

        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            records,
            columns,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Original fields of a 1-based data row.
    pub fn record(&self, row: usize) -> Option<&csv::StringRecord> {
        row.checked_sub(1).and_then(|i| self.records.get(i))
    }

    fn piece_id(&self, record: &csv::StringRecord, row: usize) -> String {
        self.columns
            .id
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("row {}", row))
    }

    /// Parse a row into a record, or report why it is excluded.
    ///
    /// A malformed pitch token is a hard error rather than an exclusion.
    fn parse_row(&self, row: usize, record: &csv::StringRecord) -> Result<ParsedRow, CorpusError> {
        let id = self.piece_id(record, row);

        let key_cell = record.get(self.columns.key).unwrap_or("");
        let key = match PieceKey::parse(key_cell) {
            Ok(key) => key,
            Err(e) => {
                return Ok(ParsedRow::Excluded(Exclusion {
                    id,
                    row,
                    reason: ExclusionReason::Key(e),
                }))
            }
        };

        // A blank cell is a piece with no notes, same as `[]`.
        let pitches_cell = record.get(self.columns.pitches).unwrap_or("");
        let pitches = if pitches_cell.trim().is_empty() {
            Vec::new()
        } else {
            tokenize(pitches_cell).map_err(|source| CorpusError::Piece { piece: id.clone(), source })?
        };

        Ok(ParsedRow::Piece(PieceRecord {
            id,
            row,
            key,
            pitches,
        }))
    }

    /// Parse every row in table order.
    pub fn rows(&self) -> impl Iterator<Item = Result<ParsedRow, CorpusError>> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| self.parse_row(i + 1, record))
    }

    /// Derive distributions for every row.
    pub fn analyze(&self) -> Result<CorpusAnalysis, CorpusError> {
        let mut analysis = CorpusAnalysis::default();

        for parsed in self.rows() {
            let piece = match parsed? {
                ParsedRow::Piece(piece) => piece,
                ParsedRow::Excluded(exclusion) => {
                    warn!(piece = %exclusion.id, reason = %exclusion.reason, "excluding piece");
                    analysis.excluded.push(exclusion);
                    continue;
                }
            };

            match piece.analyze() {
                Ok(analyzed) => {
                    debug!(piece = %analyzed.id, key = %analyzed.key, notes = analyzed.notes, "analyzed piece");
                    analysis.pieces.push(analyzed);
                }
                Err(EmptyPiece) => {
                    warn!(piece = %piece.id, "excluding piece with no notes");
                    analysis.excluded.push(Exclusion {
                        id: piece.id,
                        row: piece.row,
                        reason: ExclusionReason::Empty,
                    });
                }
            }
        }

        info!(
            analyzed = analysis.pieces.len(),
            excluded = analysis.excluded.len(),
            "corpus analysis complete"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchClass;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
id,key,spelled_pitches,region
a,C major,\"['C4', 'C4', 'E4', 'G4']\",north
b,G major,\"['G4', 'G4', 'B4', 'D5']\",south
c,,\"['C4']\",east
d,D dorian,[],west
";

    fn corpus() -> Corpus {
        let options = CorpusOptions {
            id_column: Some("id".to_string()),
            ..CorpusOptions::default()
        };
        Corpus::from_reader(TABLE.as_bytes(), &options).unwrap()
    }

    #[test]
    fn test_c_major_piece() {
        let analysis = corpus().analyze().unwrap();
        let piece = &analysis.pieces[0];
        assert_eq!(piece.id, "a");
        assert_eq!(piece.counts.as_array(), &[2, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(
            piece.distribution.as_array(),
            &[0.5, 0.0, 0.0, 0.0, 0.25, 0.0, 0.0, 0.25, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(piece.transposed.as_array(), piece.distribution.as_array());
    }

    #[test]
    fn test_g_major_piece() {
        let analysis = corpus().analyze().unwrap();
        let piece = &analysis.pieces[1];
        assert_eq!(piece.key.root, PitchClass::new(7));
        assert_eq!(piece.counts.get(PitchClass::new(7)), 2);
        assert_eq!(piece.counts.get(PitchClass::new(11)), 1);
        assert_eq!(piece.counts.get(PitchClass::new(2)), 1);
        assert_eq!(
            piece.transposed.as_array(),
            &[0.5, 0.0, 0.0, 0.0, 0.25, 0.0, 0.0, 0.25, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_exclusions() {
        let analysis = corpus().analyze().unwrap();
        assert_eq!(analysis.pieces.len(), 2);
        assert_eq!(
            analysis.excluded,
            vec![
                Exclusion {
                    id: "c".to_string(),
                    row: 3,
                    reason: ExclusionReason::Key(KeyError::Empty),
                },
                Exclusion {
                    id: "d".to_string(),
                    row: 4,
                    reason: ExclusionReason::Empty,
                },
            ]
        );
    }

    #[test]
    fn test_rederiving_is_identical() {
        let corpus = corpus();
        let Some(Ok(ParsedRow::Piece(record))) = corpus.rows().nth(1) else {
            panic!("row 2 should parse");
        };
        assert_eq!(record.distribution(), record.distribution());
        assert_eq!(record.analyze(), record.analyze());
    }

    #[test]
    fn test_bad_token_names_piece() {
        let table = "key,spelled_pitches\nC major,\"['C4', 'Q4']\"\n";
        let corpus = Corpus::from_reader(table.as_bytes(), &CorpusOptions::default()).unwrap();
        let err = corpus.analyze().unwrap_err();
        assert_eq!(
            err.to_string(),
            "piece row 1: malformed spelled pitch 'Q4'"
        );
    }

    #[test]
    fn test_blank_pitches_cell_is_empty_piece() {
        let table = "key,spelled_pitches\nC major,\nG major,\"  \"\nD minor,\"['D4']\"\n";
        let corpus = Corpus::from_reader(table.as_bytes(), &CorpusOptions::default()).unwrap();
        let analysis = corpus.analyze().unwrap();

        assert_eq!(analysis.pieces.len(), 1);
        assert_eq!(
            analysis
                .excluded
                .iter()
                .map(|e| (e.row, &e.reason))
                .collect::<Vec<_>>(),
            vec![(1, &ExclusionReason::Empty), (2, &ExclusionReason::Empty)]
        );
    }

    #[test]
    fn test_missing_column() {
        let table = "key,notes\nC major,[]\n";
        let err = Corpus::from_reader(table.as_bytes(), &CorpusOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, CorpusError::MissingColumn(ref c) if c == "spelled_pitches"));
    }

    #[test]
    fn test_tab_delimited() {
        let table = "key\tspelled_pitches\nB- minor\t['B-4', 'D-5', 'F5']\n";
        let options = CorpusOptions {
            delimiter: b'\t',
            ..CorpusOptions::default()
        };
        let corpus = Corpus::from_reader(table.as_bytes(), &options).unwrap();
        let analysis = corpus.analyze().unwrap();
        let piece = &analysis.pieces[0];
        assert_eq!(piece.key.root, PitchClass::new(10));
        assert_eq!(piece.transposed.get(PitchClass::new(0)) * 3.0, 1.0);
        assert_eq!(piece.transposed.get(PitchClass::new(3)) * 3.0, 1.0);
        assert_eq!(piece.transposed.get(PitchClass::new(7)) * 3.0, 1.0);
    }
}
