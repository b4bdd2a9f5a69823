//! Pitch-class profiles for folk melody corpora.
//!
//! Reduces spelled pitches (`C4`, `F#3`, `B-5`) to pitch classes, counts
//! and normalizes them per piece, and rotates each piece's profile so its
//! root sits at bin 0. Pieces in different keys can then be compared and
//! averaged by mode.
//!
//! # Example
//!
//! ```
//! use melody_profile::{pitch_class, Corpus, CorpusOptions, ModeSummary};
//!
//! assert_eq!(pitch_class("B-5").unwrap().value(), 10);
//!
//! let table = "key,spelled_pitches\nG major,\"['G4', 'G4', 'B4', 'D5']\"\n";
//! let corpus = Corpus::from_reader(table.as_bytes(), &CorpusOptions::default()).unwrap();
//! let analysis = corpus.analyze().unwrap();
//!
//! // G is the root, so it moves to bin 0
//! assert_eq!(analysis.pieces[0].transposed.as_array()[0], 0.5);
//!
//! let summaries = ModeSummary::from_pieces(&analysis.pieces);
//! assert_eq!(summaries[0].pieces, 1);
//! ```

pub mod corpus;
pub mod distribution;
pub mod error;
pub mod key;
pub mod output;
pub mod pitch;
pub mod summary;
pub mod tokenize;

pub use corpus::{
    AnalyzedPiece, Corpus, CorpusAnalysis, CorpusOptions, Exclusion, ExclusionReason, ParsedRow,
    PieceRecord,
};
pub use distribution::{transpose, NormalizedDistribution, PitchClassCounts, TransposedDistribution};
pub use error::{CorpusError, EmptyPiece, KeyError, ParseError};
pub use key::{Mode, PieceKey};
pub use output::{write_csv, write_json, DistributionView};
pub use pitch::{pitch_class, NoteName, PitchClass, SpelledPitch, Spelling, PITCH_CLASSES};
pub use summary::ModeSummary;
pub use tokenize::tokenize;
