//! Error types for pitch, key, and corpus parsing.

use std::path::PathBuf;
use thiserror::Error;

/// A spelled pitch or pitch list that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed spelled pitch '{token}'")]
    Pitch { token: String },

    #[error("malformed pitch list at offset {offset}: {input:?}")]
    List { input: String, offset: usize },
}

impl ParseError {
    pub fn pitch(token: impl Into<String>) -> Self {
        ParseError::Pitch {
            token: token.into(),
        }
    }
}

/// A `key` cell that does not name a usable root and mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key is empty")]
    Empty,

    #[error("key '{0}' has no mode")]
    MissingMode(String),

    #[error("unrecognized root '{root}' in key '{key}'")]
    Root { key: String, root: String },

    #[error("unrecognized mode '{mode}' in key '{key}'")]
    Mode { key: String, mode: String },

    #[error("unexpected trailing text in key '{0}'")]
    Trailing(String),
}

/// Normalizing a piece with no notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("piece has no notes")]
pub struct EmptyPiece;

/// Failures that abort a corpus run.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to open corpus {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read corpus table: {0}")]
    Table(#[from] csv::Error),

    #[error("corpus is missing required column '{0}'")]
    MissingColumn(String),

    #[error("piece {piece}: {source}")]
    Piece { piece: String, source: ParseError },

    #[error("failed to write output table: {0}")]
    WriteTable(#[source] csv::Error),

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
