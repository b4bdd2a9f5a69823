//! Tokenizer for the `spelled_pitches` cell.
//!
//! The corpus stores each melody as a bracketed, list-like string:
//! `['C4', 'E-4', 'G4']`. Items may be single-quoted, double-quoted, or
//! bare. Every item goes through [`SpelledPitch::parse`], so a bad token
//! surfaces here as a [`ParseError`] and never reaches a histogram.

use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, separated};
use winnow::prelude::*;
use winnow::token::take_till;

use crate::error::ParseError;
use crate::pitch::SpelledPitch;

type PResult<T> = winnow::ModalResult<T>;

/// Parse one list item, without its quotes.
fn parse_item<'i>(input: &mut &'i str) -> PResult<&'i str> {
    alt((
        delimited('\'', take_till(0.., '\''), '\''),
        delimited('"', take_till(0.., '"'), '"'),
        take_till(1.., |c: char| c == ',' || c == ']' || c.is_whitespace()),
    ))
    .parse_next(input)
}

/// Parse the bracketed list into raw item strings.
pub fn parse_list<'i>(input: &mut &'i str) -> PResult<Vec<&'i str>> {
    delimited(
        (multispace0, '[', multispace0),
        separated(0.., delimited(multispace0, parse_item, multispace0), ','),
        (']', multispace0),
    )
    .parse_next(input)
}

/// Split a cell into raw tokens without validating them.
pub fn split_tokens(cell: &str) -> Result<Vec<&str>, ParseError> {
    parse_list.parse(cell).map_err(|e| ParseError::List {
        input: cell.to_string(),
        offset: e.offset(),
    })
}

/// Tokenize and validate a `spelled_pitches` cell.
pub fn tokenize(cell: &str) -> Result<Vec<SpelledPitch>, ParseError> {
    split_tokens(cell)?
        .into_iter()
        .map(SpelledPitch::parse)
        .collect()
}
