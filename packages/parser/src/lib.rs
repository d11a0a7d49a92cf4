#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-form US postal address parser.
//!
//! Turns strings like `"1900 E Emerald, CHULA-VISTA, CA 91913"` into a
//! structured [`AddressRecord`]:
//!
//! 1. The [`scanner`] splits the input into classified tokens.
//! 2. A fixed pipeline of extraction stages peels off the house number,
//!    fraction, block filler, zip, state, suite, city, street type and
//!    direction, each working through a [`cursor::TokenCursor`].
//! 3. The [`street`] resolver names the street from whatever remains,
//!    trying highway, numbered and simple forms in that order.
//!
//! Inputs of the form `"A / B"` are intersections: both halves are parsed
//! and `B` becomes the cross street of `A`.
//!
//! Parsed records can be reduced to stable identity digests with
//! [`identify`], for deduplication and fuzzy record linkage.
//!
//! An [`AddressParser`] compiles its matchers once and is `Send + Sync`;
//! share one instance across threads.

pub mod cursor;
mod extract;
pub mod hash;
pub mod phonetic;
pub mod reference;
pub mod scanner;
pub mod street;

pub use address_parser_models::{
    AddressIdentity, AddressRecord, GeocodeArgs, Token, TokenKind, title_case,
};
pub use hash::identify;

use cursor::TokenCursor;
use reference::ReferenceData;
use regex::Regex;
use scanner::Scanner;
use thiserror::Error;

/// Separator between the two streets of an intersection.
pub const INTERSECTION_SEPARATOR: &str = " / ";

/// Errors produced while parsing an address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The input was empty or whitespace-only.
    #[error("no address: input is empty")]
    EmptyInput,

    /// Part of the input was claimed by no scanner rule.
    #[error("failed to scan {input:?} at byte {position}: {remainder:?}")]
    Scan {
        /// The full input.
        input: String,
        /// Byte offset where scanning stopped.
        position: usize,
        /// The unclaimed tail.
        remainder: String,
    },

    /// No street name could be resolved.
    #[error("failed for '{text}' in '{input}', type={kind}. expected: {expected}. {message}")]
    Parse {
        /// The half of the input being parsed.
        input: String,
        /// Kind of the offending token.
        kind: TokenKind,
        /// Text of the offending token.
        text: String,
        /// The token kind that would have been accepted.
        expected: TokenKind,
        /// What went wrong.
        message: String,
    },

    /// Reference data produced a matcher that does not compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Reference TOML failed to deserialize.
    #[error("invalid reference data: {0}")]
    Reference(#[from] toml::de::Error),
}

impl AddressError {
    /// Returns `true` for [`AddressError::EmptyInput`].
    #[must_use]
    pub const fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }

    /// Returns `true` for [`AddressError::Parse`].
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Per-call parse state shared by the extraction stages and the street
/// resolver.
pub(crate) struct ParseState<'p> {
    pub parser: &'p AddressParser,
    pub input: &'p str,
    pub cursor: TokenCursor,
    pub record: AddressRecord,
}

impl ParseState<'_> {
    /// Builds a [`AddressError::Parse`] blaming the most recently consumed
    /// token, or the head if nothing was consumed.
    pub fn parse_error(&self, expected: TokenKind, message: &str) -> AddressError {
        let token = self
            .cursor
            .last()
            .unwrap_or_else(|| self.cursor.peek(0));

        AddressError::Parse {
            input: self.input.to_string(),
            kind: token.kind,
            text: token.text.clone(),
            expected,
            message: message.to_string(),
        }
    }
}

/// Result of [`AddressParser::parse_batch`]. Indices refer to input
/// positions.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successfully parsed records.
    pub parsed: Vec<(usize, AddressRecord)>,
    /// Inputs that failed, with their errors.
    pub failed: Vec<(usize, AddressError)>,
}

impl BatchResult {
    /// Number of failures that were empty input rather than malformed
    /// addresses.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.failed
            .iter()
            .filter(|(_, err)| err.is_empty_input())
            .count()
    }

    /// Total inputs seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.parsed.len() + self.failed.len()
    }
}

/// The address parser. Holds the reference data and the matchers compiled
/// from it.
#[derive(Debug)]
pub struct AddressParser {
    reference: ReferenceData,
    scanner: Scanner,
    suite_word_re: Option<Regex>,
    highway_re: Option<Regex>,
}

impl AddressParser {
    /// Compiles a parser for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Pattern`] if a matcher built from the
    /// reference data fails to compile.
    pub fn new(reference: ReferenceData) -> Result<Self, AddressError> {
        let scanner = Scanner::new(&reference.suite_keywords)?;
        let suite_word_re = exact_word_pattern(reference.suite_keywords.iter(), "")?;
        let highway_re = exact_word_pattern(reference.suffixes.highway_words(), "-?")?;

        log::debug!(
            "compiled address parser: {} suffixes, {} states",
            reference.suffixes.len(),
            reference.states.len()
        );

        Ok(Self {
            reference,
            scanner,
            suite_word_re,
            highway_re,
        })
    }

    /// A parser over the embedded reference data.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Pattern`] if a matcher fails to compile.
    pub fn with_defaults() -> Result<Self, AddressError> {
        Self::new(ReferenceData::embedded())
    }

    /// The reference data this parser was built from.
    #[must_use]
    pub const fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// The compiled scanner.
    #[must_use]
    pub const fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub(crate) const fn suite_word_re(&self) -> Option<&Regex> {
        self.suite_word_re.as_ref()
    }

    pub(crate) const fn highway_re(&self) -> Option<&Regex> {
        self.highway_re.as_ref()
    }

    /// Parses a single address, or an intersection of two.
    ///
    /// # Errors
    ///
    /// * [`AddressError::EmptyInput`] if `address` is blank
    /// * [`AddressError::Parse`] if no street name can be resolved in
    ///   either half
    pub fn parse(&self, address: &str) -> Result<AddressRecord, AddressError> {
        self.parse_with_locality(address, None, None, None)
    }

    /// Like [`AddressParser::parse`], but non-blank `city`, `state` and
    /// `zip` replace whatever the parser extracted.
    ///
    /// # Errors
    ///
    /// See [`AddressParser::parse`].
    pub fn parse_with_locality(
        &self,
        address: &str,
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Result<AddressRecord, AddressError> {
        if address.trim().is_empty() {
            return Err(AddressError::EmptyInput);
        }

        let (first, second) = match address.split_once(INTERSECTION_SEPARATOR) {
            Some((first, second)) => (first, Some(second)),
            None => (address, None),
        };

        let mut record = self.parse_one(first)?;

        if let Some(second) = second.filter(|s| !s.trim().is_empty()) {
            record.cross_street = Some(Box::new(self.parse_one(second)?));
        }

        if let Some(city) = non_blank(city) {
            record.city = Some(title_case(city));
        }
        if let Some(state) = non_blank(state) {
            record.state = Some(state.to_uppercase());
        }
        if let Some(zip) = non_blank(zip) {
            record.set_zip(zip);
        }

        Ok(record)
    }

    /// Parses every line, collecting failures instead of stopping at them.
    pub fn parse_batch<I, S>(&self, lines: I) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = BatchResult::default();

        for (index, line) in lines.into_iter().enumerate() {
            match self.parse(line.as_ref()) {
                Ok(record) => result.parsed.push((index, record)),
                Err(err) => {
                    if !err.is_empty_input() {
                        log::debug!("line {index}: {err}");
                    }
                    result.failed.push((index, err));
                }
            }
        }

        log::debug!(
            "parsed {}/{} addresses ({} empty)",
            result.parsed.len(),
            result.total(),
            result.empty_count()
        );

        result
    }

    fn parse_one(&self, input: &str) -> Result<AddressRecord, AddressError> {
        let tokens = self.scanner.scan(input)?;

        let mut state = ParseState {
            parser: self,
            input,
            cursor: TokenCursor::new(tokens),
            record: AddressRecord::default(),
        };

        extract::run(&mut state);
        street::resolve(&mut state)?;

        Ok(state.record)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `^(?:w1|w2|...)<suffix>$`, case-insensitive, longest word first. `None`
/// if there are no words.
fn exact_word_pattern<'a>(
    words: impl Iterator<Item = &'a str>,
    suffix: &str,
) -> Result<Option<Regex>, regex::Error> {
    let mut words: Vec<&str> = words.collect();
    if words.is_empty() {
        return Ok(None);
    }
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let alternatives: Vec<String> = words.into_iter().map(regex::escape).collect();
    let pattern = format!("(?i)^(?:{}){suffix}$", alternatives.join("|"));

    Regex::new(&pattern).map(Some)
}
