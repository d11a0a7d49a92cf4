//! Lexical token types produced by the address scanner.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Classification of a scanned token.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Synthetic terminator appended after the last real token.
    End,
    /// A run of letters, periods, hyphens or apostrophes.
    Word,
    /// A comma-delimited phrase. Reserved; the scanner does not emit it.
    Phrase,
    /// A run of digits.
    Number,
    /// Digits followed by letters (`"221B"`, `"8th"`) or the reverse.
    AlphaNumber,
    /// A numeric range such as `"12-1/2"` or `"100-102"`.
    MultiNumber,
    /// A fraction such as `"1/2"`.
    FractionNumber,
    /// A literal `&`.
    Conjunction,
    /// A suite introducer keyword (`suite`, `apt`, `#`, ...).
    SuiteIntro,
    /// A literal `,`.
    Comma,
    /// Anything the other classes do not claim.
    Other,
}

/// A classified lexical unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Token class.
    pub kind: TokenKind,
    /// Normalized payload text. Empty for `End`, `Comma` and `Conjunction`.
    pub text: String,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The synthetic end-of-input marker.
    #[must_use]
    pub const fn end() -> Self {
        Self {
            kind: TokenKind::End,
            text: String::new(),
        }
    }

    /// Creates a payload-less token (comma, conjunction).
    #[must_use]
    pub const fn bare(kind: TokenKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }

    /// Returns `true` for the synthetic end marker.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}({})", self.kind, self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_names_are_screaming_snake_case() {
        assert_eq!(TokenKind::AlphaNumber.to_string(), "ALPHA_NUMBER");
        assert_eq!(TokenKind::SuiteIntro.as_ref(), "SUITE_INTRO");
        assert_eq!(
            TokenKind::from_str("FRACTION_NUMBER").unwrap(),
            TokenKind::FractionNumber
        );
    }

    #[test]
    fn end_token_has_no_payload() {
        let end = Token::end();
        assert!(end.is_end());
        assert!(end.text.is_empty());
        assert_eq!(end.to_string(), "END");
    }

    #[test]
    fn displays_payload() {
        assert_eq!(Token::new(TokenKind::Word, "main").to_string(), "WORD(main)");
        assert_eq!(Token::bare(TokenKind::Comma).to_string(), "COMMA");
    }
}
