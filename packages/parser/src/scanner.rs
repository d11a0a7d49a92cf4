//! Lexical scanner: raw address string → ordered token sequence.
//!
//! Each rule is an anchored regex tried at the current position in fixed
//! priority order; the first rule that matches wins and scanning advances
//! past the match. Whitespace produces no token. The catch-all `Other` rule
//! claims every non-whitespace character the earlier rules do not, so a
//! [`AddressError::Scan`] indicates a broken rule table rather than bad
//! input.

use std::sync::LazyLock;

use address_parser_models::{Token, TokenKind};
use regex::Regex;

use crate::AddressError;
use crate::reference::SuiteKeywords;

/// Separator between the two halves of a multi-number.
static MULTI_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[&/\-]\s*").expect("valid regex"));

const WHITESPACE: &str = r"\s+";
const FRACTION: &str = r"[0-9]+\s*/\s*[0-9]+";
const MULTI_NUMBER: &str =
    r"[A-Za-z]*[0-9]+[A-Za-z]*\s*[&\-]\s*[A-Za-z]*[0-9]+[A-Za-z]*(?:/[0-9]+)?";
const WORD: &str = r"[\p{L}.\-'`]+";
const ALPHA_NUMBER: &str = r"[0-9]+\p{L}+|\p{L}+[0-9]+";
const NUMBER: &str = r"[0-9]+";
const COMMA: &str = ",";
const CONJUNCTION: &str = "&";
const OTHER: &str = r"[^\s\p{L}0-9,&]+";

/// A single scanning rule. `kind == None` means the match is skipped.
#[derive(Debug)]
struct Rule {
    kind: Option<TokenKind>,
    re: Regex,
}

impl Rule {
    fn new(kind: Option<TokenKind>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            re: Regex::new(&format!("^(?:{pattern})"))?,
        })
    }
}

/// Longest-match-first tokenizer, compiled once per parser instance.
#[derive(Debug)]
pub struct Scanner {
    rules: Vec<Rule>,
}

impl Scanner {
    /// Compiles the rule table. Suite keywords are matched as whole words,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule fails to compile.
    pub fn new(suite_keywords: &SuiteKeywords) -> Result<Self, regex::Error> {
        let mut rules = vec![Rule::new(None, WHITESPACE)?];

        if let Some(pattern) = suite_pattern(suite_keywords) {
            rules.push(Rule::new(Some(TokenKind::SuiteIntro), &pattern)?);
        }

        for (kind, pattern) in [
            (TokenKind::FractionNumber, FRACTION),
            (TokenKind::MultiNumber, MULTI_NUMBER),
            (TokenKind::Word, WORD),
            (TokenKind::AlphaNumber, ALPHA_NUMBER),
            (TokenKind::Number, NUMBER),
            (TokenKind::Comma, COMMA),
            (TokenKind::Conjunction, CONJUNCTION),
            (TokenKind::Other, OTHER),
        ] {
            rules.push(Rule::new(Some(kind), pattern)?);
        }

        Ok(Self { rules })
    }

    /// Scans `input` into tokens. The caller appends the `End` marker.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Scan`] if some input is claimed by no rule.
    pub fn scan(&self, input: &str) -> Result<Vec<Token>, AddressError> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < input.len() {
            let rest = &input[pos..];

            let Some((rule, len)) = self.rules.iter().find_map(|rule| {
                rule.re
                    .find(rest)
                    .map(|m| m.end())
                    .filter(|&len| len > 0)
                    .map(|len| (rule, len))
            }) else {
                return Err(AddressError::Scan {
                    input: input.to_string(),
                    position: pos,
                    remainder: rest.to_string(),
                });
            };

            if let Some(token) = rule.kind.and_then(|kind| classify(kind, &rest[..len])) {
                tokens.push(token);
            }

            pos += len;
        }

        log::trace!("scanned {} tokens from {input:?}", tokens.len());

        Ok(tokens)
    }
}

/// Builds the suite introducer alternation. Keywords ending in a word
/// character need a trailing word boundary so `"no"` does not claim the
/// start of `"north"`.
fn suite_pattern(keywords: &SuiteKeywords) -> Option<String> {
    let mut words: Vec<&str> = keywords.iter().collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let alternatives: Vec<String> = words
        .into_iter()
        .map(|w| {
            let escaped = regex::escape(w);
            if w.chars().last().is_some_and(char::is_alphanumeric) {
                format!(r"{escaped}\b")
            } else {
                escaped
            }
        })
        .collect();

    Some(format!("(?i:{})", alternatives.join("|")))
}

/// Normalizes the matched text for `kind`. Returns `None` for matches that
/// carry nothing (a lone `"."`).
fn classify(kind: TokenKind, text: &str) -> Option<Token> {
    let token = match kind {
        TokenKind::SuiteIntro => Token::new(kind, text.to_lowercase()),
        TokenKind::FractionNumber => {
            let (num, den) = text.split_once('/')?;
            Token::new(kind, format!("{}/{}", num.trim(), den.trim()))
        }
        TokenKind::MultiNumber => {
            let m = MULTI_SPLIT_RE.find(text)?;
            Token::new(kind, format!("{}-{}", &text[..m.start()], &text[m.end()..]))
        }
        TokenKind::Word => {
            let word = text.to_lowercase();
            let word = word.trim_end_matches('.');
            if word.is_empty() {
                return None;
            }
            Token::new(kind, word)
        }
        TokenKind::AlphaNumber | TokenKind::Number => Token::new(kind, text),
        TokenKind::Comma | TokenKind::Conjunction | TokenKind::End => Token::bare(kind),
        TokenKind::Other | TokenKind::Phrase => Token::new(kind, text.trim().to_lowercase()),
    };

    Some(token)
}
