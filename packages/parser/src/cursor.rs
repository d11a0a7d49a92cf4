//! Mutable, position-addressable view over the remaining tokens.
//!
//! Every extraction rule works exclusively through [`TokenCursor`]. The
//! sequence always ends with a synthetic `End` token that is never removed:
//! reads past either end return `End`, taking `End` leaves it in place, and
//! putting `End` back is a no-op. Negative positions index from the tail,
//! so `-1` is `End` and [`LAST`] (`-2`) is the last real token.
//!
//! Speculative parses bracket their work with [`TokenCursor::save`] and
//! either [`TokenCursor::restore`] (unwind) or [`TokenCursor::commit`]
//! (keep). Snapshots are full copies of the remaining sequence.

use address_parser_models::{Token, TokenKind};
use regex::Regex;

/// Position of the last real token, just before `End`.
pub const LAST: isize = -2;

static END: Token = Token::end();

/// Selects tokens for [`TokenCursor::contains`], [`TokenCursor::find`] and
/// [`TokenCursor::pluck`].
#[derive(Debug, Clone, Copy)]
pub enum Matcher<'a> {
    /// Tokens of the given kind.
    Kind(TokenKind),
    /// Tokens whose text equals the given string exactly.
    Text(&'a str),
    /// Tokens whose text the regex matches anywhere.
    Pattern(&'a Regex),
}

impl Matcher<'_> {
    /// Returns `true` if `token` satisfies this matcher.
    #[must_use]
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Self::Kind(kind) => token.kind == *kind,
            Self::Text(text) => token.text == *text,
            Self::Pattern(re) => re.is_match(&token.text),
        }
    }
}

/// The token sequence under parse, plus its snapshot stack.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    saved: Vec<Vec<Token>>,
    last: Option<Token>,
}

impl TokenCursor {
    /// Wraps `tokens`, appending the `End` marker. Any `End` tokens already
    /// present are dropped so there is exactly one, at the tail.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.is_end()).collect();
        tokens.push(Token::end());
        Self {
            tokens,
            saved: Vec::new(),
            last: None,
        }
    }

    /// Number of real tokens remaining (excluding `End`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len() - 1
    }

    /// Returns `true` if only `End` remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recently consumed or re-inserted token, for diagnostics.
    #[must_use]
    pub const fn last(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    fn resolve(&self, pos: isize) -> Option<usize> {
        let index = if pos < 0 {
            self.tokens.len().checked_sub(pos.unsigned_abs())?
        } else {
            pos.unsigned_abs()
        };
        (index < self.tokens.len()).then_some(index)
    }

    /// Reads the token at `pos` without removing it. Out-of-range positions
    /// read as `End`.
    #[must_use]
    pub fn peek(&self, pos: isize) -> &Token {
        self.resolve(pos).map_or(&END, |i| &self.tokens[i])
    }

    /// Reads the token at absolute `index`, as returned by
    /// [`TokenCursor::find`]. Past the end reads as `End`.
    #[must_use]
    pub fn peek_at(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&END)
    }

    /// Removes and returns the token at `pos`. Out-of-range positions and
    /// the terminator itself return `End` without changing the sequence.
    pub fn next(&mut self, pos: isize) -> Token {
        match self.resolve(pos) {
            Some(index) => self.take(index),
            None => self.record(Token::end()),
        }
    }

    /// Removes and returns the token at absolute `index`, as returned by
    /// [`TokenCursor::find`].
    pub fn take(&mut self, index: usize) -> Token {
        let token = if index < self.len() {
            self.tokens.remove(index)
        } else {
            Token::end()
        };
        self.record(token)
    }

    /// Removes and returns the last real token, or `End` if none remain.
    pub fn pop(&mut self) -> Token {
        self.next(LAST)
    }

    /// Puts `token` back at the head.
    pub fn unshift(&mut self, token: Token) {
        self.insert_at(0, token);
    }

    /// Puts `token` back at `index`, clamped so it never lands after `End`.
    pub fn insert_at(&mut self, index: usize, token: Token) {
        if token.is_end() {
            self.last = Some(token);
            return;
        }
        let index = index.min(self.len());
        self.tokens.insert(index, token.clone());
        self.last = Some(token);
    }

    /// Returns `true` if any real token satisfies `matcher`.
    #[must_use]
    pub fn contains(&self, matcher: Matcher<'_>) -> bool {
        self.real().iter().any(|t| matcher.matches(t))
    }

    /// Index of the first (or, with `reverse`, last) real token satisfying
    /// `matcher`.
    #[must_use]
    pub fn find(&self, matcher: Matcher<'_>, reverse: bool) -> Option<usize> {
        let real = self.real();
        if reverse {
            real.iter().rposition(|t| matcher.matches(t))
        } else {
            real.iter().position(|t| matcher.matches(t))
        }
    }

    /// Removes and returns the first (or last) real token satisfying
    /// `matcher`.
    pub fn pluck(&mut self, matcher: Matcher<'_>, reverse: bool) -> Option<Token> {
        self.find(matcher, reverse).map(|index| self.take(index))
    }

    /// Pushes a snapshot of the remaining sequence.
    pub fn save(&mut self) {
        self.saved.push(self.tokens.clone());
    }

    /// Replaces the sequence with the most recent snapshot, discarding every
    /// change since the matching [`TokenCursor::save`]. Returns `false` if
    /// there was no snapshot.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(tokens) => {
                self.tokens = tokens;
                true
            }
            None => false,
        }
    }

    /// Discards the most recent snapshot, keeping the current sequence.
    /// Returns `false` if there was no snapshot.
    pub fn commit(&mut self) -> bool {
        self.saved.pop().is_some()
    }

    /// Number of outstanding snapshots.
    #[must_use]
    pub fn checkpoints(&self) -> usize {
        self.saved.len()
    }

    /// Drains real tokens from the head until `End`. Destructive: tokens are
    /// consumed as the iterator advances, so callers that need to look
    /// without consuming must [`TokenCursor::save`] first.
    pub fn rest(&mut self) -> Rest<'_> {
        Rest { cursor: self }
    }

    /// The remaining real tokens' text, space-joined.
    #[must_use]
    pub fn remainder(&self) -> String {
        self.real()
            .iter()
            .map(|t| t.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn real(&self) -> &[Token] {
        &self.tokens[..self.len()]
    }

    fn record(&mut self, token: Token) -> Token {
        self.last = Some(token.clone());
        token
    }
}

/// Destructive iterator over the remaining real tokens. See
/// [`TokenCursor::rest`].
#[derive(Debug)]
pub struct Rest<'a> {
    cursor: &'a mut TokenCursor,
}

impl Iterator for Rest<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.cursor.is_empty() {
            return None;
        }
        Some(self.cursor.take(0))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.cursor.len();
        (len, Some(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Token {
        Token::new(TokenKind::Word, text)
    }

    fn number(text: &str) -> Token {
        Token::new(TokenKind::Number, text)
    }

    fn cursor(words: &[&str]) -> TokenCursor {
        TokenCursor::new(words.iter().map(|w| word(w)).collect())
    }

    fn texts(cursor: &TokenCursor) -> Vec<String> {
        cursor.tokens.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn always_ends_with_end() {
        let c = TokenCursor::new(vec![Token::end(), word("main"), Token::end()]);
        assert_eq!(c.len(), 1);
        assert!(c.peek(-1).is_end());
        assert_eq!(c.peek(LAST).text, "main");
    }

    #[test]
    fn peeks_out_of_range_as_end() {
        let c = cursor(&["a", "b"]);
        assert_eq!(c.peek(0).text, "a");
        assert_eq!(c.peek(1).text, "b");
        assert!(c.peek(2).is_end());
        assert!(c.peek(10).is_end());
        assert!(c.peek(-10).is_end());
    }

    #[test]
    fn peeks_at_absolute_index() {
        let c = cursor(&["block", "of", "elm"]);
        assert_eq!(c.peek_at(1).text, "of");
        assert!(c.peek_at(3).is_end());
        assert!(c.peek_at(usize::MAX).is_end());
    }

    #[test]
    fn next_never_removes_end() {
        let mut c = cursor(&["a"]);
        assert_eq!(c.next(0).text, "a");
        assert!(c.next(0).is_end());
        assert!(c.next(0).is_end());
        assert!(c.peek(0).is_end());
        assert_eq!(c.tokens.len(), 1);
    }

    #[test]
    fn pop_takes_last_real_token() {
        let mut c = cursor(&["main", "st", "ca"]);
        assert_eq!(c.pop().text, "ca");
        assert_eq!(c.pop().text, "st");
        assert_eq!(c.pop().text, "main");
        assert!(c.pop().is_end());
        assert!(c.is_empty());
    }

    #[test]
    fn reinserts_tokens() {
        let mut c = cursor(&["a", "c"]);
        c.insert_at(1, word("b"));
        c.unshift(word("z"));
        assert_eq!(texts(&c), vec!["z", "a", "b", "c", ""]);

        c.insert_at(99, word("tail"));
        assert_eq!(c.peek(LAST).text, "tail");
        assert!(c.peek(-1).is_end());
    }

    #[test]
    fn reinserting_end_is_a_no_op() {
        let mut c = cursor(&["a"]);
        let end = c.next(1);
        c.insert_at(1, end.clone());
        c.unshift(end);
        assert_eq!(c.tokens.len(), 2);
    }

    #[test]
    fn matches_by_kind_text_and_pattern() {
        let re = Regex::new(r"^\d{5}$").unwrap();
        let c = TokenCursor::new(vec![word("main"), number("91913"), number("12")]);

        assert!(c.contains(Matcher::Kind(TokenKind::Number)));
        assert!(!c.contains(Matcher::Kind(TokenKind::Comma)));
        assert!(!c.contains(Matcher::Kind(TokenKind::End)));
        assert!(c.contains(Matcher::Text("main")));
        assert!(!c.contains(Matcher::Text("mai")));
        assert!(c.contains(Matcher::Pattern(&re)));
    }

    #[test]
    fn finds_forward_and_reverse() {
        let c = TokenCursor::new(vec![number("1"), word("a"), number("2")]);
        assert_eq!(c.find(Matcher::Kind(TokenKind::Number), false), Some(0));
        assert_eq!(c.find(Matcher::Kind(TokenKind::Number), true), Some(2));
        assert_eq!(c.find(Matcher::Text("zzz"), false), None);
    }

    #[test]
    fn plucks_from_the_middle() {
        let mut c = cursor(&["100", "block", "of", "main"]);
        assert_eq!(c.pluck(Matcher::Text("block"), false).unwrap().text, "block");
        assert_eq!(c.pluck(Matcher::Text("block"), false), None);
        assert_eq!(texts(&c), vec!["100", "of", "main", ""]);
        assert_eq!(c.last().unwrap().text, "block");
    }

    #[test]
    fn restore_unwinds_to_the_latest_snapshot() {
        let mut c = cursor(&["a", "b", "c"]);
        c.save();
        c.next(0);
        c.save();
        c.next(0);
        assert_eq!(c.checkpoints(), 2);

        assert!(c.restore());
        assert_eq!(texts(&c), vec!["b", "c", ""]);
        assert!(c.restore());
        assert_eq!(texts(&c), vec!["a", "b", "c", ""]);
        assert!(!c.restore());
    }

    #[test]
    fn commit_keeps_changes() {
        let mut c = cursor(&["a", "b"]);
        c.save();
        c.next(0);
        assert!(c.commit());
        assert_eq!(c.checkpoints(), 0);
        assert_eq!(texts(&c), vec!["b", ""]);
        assert!(!c.commit());
    }

    #[test]
    fn rest_drains_destructively_and_restarts() {
        let mut c = cursor(&["a", "b", "c"]);
        let first: Vec<String> = c.rest().take(2).map(|t| t.text).collect();
        assert_eq!(first, vec!["a", "b"]);

        let second: Vec<String> = c.rest().map(|t| t.text).collect();
        assert_eq!(second, vec!["c"]);
        assert!(c.rest().next().is_none());
        assert!(c.peek(0).is_end());
    }

    #[test]
    fn remainder_joins_payloads() {
        let c = TokenCursor::new(vec![
            word("main"),
            Token::bare(TokenKind::Comma),
            word("phoenix"),
        ]);
        assert_eq!(c.remainder(), "main phoenix");
    }
}
