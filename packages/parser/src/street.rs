//! Street name resolution.
//!
//! Runs after field extraction, against whatever tokens are left. The
//! strategies are tried in [`StreetStrategy::ORDER`]; the first one that
//! applies sets `street_name` (and possibly `street_type` and
//! `street_direction`) and the rest are skipped.

use std::sync::LazyLock;

use address_parser_models::{TokenKind, title_case};
use regex::Regex;
use strum_macros::{AsRefStr, Display};

use crate::cursor::Matcher;
use crate::extract::ORDINALS;
use crate::{AddressError, ParseState};

static INTERSTATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:i|interstate)$").expect("valid regex"));

/// Travel-direction qualifiers on a highway (`"I-5 SB"`).
const BOUNDS: &[&str] = &["sb", "nb", "eb", "wb"];

/// Words appended after the route number (`"I-8 Business"`).
const MODIFIERS: &[&str] = &["business", "loop"];

const HIGHWAY_TYPE: &str = "highway";

/// How a street name was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StreetStrategy {
    /// A highway designator plus route number.
    Highway,
    /// A number, optional ordinal and optional suffix (`"19th St"`).
    Numbered,
    /// Words up to the first suffix or comma.
    Simple,
}

impl StreetStrategy {
    /// Resolution order.
    pub const ORDER: [Self; 3] = [Self::Highway, Self::Numbered, Self::Simple];

    fn apply(self, state: &mut ParseState<'_>) -> bool {
        match self {
            Self::Highway => highway(state),
            Self::Numbered => numbered(state),
            Self::Simple => simple(state),
        }
    }
}

/// Resolves the street name from the remaining tokens.
///
/// # Errors
///
/// Returns [`AddressError::Parse`] if no strategy applies, which only
/// happens when nothing is left to name the street with.
pub(crate) fn resolve(state: &mut ParseState<'_>) -> Result<StreetStrategy, AddressError> {
    for strategy in StreetStrategy::ORDER {
        if strategy.apply(state) {
            debug_assert_eq!(state.cursor.checkpoints(), 0);
            log::debug!("street resolved by {strategy} in {:?}", state.input);
            return Ok(strategy);
        }
    }

    Err(state.parse_error(TokenKind::Word, "couldn't parse the street name"))
}

/// `"I - 8 Business"`, `"Highway 94 EB"`, `"Old Hwy 80"`.
///
/// Drains the remaining tokens under a checkpoint; if no designator or no
/// route number turns up, the tokens are put back untouched.
fn highway(state: &mut ParseState<'_>) -> bool {
    let Some(highway_re) = state.parser.highway_re() else {
        return false;
    };
    if !state.cursor.contains(Matcher::Pattern(highway_re)) {
        return false;
    }

    state.cursor.save();

    let mut designator = None;
    let mut route = None;
    let mut bound = None;
    let mut adjectives = Vec::new();
    let mut modifiers = Vec::new();

    for token in state.cursor.rest() {
        if highway_re.is_match(&token.text) {
            designator = Some(token.text.trim_end_matches('-').to_string());
            continue;
        }

        match token.kind {
            TokenKind::Number => route = Some(token.text),
            _ if BOUNDS.contains(&token.text.as_str()) => bound = Some(token.text),
            _ if MODIFIERS.contains(&token.text.as_str()) => modifiers.push(token.text),
            TokenKind::Word if token.text != "-" => adjectives.push(token.text),
            _ => {}
        }
    }

    let (Some(designator), Some(route)) = (designator, route) else {
        state.cursor.restore();
        log::debug!("no highway in {:?}, backtracking", state.input);
        return false;
    };

    state.cursor.commit();

    let kind = if INTERSTATE_RE.is_match(&designator) {
        "interstate"
    } else {
        "highway"
    };

    let mut words = adjectives;
    words.push(kind.to_string());
    words.push(route);
    words.extend(modifiers);

    state.record.street_name = Some(title_case(&words.join(" ")));
    state.record.street_type = Some(HIGHWAY_TYPE.to_string());
    if let Some(bound) = bound {
        state.record.street_direction = Some(bound.to_uppercase());
    }

    true
}

/// `"24 th St"`, `"19th St"`, `"5 Ave"`.
fn numbered(state: &mut ParseState<'_>) -> bool {
    if !matches!(
        state.cursor.peek(0).kind,
        TokenKind::Number | TokenKind::AlphaNumber
    ) {
        return false;
    }

    let head = state.cursor.next(0);

    let bare_number = head.kind == TokenKind::Number;
    let mut name = head.text;

    // "19th" already carries its ordinal; only a bare "24" takes a split "th".
    if bare_number {
        let ordinal = state.cursor.next(0);
        if ORDINALS.contains(&ordinal.text.as_str()) {
            name.push_str(&ordinal.text);
        } else {
            state.cursor.unshift(ordinal);
        }
    }

    state.record.street_name = Some(title_case(&name));

    let suffix = state.cursor.next(0);
    match state.parser.reference().suffixes.get(&suffix.text) {
        Some(code) => state.record.street_type = Some(code.to_string()),
        None => state.cursor.unshift(suffix),
    }

    true
}

/// Consumes words until a comma, the end, or a known suffix that is not the
/// first word (so `"Court Street"` keeps `"Court"` as its name).
fn simple(state: &mut ParseState<'_>) -> bool {
    if state.cursor.is_empty() {
        return false;
    }

    let suffixes = &state.parser.reference().suffixes;
    let mut words = Vec::new();
    let mut taken = 0;

    loop {
        let token = state.cursor.next(0);
        match token.kind {
            TokenKind::End | TokenKind::Comma => break,
            _ => {}
        }

        if taken > 0
            && let Some(code) = suffixes.get(&token.text)
        {
            state.record.street_type = Some(code.to_string());
            break;
        }

        taken += 1;
        if !token.text.is_empty() {
            words.push(token.text);
        }
    }

    if !words.is_empty() {
        state.record.street_name = Some(title_case(&words.join(" ")));
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AddressParser;
    use crate::cursor::TokenCursor;
    use address_parser_models::AddressRecord;

    fn resolve_tokens(parser: &AddressParser, input: &str) -> (StreetStrategy, AddressRecord, String) {
        let tokens = parser.scanner().scan(input).unwrap();
        let mut state = ParseState {
            parser,
            input,
            cursor: TokenCursor::new(tokens),
            record: AddressRecord::default(),
        };
        let strategy = resolve(&mut state).unwrap();
        (strategy, state.record, state.cursor.remainder())
    }

    #[test]
    fn resolves_interstate_with_modifier() {
        let parser = AddressParser::with_defaults().unwrap();
        let (strategy, record, rest) = resolve_tokens(&parser, "I - 8 Business");
        assert_eq!(strategy, StreetStrategy::Highway);
        assert_eq!(record.street_name.as_deref(), Some("Interstate 8 Business"));
        assert_eq!(record.street_type.as_deref(), Some("highway"));
        assert!(rest.is_empty());
    }

    #[test]
    fn resolves_highway_with_bound_and_adjective() {
        let parser = AddressParser::with_defaults().unwrap();
        let (_, record, _) = resolve_tokens(&parser, "Old Hwy 80 eb");
        assert_eq!(record.street_name.as_deref(), Some("Old Highway 80"));
        assert_eq!(record.street_direction.as_deref(), Some("EB"));

        let (_, record, _) = resolve_tokens(&parser, "I-5");
        assert_eq!(record.street_name.as_deref(), Some("Interstate 5"));
    }

    #[test]
    fn highway_without_route_backtracks() {
        let parser = AddressParser::with_defaults().unwrap();
        let (strategy, record, _) = resolve_tokens(&parser, "Old Highway");
        assert_eq!(strategy, StreetStrategy::Simple);
        assert_eq!(record.street_name.as_deref(), Some("Old"));
        assert_eq!(record.street_type.as_deref(), Some("hwy"));
        assert_eq!(record.street_direction, None);
    }

    #[test]
    fn resolves_numbered_streets() {
        let parser = AddressParser::with_defaults().unwrap();

        let (strategy, record, _) = resolve_tokens(&parser, "19th St");
        assert_eq!(strategy, StreetStrategy::Numbered);
        assert_eq!(record.street_name.as_deref(), Some("19th"));
        assert_eq!(record.street_type.as_deref(), Some("st"));

        let (_, record, _) = resolve_tokens(&parser, "24 th Street");
        assert_eq!(record.street_name.as_deref(), Some("24th"));
        assert_eq!(record.street_type.as_deref(), Some("st"));

        let (_, record, rest) = resolve_tokens(&parser, "5 Corners");
        assert_eq!(record.street_name.as_deref(), Some("5"));
        assert_eq!(record.street_type, None);
        assert_eq!(rest, "corners");
    }

    #[test]
    fn simple_street_stops_at_suffix_after_first_word() {
        let parser = AddressParser::with_defaults().unwrap();

        let (strategy, record, _) = resolve_tokens(&parser, "Pearl St");
        assert_eq!(strategy, StreetStrategy::Simple);
        assert_eq!(record.street_name.as_deref(), Some("Pearl"));
        assert_eq!(record.street_type.as_deref(), Some("st"));

        let (_, record, _) = resolve_tokens(&parser, "Court Street");
        assert_eq!(record.street_name.as_deref(), Some("Court"));
        assert_eq!(record.street_type.as_deref(), Some("st"));

        let (_, record, rest) = resolve_tokens(&parser, "Bennet Rd and Main St");
        assert_eq!(record.street_name.as_deref(), Some("Bennet"));
        assert_eq!(record.street_type.as_deref(), Some("rd"));
        assert_eq!(rest, "and main st");
    }

    #[test]
    fn simple_street_stops_at_comma() {
        let parser = AddressParser::with_defaults().unwrap();
        let (_, record, rest) = resolve_tokens(&parser, "The Landmark, One Market");
        assert_eq!(record.street_name.as_deref(), Some("The Landmark"));
        assert_eq!(record.street_type, None);
        assert_eq!(rest, "one market");
    }

    #[test]
    fn nothing_left_is_a_parse_error() {
        let parser = AddressParser::with_defaults().unwrap();
        let mut state = ParseState {
            parser: &parser,
            input: "1234",
            cursor: TokenCursor::new(Vec::new()),
            record: AddressRecord::default(),
        };
        let err = resolve(&mut state).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(state.cursor.checkpoints(), 0);
    }

    #[test]
    fn strategy_names() {
        assert_eq!(StreetStrategy::Highway.to_string(), "highway");
        assert_eq!(StreetStrategy::Numbered.as_ref(), "numbered");
    }
}
