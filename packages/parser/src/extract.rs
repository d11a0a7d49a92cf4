//! Field extraction stages.
//!
//! The stages run strictly in [`STAGES`] order. Each one is best-effort: it
//! pulls zero or one field out of the cursor and records it, and never
//! fails the parse. Later stages see only what earlier stages left behind,
//! so the order is load-bearing (the zip must go before the state, the
//! state before the city, and the city before the trailing suite).

use std::sync::LazyLock;

use address_parser_models::{TokenKind, title_case};
use regex::Regex;

use crate::ParseState;
use crate::cursor::{LAST, Matcher};

/// Zip or zip+4.
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}(?:-[0-9]{4})?$").expect("valid regex"));

/// Leading digits and trailing letters of an alphanumeric house number.
static ALPHA_HOUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(\p{L}+)$").expect("valid regex"));

/// Ordinal suffixes that turn a number into a street name (`"19th"`).
pub const ORDINALS: &[&str] = &["st", "nd", "rd", "th"];

type Stage = fn(&mut ParseState<'_>);

/// The extraction pipeline, in execution order.
pub const STAGES: &[(&str, Stage)] = &[
    ("house_number", house_number),
    ("fraction", fraction),
    ("block_filler", block_filler),
    ("zip", zip),
    ("state", state_code),
    ("complex_suite", complex_suite),
    ("city", city),
    ("trailing_suite", trailing_suite),
    ("street_type", street_type),
    ("direction", direction),
];

/// Runs every stage against `state`.
pub fn run(state: &mut ParseState<'_>) {
    for (name, stage) in STAGES {
        stage(state);
        log::trace!("{name}: remaining {:?}", state.cursor.remainder());
    }
}

/// A leading number, multi-number, or digits+letters (`"221B"`).
fn house_number(state: &mut ParseState<'_>) {
    let head = state.cursor.peek(0).clone();

    match head.kind {
        TokenKind::Number => {
            if let Ok(number) = head.text.parse::<u64>() {
                state.cursor.next(0);
                state.record.house_number = Some(number);
            }
        }
        TokenKind::MultiNumber => {
            state.cursor.next(0);
            state.record.multi_number = Some(head.text);
        }
        TokenKind::AlphaNumber => {
            let Some(caps) = ALPHA_HOUSE_RE.captures(&head.text) else {
                return;
            };
            let letters = &caps[2];

            // "19th St" is a numbered street, not house 19 in suite "th".
            if ORDINALS.contains(&letters.to_lowercase().as_str()) {
                return;
            }

            let Ok(number) = caps[1].parse::<u64>() else {
                return;
            };

            state.cursor.next(0);
            state.record.house_number = Some(number);

            if state.parser.reference().is_block_word(letters) {
                state.record.is_block = true;
            } else {
                state.record.suite = Some(letters.to_string());
            }
        }
        _ => {}
    }
}

fn fraction(state: &mut ParseState<'_>) {
    if state.cursor.peek(0).kind == TokenKind::FractionNumber {
        state.record.fraction = Some(state.cursor.next(0).text);
    }
}

/// Strips every "block" (and an "of" right after it). Some datasets repeat
/// the word, as in `"BLOCK BLOCK ACACIA AVENUE"`.
fn block_filler(state: &mut ParseState<'_>) {
    let reference = state.parser.reference();

    loop {
        let Some(index) = reference
            .block_words
            .iter()
            .filter_map(|word| state.cursor.find(Matcher::Text(word), false))
            .min()
        else {
            break;
        };

        state.cursor.take(index);
        state.record.is_block = true;

        if state.cursor.peek_at(index).text == "of" {
            state.cursor.take(index);
        }
    }
}

/// The last zip-shaped token anywhere in the input.
fn zip(state: &mut ParseState<'_>) {
    if let Some(token) = state.cursor.pluck(Matcher::Pattern(&ZIP_RE), true) {
        state.record.set_zip(token.text);
    }
}

/// A state code in the last position, with its leading comma.
///
/// A code that doubles as a street suffix or direction (`ct`, `ne`) only
/// counts when the input also carries a comma or a zip, so a bare
/// `"Stierlin Ct"` keeps its suffix.
fn state_code(state: &mut ParseState<'_>) {
    let reference = state.parser.reference();
    let tail = state.cursor.peek(LAST);
    if tail.kind != TokenKind::Word || !reference.is_state(&tail.text) {
        return;
    }

    let ambiguous =
        reference.suffixes.contains(&tail.text) || direction_code(&tail.text).is_some();
    if ambiguous
        && state.record.zip.is_none()
        && !state.cursor.contains(Matcher::Kind(TokenKind::Comma))
    {
        return;
    }

    state.record.state = Some(state.cursor.pop().text.to_uppercase());

    if state.cursor.peek(LAST).kind == TokenKind::Comma {
        state.cursor.pop();
    }
}

/// A suite introducer and the numbers that follow it, e.g.
/// `"Suite 300B"`. The payload is joined in reverse encounter order.
fn complex_suite(state: &mut ParseState<'_>) {
    let Some(index) = state
        .cursor
        .find(Matcher::Kind(TokenKind::SuiteIntro), false)
    else {
        return;
    };

    let mut payload = Vec::new();
    let stop = loop {
        let token = state.cursor.take(index);
        match token.kind {
            TokenKind::SuiteIntro => {}
            TokenKind::Number | TokenKind::MultiNumber | TokenKind::AlphaNumber => {
                payload.push(token.text);
            }
            _ => break token,
        }
    };

    if stop.kind != TokenKind::Comma {
        state.cursor.insert_at(index, stop);
    }

    payload.reverse();
    set_suite(state, &payload);
}

/// Everything after the last comma.
fn city(state: &mut ParseState<'_>) {
    let Some(index) = state.cursor.find(Matcher::Kind(TokenKind::Comma), true) else {
        return;
    };

    let mut parts = Vec::new();
    loop {
        let token = state.cursor.take(index);
        if token.is_end() {
            break;
        }
        if token.kind != TokenKind::Comma && !token.text.is_empty() {
            parts.push(token.text);
        }
    }

    if !parts.is_empty() {
        state.record.city = Some(title_case(&parts.join(" ")));
    }
}

/// A suite keyword left near the tail, with whatever follows it. Overwrites
/// a suite found by [`complex_suite`].
fn trailing_suite(state: &mut ParseState<'_>) {
    let Some(suite_re) = state.parser.suite_word_re() else {
        return;
    };
    if !state.cursor.contains(Matcher::Pattern(suite_re)) {
        return;
    }

    let mut payload = Vec::new();
    loop {
        let token = state.cursor.pop();
        if token.is_end() || suite_re.is_match(&token.text) {
            break;
        }
        if !token.text.is_empty() {
            payload.push(token.text);
        }
    }

    payload.reverse();
    set_suite(state, &payload);
}

/// A known street suffix in the last position.
fn street_type(state: &mut ParseState<'_>) {
    let Some(code) = state
        .parser
        .reference()
        .suffixes
        .get(&state.cursor.peek(LAST).text)
    else {
        return;
    };

    state.cursor.pop();
    state.record.street_type = Some(code.to_string());
}

/// A compass direction at the head, unless it is the only token left (then
/// it is the street name, as in `"E Street"`).
fn direction(state: &mut ParseState<'_>) {
    if state.cursor.peek(1).is_end() {
        return;
    }

    let Some(direction) = direction_code(&state.cursor.peek(0).text) else {
        return;
    };

    state.cursor.next(0);
    state.record.street_direction = Some(direction);
}

/// Normalizes `n`, `north`, `ne`, ... to `N`, `NE`, ...
pub fn direction_code(text: &str) -> Option<String> {
    let first = text.chars().next()?;
    if !matches!(first, 'n' | 's' | 'e' | 'w') {
        return None;
    }

    match text {
        _ if text.len() == 1 => Some(first.to_ascii_uppercase().to_string()),
        "ne" | "nw" | "se" | "sw" => Some(text.to_uppercase()),
        "north" | "south" | "east" | "west" => Some(first.to_ascii_uppercase().to_string()),
        _ => None,
    }
}

fn set_suite(state: &mut ParseState<'_>, payload: &[String]) {
    if !payload.is_empty() {
        state.record.suite = Some(payload.join(" "));
    }
}
