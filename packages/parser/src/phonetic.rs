//! Metaphone phonetic encoding, used by the fuzzy identity hash.
//!
//! Implements the original Metaphone rules over ASCII letters. Multi-word
//! input is encoded word by word and re-joined with single spaces, so
//! `"Chula Vista"` becomes `"XL FST"`. Non-letters separate words and are
//! otherwise ignored.

/// Encodes `text`, word by word.
#[must_use]
pub fn metaphone(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .map(encode_word)
        .filter(|code| !code.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

const fn is_vowel(c: Option<char>) -> bool {
    matches!(c, Some('A' | 'E' | 'I' | 'O' | 'U'))
}

fn encode_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().map(|c| c.to_ascii_uppercase()).collect();
    let len = chars.len();
    let at = |i: usize| chars.get(i).copied();

    let mut code = String::new();

    // Initial-letter exceptions. `vowel_at` is the only position where a
    // vowel is still written out.
    let (mut i, vowel_at) = match (at(0), at(1)) {
        (None, _) => return code,
        (Some('A'), Some('E'))
        | (Some('G' | 'K' | 'P'), Some('N'))
        | (Some('W'), Some('R')) => (1, Some(1)),
        (Some('X'), _) => {
            code.push('S');
            (1, None)
        }
        (Some('W'), Some('H')) => {
            code.push('W');
            (2, None)
        }
        _ => (0, Some(0)),
    };

    while i < len {
        let c = chars[i];
        let prev = i.checked_sub(1).and_then(at);
        let next = at(i + 1);
        let after = at(i + 2);
        let mut skip = 0;

        if prev == Some(c) && c != 'C' {
            i += 1;
            continue;
        }

        match c {
            'A' | 'E' | 'I' | 'O' | 'U' => {
                if vowel_at == Some(i) {
                    code.push(c);
                }
            }
            'B' => {
                if !(prev == Some('M') && next.is_none()) {
                    code.push('B');
                }
            }
            'C' => {
                if next == Some('I') && after == Some('A') {
                    code.push('X');
                } else if next == Some('H') {
                    code.push(if prev == Some('S') { 'K' } else { 'X' });
                } else if matches!(next, Some('I' | 'E' | 'Y')) {
                    if prev != Some('S') {
                        code.push('S');
                    }
                } else {
                    code.push('K');
                }
            }
            'D' => {
                if next == Some('G') && matches!(after, Some('E' | 'Y' | 'I')) {
                    code.push('J');
                    skip = 1;
                } else {
                    code.push('T');
                }
            }
            'G' => {
                let silent_gh = next == Some('H') && after.is_some() && !is_vowel(after);
                let silent_gn = next == Some('N')
                    && (i + 2 == len || (i + 4 == len && chars[i + 2..] == ['E', 'D']));

                if !silent_gh && !silent_gn {
                    code.push(if matches!(next, Some('I' | 'E' | 'Y')) { 'J' } else { 'K' });
                }
            }
            'H' => {
                let after_modifier = matches!(prev, Some('C' | 'S' | 'P' | 'T' | 'G'));
                let between = is_vowel(prev) && !is_vowel(next);
                if !after_modifier && !between {
                    code.push('H');
                }
            }
            'K' => {
                if prev != Some('C') {
                    code.push('K');
                }
            }
            'P' => code.push(if next == Some('H') { 'F' } else { 'P' }),
            'Q' => code.push('K'),
            'S' => {
                if next == Some('H') || (next == Some('I') && matches!(after, Some('O' | 'A'))) {
                    code.push('X');
                } else {
                    code.push('S');
                }
            }
            'T' => {
                if next == Some('I') && matches!(after, Some('O' | 'A')) {
                    code.push('X');
                } else if next == Some('H') {
                    code.push('0');
                } else if !(next == Some('C') && after == Some('H')) {
                    code.push('T');
                }
            }
            'V' => code.push('F'),
            'W' | 'Y' => {
                if is_vowel(next) {
                    code.push(c);
                }
            }
            'X' => code.push_str("KS"),
            'Z' => code.push('S'),
            _ => code.push(c),
        }

        i += 1 + skip;
    }

    code
}
