//! Flattening of raw scraped text.
//!
//! Every maximal run of control characters, sentinels and (optionally) commas
//! not sitting between two digits becomes one sentinel. Remaining space runs
//! collapse to a single space. Decimal commas such as `3,4` survive.

use super::SENTINEL;

/// Flatten `text`. Idempotent: `normalize(&normalize(x, d), d) == normalize(x, d)`.
pub fn normalize(text: &str, drop_commas: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_separator = false;
    let mut in_space = false;

    for (i, &c) in chars.iter().enumerate() {
        let separator = is_control(c)
            || c == SENTINEL
            || (drop_commas && c == ',' && !between_digits(&chars, i));

        if separator {
            if !in_separator {
                out.push(SENTINEL);
            }
            in_separator = true;
            in_space = false;
            continue;
        }
        in_separator = false;

        if is_space(c) {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        out.push(c);
    }

    out
}

/// Whitespace the flattener keeps as a plain space.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\u{00A0}' | '\u{202F}' | '\u{2007}')
}

fn is_control(c: char) -> bool {
    c.is_control() || (c.is_whitespace() && !is_space(c))
}

fn between_digits(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit())
}
