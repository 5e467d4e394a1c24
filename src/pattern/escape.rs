//! Sigma-to-glob escape translation.
//!
//! Sigma wildcard escaping:
//! - a literal backslash is written `\` or `\\`
//! - an escaped wildcard is `\*`
//! - a literal backslash before a wildcard is `\\*`
//! - a literal backslash and a literal wildcard is `\\\*`
//! - three or four backslashes before a wildcard both mean one literal
//!   backslash plus one literal wildcard character
//!
//! The glob primitive expects even backslash runs for literal backslashes, so
//! any odd run outside wildcard context gets one compensating backslash.
//! Square and curly brackets are plain characters in Sigma but structural to
//! the glob primitive and are always escaped. A single parity mistake here
//! silently changes match semantics, hence the byte-exact transduction.

use std::borrow::Cow;

const SIGMA_WILDCARD: u8 = b'*';
const SIGMA_SINGLE: u8 = b'?';
const SIGMA_ESCAPE: u8 = b'\\';

fn is_bracket(b: u8) -> bool {
    matches!(b, b'[' | b']' | b'{' | b'}')
}

/// Translate a Sigma pattern into glob escaping, borrowing when no
/// translation is needed.
pub fn escape_sigma_for_glob_cow(s: &str) -> Cow<'_, str> {
    if s.is_empty() {
        return Cow::Borrowed(s);
    }

    let needs_escaping = s
        .bytes()
        .any(|b| b == SIGMA_ESCAPE || is_bracket(b));
    if !needs_escaping {
        return Cow::Borrowed(s);
    }

    Cow::Owned(escape_sigma_for_glob_owned(s))
}

/// Translate a Sigma pattern into glob escaping.
pub fn escape_sigma_for_glob(s: &str) -> String {
    escape_sigma_for_glob_cow(s).into_owned()
}

/// Single right-to-left pass: track wildcard mode and the length of the
/// current backslash run outside wildcard mode, balancing odd runs with one
/// compensating backslash. The output is built reversed and flipped once.
fn escape_sigma_for_glob_owned(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() * 2);
    let mut wildcard = false;
    let mut slash_count = 0usize;

    for i in (0..bytes.len()).rev() {
        let ch = bytes[i];

        match ch {
            SIGMA_WILDCARD | SIGMA_SINGLE => wildcard = true,
            SIGMA_ESCAPE => {
                if !wildcard {
                    slash_count += 1;
                }
            }
            _ => wildcard = false,
        }

        if ch != SIGMA_ESCAPE && slash_count > 0 {
            if slash_count % 2 != 0 {
                out.push(SIGMA_ESCAPE);
            }
            slash_count = 0;
        }

        out.push(ch);

        if is_bracket(ch) {
            out.push(SIGMA_ESCAPE);
        }
    }

    // A run reaching the start of the string has no terminating character.
    if slash_count % 2 != 0 {
        out.push(SIGMA_ESCAPE);
    }

    out.reverse();

    // Only ASCII bytes were inserted at byte boundaries of valid UTF-8.
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}
