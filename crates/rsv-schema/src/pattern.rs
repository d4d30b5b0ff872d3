//! # ECMAScript Patterns
//!
//! JSON Schema `pattern` values are ECMA-262 regular expressions, and the
//! upstream contracts are written against JavaScript's Unicode-mode engine.
//! The `regex` crate agrees on almost all of the syntax the contracts use,
//! with two differences in the shorthand classes:
//!
//! - `\w` and `\d` are Unicode-aware in `regex`, while ECMAScript's are
//!   ASCII-only even in Unicode mode. A token name such as `"Été"` must
//!   fail `^[\w ]+$`.
//! - ECMAScript's `\s` also covers U+FEFF (BYTE ORDER MARK), which the
//!   Unicode `White_Space` property used by `regex` does not. A symbol of
//!   `"\u{FEFF}"` must fail `^\S+$`.
//!
//! [`translate`] rewrites these shorthand classes into explicit sets before
//! compilation and leaves every other construct untouched.
//! Matching uses search semantics (`RegExp.prototype.test`), so unanchored
//! patterns match anywhere in the string.

use std::fmt;

use regex::Regex;

const WORD: &str = "0-9A-Za-z_";
const DIGIT: &str = "0-9";
const SPACE: &str = r"\s\x{FEFF}";

/// A compiled `pattern` keyword, remembering its ECMAScript source.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Translate and compile an ECMAScript pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&translate(source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Rewrite `\w`, `\W`, `\d` and `\D` into ASCII classes, and widen `\s`
/// and `\S` to include U+FEFF.
///
/// Inside a bracket expression the positive forms expand to bare ranges and
/// the negated forms to a nested negated class, which the `regex` crate
/// supports.
pub fn translate(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    // Dangling escape: leave it for the regex parser to reject.
                    out.push('\\');
                    break;
                };
                let (set, negated) = match escaped {
                    'w' => (WORD, false),
                    'W' => (WORD, true),
                    'd' => (DIGIT, false),
                    'D' => (DIGIT, true),
                    's' => (SPACE, false),
                    'S' => (SPACE, true),
                    other => {
                        out.push('\\');
                        out.push(other);
                        continue;
                    }
                };
                match (in_class, negated) {
                    (true, false) => out.push_str(set),
                    (_, true) => {
                        out.push_str("[^");
                        out.push_str(set);
                        out.push(']');
                    }
                    (false, false) => {
                        out.push('[');
                        out.push_str(set);
                        out.push(']');
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                // Keep the negation marker attached to its bracket.
                if chars.as_str().starts_with('^') {
                    out.push('^');
                    chars.next();
                }
            }
            '[' => out.push_str("\\["),
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
