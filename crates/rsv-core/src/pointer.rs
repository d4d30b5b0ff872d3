//! # JSON-Pointer Instance Paths
//!
//! Instance paths follow RFC 6901: the document root is the empty string and
//! every descent appends `/` plus the escaped segment. Within a segment `~`
//! becomes `~0` and `/` becomes `~1`, in that order, so the escape is
//! reversible.

use std::borrow::Cow;

/// Escape one path segment. Borrows when nothing needs escaping.
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Append an object key to a pointer.
pub fn join(base: &str, key: &str) -> String {
    let escaped = escape_segment(key);
    let mut out = String::with_capacity(base.len() + 1 + escaped.len());
    out.push_str(base);
    out.push('/');
    out.push_str(&escaped);
    out
}

/// Append an array index to a pointer.
pub fn join_index(base: &str, index: usize) -> String {
    format!("{base}/{index}")
}
