// =============================================================================
// Text normalization for string literals
// =============================================================================

/// Escape every `quote` in `raw` so the text can sit inside a `quote`-delimited
/// literal.
/// Role: Only the delimiter is touched. Existing backslashes, punctuation and
/// non-ASCII prose pass through as written.
///
/// Not idempotent: normalizing already-escaped text escapes it again, so
/// normalize each raw payload exactly once.
pub fn normalize(raw: &str, quote: char) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        if ch == quote {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Reverse of [`normalize`]: `\` followed by `quote` becomes `quote`.
pub fn unescape(literal: &str, quote: char) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&quote) {
            continue;
        }
        out.push(ch);
    }
    out
}
