//!
//! Text helpers for the diagnostics channel.
//!

/// Strip the common leading indentation from every non-blank line, then trim
/// the block. `<br>` markers become newlines.
#[must_use]
pub fn heredoc(message: &str) -> String {
    let indent = message
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let dedented = message
        .lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n");

    dedented.trim().replace("<br>", "\n")
}

/// Shorten `s` to at most `max` characters by keeping `head` leading and
/// `tail` trailing characters around an ellipsis.
#[must_use]
pub fn ellipsize_middle(s: &str, max: usize, head: usize, tail: usize) -> String {
    let count = s.chars().count();
    if count <= max || head + tail >= count {
        return s.to_string();
    }

    let start: String = s.chars().take(head).collect();
    let end: String = s.chars().skip(count - tail).collect();

    format!("{start}…{end}")
}

/// Replace every run of characters that are not ASCII alphanumerics with a
/// single underscore, dropping `http`/`https` schemes. Used to derive file
/// prefixes from node URLs.
#[must_use]
pub fn slug(s: &str) -> String {
    let stripped = s
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    out.trim_matches('_').to_string()
}

///
/// TESTS
///
