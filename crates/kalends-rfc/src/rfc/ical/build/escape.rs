//! TEXT value escaping (RFC 5545 §3.3.11).

/// Escapes a TEXT value for serialization.
///
/// Backslash, semicolon and comma are backslash-escaped; newlines become `\n`.
/// A CR immediately followed by LF collapses into the single `\n`.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            _ => out.push(c),
        }
    }
    out
}

/// Escapes each item of a TEXT list and joins them with commas.
#[must_use]
pub fn escape_text_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| escape_text(item))
        .collect::<Vec<_>>()
        .join(",")
}
