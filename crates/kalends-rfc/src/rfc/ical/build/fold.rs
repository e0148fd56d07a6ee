//! Content line folding (RFC 5545 §3.1).

/// Folds a content line so no physical line exceeds `width` octets.
///
/// Continuation lines start with a single space, which counts toward the
/// width. Folds only at UTF-8 character boundaries.
#[must_use]
pub fn fold_line(line: &str, width: usize) -> String {
    if line.len() <= width {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / width.max(1) * 3);
    let mut current_len = 0;
    let mut first_segment = true;

    for c in line.chars() {
        let char_len = c.len_utf8();

        // Always place at least one character per segment
        if current_len + char_len > width && current_len > usize::from(!first_segment) {
            result.push_str("\r\n ");
            current_len = 1;
            first_segment = false;
        }

        result.push(c);
        current_len += char_len;
    }

    result
}
