//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", s[..end].trim_end())
    }
}

/// Split text into sentences on `.`, `!`, `?` and line breaks.
///
/// Empty fragments are dropped and surrounding whitespace trimmed. Periods
/// between two digits (`3.2`) do not end a sentence.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    for (i, ch) in text.char_indices() {
        let is_break = match ch {
            '!' | '?' | '\n' => true,
            '.' => {
                let prev_digit = i > 0 && bytes[i - 1].is_ascii_digit();
                let next_digit = bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit());
                !(prev_digit && next_digit)
            }
            _ => false,
        };
        if is_break {
            let piece = text[start..i].trim();
            if !piece.is_empty() {
                out.push(piece);
            }
            start = i + ch.len_utf8();
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// First sentence of `text`, truncated to `max_len` bytes.
pub fn excerpt(text: &str, max_len: usize) -> String {
    let first = sentences(text).into_iter().next().unwrap_or("");
    truncate(first, max_len)
}
