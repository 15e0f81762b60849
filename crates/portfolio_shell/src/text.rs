//! Text shaping for the command context: word wrapping and link normalization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Width the context text is wrapped to; matches the narrowest screen the shell targets.
pub const TERMINAL_COLS: usize = 65;

static LINK_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("link scheme pattern"));

/// Greedy word wrap that keeps the input's own line breaks.
///
/// Each paragraph is re-flowed on whitespace; words are joined with single spaces while the line
/// stays within `max_width` characters. A word longer than the width gets a line to itself.
/// Blank paragraphs survive as empty lines.
pub fn wrap_text(text: &str, max_width: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let paragraphs: Vec<String> = text
        .split('\n')
        .map(|paragraph| wrap_paragraph(paragraph.strip_suffix('\r').unwrap_or(paragraph), max_width))
        .collect();
    paragraphs.join("\n")
}

fn wrap_paragraph(paragraph: &str, max_width: usize) -> String {
    let mut words = paragraph.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut current_len = first.chars().count();
    for word in words {
        let word_len = word.chars().count();
        if current_len + 1 + word_len <= max_width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    lines.push(current);
    lines.join("\n")
}

/// Normalize a profile link to `https://...`, or `N/A` when there is none.
pub fn format_link(link: Option<&str>) -> String {
    match link.map(str::trim) {
        None | Some("") | Some("N/A") => "N/A".to_string(),
        Some(link) => format!("https://{}", LINK_SCHEME.replace(link, "")),
    }
}
