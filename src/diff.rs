//! Human-readable HTML diff between two strings.
//!
//! Display glue around the `similar` crate: the edit workflow treats this as
//! a black box that turns (original, edited) into markup.

use similar::{ChangeTag, TextDiff};

/// Render a word-level diff of `old` vs `new` as inline HTML.
///
/// Deletions come out as `<del>` spans and insertions as `<ins>` spans;
/// unchanged runs pass through escaped.
#[must_use]
pub fn html_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_words(old, new);
    let mut html = String::new();
    for change in diff.iter_all_changes() {
        let escaped = escape(change.value());
        match change.tag() {
            ChangeTag::Delete => {
                html.push_str("<del>");
                html.push_str(&escaped);
                html.push_str("</del>");
            }
            ChangeTag::Insert => {
                html.push_str("<ins>");
                html.push_str(&escaped);
                html.push_str("</ins>");
            }
            ChangeTag::Equal => html.push_str(&escaped),
        }
    }
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
