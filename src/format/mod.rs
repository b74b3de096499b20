//! Sanitizing formatter for chat messages
//!
//! Raw text is escaped in full before any markup is produced, then a fixed
//! list of markdown-like rules is applied to the escaped text. Fenced code
//! blocks are cut out first and their bodies are left untouched by the
//! inline rules.

mod rules;

use std::borrow::Cow;
use tracing::trace;

pub use rules::{Rule, FENCE, INLINE_RULES};

/// Escape `& < > " '` to HTML entities
pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Convert raw text into safe display markup.
///
/// Apply this exactly once to raw text. Its output is not re-escaped
/// on a second pass, so formatting already-formatted text is unsafe.
pub fn format(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let escaped = escape(text);
    let mut output = String::with_capacity(escaped.len() + escaped.len() / 4);
    let mut last = 0;

    for captures in FENCE.captures_iter(&escaped) {
        let whole = match captures.get(0) {
            Some(m) => m,
            None => continue,
        };
        output.push_str(&apply_inline(&escaped[last..whole.start()]));
        output.push_str("<pre><code>");
        output.push_str(captures.get(1).map_or("", |m| m.as_str()));
        output.push_str("</code></pre>");
        last = whole.end();
    }
    output.push_str(&apply_inline(&escaped[last..]));

    output
}

fn apply_inline(segment: &str) -> String {
    let mut current = segment.to_string();
    for rule in INLINE_RULES.iter() {
        let replaced = match rule.pattern.replace_all(&current, rule.replacement) {
            Cow::Owned(replaced) => Some(replaced),
            Cow::Borrowed(_) => None,
        };
        if let Some(replaced) = replaced {
            trace!(rule = rule.name, "formatting rule matched");
            current = replaced;
        }
    }
    current
}
