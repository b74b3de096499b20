// Location: src/format/rules.rs

use lazy_static::lazy_static;
use regex::Regex;

/// A single substitution applied to already-escaped text
pub struct Rule {
    /// Name used in trace output
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: &'static str,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("formatting rule pattern is valid"),
            replacement,
        }
    }
}

lazy_static! {
    /// Paired triple backticks. Matched before any inline rule and shields
    /// its body from them.
    pub static ref FENCE: Regex =
        Regex::new(r"(?s)```(.*?)```").expect("fence pattern is valid");

    /// Inline rules in precedence order. Triple markers run before double
    /// markers, double before single, so `***a***` is never split into a
    /// bold run wrapping stray asterisks. Line breaks run last because no
    /// earlier rule spans a newline.
    pub static ref INLINE_RULES: Vec<Rule> = vec![
        Rule::new("bold_italic_asterisk", r"\*\*\*(.+?)\*\*\*", "<strong><em>${1}</em></strong>"),
        Rule::new("bold_italic_underscore", r"___(.+?)___", "<strong><em>${1}</em></strong>"),
        Rule::new("bold_asterisk", r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
        Rule::new("bold_underscore", r"__(.+?)__", "<strong>${1}</strong>"),
        Rule::new("italic_asterisk", r"\*(.+?)\*", "<em>${1}</em>"),
        Rule::new("italic_underscore", r"_(.+?)_", "<em>${1}</em>"),
        Rule::new("line_break", r"\n", "<br>"),
    ];
}
