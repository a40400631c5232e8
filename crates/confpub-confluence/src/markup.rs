//! Line-based rule table for lightly formatted text.
//!
//! Each line is escaped, then the first rule whose pattern matches is applied
//! until no occurrence is left on that line and the rest of the table is
//! skipped.
//! Heading rules produce a block element; every other line becomes a `<p>`.
//! Blank lines are dropped.
//!
//! Only one rule applies per line, so `**bold** and *italic*` converts the
//! bold part only.

use std::sync::LazyLock;

use regex::Regex;

use crate::formatter::escape_text;

/// One `(pattern, replacement)` entry of the table.
struct Rule {
    pattern: Regex,
    replacement: String,
    block: bool,
}

impl Rule {
    fn inline(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("invalid markup rule"),
            replacement: replacement.to_owned(),
            block: false,
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules: Vec<Rule> = (1..=6)
        .map(|level| Rule {
            pattern: Regex::new(&format!(r"^\s*#{{{level}}}\s+(.+?)\s*$"))
                .expect("invalid heading rule"),
            replacement: format!("<h{level}>${{1}}</h{level}>"),
            block: true,
        })
        .collect();

    rules.extend([
        Rule::inline(r"\*\*\*(.+?)\*\*\*", "<strong><em>${1}</em></strong>"),
        Rule::inline(r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
        Rule::inline(r"__(.+?)__", "<strong>${1}</strong>"),
        Rule::inline(r"\*([^*\s][^*]*?)\*", "<em>${1}</em>"),
        Rule::inline(r"(^|\W)_([^_\s][^_]*?)_(\W|$)", "${1}<em>${2}</em>${3}"),
        Rule::inline(r"~~(.+?)~~", "<del>${1}</del>"),
    ]);
    rules
});

/// Convert text to storage-format paragraphs and headings.
#[must_use]
pub fn render_markup(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(line: &str) -> String {
    let escaped = escape_text(line.trim_end());

    match RULES.iter().find(|rule| rule.pattern.is_match(&escaped)) {
        Some(rule) if rule.block => rule
            .pattern
            .replace(&escaped, rule.replacement.as_str())
            .into_owned(),
        Some(rule) => {
            let mut line = escaped;
            while rule.pattern.is_match(&line) {
                line = rule
                    .pattern
                    .replace_all(&line, rule.replacement.as_str())
                    .into_owned();
            }
            format!("<p>{line}</p>")
        }
        None => format!("<p>{escaped}</p>"),
    }
}
