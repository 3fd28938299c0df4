// src/highlight.rs - Prefix-anchored match highlighting

use log::debug;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

// Characters that would let typed input inject pattern syntax.
const META_CHARS: &[char] = &['*', '[', ']', '(', ')', '{', '}', '\\', '^', '$'];

fn sanitize(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if META_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Computes which leading span of a display string matches the current search
/// term, case-insensitively. Only the start-anchored occurrence counts; the
/// host decides how to render the emphasized span.
#[derive(Debug)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Build a matcher for `term`. An empty term highlights nothing. A term
    /// the regex engine still rejects after escaping degrades to highlighting
    /// nothing rather than failing per keystroke.
    pub fn new(term: &str) -> Self {
        if term.is_empty() {
            return Self { pattern: None };
        }
        let pattern = RegexBuilder::new(&format!("^{}", sanitize(term)))
            .case_insensitive(true)
            .build();
        match pattern {
            Ok(re) => Self { pattern: Some(re) },
            Err(err) => {
                debug!("unusable highlight term {:?}: {}", term, err);
                Self { pattern: None }
            }
        }
    }

    /// Byte range of the highlighted prefix within `text`, or `None` when the
    /// term is empty or does not match at the start. An empty match carries no
    /// emphasis and also yields `None`.
    pub fn prefix_span(&self, text: &str) -> Option<Range<usize>> {
        self.pattern
            .as_ref()?
            .find(text)
            .map(|found| found.range())
            .filter(|span| !span.is_empty())
    }

    /// Split `text` into (emphasized prefix, remainder).
    pub fn split<'a>(&self, text: &'a str) -> (&'a str, &'a str) {
        match self.prefix_span(text) {
            Some(span) => text.split_at(span.end),
            None => ("", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_case_insensitive() {
        let highlighter = Highlighter::new("par");
        assert_eq!(highlighter.prefix_span("Paris"), Some(0..3));
        assert_eq!(highlighter.split("Paris"), ("Par", "is"));
    }

    #[test]
    fn test_only_leading_occurrence_counts() {
        let highlighter = Highlighter::new("great");
        // "great" appears, but not as a prefix
        assert_eq!(highlighter.prefix_span("a.b*c is great"), None);
    }

    #[test]
    fn test_metacharacters_are_escaped() {
        let highlighter = Highlighter::new("a.b*c");
        assert_eq!(highlighter.prefix_span("a.b*c is great"), Some(0..5));
        // Without escaping, "*" would quantify and "axbbc" could match
        assert_eq!(highlighter.prefix_span("abc is great"), None);
    }

    #[test]
    fn test_full_meta_set() {
        let term = "[({^$})]\\*";
        let highlighter = Highlighter::new(term);
        let text = format!("{term} suffix");
        assert_eq!(highlighter.prefix_span(&text), Some(0..term.len()));
    }

    #[test]
    fn test_empty_term_is_identity() {
        let highlighter = Highlighter::new("");
        assert_eq!(highlighter.prefix_span("anything"), None);
        assert_eq!(highlighter.split("anything"), ("", "anything"));
    }

    #[test]
    fn test_bare_quantifier_term_highlights_nothing() {
        // '?' is not in the escape set, so it reaches the pattern as a
        // quantifier rather than a literal
        let highlighter = Highlighter::new("?");
        assert_eq!(highlighter.prefix_span("?maybe"), None);
    }

    #[test]
    fn test_no_match_for_unrelated_text() {
        let highlighter = Highlighter::new("ber");
        assert_eq!(highlighter.prefix_span("Paris"), None);
    }
}
