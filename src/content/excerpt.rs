//! Plain-text excerpts for search results.
//!
//! Markdown syntax is stripped by an ordered list of rewrites, then
//! whitespace is collapsed and the result cut to a fixed number of
//! characters. The cut is not word-aware; a trailing partial word is part
//! of the contract.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Default excerpt length in characters.
pub const EXCERPT_LEN: usize = 300;

/// Rewrites applied in order. `None` marks the wikilink rule, which needs a
/// closure to choose between target and display text.
static RULES: LazyLock<Vec<(Regex, Option<&'static str>)>> = LazyLock::new(|| {
    [
        // fenced code, then inline code
        (r"(?s)```.*?```", Some("")),
        (r"`[^`]+`", Some("")),
        // heading lines
        (r"(?m)^#{1,6}[ \t]+[^\n]*", Some("")),
        // bold, italic
        (r"\*\*([^*]+)\*\*", Some("${1}")),
        (r"\*([^*]+)\*", Some("${1}")),
        // [label](url)
        (r"\[([^\]]+)\]\([^)]+\)", Some("${1}")),
        // [[target]] / [[target|display]]
        (r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]", None),
        // list and quote markers
        (r"(?m)^\s*[-*+]\s+", Some("")),
        (r"(?m)^\s*\d+\.\s+", Some("")),
        (r"(?m)^\s*>\s+", Some("")),
        // table cells
        (r"\|[^|\n]+", Some("")),
        // horizontal rules
        (r"[-=]{3,}", Some("")),
        (r"\n{2,}", Some(" ")),
        (r"\s+", Some(" ")),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Strip markdown syntax and collapse whitespace.
pub fn strip_markdown(text: &str) -> String {
    let mut text = text.to_owned();

    for (re, replacement) in RULES.iter() {
        text = match replacement {
            Some(rep) => re.replace_all(&text, *rep).into_owned(),
            None => re
                .replace_all(&text, |caps: &Captures| {
                    caps.get(2).or_else(|| caps.get(1)).map_or("", |m| m.as_str()).to_owned()
                })
                .into_owned(),
        };
    }

    text.trim().to_owned()
}

/// Build an excerpt of at most `max_chars` characters.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    strip_markdown(body).chars().take(max_chars).collect()
}
