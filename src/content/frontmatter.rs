//! Frontmatter extraction for wiki documents.
//!
//! Only a one-level-deep subset of YAML is recognized:
//!
//! ```text
//! ---
//! title: "Setup"            ← scalar, matching quotes stripped
//! tags: [install, config]   ← inline list
//! related:                  ← block list header
//!   - "[[Overview]]"        ← block list item
//! ---
//! ```
//!
//! Every other line inside the block is ignored. A document that does not
//! open with the delimiter, or never closes it, is returned untouched with an
//! empty map.
//!
//! # Line Parser
//!
//! ```text
//!              key: value            key:
//!   ┌────────┐ ◀────────── ┌───────┐ ──────────▶ ┌────────────┐
//!   │ Scalar │             │ (any) │             │ ListItems  │ ◀─┐
//!   └────────┘             └───────┘             └─────┬──────┘   │
//!                                                      └──────────┘
//!                                                      "  - item"
//! ```

use rustc_hash::FxHashMap;

/// Marker line opening and closing the frontmatter block.
const DELIMITER: &str = "---";

// ============================================================================
// Types
// ============================================================================

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

/// Parsed frontmatter map. Unrecognized keys are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: FxHashMap<String, FrontmatterValue>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.fields.get(key)
    }

    /// Non-empty scalar value for `key`.
    ///
    /// Lists and empty strings count as absent, so callers can fall back
    /// to a default with `map_or`.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FrontmatterValue::Scalar(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// List value for `key`, empty when absent or scalar.
    pub fn list(&self, key: &str) -> &[String] {
        match self.fields.get(key) {
            Some(FrontmatterValue::List(items)) => items,
            _ => &[],
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, key: &str, value: FrontmatterValue) {
        self.fields.insert(key.to_owned(), value);
    }

    fn push_item(&mut self, key: &str, item: String) {
        match self.fields.get_mut(key) {
            Some(FrontmatterValue::List(items)) => items.push(item),
            _ => self.insert(key, FrontmatterValue::List(vec![item])),
        }
    }
}

/// A document split into its metadata and markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
}

// ============================================================================
// Parsing
// ============================================================================

/// Shape of a single line inside the block.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// `key: value` or `key:`
    Key(&'a str, &'a str),
    /// `  - item`
    Item(&'a str),
    Other,
}

/// Parser state between lines.
enum State<'a> {
    Scalar,
    /// After `key:` with an empty value; `  - item` lines append to `key`.
    ListItems(&'a str),
}

/// Split `content` into frontmatter and body.
pub fn parse_document(content: &str) -> ParsedDocument {
    let untouched = || ParsedDocument {
        frontmatter: Frontmatter::default(),
        body: content.to_owned(),
    };

    if !content.starts_with(DELIMITER) {
        return untouched();
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let Some(end) = lines
        .iter()
        .skip(1)
        .position(|line| line.trim() == DELIMITER)
        .map(|pos| pos + 1)
    else {
        return untouched();
    };

    ParsedDocument {
        frontmatter: parse_block(&lines[1..end]),
        body: lines[end + 1..].join("\n").trim().to_owned(),
    }
}

/// Run the line state machine over the lines between the delimiters.
fn parse_block(lines: &[&str]) -> Frontmatter {
    let mut frontmatter = Frontmatter::default();
    let mut state = State::Scalar;

    for &raw in lines {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        state = match (state, classify(line)) {
            (State::ListItems(key), Line::Item(item)) => {
                frontmatter.push_item(key, strip_quotes(item.trim()).to_owned());
                State::ListItems(key)
            }
            (_, Line::Key(key, "")) => {
                frontmatter.insert(key, FrontmatterValue::List(Vec::new()));
                State::ListItems(key)
            }
            (_, Line::Key(key, value)) => {
                frontmatter.insert(key, parse_value(value));
                State::Scalar
            }
            (state, _) => state,
        };
    }

    frontmatter
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(char::is_whitespace) {
        let item = line
            .trim_start()
            .strip_prefix('-')
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(str::trim)
            .filter(|rest| !rest.is_empty());
        return item.map_or(Line::Other, Line::Item);
    }

    let Some((key, value)) = line.split_once(':') else {
        return Line::Other;
    };
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid_key {
        Line::Key(key, value.trim())
    } else {
        Line::Other
    }
}

/// Scalar or `[a, b, c]` inline list.
fn parse_value(value: &str) -> FrontmatterValue {
    match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => FrontmatterValue::List(
            inner
                .split(',')
                .map(|item| strip_quotes(item.trim()))
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        None => FrontmatterValue::Scalar(strip_quotes(value).to_owned()),
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        })
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> FrontmatterValue {
        FrontmatterValue::Scalar(s.to_owned())
    }

    fn list(items: &[&str]) -> FrontmatterValue {
        FrontmatterValue::List(items.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn test_no_delimiter_returns_input_unchanged() {
        let content = "# Title\n\nSome text\n";
        let doc = parse_document(content);
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, content);
    }

    #[test]
    fn test_unterminated_block_is_all_body() {
        let content = "---\ntitle: Lost\n\nno closing marker";
        let doc = parse_document(content);
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, content);
    }

    #[test]
    fn test_scalars_with_quotes() {
        let doc = parse_document("---\ntitle: \"Quoted Title\"\ntype: 'guide'\nplain: value\n---\nBody");
        assert_eq!(doc.frontmatter.get("title"), Some(&scalar("Quoted Title")));
        assert_eq!(doc.frontmatter.get("type"), Some(&scalar("guide")));
        assert_eq!(doc.frontmatter.get("plain"), Some(&scalar("value")));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_mismatched_quotes_are_kept() {
        let doc = parse_document("---\ntitle: \"half'\n---\n");
        assert_eq!(doc.frontmatter.scalar("title"), Some("\"half'"));
    }

    #[test]
    fn test_inline_list() {
        let doc = parse_document("---\ntags: [install, \"config\", 'setup', , ]\n---\n");
        assert_eq!(
            doc.frontmatter.get("tags"),
            Some(&list(&["install", "config", "setup"]))
        );
    }

    #[test]
    fn test_block_list() {
        let content = "---\nrelated:\n  - \"[[Overview]]\"\n  - plain\n  -   'spaced'  \ntitle: After\n---\nbody";
        let doc = parse_document(content);
        assert_eq!(
            doc.frontmatter.get("related"),
            Some(&list(&["[[Overview]]", "plain", "spaced"]))
        );
        assert_eq!(doc.frontmatter.scalar("title"), Some("After"));
    }

    #[test]
    fn test_empty_key_without_items_is_empty_list() {
        let doc = parse_document("---\ntags:\ntitle: T\n---\n");
        assert_eq!(doc.frontmatter.get("tags"), Some(&list(&[])));
        assert!(doc.frontmatter.list("tags").is_empty());
    }

    #[test]
    fn test_items_after_scalar_are_ignored() {
        let doc = parse_document("---\ntitle: T\n  - stray\n---\n");
        assert_eq!(doc.frontmatter.len(), 1);
        assert_eq!(doc.frontmatter.scalar("title"), Some("T"));
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let doc = parse_document("---\ncustom-key: x\nsnake_key: [a]\n---\n");
        let mut keys: Vec<_> = doc.frontmatter.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["custom-key", "snake_key"]);
    }

    #[test]
    fn test_invalid_lines_ignored() {
        let doc = parse_document("---\nnot a pair\nbad key: x\n: empty\ngood: yes\n---\n");
        assert_eq!(doc.frontmatter.len(), 1);
        assert_eq!(doc.frontmatter.scalar("good"), Some("yes"));
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let doc = parse_document("---\nurl: http://example.com:8080\n---\n");
        assert_eq!(doc.frontmatter.scalar("url"), Some("http://example.com:8080"));
    }

    #[test]
    fn test_crlf_lines() {
        let doc = parse_document("---\r\ntitle: Windows\r\ntags:\r\n  - a\r\n---\r\nBody\r\n");
        assert_eq!(doc.frontmatter.scalar("title"), Some("Windows"));
        assert_eq!(doc.frontmatter.list("tags"), ["a".to_owned()]);
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_body_is_trimmed() {
        let doc = parse_document("---\ntitle: T\n---\n\n\n# Heading\n\ntext\n\n");
        assert_eq!(doc.body, "# Heading\n\ntext");
    }

    #[test]
    fn test_scalar_helpers() {
        let doc = parse_document("---\ntitle: \"\"\ntags: [a]\n---\n");
        assert_eq!(doc.frontmatter.scalar("title"), None);
        assert_eq!(doc.frontmatter.scalar("tags"), None);
        assert!(doc.frontmatter.list("title").is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("key: v"), Line::Key("key", "v"));
        assert_eq!(classify("key:"), Line::Key("key", ""));
        assert_eq!(classify("  - item"), Line::Item("item"));
        assert_eq!(classify("  -item"), Line::Other);
        assert_eq!(classify("- item"), Line::Other);
        assert_eq!(classify("  - "), Line::Other);
    }
}
