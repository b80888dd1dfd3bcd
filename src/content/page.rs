//! Page records, name resolution, and the search index entry format.

use deunicode::deunicode;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};
use std::{cmp::Ordering, fmt, path::PathBuf};

// ============================================================================
// Page Type
// ============================================================================

/// The `type` tag from frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PageType {
    Overview,
    Concept,
    Guide,
    Reference,
    /// No `type` given.
    #[default]
    Page,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl PageType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "overview" => Self::Overview,
            "concept" => Self::Concept,
            "guide" => Self::Guide,
            "reference" => Self::Reference,
            "page" => Self::Page,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Overview => "overview",
            Self::Concept => "concept",
            Self::Guide => "guide",
            Self::Reference => "reference",
            Self::Page => "page",
            Self::Other(tag) => tag,
        }
    }

    pub const fn is_overview(&self) -> bool {
        matches!(self, Self::Overview)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Page
// ============================================================================

/// One document of the wiki. Never mutated after the scan that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path relative to the content root without extension, `/`-separated.
    pub slug: String,
    pub title: String,
    pub page_type: PageType,
    pub tags: Vec<String>,
    /// Raw entries, each optionally `[[wikilink]]` syntax.
    pub related: Vec<String>,
    pub excerpt: String,
    /// Markdown body with frontmatter removed.
    pub raw_body: String,
    /// Source file.
    pub path: PathBuf,
}

/// Navigation order: overview pages first, then by title.
pub fn compare_pages(a: &Page, b: &Page) -> Ordering {
    b.page_type
        .is_overview()
        .cmp(&a.page_type.is_overview())
        .then_with(|| compare_titles(&a.title, &b.title))
}

/// Locale-aware title comparison.
///
/// Titles are transliterated to ASCII and compared case-insensitively, so
/// `Éclair` sorts next to `eclair`. Ties fall back to the raw strings.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    deunicode(title).to_lowercase()
}

// ============================================================================
// Alias Map
// ============================================================================

/// Lower-cased name (title, slug, or declared alias) → canonical slug.
///
/// Later inserts overwrite earlier ones. When two pages claim the same name
/// the page scanned last owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    names: FxHashMap<String, String>,
}

impl AliasMap {
    pub fn insert(&mut self, name: &str, slug: &str) {
        self.names.insert(name.to_lowercase(), slug.to_owned());
    }

    /// Resolve a name case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.names.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// Search Index
// ============================================================================

/// Compact search entry consumed by the browser-side search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    #[serde(rename = "s")]
    pub slug: String,
    #[serde(rename = "t")]
    pub title: String,
    #[serde(rename = "y")]
    pub page_type: PageType,
    #[serde(rename = "x")]
    pub excerpt: String,
}

impl From<&Page> for SearchEntry {
    fn from(page: &Page) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.title.clone(),
            page_type: page.page_type.clone(),
            excerpt: page.excerpt.clone(),
        }
    }
}
