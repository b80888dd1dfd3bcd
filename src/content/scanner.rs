//! Content tree scanning.
//!
//! Walks the content root, parses every document, and produces the
//! [`SiteIndex`]: ordered pages, the alias map, and the search index.
//!
//! ```text
//! wiki/
//! ├── .index.json      ← optional sidecar (aliases per slug), never a page
//! ├── overview.md      → slug "overview"
//! └── guide/
//!     └── setup.md     → slug "guide/setup"
//! ```

use super::{
    AliasMap, Page, PageType, SearchEntry, compare_pages, excerpt::excerpt,
    frontmatter::parse_document,
};
use crate::{config::ContentConfig, log, utils::slug::slug_from_path};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::{fs, path::Path, sync::Arc};
use walkdir::{DirEntry, WalkDir};

/// Wiki title used when no overview page exists.
const DEFAULT_WIKI_TITLE: &str = "Wiki";

/// Result of one complete scan.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    /// Pages in navigation order.
    pub pages: Vec<Page>,
    /// Shared with the renderer bound to this scan.
    pub aliases: Arc<AliasMap>,
    pub search_index: Vec<SearchEntry>,
    /// Title of the first overview page.
    pub wiki_title: String,
}

impl SiteIndex {
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.slug == slug)
    }
}

// ============================================================================
// Sidecar
// ============================================================================

/// `{"pages": {"<slug>": {"aliases": ["..."]}}}`
#[derive(Debug, Default, Deserialize)]
struct Sidecar {
    #[serde(default)]
    pages: FxHashMap<String, SidecarPage>,
}

#[derive(Debug, Default, Deserialize)]
struct SidecarPage {
    #[serde(default)]
    aliases: Vec<String>,
}

/// Load the sidecar. A missing, unreadable, or malformed file is ignored.
fn load_sidecar(path: &Path) -> Option<Sidecar> {
    if !path.is_file() {
        return None;
    }

    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));

    match parsed {
        Ok(sidecar) => Some(sidecar),
        Err(err) => {
            log!("scan"; "ignoring {}: {err}", path.display());
            None
        }
    }
}

// ============================================================================
// Scanning
// ============================================================================

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Scan the content root into a fresh [`SiteIndex`].
///
/// Directory entries are visited in file-name order, so alias collisions
/// always resolve the same way for the same tree.
///
/// # Errors
///
/// Fails on any I/O error while walking or reading documents.
pub fn scan_content(config: &ContentConfig) -> Result<SiteIndex> {
    let root = &config.root;
    let sidecar = load_sidecar(&root.join(&config.sidecar));

    let mut pages = Vec::new();
    let mut aliases = AliasMap::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().is_none_or(|ext| ext != config.extension.as_str())
        {
            continue;
        }

        let relative = path.strip_prefix(root)?;
        let slug = slug_from_path(relative);
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let page = build_page(slug, &String::from_utf8_lossy(&bytes), path, config.excerpt_len);

        aliases.insert(&page.title, &page.slug);
        aliases.insert(&page.slug, &page.slug);
        if let Some(declared) = sidecar.as_ref().and_then(|s| s.pages.get(&page.slug)) {
            for alias in &declared.aliases {
                aliases.insert(alias, &page.slug);
            }
        }

        pages.push(page);
    }

    pages.sort_by(compare_pages);

    let search_index = pages.iter().map(SearchEntry::from).collect();
    let wiki_title = pages
        .iter()
        .find(|page| page.page_type.is_overview())
        .map_or_else(|| DEFAULT_WIKI_TITLE.to_owned(), |page| page.title.clone());

    Ok(SiteIndex {
        pages,
        aliases: Arc::new(aliases),
        search_index,
        wiki_title,
    })
}

/// Build a page from raw document text.
pub fn build_page(slug: String, content: &str, path: &Path, excerpt_len: usize) -> Page {
    let doc = parse_document(content);
    let fm = &doc.frontmatter;

    Page {
        title: fm.scalar("title").map_or_else(|| slug.clone(), str::to_owned),
        page_type: fm.scalar("type").map_or(PageType::Page, PageType::from_tag),
        tags: fm.list("tags").to_vec(),
        related: fm.list("related").to_vec(),
        excerpt: excerpt(&doc.body, excerpt_len),
        raw_body: doc.body,
        path: path.to_path_buf(),
        slug,
    }
}
