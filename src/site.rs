//! Site snapshots with atomic replacement.
//!
//! A [`Snapshot`] is one complete scan: pages, alias map, search index, the
//! renderer bound to that alias map, and a cache of pages rendered from it.
//! [`Site`] publishes snapshots through `arc-swap`:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  Site.current (ArcSwap)                      │
//! │                                                              │
//! │   request ──▶ snapshot() ──▶ Arc<Snapshot> (old or new)      │
//! │                                                              │
//! │   watcher ──▶ rescan() ──▶ Snapshot::build ──▶ store()       │
//! │                            (off to the side)   (on success)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A request loads the snapshot once and uses only that `Arc`, so it sees
//! either the whole old scan or the whole new one. A failed rescan never
//! reaches `store()`.

use crate::{
    config::{ContentConfig, WikiConfig},
    content::{Page, SiteIndex, scan_content},
    render::{Layout, LinkStyle, PageView, Renderer, search_json},
    utils::slug::is_safe_slug,
};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Result of looking up one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Found(Arc<str>),
    /// No document backs the requested slug.
    NotFound,
}

// ============================================================================
// Snapshot
// ============================================================================

/// One internally consistent scan plus everything rendered from it.
pub struct Snapshot {
    index: SiteIndex,
    renderer: Renderer,
    search_json: String,
    content: ContentConfig,
    not_found: Arc<str>,
    cache: RwLock<FxHashMap<String, Arc<str>>>,
}

impl Snapshot {
    /// Scan the content root and bind a renderer to the result.
    pub fn build(config: &WikiConfig, style: LinkStyle) -> Result<Self> {
        let index = scan_content(&config.content)?;
        let renderer = Renderer::new(Arc::clone(&index.aliases), &config.render, style);
        let search_json =
            search_json(&index.search_index).context("Failed to serialize search index")?;

        let mut snapshot = Self {
            index,
            renderer,
            search_json,
            content: config.content.clone(),
            not_found: Arc::from(""),
            cache: RwLock::new(FxHashMap::default()),
        };
        snapshot.not_found = Arc::from(snapshot.layout().render_not_found());
        Ok(snapshot)
    }

    pub fn index(&self) -> &SiteIndex {
        &self.index
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn layout(&self) -> Layout<'_> {
        Layout {
            index: &self.index,
            renderer: &self.renderer,
            search_json: &self.search_json,
            landing: &self.content.landing,
        }
    }

    /// Rendered page for `slug`, from cache or from this snapshot's page.
    ///
    /// Renders the body captured by this scan, never the file on disk.
    /// Unsafe slugs and slugs the scan did not find are
    /// [`PageOutcome::NotFound`].
    pub fn render_slug(&self, slug: &str) -> PageOutcome {
        if !is_safe_slug(slug) {
            return PageOutcome::NotFound;
        }
        if let Some(html) = self.cache.read().get(slug) {
            return PageOutcome::Found(Arc::clone(html));
        }

        let Some(page) = self.index.page(slug) else {
            return PageOutcome::NotFound;
        };
        let html: Arc<str> = Arc::from(self.render_page(page));
        self.cache.write().insert(slug.to_owned(), Arc::clone(&html));

        PageOutcome::Found(html)
    }

    /// Full HTML document for a page of this snapshot.
    pub fn render_page(&self, page: &Page) -> String {
        let body = self.renderer.render(&page.raw_body);
        self.layout().render_page(&PageView {
            slug: &page.slug,
            title: &page.title,
            page_type: Some(&page.page_type),
            tags: &page.tags,
            related: &page.related,
            body_html: &body,
        })
    }

    pub fn render_not_found(&self) -> Arc<str> {
        Arc::clone(&self.not_found)
    }

    /// Number of pages rendered and cached so far.
    pub fn cached_pages(&self) -> usize {
        self.cache.read().len()
    }
}

// ============================================================================
// Site
// ============================================================================

/// The serving context: configuration plus the current snapshot.
pub struct Site {
    config: Arc<WikiConfig>,
    style: LinkStyle,
    current: ArcSwap<Snapshot>,
}

impl Site {
    /// Perform the initial scan for serving mode.
    pub fn open(config: WikiConfig) -> Result<Self> {
        let style = LinkStyle::Served;
        let snapshot = Snapshot::build(&config, style)?;
        Ok(Self {
            config: Arc::new(config),
            style,
            current: ArcSwap::from_pointee(snapshot),
        })
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    /// Current snapshot. Hold the returned `Arc` for the whole request.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Build a new snapshot and publish it.
    ///
    /// On error the current snapshot stays in place and keeps serving.
    /// Returns the page count of the published snapshot.
    pub fn rescan(&self) -> Result<usize> {
        let snapshot = Snapshot::build(&self.config, self.style)?;
        let pages = snapshot.index.pages.len();
        self.current.store(Arc::new(snapshot));
        Ok(pages)
    }

    pub fn page(&self, slug: &str) -> PageOutcome {
        self.snapshot().render_slug(slug)
    }
}
