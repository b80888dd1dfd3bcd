//! Page shell: sidebar, metadata bar, related pages, embedded search index.
//!
//! The shell lives in `embed/page.html` and is filled in a single pass, so
//! `{placeholder}` text inside rendered content is never substituted.

use super::markdown::Renderer;
use crate::{
    content::{PageType, SearchEntry, SiteIndex},
    utils::html::{escape_attr, escape_text},
};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const PAGE_TEMPLATE: &str = include_str!("../embed/page.html");

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Wikilink syntax inside a `related` entry.
static RELATED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

const NOT_FOUND_TITLE: &str = "Page Not Found";

/// Sidebar groups in display order.
const NAV_GROUPS: [(NavGroup, &str); 4] = [
    (NavGroup::Overview, "Overview"),
    (NavGroup::Concept, "Concepts"),
    (NavGroup::Guide, "Guides"),
    (NavGroup::Reference, "Reference"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavGroup {
    Overview,
    Concept,
    Guide,
    Reference,
}

impl NavGroup {
    /// Untyped and unknown pages are listed under Reference.
    const fn of(page_type: &PageType) -> Self {
        match page_type {
            PageType::Overview => Self::Overview,
            PageType::Concept => Self::Concept,
            PageType::Guide => Self::Guide,
            _ => Self::Reference,
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Everything shared by all pages of one snapshot.
pub struct Layout<'a> {
    pub index: &'a SiteIndex,
    pub renderer: &'a Renderer,
    /// Pre-serialized search index, see [`search_json`].
    pub search_json: &'a str,
    pub landing: &'a str,
}

/// Per-page content placed into the shell.
pub struct PageView<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub page_type: Option<&'a PageType>,
    pub tags: &'a [String],
    pub related: &'a [String],
    pub body_html: &'a str,
}

/// Serialize the search index for embedding in a `<script>` block.
pub fn search_json(entries: &[SearchEntry]) -> serde_json::Result<String> {
    serde_json::to_string(entries).map(|json| json.replace("</", "<\\/"))
}

impl Layout<'_> {
    fn href(&self, slug: &str) -> String {
        format!("/{slug}{}", self.renderer.style().suffix())
    }

    /// Full HTML document for one page.
    pub fn render_page(&self, view: &PageView<'_>) -> String {
        fill(PAGE_TEMPLATE, |name| {
            let value = match name {
                "title" => escape_attr(view.title),
                "wiki_title" => escape_attr(&self.index.wiki_title),
                "home_href" => escape_attr(&self.href(self.landing)),
                "sidebar" => self.sidebar(view.slug),
                "page_meta" => page_meta(view.page_type, view.tags),
                "body" => view.body_html.to_owned(),
                "related" => self.related(view.related),
                "search_json" => self.search_json.to_owned(),
                "link_suffix" => self.renderer.style().suffix().to_owned(),
                _ => return None,
            };
            Some(value)
        })
    }

    /// The not-found page, inside the same shell.
    pub fn render_not_found(&self) -> String {
        let body = format!(
            "<h1>{NOT_FOUND_TITLE}</h1><p>The page you requested does not exist.</p>\
             <p><a href=\"{}\">Go to the home page</a></p>",
            escape_attr(&self.href(self.landing))
        );
        self.render_page(&PageView {
            slug: "",
            title: NOT_FOUND_TITLE,
            page_type: None,
            tags: &[],
            related: &[],
            body_html: &body,
        })
    }

    fn sidebar(&self, current: &str) -> String {
        let mut html = String::new();

        for (group, label) in NAV_GROUPS {
            let mut pages = self
                .index
                .pages
                .iter()
                .filter(|page| NavGroup::of(&page.page_type) == group)
                .peekable();
            if pages.peek().is_none() {
                continue;
            }

            html.push_str(r#"<div class="nav-group">"#);
            html.push_str(&format!(r#"<div class="nav-group-title">{label}</div>"#));
            for page in pages {
                let active = if page.slug == current { " active" } else { "" };
                html.push_str(&format!(
                    r#"<a href="{}" class="nav-link{active}">{}</a>"#,
                    escape_attr(&self.href(&page.slug)),
                    escape_text(&page.title)
                ));
            }
            html.push_str("</div>");
        }

        html
    }

    fn related(&self, related: &[String]) -> String {
        if related.is_empty() {
            return String::new();
        }

        let links: String = related
            .iter()
            .map(|entry| match RELATED_RE.captures(entry) {
                Some(caps) => self.renderer.wikilink_html(&caps[1], "related-link"),
                None => format!("<span>{}</span>", escape_text(entry)),
            })
            .collect();

        format!(
            r#"<div class="related-pages"><h3>Related Pages</h3><div class="related-links">{links}</div></div>"#
        )
    }
}

fn page_meta(page_type: Option<&PageType>, tags: &[String]) -> String {
    let mut html = String::new();
    if let Some(page_type) = page_type {
        let tag = escape_attr(page_type.as_str());
        html.push_str(&format!(r#"<span class="type-badge type-{tag}">{tag}</span>"#));
    }
    for tag in tags {
        html.push_str(&format!(r#"<span class="tag">{}</span>"#, escape_text(tag)));
    }
    html
}

/// Replace `{name}` placeholders in one pass. Unknown names are kept.
fn fill(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            value(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}
