//! Content pipeline: frontmatter, page records, and the scanner.

pub mod excerpt;
pub mod frontmatter;
mod page;
mod scanner;

pub use frontmatter::{Frontmatter, FrontmatterValue, ParsedDocument, parse_document};
pub use page::{AliasMap, Page, PageType, SearchEntry, compare_pages, compare_titles};
pub use scanner::{SiteIndex, build_page, scan_content};
