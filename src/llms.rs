//! `llms.txt` generation.
//!
//! Builds two plain-text files for language-model tooling from one scan:
//!
//! ```text
//! llms.txt        # <project> Wiki
//!                 ## Overview / Concepts / Guides / Reference / <other>
//!                 - [Setup](wiki/guide/setup.md): first paragraph
//!
//! llms-full.txt   FILE: wiki/guide/setup.md
//!                 ----------------------------------------
//!                 <body>
//! ```
//!
//! Both are derived from the [`SiteIndex`] alone, so they always describe
//! the same pages as the snapshot that produced them.

use crate::{
    config::WikiConfig,
    content::{Page, SiteIndex, compare_titles},
    log,
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

// ============================================================================
// Constants
// ============================================================================

/// Index file name.
pub const INDEX_FILE: &str = "llms.txt";

/// Full content file name.
pub const FULL_FILE: &str = "llms-full.txt";

/// Longest page description in `llms.txt`, in characters.
const DESCRIPTION_LEN: usize = 200;

/// Known page types in index order, with their section headings.
const TYPE_SECTIONS: [(&str, &str); 4] = [
    ("overview", "Overview"),
    ("concept", "Concepts"),
    ("guide", "Guides"),
    ("reference", "Reference"),
];

const INDEX_PREAMBLE: &str = "> Agent-maintained documentation for understanding this codebase.\n\n\
## Quick Start\n\n\
This wiki is designed for AI agents working with this codebase. Start with the overview page \
for a high-level understanding, then explore specific concepts as needed.\n";

// ============================================================================
// Public API
// ============================================================================

/// Generated `llms.txt` and `llms-full.txt` contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmsFiles {
    pub index: String,
    pub full: String,
}

impl LlmsFiles {
    /// Generate both files for one scan.
    pub fn generate(index: &SiteIndex, config: &WikiConfig) -> Self {
        let project = project_name(config, index);
        let links = LinkPaths::new(config);

        Self {
            index: render_index(&index.pages, &project, &links),
            full: render_full(&index.pages, &project, &links),
        }
    }

    /// Contents for a file name, if it is one of the generated files.
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            INDEX_FILE => Some(self.index.as_str()),
            FULL_FILE => Some(self.full.as_str()),
            _ => None,
        }
    }

    /// Write both files into `dir`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        for (name, content) in [(INDEX_FILE, &self.index), (FULL_FILE, &self.full)] {
            let path = dir.join(name);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log!("export"; "{name}");
        }
        Ok(())
    }
}

/// Whether `name` is a file this module generates.
pub fn is_generated(name: &str) -> bool {
    name == INDEX_FILE || name == FULL_FILE
}

// ============================================================================
// Rendering
// ============================================================================

/// Source paths as written in the files: `<root dir>/<slug>.<ext>`.
struct LinkPaths {
    dir: String,
    extension: String,
}

impl LinkPaths {
    fn new(config: &WikiConfig) -> Self {
        let dir = config
            .content_root()
            .file_name()
            .map_or_else(|| "wiki".to_owned(), |name| name.to_string_lossy().into_owned());
        Self {
            dir,
            extension: config.content.extension.clone(),
        }
    }

    fn of(&self, page: &Page) -> String {
        format!("{}/{}.{}", self.dir, page.slug, self.extension)
    }
}

fn project_name(config: &WikiConfig, index: &SiteIndex) -> String {
    if let Some(project) = &config.export.project {
        return project.clone();
    }
    config
        .content_root()
        .parent()
        .and_then(Path::file_name)
        .map_or_else(|| index.wiki_title.clone(), |name| name.to_string_lossy().into_owned())
}

fn render_index(pages: &[Page], project: &str, links: &LinkPaths) -> String {
    let mut out = format!("# {project} Wiki\n\n{INDEX_PREAMBLE}\n");

    // Types in first-seen order
    let mut groups: Vec<(&str, Vec<&Page>)> = Vec::new();
    for page in pages {
        let tag = page.page_type.as_str();
        match groups.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, group)) => group.push(page),
            None => groups.push((tag, vec![page])),
        }
    }

    for (tag, heading) in TYPE_SECTIONS {
        if let Some((_, group)) = groups.iter().find(|(t, _)| *t == tag) {
            push_section(&mut out, heading, group, links);
        }
    }
    for (tag, group) in &groups {
        if TYPE_SECTIONS.iter().all(|(known, _)| known != tag) {
            push_section(&mut out, &capitalize(tag), group, links);
        }
    }

    out
}

fn push_section(out: &mut String, heading: &str, group: &[&Page], links: &LinkPaths) {
    let mut group = group.to_vec();
    group.sort_by(|a, b| compare_titles(&a.title, &b.title));

    out.push_str(&format!("## {heading}\n\n"));
    for page in group {
        let description = first_paragraph(&page.raw_body);
        let description = if description.is_empty() {
            "No description available."
        } else {
            description.as_str()
        };
        out.push_str(&format!("- [{}]({}): {description}\n", page.title, links.of(page)));
    }
    out.push('\n');
}

fn render_full(pages: &[Page], project: &str, links: &LinkPaths) -> String {
    let rule = "=".repeat(80);
    let mut out = format!(
        "# {project} Wiki - Complete Content\n\n\
         This file contains the complete content of all wiki pages for AI context.\n\n\
         {rule}\n\n"
    );

    // Pages are already in navigation order: overview first, then by title
    for page in pages {
        out.push_str(&format!("FILE: {}\n", links.of(page)));
        out.push_str(&format!("TITLE: {}\n", page.title));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(&page.raw_body);
        out.push_str(&format!("\n\n{rule}\n\n"));
    }

    out
}

/// First paragraph of a body, skipping leading headings, blank lines and
/// fence lines. Longer than [`DESCRIPTION_LEN`] → cut with `...`.
fn first_paragraph(body: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for line in body.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with("```") {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line);
    }

    let description = lines.join(" ");
    if description.chars().count() <= DESCRIPTION_LEN {
        return description;
    }
    let cut: String = description.chars().take(DESCRIPTION_LEN - 3).collect();
    format!("{cut}...")
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    chars
        .next()
        .map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::scan_content;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn generate(dir: &TempDir) -> LlmsFiles {
        let mut config = WikiConfig::load(dir.path()).unwrap();
        config.export.project = Some("demo".into());
        let index = scan_content(&config.content).unwrap();
        LlmsFiles::generate(&index, &config)
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("wiki");
        write(&root, "overview.md", "---\ntype: overview\ntitle: Home\n---\n# Home\n\nWhat this is.\nSecond line.\n\nMore.");
        write(&root, "guide/zeta.md", "---\ntype: guide\ntitle: Zeta\n---\nLast guide.");
        write(&root, "guide/alpha.md", "---\ntype: guide\ntitle: Alpha\n---\n");
        write(&root, "notes/adr.md", "---\ntype: decision\ntitle: ADR 1\n---\nWe chose Rust.");
        write(&root, "model.md", "---\ntype: concept\ntitle: Model\n---\n```\ncode\n```\nAfter fence.");
        dir
    }

    #[test]
    fn test_index_groups_pages_by_type() {
        let dir = fixture();
        let files = generate(&dir);
        let index = &files.index;

        assert!(index.starts_with("# demo Wiki\n\n> Agent-maintained"));
        assert!(index.contains("- [Home](wiki/overview.md): What this is. Second line.\n"));
        assert!(index.contains("- [Alpha](wiki/guide/alpha.md): No description available.\n"));
        assert!(index.contains("- [ADR 1](wiki/notes/adr.md): We chose Rust.\n"));

        let overview = index.find("## Overview").unwrap();
        let concepts = index.find("## Concepts").unwrap();
        let guides = index.find("## Guides").unwrap();
        let other = index.find("## Decision").unwrap();
        assert!(overview < concepts && concepts < guides && guides < other);
        assert!(!index.contains("## Reference"));

        let alpha = index.find("[Alpha]").unwrap();
        let zeta = index.find("[Zeta]").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_full_dump_has_every_body_overview_first() {
        let dir = fixture();
        let full = generate(&dir).full;

        assert!(full.starts_with("# demo Wiki - Complete Content\n"));
        assert_eq!(full.matches("FILE: ").count(), 5);
        let home = full.find("FILE: wiki/overview.md").unwrap();
        let alpha = full.find("FILE: wiki/guide/alpha.md").unwrap();
        assert!(home < alpha);
        assert!(full.contains("TITLE: ADR 1\n----------------------------------------\nWe chose Rust."));
    }

    #[test]
    fn test_project_defaults_to_parent_directory() {
        let dir = fixture();
        let config = WikiConfig::load(dir.path()).unwrap();
        let index = scan_content(&config.content).unwrap();
        let files = LlmsFiles::generate(&index, &config);

        let parent = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(files.index.starts_with(&format!("# {parent} Wiki\n")));
    }

    #[test]
    fn test_first_paragraph() {
        assert_eq!(first_paragraph("# Title\n\nOne\ntwo\n\nthree"), "One two");
        assert_eq!(first_paragraph("```\nx\n```"), "x");
        assert_eq!(first_paragraph(""), "");

        let long = "word ".repeat(60);
        let description = first_paragraph(&long);
        assert_eq!(description.chars().count(), DESCRIPTION_LEN);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_get_and_is_generated() {
        let files = LlmsFiles {
            index: "i".into(),
            full: "f".into(),
        };
        assert_eq!(files.get("llms.txt"), Some("i"));
        assert_eq!(files.get("llms-full.txt"), Some("f"));
        assert_eq!(files.get("notes.txt"), None);
        assert!(is_generated("llms.txt"));
        assert!(!is_generated("README.md"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("decision"), "Decision");
        assert_eq!(capitalize(""), "");
    }
}
