//! Slug derivation and validation.
//!
//! A slug is the `/`-separated path of a document relative to the content
//! root, without its extension. It doubles as the URL path in serving mode
//! and as the output path in export mode.

use std::path::{Component, Path, PathBuf};

/// Characters that never appear in a slug we are willing to map back to disk.
const FORBIDDEN_CHARS: &[char] = &['\\', ':', '*', '"', '<', '>', '|', '\0'];

// ============================================================================
// Slug Derivation
// ============================================================================

/// Derive a slug from a path relative to the content root.
///
/// `guide/setup.md` → `guide/setup`
pub fn slug_from_path(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Fallback slug for a wikilink target that matches no known name.
///
/// Lower-cased, whitespace runs replaced by `-`: `Getting Started` → `getting-started`
pub fn slugify_target(target: &str) -> String {
    target
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// Slug Safety
// ============================================================================

/// Check that a requested slug stays inside the content root.
///
/// Rejects empty components, `.`/`..`, hidden components, and characters
/// that are not valid in file names.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.contains(FORBIDDEN_CHARS)
        && slug
            .split('/')
            .all(|part| !part.is_empty() && !part.starts_with('.'))
}

/// Output file path for a slug in export mode.
pub fn output_path(output: &Path, slug: &str) -> PathBuf {
    output.join(format!("{slug}.html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_path_flat() {
        assert_eq!(slug_from_path(Path::new("overview.md")), "overview");
    }

    #[test]
    fn test_slug_from_path_nested() {
        let path: PathBuf = ["guide", "setup.md"].iter().collect();
        assert_eq!(slug_from_path(&path), "guide/setup");
    }

    #[test]
    fn test_slug_from_path_keeps_inner_dots() {
        assert_eq!(slug_from_path(Path::new("v1.2/notes.md")), "v1.2/notes");
    }

    #[test]
    fn test_slugify_target() {
        assert_eq!(slugify_target("Getting Started"), "getting-started");
        assert_eq!(slugify_target("  Multiple   Spaces "), "multiple-spaces");
        assert_eq!(slugify_target("guide/Setup"), "guide/setup");
        assert_eq!(slugify_target(""), "");
    }

    #[test]
    fn test_is_safe_slug_accepts_nested() {
        assert!(is_safe_slug("overview"));
        assert!(is_safe_slug("guide/setup"));
        assert!(is_safe_slug("notes/v1.2"));
        assert!(is_safe_slug("日本語/ページ"));
        assert!(is_safe_slug("faq/why?"));
    }

    #[test]
    fn test_is_safe_slug_rejects_traversal() {
        assert!(!is_safe_slug(""));
        assert!(!is_safe_slug("../secret"));
        assert!(!is_safe_slug("guide/../../etc"));
        assert!(!is_safe_slug("guide//setup"));
        assert!(!is_safe_slug(".index"));
        assert!(!is_safe_slug("guide/.hidden"));
        assert!(!is_safe_slug("c:\\windows"));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(Path::new("/out"), "guide/setup"), Path::new("/out/guide/setup.html"));
    }
}
