//! Content watcher for live rescans.
//!
//! Monitors the content root and publishes a fresh snapshot whenever a
//! document or the sidecar alias index changes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Loop                              │
//! │                                                              │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│    handle_changes()    │  │
//! │  │ events   │    │ (300ms)  │    │    site.rescan()       │  │
//! │  └──────────┘    └──────────┘    └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every batch that touches a tracked file triggers one full rescan. There
//! is no cooldown: a change arriving during a rescan starts another one
//! after it, and the last one to finish is what gets served.

use crate::{config::ContentConfig, log, logger::WatchStatus, site::Site};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Component, Path, PathBuf},
    sync::mpsc::RecvTimeoutError,
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Path Filters
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
}

/// Whether a change to `path` can alter the scan result.
///
/// Tracked: documents outside hidden directories, and the sidecar at the
/// content root.
fn is_tracked(path: &Path, content: &ContentConfig) -> bool {
    let Ok(relative) = path.strip_prefix(&content.root) else {
        return false;
    };
    if relative == Path::new(&content.sidecar) {
        return true;
    }
    if is_temp_file(path) {
        return false;
    }

    let hidden = relative.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => true,
    });

    !hidden && path.extension().is_some_and(|ext| ext == content.extension.as_str())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event, content: &ContentConfig) {
        let before = self.pending.len();
        self.pending
            .extend(event.paths.into_iter().filter(|path| is_tracked(path, content)));
        if self.pending.len() > before {
            self.last_event = Some(Instant::now());
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Format path as relative to the content root for log display.
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Rescan after a batch of changes. The old snapshot stays on failure.
fn handle_changes(paths: &[PathBuf], site: &Site, status: &mut WatchStatus) {
    let Some(first) = paths.first() else {
        return;
    };

    let root = site.config().content_root();
    let trigger = match paths.len() {
        1 => rel_path(first, root),
        n => format!("{} (+{} more)", rel_path(first, root), n - 1),
    };

    match site.rescan() {
        Ok(pages) => status.success(&format!("rescanned {pages} pages after {trigger}")),
        Err(err) => status.error(&format!("rescan failed after {trigger}"), &format!("{err:#}")),
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking content watcher with debouncing and live rescans.
pub fn watch_for_changes_blocking(site: &Site) -> Result<()> {
    let content = &site.config().content;

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(&content.root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", content.root.display()))?;

    log!("watch"; "{}", content.root.display());

    let mut debouncer = Debouncer::new();
    let mut status = WatchStatus::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event, content),
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                handle_changes(&debouncer.take(), site, &mut status);
            }
            Err(RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WikiConfig;
    use notify::event::{CreateKind, ModifyKind};
    use std::fs;
    use tempfile::TempDir;

    fn content() -> ContentConfig {
        ContentConfig {
            root: PathBuf::from("/wiki"),
            ..ContentConfig::default()
        }
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("page.md.swp")));
        assert!(is_temp_file(Path::new("page.md~")));
        assert!(is_temp_file(Path::new(".#page.md")));
        assert!(!is_temp_file(Path::new("page.md")));
    }

    #[test]
    fn test_is_tracked() {
        let content = content();
        assert!(is_tracked(Path::new("/wiki/overview.md"), &content));
        assert!(is_tracked(Path::new("/wiki/guide/setup.md"), &content));
        assert!(is_tracked(Path::new("/wiki/.index.json"), &content));

        assert!(!is_tracked(Path::new("/wiki/llms.txt"), &content));
        assert!(!is_tracked(Path::new("/wiki/.git/notes.md"), &content));
        assert!(!is_tracked(Path::new("/wiki/guide/.index.json"), &content));
        assert!(!is_tracked(Path::new("/wiki/page.md.swp"), &content));
        assert!(!is_tracked(Path::new("/elsewhere/page.md"), &content));
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(&Event::new(EventKind::Create(CreateKind::File))));
        assert!(is_relevant(&Event::new(EventKind::Modify(ModifyKind::Any))));
        assert!(is_relevant(&Event::new(EventKind::Remove(notify::event::RemoveKind::File))));
        assert!(!is_relevant(&Event::new(EventKind::Access(notify::event::AccessKind::Any))));
    }

    #[test]
    fn test_debouncer_batches_tracked_paths() {
        let content = content();
        let mut debouncer = Debouncer::new();
        assert_eq!(debouncer.timeout(), Duration::from_secs(60));

        debouncer.add(event(EventKind::Modify(ModifyKind::Any), "/wiki/a.md"), &content);
        debouncer.add(event(EventKind::Modify(ModifyKind::Any), "/wiki/a.md"), &content);
        debouncer.add(event(EventKind::Create(CreateKind::File), "/wiki/b.txt"), &content);

        assert_eq!(debouncer.timeout(), Duration::from_millis(DEBOUNCE_MS));
        assert!(!debouncer.ready());
        assert_eq!(debouncer.take(), vec![PathBuf::from("/wiki/a.md")]);
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_debouncer_ignores_untracked_only_batches() {
        let content = content();
        let mut debouncer = Debouncer::new();
        debouncer.add(event(EventKind::Modify(ModifyKind::Any), "/wiki/llms.txt"), &content);

        assert!(debouncer.take().is_empty());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_handle_changes_rescans() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("wiki");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("overview.md"), "---\ntitle: Home\n---\nHi").unwrap();

        let site = Site::open(WikiConfig::load(dir.path()).unwrap()).unwrap();
        let root = site.config().content_root().to_path_buf();
        fs::write(root.join("new.md"), "---\ntitle: New\n---\nFresh").unwrap();

        let mut status = WatchStatus::new();
        handle_changes(&[root.join("new.md")], &site, &mut status);

        assert_eq!(site.snapshot().index().pages.len(), 2);
        assert_eq!(site.snapshot().index().aliases.resolve("new"), Some("new"));
    }
}
