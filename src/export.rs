//! Static export.
//!
//! # Architecture
//!
//! ```text
//! export_site()
//!     │
//!     ├── Snapshot::build()  ──► one scan, links with `.html` suffix
//!     │
//!     ├── export_pages()     ──► <output>/<slug>.html per page
//!     │
//!     ├── LlmsFiles::write() ──► llms.txt, llms-full.txt (when enabled)
//!     │
//!     ├── copy_companions()  ──► other companion files, when present
//!     │
//!     └── write_redirect()   ──► index.html → <landing>.html
//! ```
//!
//! Pages and generated files come from one scan: bodies are the ones the
//! scan captured, never re-read from disk.

use crate::{
    config::WikiConfig,
    llms::{self, LlmsFiles},
    log,
    render::LinkStyle,
    site::Snapshot,
    utils::{html::escape_attr, slug::output_path},
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// What an export wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    /// Generated `llms.txt` files.
    pub generated: usize,
    /// Companion files copied from the content root.
    pub companions: usize,
}

/// Export the whole wiki as static HTML into `[export].output`.
pub fn export_site(config: &WikiConfig) -> Result<ExportSummary> {
    let output = &config.export.output;
    let snapshot = Snapshot::build(config, LinkStyle::Exported)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    log!("export"; "exporting {} pages to {}", snapshot.index().pages.len(), output.display());

    let pages = export_pages(&snapshot, output)?;

    let generated = if config.export.llms {
        LlmsFiles::generate(snapshot.index(), config).write(output)?;
        2
    } else {
        0
    };

    let companions = copy_companions(config, output)?;
    write_redirect(output, config.landing_slug())?;

    log!("export"; "done: {pages} pages, {generated} generated, {companions} companion files");
    Ok(ExportSummary {
        pages,
        generated,
        companions,
    })
}

/// Render every page of the snapshot.
fn export_pages(snapshot: &Snapshot, output: &Path) -> Result<usize> {
    let mut written = 0;

    for page in &snapshot.index().pages {
        let target = output_path(output, &page.slug);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, snapshot.render_page(page))
            .with_context(|| format!("Failed to write {}", target.display()))?;

        log!("export"; "{}.html", page.slug);
        written += 1;
    }

    Ok(written)
}

/// Copy the configured companion files that exist in the content root.
///
/// Names that were generated this run are left alone.
fn copy_companions(config: &WikiConfig, output: &Path) -> Result<usize> {
    let mut copied = 0;

    for name in &config.export.companions {
        if config.export.llms && llms::is_generated(name) {
            continue;
        }
        let source = config.content_root().join(name);
        if !source.is_file() {
            continue;
        }
        fs::copy(&source, output.join(name))
            .with_context(|| format!("Failed to copy {}", source.display()))?;
        log!("export"; "{name}");
        copied += 1;
    }

    Ok(copied)
}

/// Root document redirecting to the landing page.
fn write_redirect(output: &Path, landing: &str) -> Result<()> {
    let html = format!(
        "<!DOCTYPE html><html><head><meta http-equiv=\"refresh\" content=\"0;url={}.html\"></head></html>\n",
        escape_attr(landing)
    );
    let target = output.join("index.html");
    fs::write(&target, html).with_context(|| format!("Failed to write {}", target.display()))?;
    log!("export"; "index.html");
    Ok(())
}
