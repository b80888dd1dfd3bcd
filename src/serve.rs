//! Live wiki server.
//!
//! A lightweight HTTP server on `tiny_http`:
//!
//! - Pages rendered on demand from the current [`Snapshot`]
//! - Plain files under the content root served verbatim
//! - Content watching and rescans (via the `watch` module)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!   site.snapshot()          site.rescan()
//!   route + respond          publish snapshot
//! └─────────────────────────────────────────────┘
//! ```

use crate::{
    config::WikiConfig,
    llms::{self, LlmsFiles},
    log,
    site::{PageOutcome, Site, Snapshot},
    utils::slug::is_safe_slug,
    watch::watch_for_changes_blocking,
};
use anyhow::{Context, Result, anyhow};
use std::{borrow::Cow, fs, net::SocketAddr, path::Path, sync::Arc};
use tiny_http::{Header, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the wiki server with optional content watching.
///
/// Binds to the configured interface and port (with auto-retry on port
/// conflict), spawns the watcher thread if enabled, then handles requests
/// on the calling thread. Blocks for the life of the process.
pub fn serve_site(site: Arc<Site>) -> Result<()> {
    let config = site.config();
    let interface: std::net::IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid [serve.interface] `{}`", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;

    log!("serve"; "http://{}", addr);
    log!("serve"; "{} pages from {}", site.snapshot().index().pages.len(), config.content_root().display());

    if config.serve.watch {
        let watched = Arc::clone(&site);
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(&watched) {
                log!("watch"; "{err}");
            }
        });
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &site) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map_or_else(|| "no attempts made".to_owned(), |e| e.to_string())
    ))
}

// ============================================================================
// Routing
// ============================================================================

/// What to send back for one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `204`, for `favicon.ico`.
    NoContent,
    /// A plain file from the content root.
    File {
        content_type: &'static str,
        data: Vec<u8>,
    },
    Page(Arc<str>),
    /// `404` with the rendered not-found page.
    NotFound(Arc<str>),
}

/// Resolve a raw request URL against one snapshot.
///
/// Resolution order:
/// 1. Empty path → landing page
/// 2. `favicon.ico` → no content
/// 3. Plain (non-document) file under the content root → verbatim
/// 4. `llms.txt` / `llms-full.txt` → generated from the snapshot
/// 5. Page slug → rendered page, or the not-found page
pub fn route(url: &str, config: &WikiConfig, snapshot: &Snapshot) -> Result<Reply> {
    // Strip the query first so an encoded `%3F` stays part of the path
    let raw_path = url.split('?').next().unwrap_or_default();
    // Decode URL-encoded characters (e.g., %20 → space)
    let decoded = urlencoding::decode(raw_path).unwrap_or(Cow::Borrowed(raw_path));
    let path = match decoded.trim_matches('/') {
        "" => config.landing_slug(),
        path => path,
    };

    if path == "favicon.ico" {
        return Ok(Reply::NoContent);
    }

    let document_suffix = format!(".{}", config.content.extension);
    if is_safe_slug(path) && !path.ends_with(&document_suffix) {
        let local = config.content_root().join(path);
        if local.is_file() {
            let data = fs::read(&local).with_context(|| format!("Failed to read {}", local.display()))?;
            return Ok(Reply::File {
                content_type: guess_content_type(&local),
                data,
            });
        }
    }

    if config.export.llms && llms::is_generated(path) {
        let files = LlmsFiles::generate(snapshot.index(), config);
        if let Some(text) = files.get(path) {
            return Ok(Reply::File {
                content_type: guess_content_type(Path::new(path)),
                data: text.as_bytes().to_vec(),
            });
        }
    }

    Ok(match snapshot.render_slug(path) {
        PageOutcome::Found(html) => Reply::Page(html),
        PageOutcome::NotFound => Reply::NotFound(snapshot.render_not_found()),
    })
}

/// Handle a single HTTP request against the current snapshot.
fn handle_request(request: Request, site: &Site) -> Result<()> {
    let snapshot = site.snapshot();

    let reply = route(request.url(), site.config(), &snapshot).unwrap_or_else(|err| {
        log!("error"; "{}: {err:#}", request.url());
        Reply::NotFound(snapshot.render_not_found())
    });

    match reply {
        Reply::NoContent => request.respond(Response::empty(204))?,
        Reply::File { content_type, data } => {
            request.respond(Response::from_data(data).with_header(content_type_header(content_type)?))?;
        }
        Reply::Page(html) => {
            request.respond(Response::from_string(&*html).with_header(content_type_header(HTML_CONTENT_TYPE)?))?;
        }
        Reply::NotFound(html) => {
            let response = Response::from_string(&*html)
                .with_status_code(404)
                .with_header(content_type_header(HTML_CONTENT_TYPE)?);
            request.respond(response)?;
        }
    }

    Ok(())
}

fn content_type_header(value: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", value).map_err(|()| anyhow!("invalid header value `{value}`"))
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type for a plain file. Unknown extensions are text.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "text/xml; charset=utf-8",
        _ => "text/plain; charset=utf-8",
    }
}
