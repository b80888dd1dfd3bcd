//! Autowiki - a browsable, searchable HTML wiki from a directory of markdown.
//!
//! ```ignore
//! let config = WikiConfig::load(Path::new("./"))?;
//! config.validate()?;
//!
//! // Live: rescans on change, serves the latest complete snapshot
//! serve_site(Arc::new(Site::open(config)?))?;
//!
//! // Static: one scan, one file per page
//! export_site(&config)?;
//! ```

pub mod config;
pub mod content;
pub mod export;
pub mod llms;
pub mod logger;
pub mod render;
pub mod serve;
pub mod site;
pub mod utils;
pub mod watch;

pub use config::{ConfigError, WikiConfig};
pub use export::{ExportSummary, export_site};
pub use serve::serve_site;
pub use site::{PageOutcome, Site, Snapshot};
