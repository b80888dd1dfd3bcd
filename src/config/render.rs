//! `[render]` section configuration.
//!
//! Capability flags for the markdown renderer. They are read once when a
//! renderer is built, never per render.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[render]` section in wiki.toml.
///
/// # Example
/// ```toml
/// [render]
/// smart_punctuation = false
/// ```
#[derive(Debug, Clone, Copy, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Rewrite `[[Target]]` and `[[Target|Label]]` into links.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub wikilinks: bool,

    /// Link bare `http(s)://` and `www.` URLs.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub autolink: bool,

    /// Curly quotes, dashes, and ellipses.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub smart_punctuation: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub tables: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub strikethrough: bool,
}
