//! `[content]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[content]` section in wiki.toml - where documents live.
///
/// # Example
/// ```toml
/// [content]
/// root = "docs"
/// landing = "home"
/// excerpt_len = 200
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Content root directory, relative to the config file.
    #[serde(default = "defaults::content::root")]
    #[educe(Default = defaults::content::root())]
    pub root: PathBuf,

    /// Document file extension, without the dot.
    #[serde(default = "defaults::content::extension")]
    #[educe(Default = defaults::content::extension())]
    pub extension: String,

    /// Optional alias index inside the content root.
    #[serde(default = "defaults::content::sidecar")]
    #[educe(Default = defaults::content::sidecar())]
    pub sidecar: String,

    /// Slug served for the empty path and targeted by the export redirect.
    #[serde(default = "defaults::content::landing")]
    #[educe(Default = defaults::content::landing())]
    pub landing: String,

    /// Maximum excerpt length in characters.
    #[serde(default = "defaults::content::excerpt_len")]
    #[educe(Default = defaults::content::excerpt_len())]
    pub excerpt_len: usize,
}
