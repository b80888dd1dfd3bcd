//! `[export]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[export]` section in wiki.toml - static export settings.
///
/// # Example
/// ```toml
/// [export]
/// output = "public"
/// companions = ["CHANGELOG.md"]
/// llms = true
/// project = "autowiki"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Output directory, relative to the config file.
    #[serde(default = "defaults::export::output")]
    #[educe(Default = defaults::export::output())]
    pub output: PathBuf,

    /// Plain files copied from the content root when present.
    #[serde(default = "defaults::export::companions")]
    #[educe(Default = defaults::export::companions())]
    pub companions: Vec<String>,

    /// Generate `llms.txt` and `llms-full.txt` from the scan.
    ///
    /// Generated files take precedence over companions of the same name.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub llms: bool,

    /// Project name for the `llms.txt` headings. Defaults to the name of
    /// the directory holding the content root.
    #[serde(default)]
    pub project: Option<String>,
}
