//! Wiki configuration management for `wiki.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[content]` | Content root, extension, sidecar, landing page   |
//! | `[render]`  | Markdown capability flags                        |
//! | `[serve]`   | Live server (interface, port, watch)             |
//! | `[export]`  | Static export (output dir, companion files)      |
//!
//! The file is optional; every field has a default.
//!
//! # Example
//!
//! ```toml
//! [content]
//! root = "docs"
//!
//! [render]
//! smart_punctuation = false
//!
//! [serve]
//! port = 8080
//!
//! [export]
//! output = "public"
//! ```

mod content;
pub mod defaults;
mod error;
mod export;
mod render;
mod serve;

pub use content::ContentConfig;
pub use error::ConfigError;
pub use export::ExportConfig;
pub use render::RenderConfig;
pub use serve::ServeConfig;

use crate::utils::slug::is_safe_slug;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing wiki.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WikiConfig {
    /// Absolute path to the config file (empty when defaults are used)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl WikiConfig {
    pub const FILE_NAME: &'static str = "wiki.toml";

    /// Parse configuration from TOML string. Paths are left as written.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: WikiConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path, resolving paths against its directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;

        let base = path.parent().unwrap_or(Path::new("./"));
        config.config_path = Self::normalize_path(path);
        config.resolve_paths(base);
        Ok(config)
    }

    /// Load `wiki.toml` from `dir`, or defaults rooted at `dir` when absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::FILE_NAME);
        if path.is_file() {
            return Self::from_path(&path);
        }

        let mut config = Self::default();
        config.resolve_paths(dir);
        Ok(config)
    }

    pub fn content_root(&self) -> &Path {
        &self.content.root
    }

    pub fn landing_slug(&self) -> &str {
        &self.content.landing
    }

    /// Make relative directory paths absolute against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        self.content.root = Self::normalize_path(&base.join(&self.content.root));
        self.export.output = Self::normalize_path(&base.join(&self.export.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Check the settings nothing can run without.
    ///
    /// Failures here are fatal: they are reported before any page is served
    /// or exported.
    pub fn validate(&self) -> Result<()> {
        if !self.content.root.is_dir() {
            bail!(ConfigError::MissingContentRoot(self.content.root.clone()));
        }

        if self.serve.port == 0 {
            bail!(ConfigError::Validation("[serve.port] must not be 0".into()));
        }

        if self.content.excerpt_len == 0 {
            bail!(ConfigError::Validation(
                "[content.excerpt_len] must be greater than 0".into()
            ));
        }

        if self.content.extension.is_empty() || self.content.extension.starts_with('.') {
            bail!(ConfigError::Validation(
                "[content.extension] must be a bare extension such as \"md\"".into()
            ));
        }

        if !is_safe_slug(&self.content.landing) {
            bail!(ConfigError::Validation(format!(
                "[content.landing] `{}` is not a valid page slug",
                self.content.landing
            )));
        }

        if let Some(name) = self
            .export
            .companions
            .iter()
            .find(|name| !is_plain_file_name(name))
        {
            bail!(ConfigError::Validation(format!(
                "[export.companions] entry `{name}` must be a plain file name"
            )));
        }

        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_error(result: Result<()>) -> ConfigError {
        result.unwrap_err().downcast::<ConfigError>().unwrap()
    }

    fn valid_in(dir: &TempDir) -> WikiConfig {
        fs::create_dir_all(dir.path().join("wiki")).unwrap();
        WikiConfig::load(dir.path()).unwrap()
    }

    #[test]
    fn test_from_str() {
        let config = WikiConfig::from_str(
            r#"
            [content]
            root = "docs"

            [serve]
            port = 8080
        "#,
        )
        .unwrap();

        assert_eq!(config.content.root, PathBuf::from("docs"));
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.landing_slug(), "overview");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = WikiConfig::from_str("[content\nroot = \"docs\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = WikiConfig::from_str("[base]\ntitle = \"Test\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default() {
        let config = WikiConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.content_root(), Path::new("wiki"));
        assert_eq!(config.export.output, PathBuf::from("wiki-html"));
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_load_without_file_uses_defaults_in_dir() {
        let dir = TempDir::new().unwrap();
        let config = valid_in(&dir);

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.content_root(), root.join("wiki"));
        assert!(config.export.output.is_absolute());
        assert!(config.export.output.ends_with("wiki-html"));
        assert_eq!(config.config_path, PathBuf::new());
    }

    #[test]
    fn test_load_resolves_paths_against_config_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join(WikiConfig::FILE_NAME),
            "[content]\nroot = \"docs\"\n[export]\noutput = \"out\"\n",
        )
        .unwrap();

        let config = WikiConfig::load(dir.path()).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.content_root(), root.join("docs"));
        assert!(config.export.output.ends_with("out"));
        assert_eq!(config.config_path, root.join(WikiConfig::FILE_NAME));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = WikiConfig::from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::Io(..))));
    }

    #[test]
    fn test_validate_missing_content_root() {
        let dir = TempDir::new().unwrap();
        let config = WikiConfig::load(dir.path()).unwrap();

        assert!(matches!(
            config_error(config.validate()),
            ConfigError::MissingContentRoot(_)
        ));
    }

    #[test]
    fn test_validate_port_zero() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_in(&dir);
        config.serve.port = 0;

        assert!(matches!(config_error(config.validate()), ConfigError::Validation(_)));
    }

    #[test]
    fn test_validate_excerpt_len_zero() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_in(&dir);
        config.content.excerpt_len = 0;

        assert!(matches!(config_error(config.validate()), ConfigError::Validation(_)));
    }

    #[test]
    fn test_validate_landing_and_companions() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_in(&dir);
        config.content.landing = "../etc".into();
        assert!(config.validate().is_err());

        let mut config = valid_in(&dir);
        config.export.companions = vec!["../secret.txt".into()];
        assert!(config.validate().is_err());

        let mut config = valid_in(&dir);
        config.content.extension = ".md".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_defaults_ok() {
        let dir = TempDir::new().unwrap();
        assert!(valid_in(&dir).validate().is_ok());
    }
}
