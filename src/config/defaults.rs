//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use std::path::PathBuf;

    pub fn root() -> PathBuf {
        "wiki".into()
    }

    pub fn extension() -> String {
        "md".into()
    }

    pub fn sidecar() -> String {
        ".index.json".into()
    }

    pub fn landing() -> String {
        "overview".into()
    }

    pub fn excerpt_len() -> usize {
        crate::content::excerpt::EXCERPT_LEN
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }
}

// ============================================================================
// [export] Section Defaults
// ============================================================================

pub mod export {
    use std::path::PathBuf;

    pub fn output() -> PathBuf {
        "wiki-html".into()
    }

    pub fn companions() -> Vec<String> {
        vec!["llms.txt".into(), "llms-full.txt".into()]
    }
}
