//! Markdown rendering, code highlighting, and the page shell.

pub mod highlight;
mod markdown;
pub mod template;

pub use highlight::highlight;
pub use markdown::{LinkStyle, Renderer};
pub use template::{Layout, PageView, search_json};
