//! Utility modules shared across the wiki pipeline.

pub mod html;
pub mod slug;
