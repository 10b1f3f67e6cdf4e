//! Domain logic - naming rules independent of git operations

pub mod tag;

pub use tag::{tag_message, TagPattern};
