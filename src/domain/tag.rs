use crate::error::{ReleaseError, Result};

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern, rejecting patterns without a `{version}` placeholder
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        if pattern.matches("{version}").count() != 1 {
            return Err(ReleaseError::config(format!(
                "Tag pattern '{}' must contain exactly one {{version}} placeholder",
                pattern
            )));
        }

        if pattern.chars().any(char::is_whitespace) {
            return Err(ReleaseError::config(format!(
                "Tag pattern '{}' must not contain whitespace",
                pattern
            )));
        }

        Ok(TagPattern { pattern })
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version="1.2.3" -> "v1.2.3"
    pub fn format(&self, version: &str) -> String {
        self.pattern.replace("{version}", version)
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            pattern: "v{version}".to_string(),
        }
    }
}

/// Message stored on the annotated release tag
pub fn tag_message(version: &str) -> String {
    format!("Release {}", version)
}
