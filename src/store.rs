//! Persisted project version
//!
//! The development version lives in a `key=value` properties file. It is read
//! by property lookup and rewritten by replacing the `key=old` line,
//! so the rest of the file (comments, ordering, other keys) is left untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use regex::Regex;

use crate::error::{ReleaseError, Result};

/// Where the project version is persisted
pub trait ConfigStore: Send + Sync {
    /// File holding the version, staged when the bump is committed
    fn path(&self) -> &Path;

    /// Current value of the version property
    fn read_version(&self) -> Result<String>;

    /// Replace the literal `key=current` line with `key=next`.
    ///
    /// Fails with [ReleaseError::ConfigWrite] when `key=current` does not
    /// appear verbatim.
    fn replace_version(&self, current: &str, next: &str) -> Result<()>;
}

/// Look up `key` in properties-formatted text.
///
/// Accepts `key=value`, `key = value` and `key: value`. Lines starting with
/// `#` or `!` are comments. The last assignment wins.
pub fn lookup_property(contents: &str, key: &str) -> Option<String> {
    let pattern = format!(r"^\s*{}\s*[=:]\s*(.*?)\s*$", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;

    contents
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !(trimmed.starts_with('#') || trimmed.starts_with('!'))
        })
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .last()
}

/// Rewrite every line that reads exactly `key=current` (surrounding
/// whitespace aside). Other lines, including other keys ending in `key`,
/// are kept byte for byte.
fn replace_literal(contents: &str, key: &str, current: &str, next: &str) -> Option<String> {
    let expected = format!("{}={}", key, current);
    let replacement = format!("{}={}", key, next);
    let mut found = false;

    let updated: String = contents
        .split_inclusive('\n')
        .map(|line| {
            let body = line.trim_end_matches(['\n', '\r']);
            if body.trim() != expected {
                return line.to_string();
            }
            found = true;
            let indent = &body[..body.len() - body.trim_start().len()];
            format!("{}{}{}", indent, replacement, &line[body.len()..])
        })
        .collect();

    found.then_some(updated)
}

/// A properties file on disk (e.g. `gradle.properties`)
#[derive(Debug, Clone)]
pub struct PropertiesFile {
    path: PathBuf,
    key: String,
}

impl PropertiesFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        PropertiesFile {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl ConfigStore for PropertiesFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_version(&self) -> Result<String> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ReleaseError::config(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        lookup_property(&contents, &self.key).ok_or_else(|| {
            ReleaseError::config(format!(
                "No '{}' property in {}",
                self.key,
                self.path.display()
            ))
        })
    }

    fn replace_version(&self, current: &str, next: &str) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;

        let updated = replace_literal(&contents, &self.key, current, next).ok_or_else(|| {
            ReleaseError::ConfigWrite {
                path: self.path.clone(),
                expected: format!("{}={}", self.key, current),
            }
        })?;

        fs::write(&self.path, updated)?;
        log::debug!(
            "{}: {}={} -> {}={}",
            self.path.display(),
            self.key,
            current,
            self.key,
            next
        );
        Ok(())
    }
}

/// In-memory properties store for tests
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    key: String,
    contents: Mutex<String>,
}

impl MemoryStore {
    pub fn new(key: impl Into<String>, contents: impl Into<String>) -> Self {
        MemoryStore {
            path: PathBuf::from("gradle.properties"),
            key: key.into(),
            contents: Mutex::new(contents.into()),
        }
    }

    /// Store holding a single `version=<version>` line
    pub fn with_version(version: &str) -> Self {
        Self::new("version", format!("version={}\n", version))
    }

    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ConfigStore for MemoryStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_version(&self) -> Result<String> {
        lookup_property(&self.contents(), &self.key)
            .ok_or_else(|| ReleaseError::config(format!("No '{}' property", self.key)))
    }

    fn replace_version(&self, current: &str, next: &str) -> Result<()> {
        let mut contents = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        let updated = replace_literal(&contents, &self.key, current, next).ok_or_else(|| {
            ReleaseError::ConfigWrite {
                path: self.path.clone(),
                expected: format!("{}={}", self.key, current),
            }
        })?;
        *contents = updated;
        Ok(())
    }
}
