use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// Heading a changelog must carry for a released version
pub fn entry_heading(version: &str) -> String {
    format!("## [{}]", version)
}

/// A changelog document read in full
#[derive(Debug, Clone)]
pub struct Changelog {
    path: PathBuf,
    contents: String,
}

impl Changelog {
    /// Read the changelog at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Ok(Changelog {
            path: path.to_path_buf(),
            contents,
        })
    }

    pub fn from_contents(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Changelog {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn has_entry(&self, version: &str) -> bool {
        self.contents.contains(&entry_heading(version))
    }
}

/// Check that the changelog at `path` exists and has a section for `version`.
///
/// A missing file is reported the same way as a missing section.
pub fn verify_entry(path: &Path, version: &str) -> Result<()> {
    let missing = || ReleaseError::MissingChangelogEntry {
        path: path.to_path_buf(),
        heading: entry_heading(version),
    };

    let changelog = match Changelog::load(path) {
        Ok(changelog) => changelog,
        Err(ReleaseError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("changelog {} does not exist", path.display());
            return Err(missing());
        }
        Err(e) => return Err(e),
    };

    if changelog.has_entry(version) {
        log::debug!(
            "found '{}' in {}",
            entry_heading(version),
            changelog.path.display()
        );
        Ok(())
    } else {
        Err(missing())
    }
}
