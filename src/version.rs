use std::fmt;

use crate::error::{ReleaseError, Result};

/// Default marker appended to development versions.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A version that may be released.
///
/// Wraps a `semver::Version` with no pre-release identifiers and no snapshot
/// marker. Build metadata is dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion {
    inner: semver::Version,
}

impl ReleaseVersion {
    /// Creates a version from its three components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        ReleaseVersion {
            inner: semver::Version::new(major, minor, patch),
        }
    }

    /// Parses a version string and checks that it is releasable.
    ///
    /// # Arguments
    /// * `raw` - Version string as read from the properties file
    /// * `snapshot_suffix` - Marker identifying development versions (e.g. `-SNAPSHOT`)
    ///
    /// # Returns
    /// * `Ok(ReleaseVersion)` - A plain `major.minor.patch` version
    /// * `Err(InvalidVersion)` - If the version is a snapshot, a pre-release, or not `X.Y.Z`
    ///
    /// # Example
    /// ```ignore
    /// assert!(ReleaseVersion::parse("0.2.0", "-SNAPSHOT").is_ok());
    /// assert!(ReleaseVersion::parse("0.2.0-SNAPSHOT", "-SNAPSHOT").is_err());
    /// ```
    pub fn parse(raw: &str, snapshot_suffix: &str) -> Result<Self> {
        let raw = raw.trim();

        if !snapshot_suffix.is_empty() && raw.ends_with(snapshot_suffix) {
            return Err(ReleaseError::invalid_version(format!(
                "'{}' is a development version; remove '{}' before releasing",
                raw, snapshot_suffix
            )));
        }

        let parsed = semver::Version::parse(raw).map_err(|e| {
            ReleaseError::invalid_version(format!(
                "'{}' is not a major.minor.patch version: {}",
                raw, e
            ))
        })?;

        if !parsed.pre.is_empty() {
            return Err(ReleaseError::invalid_version(format!(
                "'{}' carries pre-release identifier '{}'",
                raw, parsed.pre
            )));
        }

        Ok(ReleaseVersion::new(parsed.major, parsed.minor, parsed.patch))
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// Returns the next development version: patch + 1 followed by the snapshot marker.
    ///
    /// `0.2.0` becomes `0.2.1-SNAPSHOT`.
    pub fn next_snapshot(&self, snapshot_suffix: &str) -> String {
        format!(
            "{}.{}.{}{}",
            self.inner.major,
            self.inner.minor,
            self.inner.patch + 1,
            snapshot_suffix
        )
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.inner.major, self.inner.minor, self.inner.patch
        )
    }
}
