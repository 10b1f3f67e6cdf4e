use std::fmt;

use crate::cli::orchestration::ReleaseState;

/// Partial results left behind by a release that stopped after an
/// irreversible step. These are reported to the operator, never acted upon.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Artifacts were published but the tag never reached the remote
    TagNotPushed { tag: String, remote: String },
    /// The tag is public but the next development version was not written
    VersionNotBumped { tag: String, next_version: String },
    /// The properties file holds the next version but it was not committed
    BumpNotCommitted { next_version: String, file: String },
    /// The version bump commit exists locally only
    CommitNotPushed { remote: String },
    /// `tag-release` created the tag but could not push it
    LocalTagLeftBehind { tag: String, remote: String },
    /// Publishing failed and the tag it was cut for could not be deleted
    TagNotRolledBack { tag: String },
}

/// Facts about a failed release needed to describe its partial state
#[derive(Debug, Clone)]
pub struct PartialRelease<'a> {
    pub tag: &'a str,
    pub remote: &'a str,
    pub next_version: &'a str,
    pub properties_file: &'a str,
}

impl BoundaryWarning {
    /// Warning for a release that failed after reaching `state`.
    ///
    /// Returns `None` when nothing is left behind: validation failures, or a
    /// publish failure whose tag was deleted again. `TagCreated` is only kept
    /// when that deletion failed.
    pub fn for_failed_release(state: ReleaseState, release: &PartialRelease<'_>) -> Option<Self> {
        match state {
            ReleaseState::TagCreated => Some(BoundaryWarning::TagNotRolledBack {
                tag: release.tag.to_string(),
            }),
            ReleaseState::Published => Some(BoundaryWarning::TagNotPushed {
                tag: release.tag.to_string(),
                remote: release.remote.to_string(),
            }),
            ReleaseState::TagPushed => Some(BoundaryWarning::VersionNotBumped {
                tag: release.tag.to_string(),
                next_version: release.next_version.to_string(),
            }),
            ReleaseState::VersionBumped => Some(BoundaryWarning::BumpNotCommitted {
                next_version: release.next_version.to_string(),
                file: release.properties_file.to_string(),
            }),
            ReleaseState::Committed => Some(BoundaryWarning::CommitNotPushed {
                remote: release.remote.to_string(),
            }),
            ReleaseState::Idle | ReleaseState::Validating | ReleaseState::Done => None,
        }
    }

    /// Command the operator can run to finish the interrupted step
    pub fn manual_fix(&self) -> Option<String> {
        match self {
            BoundaryWarning::TagNotPushed { tag, remote }
            | BoundaryWarning::LocalTagLeftBehind { tag, remote } => {
                Some(format!("git push {} refs/tags/{}", remote, tag))
            }
            BoundaryWarning::TagNotRolledBack { tag } => Some(format!("git tag -d {}", tag)),
            BoundaryWarning::VersionNotBumped { .. } => None,
            BoundaryWarning::BumpNotCommitted { next_version, file } => Some(format!(
                "git add {} && git commit -m \"Prepare next development version {}\"",
                file, next_version
            )),
            BoundaryWarning::CommitNotPushed { remote } => {
                Some(format!("git push {} HEAD", remote))
            }
        }
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::TagNotPushed { tag, remote } => write!(
                f,
                "Artifacts are published but tag '{}' was not pushed to '{}'",
                tag, remote
            ),
            BoundaryWarning::VersionNotBumped { tag, next_version } => write!(
                f,
                "Tag '{}' is pushed but the version was not bumped to {}",
                tag, next_version
            ),
            BoundaryWarning::BumpNotCommitted { next_version, file } => write!(
                f,
                "{} now holds {} but the change is not committed",
                file, next_version
            ),
            BoundaryWarning::CommitNotPushed { remote } => write!(
                f,
                "The version bump is committed locally but not pushed to '{}'",
                remote
            ),
            BoundaryWarning::LocalTagLeftBehind { tag, remote } => write!(
                f,
                "Tag '{}' exists locally but was not pushed to '{}'",
                tag, remote
            ),
            BoundaryWarning::TagNotRolledBack { tag } => write!(
                f,
                "Nothing was published but local tag '{}' could not be deleted",
                tag
            ),
        }
    }
}
