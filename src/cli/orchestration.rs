//! Release workflow orchestration
//!
//! [ReleaseOrchestrator] sequences the release over injected collaborators:
//! a [VersionControl] client, a [ConfigStore] holding the project version and
//! a [Publisher]. It performs no I/O of its own apart from reading the
//! changelog, so tests drive it entirely with mocks.
//!
//! `release()` walks the states
//! `Idle -> Validating -> TagCreated -> Published -> TagPushed -> VersionBumped -> Committed -> Done`.
//! A failed publish deletes the fresh tag and returns to `Idle`; any other
//! failure stops where it is and leaves [ReleaseOrchestrator::state] at the
//! last state reached.

use std::path::PathBuf;

use crate::changelog;
use crate::config::Config;
use crate::domain::{tag_message, TagPattern};
use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;
use crate::publish::Publisher;
use crate::store::ConfigStore;
use crate::ui;
use crate::version::ReleaseVersion;

/// Commit the tag is placed on when none is given
pub const DEFAULT_COMMITISH: &str = "HEAD";

/// Progress of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Idle,
    Validating,
    TagCreated,
    Published,
    TagPushed,
    VersionBumped,
    Committed,
    Done,
}

/// Settings the orchestrator needs from the configuration
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    pub remote: String,
    pub tag_pattern: TagPattern,
    pub snapshot_suffix: String,
    /// Changelog that must contain the release section; `None` skips the check
    pub changelog: Option<PathBuf>,
}

impl ReleaseSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(ReleaseSettings {
            remote: config.git.remote.clone(),
            tag_pattern: config.tag_pattern()?,
            snapshot_suffix: config.project.snapshot_suffix.clone(),
            changelog: config
                .project
                .require_changelog
                .then(|| config.project.changelog.clone()),
        })
    }
}

/// A validated release, ready to execute
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    pub version: ReleaseVersion,
    /// Version text exactly as persisted, used for the literal rewrite
    pub current: String,
    pub tag: String,
    pub next_version: String,
    pub remote: String,
}

/// Result of a successful release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub version: String,
    pub tag: String,
    pub next_version: String,
}

/// Result of a successful `tag_release`
#[derive(Debug, Clone, PartialEq)]
pub struct TagOutcome {
    pub tag: String,
    pub commitish: String,
}

/// Message of the commit that persists the next development version
pub fn bump_commit_message(next_version: &str) -> String {
    format!("Prepare next development version {}", next_version)
}

/// Drives a release over injected collaborators
pub struct ReleaseOrchestrator<'a, V, S, P>
where
    V: VersionControl + ?Sized,
    S: ConfigStore + ?Sized,
    P: Publisher + ?Sized,
{
    vcs: &'a V,
    store: &'a S,
    publisher: &'a P,
    settings: ReleaseSettings,
    state: ReleaseState,
}

impl<'a, V, S, P> ReleaseOrchestrator<'a, V, S, P>
where
    V: VersionControl + ?Sized,
    S: ConfigStore + ?Sized,
    P: Publisher + ?Sized,
{
    pub fn new(vcs: &'a V, store: &'a S, publisher: &'a P, settings: ReleaseSettings) -> Self {
        ReleaseOrchestrator {
            vcs,
            store,
            publisher,
            settings,
            state: ReleaseState::Idle,
        }
    }

    /// Last state reached
    pub fn state(&self) -> ReleaseState {
        self.state
    }

    pub fn settings(&self) -> &ReleaseSettings {
        &self.settings
    }

    /// Run the release preconditions without side effects.
    ///
    /// Checks, in order:
    /// 1. the persisted version is releasable (`InvalidVersion`)
    /// 2. the changelog has a `## [<version>]` section, when required (`MissingChangelogEntry`)
    /// 3. the working copy is clean (`DirtyWorkingTree`, carrying the status text)
    pub fn validate(&mut self) -> Result<ReleasePlan> {
        self.state = ReleaseState::Validating;

        let current = self.store.read_version()?.trim().to_string();
        let version = ReleaseVersion::parse(&current, &self.settings.snapshot_suffix)?;
        log::debug!("releasing version {}", version);

        if let Some(path) = &self.settings.changelog {
            changelog::verify_entry(path, &version.to_string())?;
        }

        let status = self.vcs.status()?;
        if !status.trim().is_empty() {
            return Err(ReleaseError::DirtyWorkingTree { status });
        }

        Ok(ReleasePlan {
            tag: self.settings.tag_pattern.format(&version.to_string()),
            next_version: version.next_snapshot(&self.settings.snapshot_suffix),
            remote: self.settings.remote.clone(),
            current,
            version,
        })
    }

    /// Cut a release of the persisted version.
    ///
    /// The tag is created before publishing; every published artifact
    /// has a tag. If publishing fails the tag is deleted again and the
    /// publish error is returned; if that deletion fails too the result is
    /// [ReleaseError::RollbackFailed]. Failures after a successful publish
    /// are not compensated.
    pub fn release(&mut self) -> Result<ReleaseOutcome> {
        let plan = self.validate()?;
        let version = plan.version.to_string();

        ui::display_status(&format!("Creating tag {}", plan.tag));
        self.vcs.create_tag(&plan.tag, &tag_message(&version), DEFAULT_COMMITISH)?;
        self.state = ReleaseState::TagCreated;

        ui::display_status(&format!("Publishing {}", version));
        if let Err(cause) = self.publisher.publish(&plan.version) {
            log::warn!("publish failed, deleting local tag {}", plan.tag);
            return match self.vcs.delete_tag(&plan.tag) {
                Ok(()) => {
                    self.state = ReleaseState::Idle;
                    ui::display_status(&format!("Deleted local tag {}", plan.tag));
                    Err(cause)
                }
                Err(rollback) => Err(ReleaseError::RollbackFailed {
                    tag: plan.tag.clone(),
                    cause: Box::new(cause),
                    rollback: Box::new(rollback),
                }),
            };
        }
        self.state = ReleaseState::Published;
        ui::display_success(&format!("Published {}", version));

        ui::display_status(&format!("Pushing tag {} to {}", plan.tag, plan.remote));
        self.vcs.push_tag(&plan.remote, &plan.tag)?;
        self.state = ReleaseState::TagPushed;

        ui::display_status(&format!("Bumping version to {}", plan.next_version));
        self.store.replace_version(&plan.current, &plan.next_version)?;
        self.state = ReleaseState::VersionBumped;

        self.vcs.add(self.store.path())?;
        self.vcs.commit(&bump_commit_message(&plan.next_version))?;
        self.state = ReleaseState::Committed;

        self.vcs.push(&plan.remote)?;
        self.state = ReleaseState::Done;
        log::info!("released {} as {}", version, plan.tag);

        Ok(ReleaseOutcome {
            version,
            tag: plan.tag,
            next_version: plan.next_version,
        })
    }

    /// Create and push an annotated tag for `version` at `commitish`.
    ///
    /// Same as [TagReleaser::tag_release]; the store and publisher are not
    /// used.
    pub fn tag_release(
        &mut self,
        version: Option<&str>,
        commitish: Option<&str>,
    ) -> Result<TagOutcome> {
        let mut tagger = TagReleaser::new(self.vcs, self.settings.clone());
        let result = tagger.tag_release(version, commitish);
        self.state = tagger.state();
        result
    }
}

/// Tags an arbitrary commit; needs nothing but version control
pub struct TagReleaser<'a, V: VersionControl + ?Sized> {
    vcs: &'a V,
    settings: ReleaseSettings,
    state: ReleaseState,
}

impl<'a, V: VersionControl + ?Sized> TagReleaser<'a, V> {
    pub fn new(vcs: &'a V, settings: ReleaseSettings) -> Self {
        TagReleaser {
            vcs,
            settings,
            state: ReleaseState::Idle,
        }
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    pub fn settings(&self) -> &ReleaseSettings {
        &self.settings
    }

    /// Create and push an annotated tag for `version` at `commitish`.
    ///
    /// No changelog or working tree checks. A failed push leaves the local
    /// tag in place (state `TagCreated`).
    pub fn tag_release(
        &mut self,
        version: Option<&str>,
        commitish: Option<&str>,
    ) -> Result<TagOutcome> {
        let version = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ReleaseError::MissingParameter("version"))?;
        let commitish = commitish
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COMMITISH);
        let tag = self.settings.tag_pattern.format(version);

        self.state = ReleaseState::Idle;

        ui::display_status(&format!("Creating tag {} at {}", tag, commitish));
        self.vcs.create_tag(&tag, &tag_message(version), commitish)?;
        self.state = ReleaseState::TagCreated;

        ui::display_status(&format!("Pushing tag {} to {}", tag, self.settings.remote));
        self.vcs.push_tag(&self.settings.remote, &tag)?;
        self.state = ReleaseState::Done;

        Ok(TagOutcome {
            tag,
            commitish: commitish.to_string(),
        })
    }
}
