//! Command handlers
//!
//! Builds the collaborators described by the configuration and runs the
//! orchestrator for the `release` and `tag-release` commands.

pub mod orchestration;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::boundary::{BoundaryWarning, PartialRelease};
use crate::config::{Config, GitBackend};
use crate::git::{Git2Repository, GitCli, VersionControl};
use crate::process::SystemRunner;
use crate::publish::{CommandPublisher, Publisher};
use crate::store::PropertiesFile;
use crate::ui;

use orchestration::{ReleaseOrchestrator, ReleaseSettings, ReleaseState, TagReleaser};

/// Options of the `release` command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseArgs {
    /// Validate and print the plan without changing anything
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

/// Options of the `tag-release` command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagReleaseArgs {
    pub version: Option<String>,
    pub commitish: Option<String>,
}

/// Open the version control backend selected in the configuration
pub fn open_vcs(config: &Config, project_dir: &Path) -> Result<Box<dyn VersionControl>> {
    let vcs: Box<dyn VersionControl> = match config.git.backend {
        GitBackend::Cli => Box::new(GitCli::new(
            SystemRunner,
            Some(project_dir.to_path_buf()),
        )),
        GitBackend::Libgit2 => Box::new(Git2Repository::open(project_dir)?),
    };
    Ok(vcs)
}

fn publisher(config: &Config, project_dir: &Path) -> Result<CommandPublisher<SystemRunner>> {
    Ok(CommandPublisher::new(
        SystemRunner,
        config.publish.command.clone(),
        Some(project_dir.to_path_buf()),
    )?)
}

/// Run the `release` command
pub fn run_release(config: &Config, project_dir: &Path, args: &ReleaseArgs) -> Result<()> {
    let config = config.clone().resolve_paths(project_dir);
    let vcs = open_vcs(&config, project_dir)?;
    let store = PropertiesFile::new(
        config.project.properties_file.clone(),
        config.project.version_key.clone(),
    );
    let publisher = publisher(&config, project_dir)?;
    let settings = ReleaseSettings::from_config(&config)?;

    let mut orchestrator = ReleaseOrchestrator::new(&*vcs, &store, &publisher, settings);

    ui::display_status("Checking release preconditions...");
    let plan = orchestrator.validate()?;
    ui::display_success(&format!("Ready to release {} as {}", plan.version, plan.tag));

    if args.dry_run {
        ui::display_release_plan(&plan, &publisher.describe());
        return Ok(());
    }

    if !args.assume_yes
        && console::user_attended()
        && !ui::confirm_action(&format!("Release {} and publish it?", plan.version))?
    {
        println!("Release cancelled by user.");
        return Ok(());
    }

    match orchestrator.release() {
        Ok(outcome) => {
            println!(
                "\n{} Released {} (tag {}); next development version is {}\n",
                console::style("✓").green(),
                outcome.version,
                outcome.tag,
                outcome.next_version
            );
            Ok(())
        }
        Err(e) => {
            let file = display_relative(&config.project.properties_file, project_dir);
            let partial = PartialRelease {
                tag: &plan.tag,
                remote: &plan.remote,
                next_version: &plan.next_version,
                properties_file: &file,
            };
            let warning = BoundaryWarning::for_failed_release(orchestrator.state(), &partial);
            if let Some(warning) = warning {
                ui::display_boundary_warning(&warning);
            }
            Err(e.into())
        }
    }
}

/// Run the `tag-release` command
///
/// Only version control is opened; the version store and publish command
/// play no part in tagging.
pub fn run_tag_release(config: &Config, project_dir: &Path, args: &TagReleaseArgs) -> Result<()> {
    let settings = ReleaseSettings::from_config(config)?;
    let remote = settings.remote.clone();

    // Reject a missing version before touching the repository
    if args.version.as_deref().map_or(true, |v| v.trim().is_empty()) {
        return Err(crate::error::ReleaseError::MissingParameter("version").into());
    }

    let vcs = open_vcs(config, project_dir)?;
    let mut tagger = TagReleaser::new(&*vcs, settings);

    match tagger.tag_release(args.version.as_deref(), args.commitish.as_deref()) {
        Ok(outcome) => {
            ui::display_success(&format!(
                "Pushed tag {} ({}) to {}",
                outcome.tag, outcome.commitish, remote
            ));
            Ok(())
        }
        Err(e) => {
            if tagger.state() == ReleaseState::TagCreated {
                let version = args.version.as_deref().unwrap_or_default().trim();
                let tag = tagger.settings().tag_pattern.format(version);
                ui::display_boundary_warning(&BoundaryWarning::LocalTagLeftBehind { tag, remote });
            }
            Err(e.into())
        }
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .map(PathBuf::from)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_relative() {
        assert_eq!(
            display_relative(Path::new("/repo/gradle.properties"), Path::new("/repo")),
            "gradle.properties"
        );
        assert_eq!(
            display_relative(Path::new("/elsewhere/x.properties"), Path::new("/repo")),
            "/elsewhere/x.properties"
        );
    }

    #[test]
    fn test_tag_release_without_version_fails_before_git() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_tag_release(
            &Config::default(),
            dir.path(),
            &TagReleaseArgs {
                version: None,
                commitish: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("Missing required parameter: version"));
    }

    #[test]
    fn test_tag_release_ignores_publish_settings() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        {
            let mut git_config = repo.config().unwrap();
            git_config.set_str("user.name", "Release Bot").unwrap();
            git_config.set_str("user.email", "release@example.org").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = repo.signature().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[]).unwrap();
        }

        let mut config = Config::default();
        config.git.backend = GitBackend::Libgit2;
        config.publish.command = Vec::new();

        let err = run_tag_release(
            &config,
            dir.path(),
            &TagReleaseArgs {
                version: Some("0.0.9".to_string()),
                commitish: None,
            },
        )
        .unwrap_err();

        // Fails at the push (no remote), not on the empty publish command
        assert!(!err.to_string().contains("Publish command is empty"));
        assert!(repo.find_reference("refs/tags/v0.0.9").is_ok());
    }
}
