// tests/cli_orchestration_test.rs
use std::fs;
use std::path::PathBuf;

use release_flow::boundary::{BoundaryWarning, PartialRelease};
use release_flow::cli::orchestration::{
    ReleaseOrchestrator, ReleaseSettings, ReleaseState, TagReleaser, DEFAULT_COMMITISH,
};
use release_flow::domain::TagPattern;
use release_flow::git::{MockVersionControl, VcsCall, VcsOp};
use release_flow::publish::MockPublisher;
use release_flow::store::MemoryStore;
use release_flow::ReleaseError;
use tempfile::TempDir;

fn settings(changelog: Option<PathBuf>) -> ReleaseSettings {
    ReleaseSettings {
        remote: "origin".to_string(),
        tag_pattern: TagPattern::default(),
        snapshot_suffix: "-SNAPSHOT".to_string(),
        changelog,
    }
}

fn changelog_with(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CHANGELOG.md");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_end_to_end_release() {
    let (_dir, changelog) =
        changelog_with("# Changelog\n\n## [0.1.0] - 2026-10-19\n\n- Initial release\n");
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.1.0");
    let publisher = MockPublisher::new();

    let mut orchestrator =
        ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(Some(changelog)));
    let outcome = orchestrator.release().unwrap();

    assert_eq!(outcome.version, "0.1.0");
    assert_eq!(outcome.tag, "v0.1.0");
    assert_eq!(outcome.next_version, "0.1.1-SNAPSHOT");
    assert_eq!(orchestrator.state(), ReleaseState::Done);

    assert_eq!(vcs.remote_tags(), vec!["v0.1.0"]);
    assert_eq!(publisher.published(), vec!["0.1.0"]);
    assert_eq!(store.contents(), "version=0.1.1-SNAPSHOT\n");
    assert_eq!(
        vcs.commits(),
        vec!["Prepare next development version 0.1.1-SNAPSHOT"]
    );
    assert_eq!(vcs.pushes(), 1);

    assert_eq!(
        vcs.calls(),
        vec![
            VcsCall::Status,
            VcsCall::CreateTag {
                name: "v0.1.0".to_string(),
                message: "Release 0.1.0".to_string(),
                commitish: "HEAD".to_string(),
            },
            VcsCall::PushTag {
                remote: "origin".to_string(),
                name: "v0.1.0".to_string(),
            },
            VcsCall::Add(PathBuf::from("gradle.properties")),
            VcsCall::Commit("Prepare next development version 0.1.1-SNAPSHOT".to_string()),
            VcsCall::Push("origin".to_string()),
        ]
    );
}

#[test]
fn test_snapshot_version_aborts_before_side_effects() {
    for version in ["0.2.0-SNAPSHOT", "1.0.0-SNAPSHOT", "10.4.7-SNAPSHOT"] {
        let vcs = MockVersionControl::new();
        let store = MemoryStore::with_version(version);
        let publisher = MockPublisher::new();

        let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
        let err = orchestrator.release().unwrap_err();

        assert!(matches!(err, ReleaseError::InvalidVersion(_)), "{}", err);
        assert!(vcs.calls().is_empty(), "no git call expected for {}", version);
        assert!(vcs.local_tags().is_empty());
        assert!(publisher.published().is_empty());
        assert_eq!(store.contents(), format!("version={}\n", version));
    }
}

#[test]
fn test_missing_changelog_entry_aborts_before_tag() {
    let (_dir, changelog) = changelog_with("# Changelog\n\n## [0.1.0]\n\n- Older release\n");
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.2.0");
    let publisher = MockPublisher::new();

    let mut orchestrator =
        ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(Some(changelog)));
    let err = orchestrator.release().unwrap_err();

    assert!(matches!(err, ReleaseError::MissingChangelogEntry { .. }));
    assert!(err.to_string().contains("## [0.2.0]"));
    assert!(vcs.local_tags().is_empty());
    assert!(vcs.is_untouched());
}

#[test]
fn test_missing_changelog_file_aborts_before_tag() {
    let dir = tempfile::tempdir().unwrap();
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.2.0");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(
        &vcs,
        &store,
        &publisher,
        settings(Some(dir.path().join("CHANGELOG.md"))),
    );
    let err = orchestrator.release().unwrap_err();

    assert!(matches!(err, ReleaseError::MissingChangelogEntry { .. }));
    assert!(vcs.calls().is_empty());
}

#[test]
fn test_changelog_check_can_be_disabled() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.2.0");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    assert!(orchestrator.release().is_ok());
}

#[test]
fn test_dirty_working_tree_aborts_with_status_text() {
    for status in [" M build.gradle.kts", "?? scratch.txt", "A  src/New.java\n D old.txt"] {
        let vcs = MockVersionControl::dirty(status);
        let store = MemoryStore::with_version("0.2.0");
        let publisher = MockPublisher::new();

        let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
        let err = orchestrator.release().unwrap_err();

        match &err {
            ReleaseError::DirtyWorkingTree { status: reported } => assert_eq!(reported, status),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains(status));
        assert_eq!(vcs.calls(), vec![VcsCall::Status]);
        assert!(publisher.published().is_empty());
    }
}

#[test]
fn test_publish_failure_deletes_tag_and_propagates() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.2.0");
    let publisher = MockPublisher::failing();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    let err = orchestrator.release().unwrap_err();

    match err {
        ReleaseError::CommandFailure { command, code } => {
            assert_eq!(command, "mock publish");
            assert_eq!(code, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(vcs.local_tags().is_empty());
    assert!(vcs.remote_tags().is_empty());
    assert_eq!(orchestrator.state(), ReleaseState::Idle);
    assert_eq!(
        vcs.calls().last(),
        Some(&VcsCall::DeleteTag("v0.2.0".to_string()))
    );
    assert_eq!(store.contents(), "version=0.2.0\n");
}

#[test]
fn test_next_version_increments_patch() {
    for (current, next) in [
        ("0.2.0", "0.2.1-SNAPSHOT"),
        ("1.0.9", "1.0.10-SNAPSHOT"),
        ("3.14.0", "3.14.1-SNAPSHOT"),
    ] {
        let vcs = MockVersionControl::new();
        let store = MemoryStore::with_version(current);
        let publisher = MockPublisher::new();

        let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
        let outcome = orchestrator.release().unwrap();

        assert_eq!(outcome.next_version, next);
        assert_eq!(store.contents(), format!("version={}\n", next));
    }
}

#[test]
fn test_config_write_failure_after_tag_push() {
    // Readable through property lookup, but the literal `version=0.2.0` text is absent
    let vcs = MockVersionControl::new();
    let store = MemoryStore::new("version", "version = 0.2.0\n");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    let err = orchestrator.release().unwrap_err();

    assert!(matches!(err, ReleaseError::ConfigWrite { .. }));
    assert_eq!(orchestrator.state(), ReleaseState::TagPushed);
    assert_eq!(vcs.remote_tags(), vec!["v0.2.0"]);
    assert!(vcs.commits().is_empty());
}

#[test]
fn test_commit_push_failure_leaves_committed_state() {
    let vcs = MockVersionControl::new();
    vcs.fail_on(VcsOp::Push);
    let store = MemoryStore::with_version("0.2.0");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    assert!(orchestrator.release().is_err());
    assert_eq!(orchestrator.state(), ReleaseState::Committed);
    assert_eq!(vcs.commits().len(), 1);
}

#[test]
fn test_tag_release_defaults_to_head_without_validation() {
    // Dirty tree and a snapshot version would both block `release()`
    let vcs = MockVersionControl::dirty(" M gradle.properties");
    let store = MemoryStore::with_version("0.3.0-SNAPSHOT");
    let publisher = MockPublisher::new();
    let (_dir, changelog) = changelog_with("# Changelog\n");

    let mut orchestrator =
        ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(Some(changelog)));
    let outcome = orchestrator.tag_release(Some("0.3.0"), None).unwrap();

    assert_eq!(outcome.tag, "v0.3.0");
    assert_eq!(outcome.commitish, DEFAULT_COMMITISH);
    assert_eq!(
        vcs.calls(),
        vec![
            VcsCall::CreateTag {
                name: "v0.3.0".to_string(),
                message: "Release 0.3.0".to_string(),
                commitish: "HEAD".to_string(),
            },
            VcsCall::PushTag {
                remote: "origin".to_string(),
                name: "v0.3.0".to_string(),
            },
        ]
    );
    assert_eq!(vcs.remote_tags(), vec!["v0.3.0"]);
    assert!(publisher.published().is_empty());
}

#[test]
fn test_tag_release_at_explicit_commit() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.3.0");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    let outcome = orchestrator
        .tag_release(Some("0.2.5"), Some("a1b2c3d"))
        .unwrap();

    assert_eq!(outcome.commitish, "a1b2c3d");
    assert!(matches!(
        &vcs.calls()[0],
        VcsCall::CreateTag { commitish, .. } if commitish == "a1b2c3d"
    ));
}

#[test]
fn test_tag_release_missing_version() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("0.3.0");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    let err = orchestrator.tag_release(None, Some("HEAD")).unwrap_err();

    assert!(matches!(err, ReleaseError::MissingParameter("version")));
    assert!(vcs.calls().is_empty());
}

#[test]
fn test_tag_release_push_failure_keeps_local_tag() {
    let vcs = MockVersionControl::new();
    vcs.fail_on(VcsOp::PushTag);
    let store = MemoryStore::with_version("0.3.0");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    assert!(orchestrator.tag_release(Some("0.3.0"), None).is_err());

    assert_eq!(orchestrator.state(), ReleaseState::TagCreated);
    assert_eq!(vcs.local_tags(), vec!["v0.3.0"]);
    assert!(vcs.remote_tags().is_empty());
    assert!(!vcs
        .calls()
        .iter()
        .any(|call| matches!(call, VcsCall::DeleteTag(_))));
}

#[test]
fn test_custom_tag_pattern() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::with_version("2.0.0");
    let publisher = MockPublisher::new();
    let mut release_settings = settings(None);
    release_settings.tag_pattern = TagPattern::new("release-{version}").unwrap();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, release_settings);
    let outcome = orchestrator.release().unwrap();
    assert_eq!(outcome.tag, "release-2.0.0");
}

#[test]
fn test_bump_only_touches_the_version_key() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::new(
        "version",
        "plugin.version=0.4.0\nversion=0.4.0\nmyversion=0.4.0\n",
    );
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    orchestrator.release().unwrap();

    assert_eq!(
        store.contents(),
        "plugin.version=0.4.0\nversion=0.4.1-SNAPSHOT\nmyversion=0.4.0\n"
    );
}

#[test]
fn test_spaced_version_line_with_lookalike_key_is_not_bumped() {
    let vcs = MockVersionControl::new();
    let store = MemoryStore::new("version", "myversion=0.4.0\nversion = 0.4.0\n");
    let publisher = MockPublisher::new();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    let err = orchestrator.release().unwrap_err();

    assert!(matches!(err, ReleaseError::ConfigWrite { .. }));
    assert_eq!(orchestrator.state(), ReleaseState::TagPushed);
    assert_eq!(store.contents(), "myversion=0.4.0\nversion = 0.4.0\n");
    assert!(vcs.commits().is_empty());
}

#[test]
fn test_failed_rollback_reports_stray_tag() {
    let vcs = MockVersionControl::new();
    vcs.fail_on(VcsOp::DeleteTag);
    let store = MemoryStore::with_version("0.5.0");
    let publisher = MockPublisher::failing();

    let mut orchestrator = ReleaseOrchestrator::new(&vcs, &store, &publisher, settings(None));
    let err = orchestrator.release().unwrap_err();
    assert!(matches!(err, ReleaseError::RollbackFailed { .. }));

    let partial = PartialRelease {
        tag: "v0.5.0",
        remote: "origin",
        next_version: "0.5.1-SNAPSHOT",
        properties_file: "gradle.properties",
    };
    let warning = BoundaryWarning::for_failed_release(orchestrator.state(), &partial).unwrap();
    assert_eq!(warning.manual_fix().as_deref(), Some("git tag -d v0.5.0"));
    assert_eq!(vcs.local_tags(), vec!["v0.5.0"]);
}

#[test]
fn test_tag_releaser_works_without_store_or_publisher() {
    let vcs = MockVersionControl::new();
    let mut tagger = TagReleaser::new(&vcs, settings(None));

    let outcome = tagger.tag_release(Some("0.6.0"), None).unwrap();

    assert_eq!(outcome.commitish, DEFAULT_COMMITISH);
    assert_eq!(tagger.state(), ReleaseState::Done);
    assert_eq!(vcs.remote_tags(), vec!["v0.6.0"]);
}
