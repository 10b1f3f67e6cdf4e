use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::version::ReleaseVersion;

/// Publishes the artifacts of a release
pub trait Publisher: Send + Sync {
    /// Human-readable description of what `publish` runs
    fn describe(&self) -> String;

    fn publish(&self, version: &ReleaseVersion) -> Result<()>;
}

/// Delegates publishing to the build tool (e.g. `./gradlew publishAndReleaseToMavenCentral`)
pub struct CommandPublisher<R: CommandRunner> {
    runner: R,
    command: Vec<String>,
    workdir: Option<PathBuf>,
}

impl<R: CommandRunner> CommandPublisher<R> {
    pub fn new(runner: R, command: Vec<String>, workdir: Option<PathBuf>) -> Result<Self> {
        if command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(ReleaseError::config("Publish command is empty"));
        }
        Ok(CommandPublisher {
            runner,
            command,
            workdir,
        })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn spec(&self) -> CommandSpec {
        CommandSpec::new(&self.command[0])
            .args(self.command[1..].iter().cloned())
            .current_dir(self.workdir.clone())
            .streaming(true)
    }
}

impl<R: CommandRunner> Publisher for CommandPublisher<R> {
    fn describe(&self) -> String {
        self.spec().display()
    }

    fn publish(&self, version: &ReleaseVersion) -> Result<()> {
        log::info!("publishing {} with `{}`", version, self.describe());
        self.runner.run_checked(&self.spec())?;
        Ok(())
    }
}

/// Publisher double recording published versions
#[derive(Debug, Default)]
pub struct MockPublisher {
    fail: bool,
    published: Mutex<Vec<String>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose command always exits non-zero
    pub fn failing() -> Self {
        MockPublisher {
            fail: true,
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Publisher for MockPublisher {
    fn describe(&self) -> String {
        "mock publish".to_string()
    }

    fn publish(&self, version: &ReleaseVersion) -> Result<()> {
        if self.fail {
            return Err(ReleaseError::command_failure(self.describe(), 1));
        }
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(version.to_string());
        Ok(())
    }
}
