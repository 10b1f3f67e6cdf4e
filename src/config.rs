use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};
use crate::version::SNAPSHOT_SUFFIX;

/// File name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "release.toml";

/// Represents the complete configuration for release-flow.
///
/// Describes where the project keeps its version and changelog, how tags are
/// named and pushed, and which command publishes the artifacts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_properties_file() -> PathBuf {
    PathBuf::from("gradle.properties")
}

fn default_version_key() -> String {
    "version".to_string()
}

fn default_snapshot_suffix() -> String {
    SNAPSHOT_SUFFIX.to_string()
}

fn default_changelog() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_true() -> bool {
    true
}

/// Location of the persisted version and the changelog.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProjectConfig {
    #[serde(default = "default_properties_file")]
    pub properties_file: PathBuf,

    #[serde(default = "default_version_key")]
    pub version_key: String,

    #[serde(default = "default_snapshot_suffix")]
    pub snapshot_suffix: String,

    #[serde(default = "default_changelog")]
    pub changelog: PathBuf,

    /// Refuse to release without a `## [<version>]` changelog section
    #[serde(default = "default_true")]
    pub require_changelog: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            properties_file: default_properties_file(),
            version_key: default_version_key(),
            snapshot_suffix: default_snapshot_suffix(),
            changelog: default_changelog(),
            require_changelog: true,
        }
    }
}

/// Which implementation talks to the repository.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GitBackend {
    /// The `git` executable
    #[default]
    Cli,
    /// The bundled libgit2 library
    Libgit2,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_format() -> String {
    "v{version}".to_string()
}

/// Remote, tag naming and backend selection.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default)]
    pub backend: GitBackend,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            tag_format: default_tag_format(),
            backend: GitBackend::default(),
        }
    }
}

fn default_publish_command() -> Vec<String> {
    vec![
        "./gradlew".to_string(),
        "publishAndReleaseToMavenCentral".to_string(),
    ]
}

/// The external command that publishes artifacts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    #[serde(default = "default_publish_command")]
    pub command: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            command: default_publish_command(),
        }
    }
}

impl Config {
    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        TagPattern::new(self.git.tag_format.clone())?;

        if self.git.remote.trim().is_empty() {
            return Err(ReleaseError::config("git.remote must not be empty"));
        }
        if self.project.version_key.trim().is_empty() {
            return Err(ReleaseError::config("project.version_key must not be empty"));
        }
        if self
            .publish
            .command
            .first()
            .map_or(true, |program| program.trim().is_empty())
        {
            return Err(ReleaseError::config("publish.command must name a program"));
        }
        Ok(())
    }

    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.git.tag_format.clone())
    }

    /// Resolve the project paths against `root` when they are relative.
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        if self.project.properties_file.is_relative() {
            self.project.properties_file = root.join(&self.project.properties_file);
        }
        if self.project.changelog.is_relative() {
            self.project.changelog = root.join(&self.project.changelog);
        }
        self
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in `project_dir`
/// 3. `.release-flow.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `project_dir` - Directory searched for `release.toml`
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, project_dir: &Path) -> Result<Config> {
    let local = project_dir.join(CONFIG_FILE_NAME);

    let source = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if local.exists() {
        Some(local)
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(".release-flow.toml"))
            .filter(|path| path.exists())
    };

    let config = match source {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            let text = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str::<Config>(&text)
                .map_err(|e| ReleaseError::config(format!("{}: {}", path.display(), e)))?
        }
        None => {
            log::debug!("no configuration file found, using defaults");
            Config::default()
        }
    };

    config.validate()?;
    Ok(config)
}
