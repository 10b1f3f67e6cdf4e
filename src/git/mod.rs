//! Version control abstraction layer
//!
//! The release flow only needs a handful of git operations. They are
//! expressed by the [VersionControl] trait so the orchestrator can be driven
//! by a real repository or by a mock in tests.
//!
//! # Implementations
//!
//! - [cli::GitCli]: drives the `git` executable through a [crate::process::CommandRunner]
//! - [repository::Git2Repository]: uses the `git2` crate directly
//! - [mock::MockVersionControl]: in-memory implementation that records calls

pub mod cli;
pub mod mock;
pub mod repository;

pub use cli::GitCli;
pub use mock::{MockVersionControl, VcsCall, VcsOp};
pub use repository::Git2Repository;

use std::path::Path;

use crate::error::Result;

/// Git operations used by the release flow
///
/// All methods block until the operation has finished. Implementations map
/// their failures to [crate::error::ReleaseError]; the CLI backend reports
/// non-zero exits as `CommandFailure`.
pub trait VersionControl: Send {
    /// Porcelain status of the working copy; empty when clean
    ///
    /// The text is passed verbatim into `DirtyWorkingTree` errors.
    fn status(&self) -> Result<String>;

    /// Create an annotated tag `name` with `message` on `commitish`
    fn create_tag(&self, name: &str, message: &str, commitish: &str) -> Result<()>;

    /// Delete the local tag `name`
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Push the tag `name` to `remote`
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// Stage `path` for the next commit
    fn add(&self, path: &Path) -> Result<()>;

    /// Commit the staged changes
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the current branch to `remote`
    fn push(&self, remote: &str) -> Result<()>;
}
