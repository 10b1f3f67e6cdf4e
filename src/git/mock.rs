use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;

/// Kind of operation, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsOp {
    Status,
    CreateTag,
    DeleteTag,
    PushTag,
    Add,
    Commit,
    Push,
}

/// A recorded call on [MockVersionControl]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Status,
    CreateTag {
        name: String,
        message: String,
        commitish: String,
    },
    DeleteTag(String),
    PushTag {
        remote: String,
        name: String,
    },
    Add(PathBuf),
    Commit(String),
    Push(String),
}

#[derive(Debug, Default)]
struct MockState {
    status: String,
    calls: Vec<VcsCall>,
    local_tags: BTreeSet<String>,
    remote_tags: BTreeSet<String>,
    staged: Vec<PathBuf>,
    commits: Vec<String>,
    pushes: usize,
    failing: Vec<VcsOp>,
}

/// Mock version control for testing without a repository
///
/// Tracks local and remote tags so tests can assert on the resulting
/// repository state, and fails any operation registered with [Self::fail_on]
/// with a `CommandFailure`.
#[derive(Debug, Default)]
pub struct MockVersionControl {
    state: Mutex<MockState>,
}

impl MockVersionControl {
    /// Create a mock with a clean working copy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose status reports `status`
    pub fn dirty(status: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().status = status.into();
        mock
    }

    /// Make every call of `op` fail
    pub fn fail_on(&self, op: VcsOp) {
        self.state().failing.push(op);
    }

    /// Add an existing local tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.state().local_tags.insert(name.into());
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.state().calls.clone()
    }

    pub fn local_tags(&self) -> Vec<String> {
        self.state().local_tags.iter().cloned().collect()
    }

    pub fn remote_tags(&self) -> Vec<String> {
        self.state().remote_tags.iter().cloned().collect()
    }

    pub fn commits(&self) -> Vec<String> {
        self.state().commits.clone()
    }

    pub fn pushes(&self) -> usize {
        self.state().pushes
    }

    /// True when no call changed the repository
    pub fn is_untouched(&self) -> bool {
        self.state()
            .calls
            .iter()
            .all(|call| matches!(call, VcsCall::Status))
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: VcsCall, op: VcsOp, command: &str) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(ReleaseError::command_failure(command, 1));
        }
        Ok(state)
    }
}

impl VersionControl for MockVersionControl {
    fn status(&self) -> Result<String> {
        let state = self.record(VcsCall::Status, VcsOp::Status, "git status --porcelain")?;
        Ok(state.status.clone())
    }

    fn create_tag(&self, name: &str, message: &str, commitish: &str) -> Result<()> {
        let call = VcsCall::CreateTag {
            name: name.to_string(),
            message: message.to_string(),
            commitish: commitish.to_string(),
        };
        let mut state = self.record(call, VcsOp::CreateTag, &format!("git tag -a {}", name))?;
        if !state.local_tags.insert(name.to_string()) {
            return Err(ReleaseError::command_failure(format!("git tag -a {}", name), 128));
        }
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        let call = VcsCall::DeleteTag(name.to_string());
        let mut state = self.record(call, VcsOp::DeleteTag, &format!("git tag -d {}", name))?;
        if !state.local_tags.remove(name) {
            return Err(ReleaseError::command_failure(format!("git tag -d {}", name), 1));
        }
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let call = VcsCall::PushTag {
            remote: remote.to_string(),
            name: name.to_string(),
        };
        let command = format!("git push {} refs/tags/{}", remote, name);
        let mut state = self.record(call, VcsOp::PushTag, &command)?;
        if !state.local_tags.contains(name) {
            return Err(ReleaseError::command_failure(command, 1));
        }
        state.remote_tags.insert(name.to_string());
        Ok(())
    }

    fn add(&self, path: &Path) -> Result<()> {
        let command = format!("git add -- {}", path.display());
        let mut state = self.record(VcsCall::Add(path.to_path_buf()), VcsOp::Add, &command)?;
        state.staged.push(path.to_path_buf());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let call = VcsCall::Commit(message.to_string());
        let mut state = self.record(call, VcsOp::Commit, "git commit")?;
        if state.staged.is_empty() {
            return Err(ReleaseError::command_failure("git commit", 1));
        }
        state.staged.clear();
        state.commits.push(message.to_string());
        Ok(())
    }

    fn push(&self, remote: &str) -> Result<()> {
        let call = VcsCall::Push(remote.to_string());
        let mut state = self.record(call, VcsOp::Push, &format!("git push {} HEAD", remote))?;
        state.pushes += 1;
        Ok(())
    }
}
