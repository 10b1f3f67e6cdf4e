use std::path::Path;

use git2::{
    Cred, CredentialType, PushOptions, RemoteCallbacks, Repository as Git2Repo, Status,
    StatusOptions,
};

use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn push_refspec(&self, remote: &str, refspec: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::config(format!("Cannot find remote '{}': {}", remote, e)))?;

        let config = self.repo.config()?;
        let mut rejection: Option<String> = None;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            if allowed.contains(CredentialType::SSH_KEY) {
                if let Some(user) = username {
                    return Cred::ssh_key_from_agent(user);
                }
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                return Cred::credential_helper(&config, url, username);
            }
            Cred::default()
        });

        callbacks.push_update_reference(|reference, status| {
            if let Some(message) = status {
                rejection = Some(format!("{}: {}", reference, message));
            }
            Ok(())
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        log::debug!("pushing {} to {}", refspec, remote.name().unwrap_or("?"));
        remote.push(&[refspec], Some(&mut options))?;
        drop(options);

        match rejection {
            Some(reason) => Err(ReleaseError::config(format!("Push rejected: {}", reason))),
            None => Ok(()),
        }
    }
}

fn status_code(status: Status) -> &'static str {
    if status.contains(Status::WT_NEW) && !status.intersects(Status::INDEX_NEW) {
        return "??";
    }
    let index = if status.contains(Status::INDEX_NEW) {
        'A'
    } else if status.contains(Status::INDEX_MODIFIED) {
        'M'
    } else if status.contains(Status::INDEX_DELETED) {
        'D'
    } else if status.contains(Status::INDEX_RENAMED) {
        'R'
    } else {
        ' '
    };
    let worktree = if status.contains(Status::WT_MODIFIED) {
        'M'
    } else if status.contains(Status::WT_DELETED) {
        'D'
    } else {
        ' '
    };
    match (index, worktree) {
        ('A', 'M') => "AM",
        ('A', _) => "A ",
        ('M', 'M') => "MM",
        ('M', _) => "M ",
        ('D', _) => "D ",
        ('R', _) => "R ",
        (_, 'M') => " M",
        (_, 'D') => " D",
        _ => " ?",
    }
}

impl VersionControl for Git2Repository {
    fn status(&self) -> Result<String> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;

        let lines: Vec<String> = statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .map(|entry| {
                format!(
                    "{} {}",
                    status_code(entry.status()),
                    entry.path().unwrap_or("(non-utf8 path)")
                )
            })
            .collect();

        Ok(lines.join("\n"))
    }

    fn create_tag(&self, name: &str, message: &str, commitish: &str) -> Result<()> {
        let target = self.repo.revparse_single(commitish).map_err(|e| {
            ReleaseError::config(format!("Cannot resolve '{}': {}", commitish, e))
        })?;
        let tagger = self.repo.signature()?;

        self.repo.tag(name, &target, &tagger, message, false)?;
        log::debug!("created tag {} at {}", name, target.id());
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo.tag_delete(name)?;
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        self.push_refspec(remote, &refspec)
    }

    fn add(&self, path: &Path) -> Result<()> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| ReleaseError::config("Repository has no working directory"))?;

        let relative = if path.is_absolute() {
            let workdir = workdir.canonicalize()?;
            let absolute = path.canonicalize()?;
            absolute
                .strip_prefix(&workdir)
                .map(Path::to_path_buf)
                .map_err(|_| {
                    ReleaseError::config(format!(
                        "{} is outside the repository",
                        path.display()
                    ))
                })?
        } else {
            path.to_path_buf()
        };

        let mut index = self.repo.index()?;
        index.add_path(&relative)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let parent = self.repo.head()?.peel_to_commit()?;

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
        Ok(())
    }

    fn push(&self, remote: &str) -> Result<()> {
        let head = self.repo.head()?;
        let branch = head
            .name()
            .filter(|name| name.starts_with("refs/heads/"))
            .ok_or_else(|| ReleaseError::config("HEAD is not on a branch"))?
            .to_string();

        self.push_refspec(remote, &format!("{}:{}", branch, branch))
    }
}
