use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::VersionControl;
use crate::process::{CommandRunner, CommandSpec};

/// Git backend that shells out to the `git` executable
pub struct GitCli<R: CommandRunner> {
    runner: R,
    workdir: Option<PathBuf>,
}

impl<R: CommandRunner> GitCli<R> {
    pub fn new(runner: R, workdir: Option<PathBuf>) -> Self {
        GitCli { runner, workdir }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn git<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new("git")
            .args(args)
            .current_dir(self.workdir.clone())
    }

    /// Run an interactive command: output is shown to the operator
    fn run_visible(&self, spec: CommandSpec) -> Result<()> {
        self.runner.run_checked(&spec.streaming(true))?;
        Ok(())
    }
}

impl<R: CommandRunner> VersionControl for GitCli<R> {
    fn status(&self) -> Result<String> {
        let out = self
            .runner
            .run_checked(&self.git(["status", "--porcelain"]))?;
        Ok(out.stdout.trim_end().to_string())
    }

    fn create_tag(&self, name: &str, message: &str, commitish: &str) -> Result<()> {
        self.run_visible(self.git(["tag", "-a", name, "-m", message, commitish]))
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.run_visible(self.git(["tag", "-d", name]))
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}", name);
        self.run_visible(self.git(["push", remote, refspec.as_str()]))
    }

    fn add(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_visible(self.git(["add", "--", &*path]))
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_visible(self.git(["commit", "-m", message]))
    }

    fn push(&self, remote: &str) -> Result<()> {
        self.run_visible(self.git(["push", remote, "HEAD"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::process::{CommandOutput, RecordingRunner};

    fn git_cli() -> GitCli<RecordingRunner> {
        GitCli::new(RecordingRunner::new(), Some(PathBuf::from("/work")))
    }

    #[test]
    fn test_status_returns_porcelain_text() {
        let git = git_cli();
        git.runner()
            .respond("git status", CommandOutput::success(" M gradle.properties\n"));

        assert_eq!(git.status().unwrap(), " M gradle.properties");
        let calls = git.runner().calls();
        assert_eq!(calls[0].display(), "git status --porcelain");
        assert!(!calls[0].stream);
        assert_eq!(calls[0].cwd, Some(PathBuf::from("/work")));
    }

    #[test]
    fn test_clean_status_is_empty() {
        let git = git_cli();
        assert_eq!(git.status().unwrap(), "");
    }

    #[test]
    fn test_tag_commands() {
        let git = git_cli();
        git.create_tag("v0.1.0", "Release 0.1.0", "HEAD").unwrap();
        git.push_tag("origin", "v0.1.0").unwrap();
        git.delete_tag("v0.1.0").unwrap();

        let calls = git.runner().calls();
        assert_eq!(calls[0].program, "git");
        assert_eq!(
            calls[0].args,
            vec!["tag", "-a", "v0.1.0", "-m", "Release 0.1.0", "HEAD"]
        );
        assert!(calls[0].stream);
        assert_eq!(calls[1].display(), "git push origin refs/tags/v0.1.0");
        assert_eq!(calls[2].display(), "git tag -d v0.1.0");
    }

    #[test]
    fn test_commit_and_push_commands() {
        let git = git_cli();
        git.add(Path::new("gradle.properties")).unwrap();
        git.commit("Prepare next development version 0.1.1-SNAPSHOT")
            .unwrap();
        git.push("origin").unwrap();

        assert_eq!(
            git.runner().command_lines(),
            vec![
                "git add -- gradle.properties",
                "git commit -m Prepare next development version 0.1.1-SNAPSHOT",
                "git push origin HEAD",
            ]
        );
    }

    #[test]
    fn test_non_zero_exit_is_command_failure() {
        let git = git_cli();
        git.runner()
            .respond("git push", CommandOutput::failure(128, "rejected"));

        let err = git.push_tag("origin", "v0.1.0").unwrap_err();
        match err {
            ReleaseError::CommandFailure { command, code } => {
                assert_eq!(command, "git push origin refs/tags/v0.1.0");
                assert_eq!(code, 128);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
