//! Subprocess execution
//!
//! Every external command (git, the build tool) goes through [CommandRunner],
//! which always captures the exit code and output. Callers that want the
//! operator to see output as it happens set [CommandSpec::stream]; the output
//! is then echoed live and still captured.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use crate::error::{ReleaseError, Result};

/// A command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherits the current one when `None`
    pub cwd: Option<PathBuf>,
    /// Echo output to the terminal while capturing it
    pub stream: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stream: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.cwd = dir;
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// The command line as shown in logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit code and captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was terminated by a signal
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandOutput {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Turn a non-zero exit into [ReleaseError::CommandFailure]
    pub fn ensure_success(self, spec: &CommandSpec) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            log::debug!(
                "`{}` exited with {}\nstdout: {}\nstderr: {}",
                spec.display(),
                self.code,
                self.stdout.trim_end(),
                self.stderr.trim_end()
            );
            Err(ReleaseError::command_failure(spec.display(), self.code))
        }
    }
}

/// Runs external commands
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    ///
    /// A non-zero exit is not an error at this level; spawn failures are.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run the command and fail on a non-zero exit
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.run(spec)?.ensure_success(spec)
    }
}

/// Runs commands with `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("running `{}`", spec.display());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            std::io::Error::new(e.kind(), format!("cannot run `{}`: {}", spec.display(), e))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stream = spec.stream;

        let (stdout, stderr) = std::thread::scope(|s| {
            let out = s.spawn(move || collect(stdout, stream, false));
            let err = s.spawn(move || collect(stderr, stream, true));
            (
                out.join().unwrap_or_default(),
                err.join().unwrap_or_default(),
            )
        });

        let status = child.wait()?;

        Ok(CommandOutput {
            code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

/// Drain a child pipe to the end, echoing raw bytes when streaming.
/// Output that is not valid UTF-8 is captured lossily.
fn collect<R: Read>(pipe: Option<R>, echo: bool, to_stderr: bool) -> String {
    let Some(pipe) = pipe else {
        return String::new();
    };

    let mut reader = BufReader::new(pipe);
    let mut captured = Vec::new();
    let mut line = Vec::new();
    loop {
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("stopped reading child output: {}", e);
                break;
            }
        }
        if echo {
            if to_stderr {
                let _ = std::io::stderr().write_all(&line);
            } else {
                let _ = std::io::stdout().write_all(&line);
            }
        }
        captured.append(&mut line);
    }
    String::from_utf8_lossy(&captured).into_owned()
}

/// Runner that records commands and replays scripted results
///
/// Commands without a scripted result succeed with empty output. Scripted
/// results are matched on the start of the displayed command line and
/// consumed in order.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    responses: Mutex<Vec<(String, VecDeque<CommandOutput>)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next command whose line starts with `prefix`
    pub fn respond(&self, prefix: impl Into<String>, output: CommandOutput) {
        let prefix = prefix.into();
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        match responses.iter_mut().find(|(p, _)| *p == prefix) {
            Some((_, queue)) => queue.push_back(output),
            None => responses.push((prefix, VecDeque::from([output]))),
        }
    }

    /// Every command line run so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::display).collect()
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(spec.clone());

        let line = spec.display();
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        let scripted = responses
            .iter_mut()
            .find(|(prefix, queue)| line.starts_with(prefix.as_str()) && !queue.is_empty())
            .and_then(|(_, queue)| queue.pop_front());

        Ok(scripted.unwrap_or_default())
    }
}
