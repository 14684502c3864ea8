//! Synchronous git subprocess execution.
//!
//! Every operation reaches git through [`CommandRunner`], so orchestration code
//! never touches `std::process` directly and tests can script git's answers.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use thiserror::Error;
use tracing::{debug, instrument};

/// Prefix carried by every [`CommandError`] message.
pub const FAILURE_MARKER: &str = "external command failed:";

/// A git sub-command, kept as a discrete argument vector.
///
/// Arguments are handed to the child process as-is and never pass through a
/// shell, so branch names and commit messages cannot smuggle in extra commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
    summary: String,
}

impl GitCommand {
    /// Build a command from raw arguments; the summary is the space-joined args.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let summary = args.join(" ");
        Self { args, summary }
    }

    pub fn init() -> Self {
        Self::new(["init"])
    }

    pub fn add(path: &str) -> Self {
        Self::new(["add", path])
    }

    /// `add .`
    pub fn add_all() -> Self {
        Self::new(["add", "."])
    }

    /// `commit -m "<message>"`. The message is passed verbatim, even when empty.
    pub fn commit(message: &str) -> Self {
        Self {
            args: vec!["commit".to_string(), "-m".to_string(), message.to_string()],
            summary: format!("commit -m \"{message}\""),
        }
    }

    pub fn checkout_new_branch(name: &str) -> Self {
        Self::new(["checkout", "-b", name])
    }

    pub fn show_current_branch() -> Self {
        Self::new(["branch", "--show-current"])
    }

    pub fn push(remote: &str, branch: &str) -> Self {
        Self::new(["push", remote, branch])
    }

    pub fn status() -> Self {
        Self::new(["status"])
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The command line as recorded in history (without the `git` prefix).
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Failure of a single git invocation.
///
/// The message always starts with [`FAILURE_MARKER`] and ends with git's own
/// diagnostic, untouched.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("external command failed: git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("external command failed: git {command}: {message}")]
    Exit {
        command: String,
        code: Option<i32>,
        message: String,
    },
}

impl CommandError {
    /// The summary of the command that failed.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. } | CommandError::Exit { command, .. } => command,
        }
    }
}

/// Runs one git sub-command to completion.
///
/// `Ok` carries stdout with trailing whitespace trimmed. Implementations must
/// not retry: whether a git command is safe to repeat is not ours to judge.
pub trait CommandRunner {
    fn run(&self, command: &GitCommand) -> Result<String, CommandError>;
}

/// Runner that spawns the real git executable in a working directory.
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: String,
    workdir: PathBuf,
}

impl GitRunner {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }
}

impl CommandRunner for GitRunner {
    #[instrument(skip_all, fields(command = %command))]
    fn run(&self, command: &GitCommand) -> Result<String, CommandError> {
        debug!(program = %self.program, workdir = %self.workdir.display(), "spawning git");
        // stdin stays attached so git can ask for credentials on push.
        let output = Command::new(&self.program)
            .args(command.args())
            .current_dir(&self.workdir)
            .stdin(Stdio::inherit())
            .output()
            .map_err(|source| {
                debug!(err = %source, "failed to spawn git");
                CommandError::Spawn {
                    command: command.summary().to_string(),
                    source,
                }
            })?;
        interpret_output(command, output)
    }
}

fn interpret_output(command: &GitCommand, output: Output) -> Result<String, CommandError> {
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(exit_code = ?output.status.code(), "git finished");
        return Ok(stdout.trim_end().to_string());
    }
    debug!(exit_code = ?output.status.code(), "git failed");
    Err(CommandError::Exit {
        command: command.summary().to_string(),
        code: output.status.code(),
        message: diagnostic(&output),
    })
}

/// Pick the text that explains a failure: stderr, else stdout (git reports
/// "nothing to commit" there), else the bare exit status.
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }
    match output.status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
