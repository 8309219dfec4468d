//! External process execution
//!
//! Fetching and tar extraction are delegated to system tools. Everything that
//! spawns a process goes through [`CommandRunner`] so the acquisition engine
//! can be driven by a fake in tests.

mod system;

pub use system::SystemRunner;

use std::fmt;
use thiserror::Error;

/// Who is to blame when a command fails.
///
/// Tool failures while fetching or unpacking a user-requested artifact are
/// attributed to the user (bad URL, corrupt archive); anything else is ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    User,
    System,
}

/// A program and its arguments, without any shell in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
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

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by its arguments.
    pub fn to_vec(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Renders the command the way it would be typed into a shell, quoting
/// words that contain spaces or glob characters.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in std::iter::once(&self.program)
            .chain(self.args.iter())
            .enumerate()
        {
            if i > 0 {
                f.write_str(" ")?;
            }
            if word.contains([' ', '?', '*']) {
                write!(f, "\"{}\"", word)?;
            } else {
                f.write_str(word)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {command} (exit code: {exit_code:?}){}", stderr_block(.stderr))]
    Failed {
        command: String,
        attribution: Attribution,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn stderr_block(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\nstderr: {}", stderr)
    }
}

impl CommandError {
    /// One-line description without the captured stderr.
    pub fn summary(&self) -> String {
        match self {
            Self::Failed {
                command, exit_code, ..
            } => match exit_code {
                Some(code) => format!("{} exited with code {}", command, code),
                None => format!("{} was terminated by a signal", command),
            },
            other => other.to_string(),
        }
    }
}

/// Which side of a pipe failed.
#[derive(Error, Debug)]
pub enum PipeFailure {
    #[error(transparent)]
    Producer(CommandError),

    #[error(transparent)]
    Consumer(CommandError),
}

/// Runs external commands on behalf of the acquisition engine.
pub trait CommandRunner {
    /// Run one process to completion, capturing its output. A non-zero exit
    /// is an error carrying the exit code and stderr.
    fn run(&self, cmd: &CommandLine, attribution: Attribution)
    -> Result<CommandOutput, CommandError>;

    /// Run `producer` and `consumer` concurrently with the producer's stdout
    /// connected to the consumer's stdin. Returns once both have exited.
    fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
        attribution: Attribution,
    ) -> Result<(), PipeFailure>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        cmd: &CommandLine,
        attribution: Attribution,
    ) -> Result<CommandOutput, CommandError> {
        (**self).run(cmd, attribution)
    }

    fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
        attribution: Attribution,
    ) -> Result<(), PipeFailure> {
        (**self).pipe(producer, consumer, attribution)
    }
}
