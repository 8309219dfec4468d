//! Acquisition error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::exec::CommandError;

/// Errors that end an acquisition.
///
/// None of these are retried; a caller that cannot continue should report
/// the message and exit with [`AcquireError::exit_code`].
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The destination has the wrong shape (directory vs file, missing, ...).
    #[error("{0}")]
    Validation(String),

    /// The URL could not be parsed or matched no registered archive type.
    #[error("{0}")]
    UnrecognizedFormat(String),

    #[error("fetching {description}: {message}{}", stderr_suffix(.stderr))]
    Fetch {
        description: String,
        message: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("extraction failed: {message}")]
    Extraction {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("{operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

impl AcquireError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a failed fetch command.
    pub fn fetch(description: &str, err: CommandError) -> Self {
        let (exit_code, stderr) = match &err {
            CommandError::Failed {
                exit_code, stderr, ..
            } => (*exit_code, stderr.clone()),
            CommandError::Spawn { .. } | CommandError::Wait { .. } => (None, String::new()),
        };
        Self::Fetch {
            description: description.to_string(),
            message: err.summary(),
            exit_code,
            stderr,
        }
    }

    /// Wrap a failed extraction command.
    pub fn extraction(err: CommandError) -> Self {
        let exit_code = match &err {
            CommandError::Failed { exit_code, .. } => *exit_code,
            CommandError::Spawn { .. } | CommandError::Wait { .. } => None,
        };
        Self::Extraction {
            message: err.to_string(),
            exit_code,
        }
    }

    /// Process exit status for this error: the tool's own exit code when a
    /// tool failed with one, otherwise 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Fetch {
                exit_code: Some(code),
                ..
            }
            | Self::Extraction {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AcquireError>;
