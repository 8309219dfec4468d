//! Shared helpers for the acquisition integration tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use buildpack_acquire::{
    Attribution, CommandError, CommandLine, CommandOutput, CommandRunner, PipeFailure,
    SystemRunner,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// curl's exit code for an HTTP error status under `--fail`.
pub const CURL_HTTP_ERROR: i32 = 22;

/// A [`CommandRunner`] that serves `curl` from an in-memory URL table and
/// hands everything else (tar) to the real system.
///
/// Unknown URLs fail like `curl --fail` on a 404, after writing a few bytes
/// of partial output so cleanup can be observed.
#[derive(Default)]
pub struct FakeRunner {
    responses: HashMap<String, Vec<u8>>,
    commands: Mutex<Vec<Vec<String>>>,
    pipes: Mutex<Vec<(Vec<String>, Vec<String>)>>,
    scratch: Mutex<Option<tempfile::TempDir>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), body.into());
        self
    }

    /// Every command passed to `run`, in order.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands.lock().unwrap().clone()
    }

    /// Every (producer, consumer) pair passed to `pipe`.
    pub fn pipes(&self) -> Vec<(Vec<String>, Vec<String>)> {
        self.pipes.lock().unwrap().clone()
    }

    /// Number of times curl was asked for anything, by `run` or `pipe`.
    pub fn fetch_count(&self) -> usize {
        let runs = self
            .commands()
            .iter()
            .filter(|c| c[0] == "curl")
            .count();
        let pipes = self.pipes().iter().filter(|(p, _)| p[0] == "curl").count();
        runs + pipes
    }

    fn not_found(cmd: &CommandLine, attribution: Attribution) -> CommandError {
        CommandError::Failed {
            command: cmd.to_string(),
            attribution,
            exit_code: Some(CURL_HTTP_ERROR),
            stderr: "curl: (22) The requested URL returned error: 404".to_string(),
        }
    }

    /// Write the body for `url` into a scratch file that lives as long as
    /// the runner.
    fn stage_body(&self, body: &[u8]) -> PathBuf {
        let mut scratch = self.scratch.lock().unwrap();
        let dir = scratch.get_or_insert_with(|| tempfile::tempdir().unwrap());
        let path = tempfile::Builder::new()
            .prefix("body")
            .tempfile_in(dir.path())
            .unwrap()
            .into_temp_path()
            .keep()
            .unwrap();
        std::fs::write(&path, body).unwrap();
        path
    }
}

fn url_of(cmd: &CommandLine) -> String {
    cmd.get_args().last().cloned().unwrap_or_default()
}

fn output_of(cmd: &CommandLine) -> Option<PathBuf> {
    let args = cmd.get_args();
    args.iter()
        .position(|a| a == "--output")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

impl CommandRunner for FakeRunner {
    fn run(
        &self,
        cmd: &CommandLine,
        attribution: Attribution,
    ) -> Result<CommandOutput, CommandError> {
        self.commands.lock().unwrap().push(cmd.to_vec());

        if cmd.program() != "curl" {
            return SystemRunner.run(cmd, attribution);
        }

        let dest = output_of(cmd).expect("curl without --output in run()");
        match self.responses.get(&url_of(cmd)) {
            Some(body) => {
                std::fs::write(&dest, body).unwrap();
                Ok(CommandOutput::default())
            }
            None => {
                std::fs::write(&dest, b"<html>partial").unwrap();
                Err(Self::not_found(cmd, attribution))
            }
        }
    }

    fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
        attribution: Attribution,
    ) -> Result<(), PipeFailure> {
        self.pipes
            .lock()
            .unwrap()
            .push((producer.to_vec(), consumer.to_vec()));

        if producer.program() != "curl" {
            return SystemRunner.pipe(producer, consumer, attribution);
        }

        let Some(body) = self.responses.get(&url_of(producer)) else {
            return Err(PipeFailure::Producer(Self::not_found(producer, attribution)));
        };
        let staged = self.stage_body(body);
        let cat = CommandLine::new("cat").arg(staged.to_string_lossy());
        SystemRunner.pipe(&cat, consumer, attribution)
    }
}

/// Whether `program` can be found on PATH.
pub fn have_program(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}

/// Sorted relative paths of every regular file under `root`.
pub fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    files.sort();
    files
}
