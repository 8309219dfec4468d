//! [`CommandRunner`] backed by real child processes

use std::process::{Command, Output, Stdio};

use super::{Attribution, CommandError, CommandLine, CommandOutput, CommandRunner, PipeFailure};

/// Spawns commands with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

fn build_command(cmd: &CommandLine) -> Command {
    let mut command = Command::new(cmd.program());
    command.args(cmd.get_args());
    command
}

fn check_status(
    cmd: &CommandLine,
    output: &Output,
    attribution: Attribution,
) -> Result<(), CommandError> {
    if output.status.success() {
        return Ok(());
    }
    Err(CommandError::Failed {
        command: cmd.to_string(),
        attribution,
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// curl's exit code for "failure writing output to destination". curl
/// ignores SIGPIPE and exits with this instead.
const CURL_WRITE_ERROR: i32 = 23;

/// Whether a pipe producer failed because its reader went away: killed by a
/// signal (SIGPIPE) or exited with curl's write error.
fn lost_its_reader(output: &Output) -> bool {
    match output.status.code() {
        None => true,
        Some(code) => code == CURL_WRITE_ERROR,
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        cmd: &CommandLine,
        attribution: Attribution,
    ) -> Result<CommandOutput, CommandError> {
        let output = build_command(cmd)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        check_status(cmd, &output, attribution)?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(0),
        })
    }

    fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
        attribution: Attribution,
    ) -> Result<(), PipeFailure> {
        let mut producer_child = build_command(producer)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                PipeFailure::Producer(CommandError::Spawn {
                    command: producer.to_string(),
                    source,
                })
            })?;

        let Some(producer_stdout) = producer_child.stdout.take() else {
            let _ = producer_child.kill();
            let _ = producer_child.wait();
            return Err(PipeFailure::Producer(CommandError::Spawn {
                command: producer.to_string(),
                source: std::io::Error::other("stdout was not captured"),
            }));
        };

        // The Command (and with it our copy of the pipe) is dropped at the end
        // of this statement, so the producer sees EPIPE once the consumer exits.
        let consumer_child = match build_command(consumer)
            .stdin(Stdio::from(producer_stdout))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                let _ = producer_child.kill();
                let _ = producer_child.wait();
                return Err(PipeFailure::Consumer(CommandError::Spawn {
                    command: consumer.to_string(),
                    source,
                }));
            }
        };

        // Drain both children at once; waiting on one while the other's
        // stderr pipe fills up would deadlock.
        let (producer_result, consumer_result) = std::thread::scope(|s| {
            let producer_wait = s.spawn(move || producer_child.wait_with_output());
            let consumer_result = consumer_child.wait_with_output();
            let producer_result = producer_wait
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("wait thread panicked")));
            (producer_result, consumer_result)
        });

        let producer_output = producer_result.map_err(|source| {
            PipeFailure::Producer(CommandError::Wait {
                command: producer.to_string(),
                source,
            })
        })?;
        let consumer_output = consumer_result.map_err(|source| {
            PipeFailure::Consumer(CommandError::Wait {
                command: consumer.to_string(),
                source,
            })
        })?;

        // A producer that died writing into a pipe the consumer had already
        // closed is a symptom; the consumer's failure is the real story.
        if !consumer_output.status.success() && lost_its_reader(&producer_output) {
            return check_status(consumer, &consumer_output, attribution)
                .map_err(PipeFailure::Consumer);
        }
        check_status(producer, &producer_output, attribution).map_err(PipeFailure::Producer)?;
        check_status(consumer, &consumer_output, attribution).map_err(PipeFailure::Consumer)
    }
}
