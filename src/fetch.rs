//! Network retrieval through `curl`
//!
//! curl's own `--retry` handles transient failures; nothing here retries or
//! imposes a timeout.

use std::path::Path;

use crate::core::error::{AcquireError, Result};
use crate::core::progress::ProgressGuard;
use crate::exec::{Attribution, CommandLine, CommandRunner};

/// Retry count handed to curl.
pub const RETRIES: u32 = 3;

fn curl() -> CommandLine {
    CommandLine::new("curl")
        .args(["--silent", "--fail", "--show-error", "--location", "--retry"])
        .arg(RETRIES.to_string())
}

/// curl writing the response body to `dest`.
pub fn curl_to_file(url: &str, dest: &Path) -> CommandLine {
    curl().arg("--output").arg(dest.to_string_lossy()).arg(url)
}

/// curl writing the response body to stdout.
pub fn curl_to_stdout(url: &str) -> CommandLine {
    curl().arg(url)
}

/// Download `url` to `dest`.
///
/// On failure whatever curl managed to write is removed, and the error
/// carries curl's exit code and stderr.
pub fn fetch_to_file<R: CommandRunner + ?Sized>(
    runner: &R,
    description: &str,
    url: &str,
    dest: &Path,
) -> Result<()> {
    let _progress = ProgressGuard::spinner(&format!("downloading {}", description));

    let cmd = curl_to_file(url, dest);
    if let Err(err) = runner.run(&cmd, Attribution::User) {
        let _ = std::fs::remove_file(dest);
        return Err(AcquireError::fetch(description, err));
    }
    Ok(())
}
