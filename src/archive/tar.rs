//! Command lines for the system `tar`
//!
//! Every tar flavour can read the archive from stdin, which is what makes
//! streamed extraction possible.

use std::path::Path;

use super::params::ExtractionParams;
use crate::exec::CommandLine;

/// Build `tar x<mode>[f <source>] --directory <dest> [...]`.
///
/// With no `source` tar reads the archive from stdin.
fn command(
    mode: &str,
    source: Option<&Path>,
    dest: &Path,
    params: &ExtractionParams,
) -> CommandLine {
    let mut cmd = CommandLine::new("tar");
    cmd = match source {
        Some(src) => cmd
            .arg(format!("x{}f", mode))
            .arg(src.to_string_lossy()),
        None => cmd.arg(format!("x{}", mode)),
    };
    cmd = cmd.arg("--directory").arg(dest.to_string_lossy());
    if params.strip_components > 0 {
        cmd = cmd.arg(format!("--strip-components={}", params.strip_components));
    }
    if params.keep_directory_symlink {
        cmd = cmd.arg("--keep-directory-symlink");
    }
    if let Some(pattern) = &params.wildcards {
        cmd = cmd.arg("--wildcards").arg(pattern.as_str());
    }
    cmd
}

pub fn plain(source: Option<&Path>, dest: &Path, params: &ExtractionParams) -> CommandLine {
    command("", source, dest, params)
}

pub fn gzip(source: Option<&Path>, dest: &Path, params: &ExtractionParams) -> CommandLine {
    command("z", source, dest, params)
}

pub fn bzip2(source: Option<&Path>, dest: &Path, params: &ExtractionParams) -> CommandLine {
    command("j", source, dest, params)
}

pub fn xz(source: Option<&Path>, dest: &Path, params: &ExtractionParams) -> CommandLine {
    command("J", source, dest, params)
}

/// Legacy `compress(1)` archives (`.tar.Z`).
pub fn compress(source: Option<&Path>, dest: &Path, params: &ExtractionParams) -> CommandLine {
    command("Z", source, dest, params)
}
