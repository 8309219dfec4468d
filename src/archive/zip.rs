//! Direct zip extraction
//!
//! Zip archives need random access, so they are always on disk before we get
//! here and cannot be streamed. The format has no notion of stripping path
//! components: with `strip_components > 0` the archive is unpacked into a
//! private staging directory inside the destination and the entries found at
//! the requested depth are renamed into place.

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::params::ExtractionParams;
use crate::core::error::{AcquireError, Result};
use crate::core::output;

#[cfg(unix)]
const UNIX_FILE_TYPE_MASK: u32 = 0o170000;
#[cfg(unix)]
const UNIX_SYMLINK: u32 = 0o120000;

/// Entries found while walking a staging tree to a fixed depth.
#[derive(Debug, Default)]
pub struct DepthWalk {
    /// Paths sitting exactly at the requested depth.
    pub at_depth: Vec<PathBuf>,
    /// Non-directories found above the requested depth, relative to the
    /// walk root.
    pub shallow: Vec<PathBuf>,
}

/// Extract `source` into `dest`. `keep_directory_symlink` has no meaning for
/// zip and is ignored.
pub fn extract(source: &Path, dest: &Path, params: &ExtractionParams) -> Result<()> {
    let filter = params
        .wildcards
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .map_err(|e| AcquireError::Extraction {
            message: format!("invalid wildcard pattern: {}", e),
            exit_code: None,
        })?;

    if params.strip_components == 0 {
        return unpack(source, dest, filter.as_ref());
    }

    // Removed when dropped, whichever way we leave this function.
    let staging = tempfile::Builder::new()
        .prefix("zip")
        .tempdir_in(dest)
        .map_err(|e| AcquireError::io("creating archive extraction directory in", dest, e))?;

    unpack(source, staging.path(), filter.as_ref())?;

    let walk = walk_to_depth(staging.path(), params.strip_components)?;
    for shallow in &walk.shallow {
        let remaining = params
            .strip_components
            .saturating_sub(shallow.components().count());
        output::warning(&format!(
            "walk: unexpected file {:?} with remaining depth {}",
            shallow, remaining
        ));
    }
    for path in &walk.at_depth {
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);
        std::fs::rename(path, &target).map_err(|e| AcquireError::io("moving into", &target, e))?;
    }

    Ok(())
}

/// Walk `root` down `depth` directory levels and collect what sits there.
///
/// With `depth == 0` that is the direct children of `root`; each extra level
/// descends one directory further. Non-directories met on the way cannot be
/// stripped that far and are reported in [`DepthWalk::shallow`].
pub fn walk_to_depth(root: &Path, depth: usize) -> Result<DepthWalk> {
    let mut walk = DepthWalk::default();
    let target = depth + 1;
    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(target)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            AcquireError::io("reading directory", path, e.into())
        })?;

        if entry.depth() == target {
            walk.at_depth.push(entry.into_path());
        } else if !entry.file_type().is_dir() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            walk.shallow.push(relative);
        }
    }

    Ok(walk)
}

fn extraction_error(message: String) -> AcquireError {
    AcquireError::Extraction {
        message,
        exit_code: None,
    }
}

/// Resolve `.` and `..` without touching the filesystem.
#[cfg(unix)]
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Reject `full_path` if any part of it that already exists under `dest`
/// is a symlink.
fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<()> {
    let rel = full_path.strip_prefix(dest).map_err(|_| {
        extraction_error(format!(
            "zip contains path outside destination: {}",
            full_path.display()
        ))
    })?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(extraction_error(format!(
                "zip extraction blocked: symlink in path component: {}",
                cur.display()
            )));
        }
    }

    Ok(())
}

/// Symlink targets must be relative and resolve inside `dest`.
#[cfg(unix)]
fn ensure_link_target_within_dest(dest: &Path, link_parent: &Path, target: &Path) -> Result<()> {
    if target.has_root() {
        return Err(extraction_error(format!(
            "zip contains unsafe link target (absolute): {}",
            target.display()
        )));
    }

    let candidate = normalize_lexical(&link_parent.join(target));
    if !candidate.starts_with(normalize_lexical(dest)) {
        return Err(extraction_error(format!(
            "zip contains unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            target.display()
        )));
    }

    Ok(())
}

/// Unpack every (matching) member of the archive under `dest`.
fn unpack(archive_path: &Path, dest: &Path, filter: Option<&glob::Pattern>) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| AcquireError::io("opening", archive_path, e))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        extraction_error(format!("{}: zip read error: {}", archive_path.display(), e))
    })?;

    for i in 0..archive.len() {
        let mut member = archive
            .by_index(i)
            .map_err(|e| extraction_error(format!("zip entry error: {}", e)))?;

        if let Some(pattern) = filter
            && !pattern.matches(member.name())
        {
            continue;
        }

        // Absolute or `..` member names never leave `dest`.
        let Some(relative) = member.enclosed_name() else {
            output::warning(&format!("skipping unsafe zip member {:?}", member.name()));
            continue;
        };
        let outpath = dest.join(relative);

        // An earlier symlink member could redirect this one out of `dest`.
        ensure_no_symlink_components(dest, &outpath)?;

        if member.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| AcquireError::io("creating directory", &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AcquireError::io("creating directory", parent, e))?;
        }

        #[cfg(unix)]
        {
            if let Some(mode) = member.unix_mode()
                && mode & UNIX_FILE_TYPE_MASK == UNIX_SYMLINK
            {
                let mut target = String::new();
                std::io::Read::read_to_string(&mut member, &mut target)
                    .map_err(|e| AcquireError::io("reading symlink member for", &outpath, e))?;
                let link_parent = outpath.parent().unwrap_or(dest);
                ensure_link_target_within_dest(dest, link_parent, Path::new(&target))?;
                std::os::unix::fs::symlink(&target, &outpath)
                    .map_err(|e| AcquireError::io("creating symlink", &outpath, e))?;
                continue;
            }
        }

        let mut outfile =
            File::create(&outpath).map_err(|e| AcquireError::io("creating", &outpath, e))?;
        std::io::copy(&mut member, &mut outfile)
            .map_err(|e| AcquireError::io("writing", &outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = member.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode & 0o7777))
                    .map_err(|e| AcquireError::io("setting permissions on", &outpath, e))?;
            }
        }
    }

    Ok(())
}
