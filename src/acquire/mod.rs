//! Download and download-and-extract
//!
//! [`Acquirer`] ties the pieces together: it validates the destination,
//! classifies the archive, consults the [`ContentCache`] when one is
//! configured and runs fetch and extraction through its [`CommandRunner`].
//!
//! ## Example
//!
//! ```no_run
//! use buildpack_acquire::{Acquirer, AcquireConfig, strip_components};
//! use std::path::Path;
//!
//! let mut acquirer = Acquirer::new(&AcquireConfig::from_env());
//! acquirer.download_and_extract(
//!     "Gradle 8.5",
//!     "https://services.gradle.org/distributions/gradle-8.5-bin.zip",
//!     Path::new("/layers/gradle"),
//!     &[strip_components(1)],
//! )?;
//! # Ok::<(), buildpack_acquire::AcquireError>(())
//! ```

mod strategy;

pub use strategy::{Strategy, select_strategy};

use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveType, DxOption, ExtractionParams, Extractor};
use crate::cache::{ContentCache, copy_file};
use crate::core::config::AcquireConfig;
use crate::core::error::{AcquireError, Result};
use crate::core::output;
use crate::core::progress::ProgressGuard;
use crate::exec::{Attribution, CommandRunner, PipeFailure, SystemRunner};
use crate::fetch;

/// Cache hits and misses observed by one [`Acquirer`], by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    hits: Vec<String>,
    misses: Vec<String>,
}

impl CacheStats {
    pub fn hits(&self) -> &[String] {
        &self.hits
    }

    pub fn misses(&self) -> &[String] {
        &self.misses
    }

    fn record_hit(&mut self, url: &str) {
        output::detail(&format!("cache hit: {}", url));
        self.hits.push(url.to_string());
    }

    fn record_miss(&mut self, url: &str) {
        output::detail(&format!("cache miss: {}", url));
        self.misses.push(url.to_string());
    }
}

pub struct Acquirer<R = SystemRunner> {
    runner: R,
    cache: Option<ContentCache>,
    stats: CacheStats,
}

impl Acquirer<SystemRunner> {
    pub fn new(config: &AcquireConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }

    /// Acquirer configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(&AcquireConfig::from_env())
    }
}

impl<R: CommandRunner> Acquirer<R> {
    pub fn with_runner(config: &AcquireConfig, runner: R) -> Self {
        Self {
            runner,
            cache: ContentCache::from_config(config),
            stats: CacheStats::default(),
        }
    }

    pub fn cache(&self) -> Option<&ContentCache> {
        self.cache.as_ref()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Download `url` to the file `dest`, going through the cache when one
    /// is configured.
    ///
    /// `dest` must not exist or be a regular file; its parent must exist.
    /// Extraction options have no effect on a plain download.
    pub fn download(
        &mut self,
        description: &str,
        url: &str,
        dest: &Path,
        _options: &[DxOption],
    ) -> Result<()> {
        validate_file_destination(dest)?;
        output::action(&format!("Fetching {}", description));

        match &self.cache {
            Some(cache) => {
                let entry = cached_entry(&self.runner, cache, &mut self.stats, description, url)?;
                copy_file(&entry, dest)
            }
            None => fetch::fetch_to_file(&self.runner, description, url, dest),
        }
    }

    /// Download the archive at `url` and extract it into the existing
    /// directory `dest_dir`.
    ///
    /// On failure `dest_dir` may be partially populated; discarding it is up
    /// to the caller. The cache is never left with a partial entry.
    pub fn download_and_extract(
        &mut self,
        description: &str,
        url: &str,
        dest_dir: &Path,
        options: &[DxOption],
    ) -> Result<()> {
        validate_directory_destination(dest_dir)?;
        let archive_type = archive::classify(url)?;
        let params = ExtractionParams::from_options(options);
        let strategy = select_strategy(self.cache.is_some(), archive_type);

        output::action(&format!("Fetching {}", description));

        match strategy {
            Strategy::Cached => {
                let Some(cache) = &self.cache else {
                    return Err(AcquireError::validation(
                        "cached extraction selected without a cache",
                    ));
                };
                let entry = cached_entry(&self.runner, cache, &mut self.stats, description, url)?;
                self.extract_file(archive_type, &entry, dest_dir, &params)
            }
            Strategy::Streamed => {
                self.extract_streamed(description, url, archive_type, dest_dir, &params)
            }
            Strategy::TempFile => {
                // Deleted on drop, after extraction or on the first error.
                let archive_path = tempfile::Builder::new()
                    .prefix(".download-")
                    .suffix(archive_type.extension())
                    .tempfile_in(dest_dir)
                    .map_err(|e| AcquireError::io("creating temporary file in", dest_dir, e))?
                    .into_temp_path();

                fetch::fetch_to_file(&self.runner, description, url, &archive_path)?;
                self.extract_file(archive_type, &archive_path, dest_dir, &params)
            }
        }
    }

    fn extract_file(
        &self,
        archive_type: ArchiveType,
        archive_path: &Path,
        dest_dir: &Path,
        params: &ExtractionParams,
    ) -> Result<()> {
        let _progress = ProgressGuard::spinner(&format!("extracting to {}", dest_dir.display()));

        match archive_type.extractor() {
            Extractor::CommandLine(build) => {
                let cmd = build(Some(archive_path), dest_dir, params);
                self.runner
                    .run(&cmd, Attribution::User)
                    .map(|_| ())
                    .map_err(AcquireError::extraction)
            }
            Extractor::Direct(extract) => extract(archive_path, dest_dir, params),
        }
    }

    fn extract_streamed(
        &self,
        description: &str,
        url: &str,
        archive_type: ArchiveType,
        dest_dir: &Path,
        params: &ExtractionParams,
    ) -> Result<()> {
        let Extractor::CommandLine(build) = archive_type.extractor() else {
            return Err(AcquireError::Extraction {
                message: format!("{:?} archives cannot be extracted from a stream", archive_type),
                exit_code: None,
            });
        };

        let _progress = ProgressGuard::spinner(&format!("downloading {}", description));
        let fetch = fetch::curl_to_stdout(url);
        let extract = build(None, dest_dir, params);

        self.runner
            .pipe(&fetch, &extract, Attribution::User)
            .map_err(|failure| match failure {
                PipeFailure::Producer(err) => AcquireError::fetch(description, err),
                PipeFailure::Consumer(err) => AcquireError::extraction(err),
            })
    }
}

/// Return the cache entry for `url`, fetching it on a miss.
fn cached_entry<R: CommandRunner>(
    runner: &R,
    cache: &ContentCache,
    stats: &mut CacheStats,
    description: &str,
    url: &str,
) -> Result<PathBuf> {
    if let Some(entry) = cache.lookup(url) {
        stats.record_hit(url);
        return Ok(entry);
    }

    stats.record_miss(url);
    cache.populate(url, |staging| {
        fetch::fetch_to_file(runner, description, url, staging)
    })
}

/// A download target must be absent or a regular file.
fn validate_file_destination(dest: &Path) -> Result<()> {
    match std::fs::metadata(dest) {
        Ok(md) if md.is_file() => Ok(()),
        Ok(_) => Err(AcquireError::validation(format!("{:?} is not a file", dest))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AcquireError::validation(format!(
            "could not access {:?}: {}",
            dest, e
        ))),
    }
}

/// An extraction target must be an existing directory.
fn validate_directory_destination(dest_dir: &Path) -> Result<()> {
    match std::fs::metadata(dest_dir) {
        Ok(md) if md.is_dir() => Ok(()),
        Ok(_) => Err(AcquireError::validation(format!(
            "location {:?} not a directory",
            dest_dir
        ))),
        Err(e) => Err(AcquireError::validation(format!(
            "cannot access {:?}: {}",
            dest_dir, e
        ))),
    }
}
