//! Artifact acquisition and extraction for buildpacks
//!
//! Buildpacks pull toolchains and runtimes over the network while they
//! assemble an image. This crate downloads those artifacts, optionally keeps
//! them in a content-addressed cache that survives across builds, and
//! extracts archives into a layer directory.
//!
//! # Overview
//!
//! - [`Acquirer::download`] fetches one URL to a file.
//! - [`Acquirer::download_and_extract`] fetches an archive and unpacks it,
//!   through the cache, as a `curl | tar` pipe, or via a temporary file.
//!
//! Archive type comes from the URL's file name:
//!
//! | Suffix     | Extractor         | Streams |
//! |------------|-------------------|---------|
//! | `.tar`     | `tar x`           | yes     |
//! | `.tar.gz`  | `tar xz`          | yes     |
//! | `.tar.bz2` | `tar xj`          | yes     |
//! | `.tar.xz`  | `tar xJ`          | yes     |
//! | `.tar.Z`   | `tar xZ`          | yes     |
//! | `.zip`     | built in          | no      |
//!
//! # Configuration
//!
//! - `BUILDPACK_CACHE_DIR` - cache root; unset or empty disables caching
//! - `BUILDPACK_ID` - owner directory inside the cache

pub mod acquire;
pub mod archive;
pub mod cache;
pub mod core;
pub mod exec;
pub mod fetch;

pub use acquire::{Acquirer, CacheStats, Strategy, select_strategy};
pub use archive::{
    ArchiveType, DxOption, ExtractionParams, classify, keep_directory_symlink, strip_components,
    wildcards,
};
pub use cache::{ContentCache, cache_key, copy_file};
pub use crate::core::config::AcquireConfig;
pub use crate::core::error::{AcquireError, Result};
pub use crate::core::output;
pub use exec::{
    Attribution, CommandError, CommandLine, CommandOutput, CommandRunner, PipeFailure, SystemRunner,
};
