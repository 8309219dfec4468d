//! Choosing how a download-and-extract runs

use crate::archive::ArchiveType;

/// Execution strategy for [`Acquirer::download_and_extract`].
///
/// [`Acquirer::download_and_extract`]: super::Acquirer::download_and_extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Make sure the archive is in the cache, then extract from the entry.
    Cached,
    /// Pipe the fetch straight into the extractor; nothing touches disk.
    Streamed,
    /// Fetch to a temporary file in the destination, extract, delete it.
    TempFile,
}

pub fn select_strategy(caching_enabled: bool, archive_type: ArchiveType) -> Strategy {
    if caching_enabled {
        Strategy::Cached
    } else if archive_type.can_stream() {
        Strategy::Streamed
    } else {
        Strategy::TempFile
    }
}
