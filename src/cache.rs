//! Content-addressed download cache
//!
//! Entries live at `<root>/downloads/<owner>/<sha256(url)>`, where the key is
//! the hex SHA-256 of the URL exactly as given. Two spellings of the same
//! resource are two entries.
//!
//! Entries are written to a staging file next to their final location and
//! renamed into place only once complete, so a reader never sees a partial
//! entry. Concurrent builds sharing the cache may both fetch the same URL;
//! the last rename wins and both results are whole.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::core::config::AcquireConfig;
use crate::core::error::{AcquireError, Result};

const DOWNLOADS_DIR: &str = "downloads";

/// Prefix of in-flight staging files; never a valid key.
const STAGING_PREFIX: &str = ".staging-";

/// Cache key for a URL: hex SHA-256 of its raw bytes.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
    owner: String,
}

impl ContentCache {
    pub fn new(root: impl Into<PathBuf>, owner: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            owner: owner.into(),
        }
    }

    /// The cache described by `config`, or `None` when caching is disabled.
    pub fn from_config(config: &AcquireConfig) -> Option<Self> {
        config
            .cache_root()
            .map(|root| Self::new(root, config.owner()))
    }

    /// Directory holding this owner's entries.
    pub fn owner_dir(&self) -> PathBuf {
        self.root.join(DOWNLOADS_DIR).join(&self.owner)
    }

    /// Where the entry for `url` lives (whether or not it exists yet).
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.owner_dir().join(cache_key(url))
    }

    /// Path of the complete entry for `url`, if there is one.
    pub fn lookup(&self, url: &str) -> Option<PathBuf> {
        let path = self.entry_path(url);
        path.is_file().then_some(path)
    }

    /// Create an entry for `url` by letting `write` fill a staging file.
    ///
    /// The staging file is renamed to the entry path only if `write`
    /// succeeds; on failure it is deleted and no entry exists afterwards.
    pub fn populate<F>(&self, url: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let dir = self.owner_dir();
        std::fs::create_dir_all(&dir).map_err(|e| AcquireError::io("creating", &dir, e))?;

        // TempPath deletes the file on drop, which covers every early return.
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&dir)
            .map_err(|e| AcquireError::io("creating staging file in", &dir, e))?
            .into_temp_path();

        write(&staging)?;

        // Staging files are created 0600; entries are ordinary downloads.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o644))
                .map_err(|e| AcquireError::io("setting permissions on", &staging, e))?;
        }

        let entry = self.entry_path(url);
        staging
            .persist(&entry)
            .map_err(|e| AcquireError::io("committing cache entry", &entry, e.error))?;
        Ok(entry)
    }

    /// Copy an existing file into the cache as the entry for `url`.
    pub fn put(&self, url: &str, source: &Path) -> Result<PathBuf> {
        self.populate(url, |staging| {
            std::fs::copy(source, staging)
                .map(|_| ())
                .map_err(|e| AcquireError::io("copying into cache", source, e))
        })
    }

    /// Copy the entry for `url` to `dest`. Returns `false` on a miss.
    pub fn copy_out(&self, url: &str, dest: &Path) -> Result<bool> {
        match self.lookup(url) {
            Some(entry) => {
                copy_file(&entry, dest)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Copy `src` to `dest` as a full, independent copy.
///
/// `src` must be a regular file and `dest` must not be a directory; `dest`
/// names the copy itself, not a directory to put it in.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    match std::fs::metadata(src) {
        Ok(md) if md.is_file() => {}
        Ok(_) => {
            return Err(AcquireError::validation(format!(
                "could not copy {:?}: is not a file",
                src
            )));
        }
        Err(e) => return Err(AcquireError::io("could not copy", src, e)),
    }

    match std::fs::metadata(dest) {
        Ok(md) if md.is_dir() => {
            return Err(AcquireError::validation(format!(
                "could not copy to {:?}: is a directory",
                dest
            )));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(AcquireError::io("could not copy to", dest, e)),
    }

    std::fs::copy(src, dest)
        .map(|_| ())
        .map_err(|e| AcquireError::io("could not copy into", dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_sha256_of_raw_url() {
        // SHA256 of "hello world"
        assert_eq!(
            cache_key("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_ne!(
            cache_key("https://example.com/a.tar.gz"),
            cache_key("https://example.com/./a.tar.gz")
        );
    }

    #[test]
    fn test_entry_layout() {
        let cache = ContentCache::new("/cache", "google.go.runtime");
        let url = "https://example.com/go.tar.gz";
        assert_eq!(
            cache.entry_path(url),
            PathBuf::from("/cache/downloads/google.go.runtime").join(cache_key(url))
        );
    }

    #[test]
    fn test_from_config_disabled() {
        assert!(ContentCache::from_config(&AcquireConfig::new("owner")).is_none());
        let config = AcquireConfig::new("owner").with_cache_root(Some(PathBuf::from("/c")));
        let cache = ContentCache::from_config(&config).unwrap();
        assert_eq!(cache.owner_dir(), PathBuf::from("/c/downloads/owner"));
    }

    #[test]
    fn test_populate_then_lookup() {
        let root = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(root.path(), "owner");
        let url = "https://example.com/a.zip";

        assert!(cache.lookup(url).is_none());
        let entry = cache
            .populate(url, |staging| {
                std::fs::write(staging, b"payload").map_err(|e| AcquireError::io("w", staging, e))
            })
            .unwrap();

        assert_eq!(cache.lookup(url), Some(entry.clone()));
        assert_eq!(std::fs::read(entry).unwrap(), b"payload");
    }

    #[test]
    fn test_failed_populate_leaves_nothing() {
        let root = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(root.path(), "owner");
        let url = "https://example.com/a.zip";

        let result = cache.populate(url, |staging| {
            std::fs::write(staging, b"half").unwrap();
            Err(AcquireError::validation("transfer interrupted"))
        });

        assert!(result.is_err());
        assert!(cache.lookup(url).is_none());
        let leftovers: Vec<_> = std::fs::read_dir(cache.owner_dir()).unwrap().collect();
        assert!(leftovers.is_empty(), "staging file left behind");
    }

    #[test]
    fn test_put_and_copy_out_are_independent_copies() {
        let root = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(root.path(), "owner");
        let url = "https://example.com/tool";

        let source = root.path().join("source");
        std::fs::write(&source, b"v1").unwrap();
        cache.put(url, &source).unwrap();

        let dest = root.path().join("dest");
        assert!(cache.copy_out(url, &dest).unwrap());
        std::fs::write(&dest, b"changed").unwrap();

        assert_eq!(std::fs::read(cache.lookup(url).unwrap()).unwrap(), b"v1");
        assert!(!cache.copy_out("https://example.com/other", &dest).unwrap());
    }

    #[test]
    fn test_copy_file_rejects_directory_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::write(&src, b"x").unwrap();

        let err = copy_file(&src, dir.path()).unwrap_err();
        assert!(err.to_string().contains("is a directory"));
    }

    #[test]
    fn test_copy_file_rejects_non_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_file(dir.path(), &dir.path().join("dest")).unwrap_err();
        assert!(err.to_string().contains("is not a file"));

        let err = copy_file(&dir.path().join("missing"), &dir.path().join("dest")).unwrap_err();
        assert!(matches!(err, AcquireError::Io { .. }));
    }

    #[test]
    fn test_copy_file_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::fs::write(&src, b"new").unwrap();
        std::fs::write(&dest, b"old contents").unwrap();

        copy_file(&src, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }
}
