//! Archive format dispatch
//!
//! The archive type of a download is decided from the file name in its URL,
//! before anything is fetched. Each [`ArchiveType`] knows whether it can be
//! fed from stdin and how it is extracted: either by a generated command line
//! for an external tool or by a routine that extracts directly.

pub mod params;
pub mod tar;
pub mod url;
pub mod zip;

use std::path::Path;

pub use params::{
    DxOption, ExtractionParams, keep_directory_symlink, strip_components, wildcards,
};

use crate::core::error::{AcquireError, Result};
use crate::exec::CommandLine;

/// Builds an extraction command line. `None` as the source means the archive
/// arrives on stdin.
pub type CommandLineBuilder = fn(Option<&Path>, &Path, &ExtractionParams) -> CommandLine;

/// Extracts an archive file directly.
pub type DirectRunner = fn(&Path, &Path, &ExtractionParams) -> Result<()>;

/// How an archive type is extracted.
#[derive(Clone, Copy)]
pub enum Extractor {
    CommandLine(CommandLineBuilder),
    Direct(DirectRunner),
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommandLine(_) => f.write_str("Extractor::CommandLine"),
            Self::Direct(_) => f.write_str("Extractor::Direct"),
        }
    }
}

/// Supported archive families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    TarZ,
    Zip,
}

impl ArchiveType {
    /// Every supported type, in matching order.
    pub const ALL: [ArchiveType; 6] = [
        Self::Tar,
        Self::TarGz,
        Self::TarBz2,
        Self::TarXz,
        Self::TarZ,
        Self::Zip,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Tar => ".tar",
            Self::TarGz => ".tar.gz",
            Self::TarBz2 => ".tar.bz2",
            Self::TarXz => ".tar.xz",
            Self::TarZ => ".tar.Z",
            Self::Zip => ".zip",
        }
    }

    /// Whether the extractor can take the archive on stdin.
    pub fn supports_stdin(self) -> bool {
        !matches!(self, Self::Zip)
    }

    pub fn extractor(self) -> Extractor {
        match self {
            Self::Tar => Extractor::CommandLine(tar::plain),
            Self::TarGz => Extractor::CommandLine(tar::gzip),
            Self::TarBz2 => Extractor::CommandLine(tar::bzip2),
            Self::TarXz => Extractor::CommandLine(tar::xz),
            Self::TarZ => Extractor::CommandLine(tar::compress),
            Self::Zip => Extractor::Direct(zip::extract),
        }
    }

    /// Whether the archive can be piped straight from the fetch into a
    /// command-line extractor.
    pub fn can_stream(self) -> bool {
        self.supports_stdin() && matches!(self.extractor(), Extractor::CommandLine(_))
    }
}

/// Determine the archive type of a download from its URL.
pub fn classify(url: &str) -> Result<ArchiveType> {
    let name = url::file_name(url)?;
    ArchiveType::ALL
        .into_iter()
        .find(|t| name.ends_with(t.extension()))
        .ok_or_else(|| {
            AcquireError::UnrecognizedFormat(format!(
                "unable to determine file archive type from {:?}",
                name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    #[test]
    fn test_extensions_are_unique() {
        let seen: HashSet<_> = ArchiveType::ALL.iter().map(|t| t.extension()).collect();
        assert_eq!(seen.len(), ArchiveType::ALL.len());
    }

    #[test]
    fn test_every_extension_classifies_to_itself() {
        for t in ArchiveType::ALL {
            let url = format!("https://web.site/foo{}", t.extension());
            assert_eq!(classify(&url).unwrap(), t, "{}", url);
        }
    }

    #[test]
    fn test_classify() {
        let cases: &[(&str, Option<ArchiveType>)] = &[
            ("", None),
            ("ht|tp:/invalid/url/foo.tar.gz", None),
            ("not a url", None),
            ("https://web.site/foo.tar", Some(ArchiveType::Tar)),
            ("https://web.site/foo.tar.gz", Some(ArchiveType::TarGz)),
            ("https://web.site/foo.tar.Z", Some(ArchiveType::TarZ)),
            ("https://web.site/foo.tar.bz2", Some(ArchiveType::TarBz2)),
            ("https://web.site/foo.tar.xz", Some(ArchiveType::TarXz)),
            ("https://web.site/foo.zip", Some(ArchiveType::Zip)),
            ("https://h/p/name.tar.gz?sig=abc", Some(ArchiveType::TarGz)),
            ("foo.tar.gz", Some(ArchiveType::TarGz)),
            ("https://web.site/foo", None),
            ("https://web.site/foo.foo", None),
            ("https://h/p/name", None),
        ];

        for (url, expected) in cases {
            match (classify(url), expected) {
                (Ok(t), Some(want)) => assert_eq!(t, *want, "{}", url),
                (Err(AcquireError::UnrecognizedFormat(_)), None) => {}
                (got, want) => panic!("{:?}: got {:?}, want {:?}", url, got, want),
            }
        }
    }

    #[test]
    fn test_streaming_support() {
        assert!(ArchiveType::TarXz.can_stream());
        assert!(!ArchiveType::Zip.can_stream());
        assert!(matches!(ArchiveType::Zip.extractor(), Extractor::Direct(_)));
    }

    fn command_line(
        extension: &str,
        source: &str,
        params: ExtractionParams,
    ) -> Vec<String> {
        let t = classify(extension).unwrap();
        let Extractor::CommandLine(build) = t.extractor() else {
            panic!("{} has no command line", extension);
        };
        let source = (!source.is_empty()).then(|| PathBuf::from(source));
        build(source.as_deref(), Path::new("/tmp"), &params).to_vec()
    }

    #[test]
    fn test_tar_command_lines() {
        let p = ExtractionParams::default;
        assert_eq!(command_line(".tar", "", p()), ["tar", "x", "--directory", "/tmp"]);
        assert_eq!(command_line(".tar.Z", "", p()), ["tar", "xZ", "--directory", "/tmp"]);
        assert_eq!(command_line(".tar.gz", "", p()), ["tar", "xz", "--directory", "/tmp"]);
        assert_eq!(command_line(".tar.bz2", "", p()), ["tar", "xj", "--directory", "/tmp"]);
        assert_eq!(command_line(".tar.xz", "", p()), ["tar", "xJ", "--directory", "/tmp"]);
        assert_eq!(
            command_line(".tar.xz", "file", p()),
            ["tar", "xJf", "file", "--directory", "/tmp"]
        );
    }

    #[test]
    fn test_tar_command_line_flag_order() {
        assert_eq!(
            command_line(
                ".tar.xz",
                "file",
                ExtractionParams {
                    keep_directory_symlink: true,
                    ..Default::default()
                }
            ),
            ["tar", "xJf", "file", "--directory", "/tmp", "--keep-directory-symlink"]
        );
        assert_eq!(
            command_line(
                ".tar.xz",
                "",
                ExtractionParams {
                    keep_directory_symlink: true,
                    strip_components: 20,
                    ..Default::default()
                }
            ),
            [
                "tar",
                "xJ",
                "--directory",
                "/tmp",
                "--strip-components=20",
                "--keep-directory-symlink"
            ]
        );
        assert_eq!(
            command_line(
                ".tar.xz",
                "",
                ExtractionParams {
                    wildcards: Some("*/foo".to_string()),
                    ..Default::default()
                }
            ),
            ["tar", "xJ", "--directory", "/tmp", "--wildcards", "*/foo"]
        );
    }
}
