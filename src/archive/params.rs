//! Extraction options
//!
//! Callers pass an ordered list of [`DxOption`]s; they are folded into one
//! [`ExtractionParams`] with later options overriding earlier ones.

/// A single download/extract option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DxOption {
    /// Drop this many leading path components from every member.
    StripComponents(usize),
    /// Keep existing symlinks to directories instead of replacing them.
    KeepDirectorySymlink,
    /// Only extract members matching this pattern (matched before stripping).
    Wildcards(String),
}

/// Strip the first `n` path components when extracting.
///
/// Extracting `gradle-5.2.3/bin/gradle` with `strip_components(1)` yields
/// `bin/gradle`.
pub fn strip_components(n: usize) -> DxOption {
    DxOption::StripComponents(n)
}

/// Preserve existing symlinks to directories during extraction.
pub fn keep_directory_symlink() -> DxOption {
    DxOption::KeepDirectorySymlink
}

/// Only extract members matching `pattern`.
pub fn wildcards(pattern: impl Into<String>) -> DxOption {
    DxOption::Wildcards(pattern.into())
}

/// Resolved extraction policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionParams {
    pub strip_components: usize,
    pub keep_directory_symlink: bool,
    pub wildcards: Option<String>,
}

impl ExtractionParams {
    pub fn from_options(options: &[DxOption]) -> Self {
        let mut params = Self::default();
        for option in options {
            params.apply(option);
        }
        params
    }

    pub fn apply(&mut self, option: &DxOption) {
        match option {
            DxOption::StripComponents(n) => self.strip_components = *n,
            DxOption::KeepDirectorySymlink => self.keep_directory_symlink = true,
            DxOption::Wildcards(pattern) if pattern.is_empty() => self.wildcards = None,
            DxOption::Wildcards(pattern) => self.wildcards = Some(pattern.clone()),
        }
    }
}
