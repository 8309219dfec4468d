//! File name extraction from download URLs

use crate::core::error::{AcquireError, Result};

/// Return the final path segment of `url`, ignoring query and fragment.
///
/// Plain relative names (`foo.tar.gz`) are accepted. A scheme, when present,
/// must be well formed.
pub fn file_name(url: &str) -> Result<&str> {
    let rest = match scheme_split(url) {
        Some((scheme, rest)) => {
            if !is_valid_scheme(scheme) {
                return Err(AcquireError::UnrecognizedFormat(format!(
                    "invalid URL {:?}: malformed scheme {:?}",
                    url, scheme
                )));
            }
            rest
        }
        None => url,
    };

    let rest = rest.split('#').next().unwrap_or(rest);
    let rest = rest.split('?').next().unwrap_or(rest);

    // Drop the authority of "//host/path" so a bare host is never taken for
    // a file name.
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map_or("", |i| &authority_and_path[i..]),
        None => rest,
    };

    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(AcquireError::UnrecognizedFormat(format!(
            "unable to determine local file name from {:?}",
            url
        )));
    }
    Ok(name)
}

/// Split off a scheme if a ':' appears before any path, query or fragment.
fn scheme_split(url: &str) -> Option<(&str, &str)> {
    let colon = url.find(':')?;
    if url[..colon].contains(['/', '?', '#']) {
        return None;
    }
    Some((&url[..colon], &url[colon + 1..]))
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
