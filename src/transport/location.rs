//! URL scheme dispatch

use super::error::{TransportError, TransportResult};
use std::path::PathBuf;

/// Where a URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `file://` URL resolved to a filesystem path
    File(PathBuf),
    /// `http://` or `https://` URL
    Remote(String),
}

impl Location {
    pub fn parse(url: &str) -> TransportResult<Self> {
        if let Some(rest) = url.strip_prefix("file://") {
            // file:///tmp/x and file://localhost/tmp/x both mean /tmp/x
            return match rest.find('/') {
                Some(start) => Ok(Location::File(PathBuf::from(&rest[start..]))),
                None => Err(TransportError::InvalidUrl {
                    url: redact_url(url),
                }),
            };
        }

        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Location::Remote(url.to_string()));
        }

        Err(TransportError::InvalidUrl {
            url: redact_url(url),
        })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Location::File(_))
    }
}

/// Strip the query string (presigned credentials) from a URL for display
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?…", base),
        None => url.to_string(),
    }
}

/// Last path segment of a URL, ignoring any query string
pub fn last_path_segment(url: &str) -> Option<&str> {
    let without_query = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    let without_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    // The authority is not a path segment
    let path = without_scheme.split_once('/').map(|(_, p)| p)?;
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}
