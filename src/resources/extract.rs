//! Archive unpacking by file extension

use super::error::{ResourceError, ResourceResult};
use std::fs::File;
use std::path::Path;

/// Archive formats that can be unpacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
    TarBz2,
}

impl ArchiveKind {
    /// Detect from a file name; unknown extensions are not archives
    pub fn detect(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") {
            Some(ArchiveKind::TarBz2)
        } else if lower.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }
}

/// Unpack `archive` into `destination`
///
/// Blocking; callers on the async path run it via `spawn_blocking`.
pub fn extract_archive(archive: &Path, kind: ArchiveKind, destination: &Path) -> ResourceResult<()> {
    let file = File::open(archive).map_err(|source| ResourceError::Io {
        operation: "open",
        path: archive.to_path_buf(),
        source,
    })?;
    let failed = |message: String| ResourceError::Extract {
        path: archive.to_path_buf(),
        message,
    };

    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;
            zip.extract(destination).map_err(|e| failed(e.to_string()))
        }
        ArchiveKind::Tar => tar::Archive::new(file)
            .unpack(destination)
            .map_err(|e| failed(e.to_string())),
        ArchiveKind::TarGz => tar::Archive::new(flate2::read::GzDecoder::new(file))
            .unpack(destination)
            .map_err(|e| failed(e.to_string())),
        ArchiveKind::TarBz2 => tar::Archive::new(bzip2::read::BzDecoder::new(file))
            .unpack(destination)
            .map_err(|e| failed(e.to_string())),
    }
}
