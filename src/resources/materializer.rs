//! Download, verify and unpack declared resources

use super::error::{ResourceError, ResourceResult};
use super::extract::{extract_archive, ArchiveKind};
use super::manifest::ResourceSpec;
use crate::transport::Transport;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Materializes resources into one directory, in manifest order
#[derive(Debug)]
pub struct ResourceMaterializer<'a> {
    transport: &'a Transport,
    destination: PathBuf,
    timeout: Duration,
}

impl<'a> ResourceMaterializer<'a> {
    pub fn new(transport: &'a Transport, destination: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            transport,
            destination: destination.into(),
            timeout,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Materialize every resource sequentially; the first failure stops the rest
    pub async fn materialize_all(&self, specs: &[ResourceSpec]) -> ResourceResult<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(specs.len());
        for spec in specs {
            paths.push(self.materialize(spec).await?);
        }
        Ok(paths)
    }

    /// Download one resource, check its checksum, unpack it if asked
    pub async fn materialize(&self, spec: &ResourceSpec) -> ResourceResult<PathBuf> {
        let dest = self.destination.join(spec.destination_name());
        log::info!("Fetching resource {} -> {}", spec.label(), dest.display());

        let digest = self.download(spec, &dest).await?;

        if let Some(expected) = spec.sha256.as_deref().filter(|s| !s.trim().is_empty()) {
            if !digest.eq_ignore_ascii_case(expected.trim()) {
                return Err(ResourceError::Integrity {
                    name: spec.label().to_string(),
                    expected: expected.to_string(),
                    actual: digest,
                });
            }
            log::debug!("Resource {} checksum verified", spec.label());
        }

        if spec.extract {
            self.extract(&dest).await?;
        }

        Ok(dest)
    }

    // Streams to disk and returns the hex sha256 of what was written
    async fn download(&self, spec: &ResourceSpec, dest: &Path) -> ResourceResult<String> {
        let download_failed = |source| ResourceError::Download {
            name: spec.label().to_string(),
            source,
        };
        let io_failed = |operation, source| ResourceError::Io {
            operation,
            path: dest.to_path_buf(),
            source,
        };

        let mut stream = self
            .transport
            .fetch_stream(&spec.url, self.timeout)
            .await
            .map_err(download_failed)?;
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| io_failed("create", e))?;
        let mut hasher = Sha256::new();

        while let Some(chunk) = stream.next_chunk().await.map_err(download_failed)? {
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| io_failed("write", e))?;
        }
        file.flush().await.map_err(|e| io_failed("flush", e))?;

        Ok(format!("{:x}", hasher.finalize()))
    }

    async fn extract(&self, archive: &Path) -> ResourceResult<()> {
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = match ArchiveKind::detect(&file_name) {
            Some(kind) => kind,
            None => {
                log::debug!("{} is not a known archive type; left as is", file_name);
                return Ok(());
            }
        };

        log::info!("Extracting {} ({})", file_name, kind);
        let archive = archive.to_path_buf();
        let destination = self.destination.clone();
        let failed_path = archive.clone();
        tokio::task::spawn_blocking(move || extract_archive(&archive, kind, &destination))
            .await
            .map_err(|e| ResourceError::Extract {
                path: failed_path,
                message: e.to_string(),
            })?
    }
}
