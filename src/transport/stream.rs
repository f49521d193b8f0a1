//! Lazy chunked downloads

use super::error::{TransportError, TransportResult};
use super::location::redact_url;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// Read size for file-backed streams
pub const CHUNK_SIZE: usize = 1 << 20;

/// A finite, non-restartable sequence of byte chunks
///
/// Large resources are written through chunk by chunk instead of being
/// buffered whole.
#[derive(Debug)]
pub struct ByteStream {
    source: String,
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    File { path: PathBuf, file: tokio::fs::File },
    Remote(reqwest::Response),
    Done,
}

impl ByteStream {
    pub(crate) fn from_file(path: PathBuf, file: tokio::fs::File) -> Self {
        Self {
            source: path.display().to_string(),
            inner: Inner::File { path, file },
        }
    }

    pub(crate) fn from_response(url: &str, response: reqwest::Response) -> Self {
        Self {
            source: redact_url(url),
            inner: Inner::Remote(response),
        }
    }

    /// Next chunk, or `None` once the source is exhausted
    pub async fn next_chunk(&mut self) -> TransportResult<Option<Vec<u8>>> {
        let chunk = match &mut self.inner {
            Inner::Done => return Ok(None),
            Inner::File { path, file } => {
                let mut buf = vec![0u8; CHUNK_SIZE];
                let read = file.read(&mut buf).await.map_err(|source| TransportError::Io {
                    operation: "read",
                    path: path.clone(),
                    source,
                })?;
                if read == 0 {
                    None
                } else {
                    buf.truncate(read);
                    Some(buf)
                }
            }
            Inner::Remote(response) => {
                response
                    .chunk()
                    .await
                    .map_err(|source| TransportError::Request {
                        method: "GET",
                        url: self.source.clone(),
                        source: source.without_url(),
                    })?
                    .map(|bytes| bytes.to_vec())
            }
        };

        if chunk.is_none() {
            self.inner = Inner::Done;
        }
        Ok(chunk)
    }

    /// Display form of where the bytes come from
    pub fn source(&self) -> &str {
        &self.source
    }
}
