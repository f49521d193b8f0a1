//! Fetch and push operations

use super::error::{TransportError, TransportResult};
use super::location::{redact_url, Location};
use super::stream::ByteStream;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Blocking-per-call transport over `file://` and `http(s)://` URLs
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    pub fn new() -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("adapter-runtime/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| TransportError::Request {
                method: "INIT",
                url: String::new(),
                source: source.without_url(),
            })?;
        Ok(Self { client })
    }

    /// Fetch a whole body as UTF-8 text
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> TransportResult<String> {
        match Location::parse(url)? {
            Location::File(path) => {
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| TransportError::Io {
                        operation: "read",
                        path,
                        source,
                    })
            }
            Location::Remote(url) => {
                let response = self.get(&url, timeout).await?;
                response
                    .text()
                    .await
                    .map_err(|source| TransportError::Request {
                        method: "GET",
                        url: redact_url(&url),
                        source: source.without_url(),
                    })
            }
        }
    }

    /// Fetch and parse a JSON document
    pub async fn fetch_json(
        &self,
        url: &str,
        timeout: Duration,
    ) -> TransportResult<serde_json::Value> {
        let text = self.fetch_text(url, timeout).await?;
        serde_json::from_str(&text).map_err(|source| TransportError::Parse {
            url: redact_url(url),
            source,
        })
    }

    /// Open a lazy chunked download
    pub async fn fetch_stream(&self, url: &str, timeout: Duration) -> TransportResult<ByteStream> {
        match Location::parse(url)? {
            Location::File(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|source| TransportError::Io {
                        operation: "open",
                        path: path.clone(),
                        source,
                    })?;
                Ok(ByteStream::from_file(path, file))
            }
            Location::Remote(url) => {
                let response = self.get(&url, timeout).await?;
                Ok(ByteStream::from_response(&url, response))
            }
        }
    }

    /// Upload a file's full contents
    pub async fn push_file(
        &self,
        url: &str,
        source: &Path,
        content_type: &str,
        timeout: Duration,
    ) -> TransportResult<()> {
        match Location::parse(url)? {
            Location::File(dest) => {
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| TransportError::Io {
                            operation: "create directory",
                            path: parent.to_path_buf(),
                            source: e,
                        })?;
                }
                tokio::fs::copy(source, &dest)
                    .await
                    .map_err(|e| TransportError::Io {
                        operation: "copy",
                        path: dest.clone(),
                        source: e,
                    })?;
                Ok(())
            }
            Location::Remote(url) => {
                let read_failed = |e| TransportError::Io {
                    operation: "read",
                    path: source.to_path_buf(),
                    source: e,
                };
                let file = tokio::fs::File::open(source).await.map_err(read_failed)?;
                let length = file.metadata().await.map_err(read_failed)?.len();
                // Streamed bodies are chunked unless the length is given up front
                let response = self
                    .client
                    .put(&url)
                    .timeout(timeout)
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .header(reqwest::header::CONTENT_LENGTH, length)
                    .body(reqwest::Body::from(file))
                    .send()
                    .await
                    .map_err(|e| TransportError::Request {
                        method: "PUT",
                        url: redact_url(&url),
                        source: e.without_url(),
                    })?;
                check_status("PUT", &url, &response)
            }
        }
    }

    /// POST a JSON document
    ///
    /// A `file://` target gets the document appended as one JSON line, which
    /// lets local runs capture signals without a control plane.
    pub async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> TransportResult<()> {
        match Location::parse(url)? {
            Location::File(path) => {
                let mut line = serde_json::to_vec(payload).map_err(|source| {
                    TransportError::Parse {
                        url: redact_url(url),
                        source,
                    }
                })?;
                line.push(b'\n');
                let io_err = |source: std::io::Error| TransportError::Io {
                    operation: "append",
                    path: path.clone(),
                    source,
                };
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .await
                    .map_err(io_err)?;
                file.write_all(&line).await.map_err(io_err)?;
                file.flush().await.map_err(io_err)
            }
            Location::Remote(url) => {
                let response = self
                    .client
                    .post(&url)
                    .timeout(timeout)
                    .json(payload)
                    .send()
                    .await
                    .map_err(|source| TransportError::Request {
                        method: "POST",
                        url: redact_url(&url),
                        source: source.without_url(),
                    })?;
                check_status("POST", &url, &response)
            }
        }
    }

    async fn get(&self, url: &str, timeout: Duration) -> TransportResult<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                method: "GET",
                url: redact_url(url),
                source: source.without_url(),
            })?;
        check_status("GET", url, &response)?;
        Ok(response)
    }
}

fn check_status(
    method: &'static str,
    url: &str,
    response: &reqwest::Response,
) -> TransportResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(TransportError::Status {
            method,
            url: redact_url(url),
            status: response.status().as_u16(),
        })
    }
}
