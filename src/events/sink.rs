//! Append-only gzip JSON-lines writer

use super::envelope::{Envelope, EventContext};
use super::error::{EventError, EventResult};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Writes envelopes to a gzip-compressed newline-delimited JSON file
///
/// The sink owns the compressed stream until `close`. Only the foreground
/// path writes; `count` is the number of envelopes written so far.
#[derive(Debug)]
pub struct EventSink {
    path: PathBuf,
    context: EventContext,
    encoder: Option<GzEncoder<BufWriter<File>>>,
    count: u64,
}

impl EventSink {
    pub fn create(path: impl Into<PathBuf>, context: EventContext) -> EventResult<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|source| EventError::Io {
            operation: "create",
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            context,
            encoder: Some(GzEncoder::new(BufWriter::new(file), Compression::default())),
            count: 0,
        })
    }

    /// Append one envelope
    pub fn emit(&mut self, event_type: &str, payload: &Value) -> EventResult<()> {
        let encoder = self.encoder.as_mut().ok_or_else(|| EventError::UseAfterClose {
            path: self.path.clone(),
        })?;

        let line = Envelope::new(&self.context, event_type, payload)
            .to_line()
            .map_err(|source| EventError::Serialize {
                event_type: event_type.to_string(),
                source,
            })?;
        encoder.write_all(&line).map_err(|source| EventError::Io {
            operation: "write",
            path: self.path.clone(),
            source,
        })?;

        self.count += 1;
        Ok(())
    }

    /// Flush and finalize the gzip stream
    ///
    /// Only the first call does any work; later calls are no-ops.
    pub fn close(&mut self) -> EventResult<()> {
        let encoder = match self.encoder.take() {
            Some(encoder) => encoder,
            None => return Ok(()),
        };
        let io_err = |source| EventError::Io {
            operation: "finalize",
            path: self.path.clone(),
            source,
        };
        let mut writer = encoder.finish().map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_closed(&self) -> bool {
        self.encoder.is_none()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn context(&self) -> &EventContext {
        &self.context
    }
}

/// Hex sha256 of a file's contents
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1 << 20];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
