//! URL-addressed I/O
//!
//! One retry-free call per operation over two schemes: `file://` URLs read
//! and write the filesystem directly, `http(s)://` URLs go over the network.
//! Retry policy belongs to callers.

pub mod client;
pub mod error;
pub mod location;
pub mod stream;

pub use client::Transport;
pub use error::{TransportError, TransportResult};
pub use location::{redact_url, Location};
pub use stream::{ByteStream, CHUNK_SIZE};
