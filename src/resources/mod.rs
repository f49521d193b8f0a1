//! Declared resources: manifest parsing, download, verification, unpacking

pub mod error;
pub mod extract;
pub mod manifest;
pub mod materializer;

pub use error::{ResourceError, ResourceResult};
pub use extract::ArchiveKind;
pub use manifest::{BatchConfig, Parameters, ResourceSpec};
pub use materializer::ResourceMaterializer;
