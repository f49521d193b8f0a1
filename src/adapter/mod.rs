//! Collaborator surface: tool-specific adapters plugged into the runtime

pub mod builtin;
pub mod emitter;
pub mod error;
pub mod registry;
pub mod traits;

pub use emitter::Emitter;
pub use error::{AdapterError, AdapterResult};
pub use registry::{adapter_names, create_adapter, discover_adapters, AdapterInfo};
pub use traits::{Adapter, AdapterIdentity, AdapterMode, Artifact, CommandAdapter, GenerateAdapter};
