//! The batch lifecycle

pub mod error;
pub mod orchestrator;
pub mod state;
pub mod workdir;

pub use error::{ErrorCategory, RuntimeError, RuntimeResult};
pub use orchestrator::{parse_targets, AdapterRuntime, RunReport};
pub use state::LifecycleState;
pub use workdir::WorkDir;

#[cfg(test)]
mod tests;
