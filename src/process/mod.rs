//! External tool supervision

pub mod error;
pub mod supervisor;

pub use error::{ProcessError, ProcessResult};
pub use supervisor::{spawn_and_stream, ToolCommand};
