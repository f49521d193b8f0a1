//! Run configuration
//!
//! Resolves the run identity and endpoint URLs once at startup into an
//! immutable [`RunSettings`] value that every component receives by reference.

pub mod error;
pub mod file;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use file::SettingsFile;
pub use settings::{RunSettings, Timeouts, DEFAULT_HEARTBEAT_SECONDS};
