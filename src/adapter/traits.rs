//! Adapter traits
//!
//! An adapter declares its mode up front: command mode builds a tool command
//! line and parses its output one line at a time, generate mode produces
//! events in-process. The runtime dispatches on the declared mode.

use super::emitter::Emitter;
use super::error::AdapterResult;
use crate::heartbeat::Metrics;
use crate::process::ToolCommand;
use crate::resources::{BatchConfig, Parameters};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Declared tool identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterIdentity {
    pub tool: &'static str,
    pub version: &'static str,
    /// Event types this adapter may emit; empty allows any
    pub produces: &'static [&'static str],
}

/// A file left in the working directory worth reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub mime_type: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }
}

pub enum AdapterMode<'a> {
    Command(&'a mut dyn CommandAdapter),
    Generate(&'a mut dyn GenerateAdapter),
}

pub trait Adapter: Send {
    fn identity(&self) -> AdapterIdentity;

    fn mode(&mut self) -> AdapterMode<'_>;

    /// Files to report once the collaborator has finished
    fn list_artifacts(&self, _workdir: &Path) -> Vec<Artifact> {
        Vec::new()
    }
}

pub trait CommandAdapter: Send {
    /// `None` means there is nothing to run for this batch
    fn build_command(
        &mut self,
        targets: &[String],
        parameters: &Parameters,
        workdir: &Path,
    ) -> AdapterResult<Option<ToolCommand>>;

    /// Parse one output line; an error drops just this line
    fn handle_output_line(&mut self, line: &str, emitter: &mut Emitter<'_>) -> AdapterResult<()>;

    /// Parse output files after the tool exits
    fn postprocess(&mut self, _workdir: &Path, _emitter: &mut Emitter<'_>) -> AdapterResult<()> {
        Ok(())
    }
}

#[async_trait]
pub trait GenerateAdapter: Send {
    async fn generate(
        &mut self,
        targets: &[String],
        config: &BatchConfig,
        emitter: &mut Emitter<'_>,
        metrics: &Metrics,
    ) -> AdapterResult<()>;
}
