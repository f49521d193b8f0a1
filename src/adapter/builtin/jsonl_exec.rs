//! Runs any tool that prints one JSON object per line

use crate::adapter::emitter::Emitter;
use crate::adapter::error::{AdapterError, AdapterResult};
use crate::adapter::traits::{Adapter, AdapterIdentity, AdapterMode, Artifact, CommandAdapter};
use crate::process::ToolCommand;
use crate::resources::Parameters;
use serde_json::Value;
use std::path::Path;

const TOOL: &str = "jsonl-exec";
const TARGETS_FILE: &str = "targets.txt";
const TARGETS_TOKEN: &str = "{targets}";
const DEFAULT_EVENT_TYPE: &str = "raw.record";

/// Command-mode adapter driven entirely by manifest parameters
///
/// `parameters.argv` is the command line. Any `{targets}` inside an argument
/// is replaced with the path of a `targets.txt` written to the working
/// directory. Each JSON object printed by the tool becomes one event of type
/// `parameters.event_type`.
#[derive(Debug)]
pub struct JsonlExec {
    event_type: String,
    artifacts: Vec<Artifact>,
}

impl Default for JsonlExec {
    fn default() -> Self {
        Self {
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            artifacts: Vec::new(),
        }
    }
}

crate::adapter!(
    JsonlExec,
    "jsonl-exec",
    "run parameters.argv and emit each JSON output line as an event"
);

impl Adapter for JsonlExec {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: TOOL,
            version: env!("CARGO_PKG_VERSION"),
            produces: &[],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Command(self)
    }

    fn list_artifacts(&self, _workdir: &Path) -> Vec<Artifact> {
        self.artifacts.clone()
    }
}

impl CommandAdapter for JsonlExec {
    fn build_command(
        &mut self,
        targets: &[String],
        parameters: &Parameters,
        workdir: &Path,
    ) -> AdapterResult<Option<ToolCommand>> {
        if let Some(event_type) = parameters.get("event_type") {
            self.event_type = event_type
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AdapterError::invalid_parameter("event_type", "must be a non-empty string"))?
                .to_string();
        }

        let argv = match parameters.get("argv") {
            None => {
                log::warn!("{}: no argv parameter, nothing to run", TOOL);
                return Ok(None);
            }
            Some(value) => string_array(value)
                .ok_or_else(|| AdapterError::invalid_parameter("argv", "must be an array of strings"))?,
        };
        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => {
                log::warn!("{}: empty argv, nothing to run", TOOL);
                return Ok(None);
            }
        };

        let targets_path = workdir.join(TARGETS_FILE);
        let mut contents = targets.join("\n");
        contents.push('\n');
        std::fs::write(&targets_path, contents).map_err(|source| AdapterError::Io {
            operation: "write",
            path: targets_path.clone(),
            source,
        })?;
        self.artifacts = vec![Artifact::new(&targets_path, "text/plain")];

        let targets_arg = targets_path.to_string_lossy();
        let args = args.iter().map(|arg| arg.replace(TARGETS_TOKEN, &targets_arg));
        Ok(Some(ToolCommand::new(program.clone()).args(args)))
    }

    fn handle_output_line(&mut self, line: &str, emitter: &mut Emitter<'_>) -> AdapterResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value @ Value::Object(_)) => emitter.emit_value(&self.event_type, value),
            Ok(_) => Err(AdapterError::collaborator(TOOL, "output line is not a JSON object")),
            Err(e) => Err(AdapterError::collaborator(TOOL, format!("unparseable output line: {}", e))),
        }
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
