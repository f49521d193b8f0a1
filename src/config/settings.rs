//! Run settings resolution

use super::error::{ConfigError, ConfigResult};
use std::time::Duration;

/// Heartbeat interval used when `HEARTBEAT_SECONDS` is absent
pub const DEFAULT_HEARTBEAT_SECONDS: u64 = 30;

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// Per-operation timeouts for transport calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub inputs: Duration,
    pub manifest: Duration,
    pub resource: Duration,
    pub upload: Duration,
    pub heartbeat: Duration,
    pub results_signal: Duration,
    pub error_signal: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            inputs: Duration::from_secs(180),
            manifest: Duration::from_secs(180),
            resource: Duration::from_secs(600),
            upload: Duration::from_secs(600),
            heartbeat: Duration::from_secs(10),
            results_signal: Duration::from_secs(30),
            error_signal: Duration::from_secs(10),
        }
    }
}

/// Immutable per-run settings
///
/// Built once at process start; `inputs_url` is the only mandatory value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub inputs_url: String,
    pub resources_manifest_url: Option<String>,
    pub output_url: Option<String>,
    pub signal_url: Option<String>,
    pub tenant_id: String,
    pub run_id: String,
    pub batch_id: String,
    pub ocs_prefix: String,
    pub tool_image_digest: Option<String>,
    pub tool: String,
    pub tool_version: String,
    /// Requested interval; the heartbeat reporter enforces its own floor
    pub heartbeat_seconds: u64,
    pub preserve_workdir: bool,
    pub timeouts: Timeouts,
}

impl RunSettings {
    /// Resolve settings through a key lookup
    ///
    /// `lookup` returns the raw value for a setting name such as `INPUTS_URL`;
    /// empty values count as absent. `default_tool` and `default_version` are
    /// the collaborator's declared identity and win over `TOOL`/`TOOL_VERSION`.
    pub fn resolve<F>(lookup: F, default_tool: &str, default_version: &str) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let inputs_url = get("INPUTS_URL").ok_or_else(|| ConfigError::missing("INPUTS_URL"))?;

        let heartbeat_seconds = match get("HEARTBEAT_SECONDS") {
            Some(raw) => {
                let seconds = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| ConfigError::invalid("HEARTBEAT_SECONDS", &raw, e))?;
                // zero means unset, negatives fall to the reporter floor
                match seconds {
                    0 => DEFAULT_HEARTBEAT_SECONDS,
                    n => u64::try_from(n).unwrap_or(0),
                }
            }
            None => DEFAULT_HEARTBEAT_SECONDS,
        };

        let tool = non_empty(default_tool)
            .or_else(|| get("TOOL"))
            .unwrap_or_default();
        let tool_version = non_empty(default_version)
            .or_else(|| get("TOOL_VERSION"))
            .unwrap_or_default();

        Ok(Self {
            inputs_url,
            resources_manifest_url: get("RESOURCES_MANIFEST_URL"),
            output_url: get("OUTPUT_URL"),
            signal_url: get("SIGNAL_URL"),
            tenant_id: get("TENANT_ID").unwrap_or_default(),
            run_id: get("RUN_ID").unwrap_or_default(),
            batch_id: get("BATCH_ID").unwrap_or_default(),
            ocs_prefix: get("OCS_PREFIX").unwrap_or_default(),
            tool_image_digest: get("TOOL_IMAGE_DIGEST"),
            tool,
            tool_version,
            heartbeat_seconds,
            preserve_workdir: get("ADAPTER_PRESERVE_WORKDIR")
                .map(|raw| is_truthy(&raw))
                .unwrap_or(false),
            timeouts: Timeouts::default(),
        })
    }

    /// Resolve settings from the process environment only
    pub fn from_env(default_tool: &str, default_version: &str) -> ConfigResult<Self> {
        Self::resolve(|name| std::env::var(name).ok(), default_tool, default_version)
    }

    /// Blob name reported in `results_ready`
    pub fn events_blob(&self) -> String {
        format!("{}events.jsonl.gz", self.ocs_prefix)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `1`, `true`, `yes` and `on` (any case) are truthy
pub fn is_truthy(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    TRUTHY.contains(&lowered.as_str())
}
