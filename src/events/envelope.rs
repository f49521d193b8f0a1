//! The persisted unit of the event stream

use serde::Serialize;
use serde_json::Value;

/// Keys every envelope carries; `tool_image_digest` is optional
pub const ENVELOPE_KEYS: [&str; 8] = [
    "tool",
    "tool_version",
    "run_id",
    "batch_id",
    "tool_image_digest",
    "event_type",
    "timestamp",
    "payload",
];

/// Run and tool identity stamped onto every envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventContext {
    pub tool: String,
    pub tool_version: String,
    pub run_id: String,
    pub batch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_image_digest: Option<String>,
}

/// One line of the event stream
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    #[serde(flatten)]
    pub context: &'a EventContext,
    pub event_type: &'a str,
    pub timestamp: String,
    pub payload: &'a Value,
}

impl<'a> Envelope<'a> {
    pub fn new(context: &'a EventContext, event_type: &'a str, payload: &'a Value) -> Self {
        Self {
            context,
            event_type,
            timestamp: crate::core::time::iso_now(),
            payload,
        }
    }

    /// Compact single-line JSON terminated by `\n`
    ///
    /// serde_json escapes control characters inside strings, so the only raw
    /// newline is the terminator.
    pub fn to_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
