//! Signal payloads and best-effort delivery

use super::metrics::Metrics;
use crate::core::time::iso_now;
use crate::transport::{redact_url, Transport};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

pub const PROGRESS_KIND: &str = "progress@v1";
pub const RESULTS_READY_KIND: &str = "results_ready@v1";

/// Identity fields carried by every signal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalContext {
    pub tenant_id: String,
    pub run_id: String,
    pub batch_id: String,
    pub tool: String,
    pub tool_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_image_digest: Option<String>,
}

impl SignalContext {
    fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// `{...context, ...metrics, kind, at}`
pub fn progress_payload(context: &SignalContext, metrics: &Metrics) -> Value {
    let mut payload = context.to_map();
    payload.extend(metrics.snapshot());
    payload.insert("kind".to_string(), Value::from(PROGRESS_KIND));
    payload.insert("at".to_string(), Value::from(iso_now()));
    Value::Object(payload)
}

/// Progress signal announcing a failed run
pub fn error_payload(context: &SignalContext, error: &str) -> Value {
    let mut payload = context.to_map();
    payload.insert("kind".to_string(), Value::from(PROGRESS_KIND));
    payload.insert("phase".to_string(), Value::from("error"));
    payload.insert("error".to_string(), Value::from(error));
    payload.insert("at".to_string(), Value::from(iso_now()));
    Value::Object(payload)
}

/// Terminal signal sent once the event stream is finalized
#[derive(Debug, Clone, Serialize)]
pub struct ResultsReady {
    pub tenant_id: String,
    pub run_id: String,
    pub batch_id: String,
    pub tool: String,
    pub tool_version: String,
    pub doc_count: u64,
    pub events_blob: String,
    pub events_sha256: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_image_digest: Option<String>,
}

impl ResultsReady {
    pub fn to_payload(&self) -> Value {
        let mut payload = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        payload.insert("kind".to_string(), Value::from(RESULTS_READY_KIND));
        Value::Object(payload)
    }
}

/// Fire-and-forget POSTs to the signal endpoint
///
/// Delivery failures are logged at debug and otherwise ignored; a lost signal
/// never affects the run.
#[derive(Debug, Clone)]
pub struct SignalClient {
    transport: Transport,
    url: Option<String>,
}

impl SignalClient {
    pub fn new(transport: Transport, url: Option<String>) -> Self {
        Self { transport, url }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Returns whether the push was delivered
    pub async fn notify(&self, payload: &Value, timeout: Duration) -> bool {
        let url = match &self.url {
            Some(url) => url,
            None => return false,
        };

        let push = self.transport.post_json(url, payload, timeout);
        match tokio::time::timeout(timeout, push).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                log::debug!("signal push dropped: {}", e);
                false
            }
            Err(_) => {
                log::debug!(
                    "signal push to {} abandoned after {:?}",
                    redact_url(url),
                    timeout
                );
                false
            }
        }
    }
}
