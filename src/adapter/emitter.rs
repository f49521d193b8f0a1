//! The emit handle given to collaborators

use super::error::{AdapterError, AdapterResult};
use crate::events::{sanitize_payload, EventModel, EventSink};
use crate::heartbeat::Metrics;
use serde_json::Value;

/// Writes collaborator events to the sink
///
/// Events whose type is not in the adapter's `produces` list are dropped
/// without error. After every write the sink count is mirrored into the
/// heartbeat's `emitted_docs`.
pub struct Emitter<'a> {
    sink: &'a mut EventSink,
    metrics: &'a Metrics,
    produces: &'static [&'static str],
}

impl<'a> Emitter<'a> {
    pub fn new(sink: &'a mut EventSink, metrics: &'a Metrics, produces: &'static [&'static str]) -> Self {
        Self {
            sink,
            metrics,
            produces,
        }
    }

    pub fn emit<M: EventModel>(&mut self, model: &M) -> AdapterResult<()> {
        let event_type = model.event_type();
        if !self.accepts(event_type) {
            return Ok(());
        }
        let payload = model.to_payload().map_err(|source| AdapterError::Payload {
            event_type: event_type.to_string(),
            source,
        })?;
        self.write(event_type, &payload)
    }

    /// Emit an untyped payload; it is sanitized like a typed one
    pub fn emit_value(&mut self, event_type: &str, payload: Value) -> AdapterResult<()> {
        if !self.accepts(event_type) {
            return Ok(());
        }
        self.write(event_type, &sanitize_payload(payload))
    }

    pub fn count(&self) -> u64 {
        self.sink.count()
    }

    fn accepts(&self, event_type: &str) -> bool {
        let accepted = self.produces.is_empty() || self.produces.contains(&event_type);
        if !accepted {
            log::trace!("dropping undeclared event type '{}'", event_type);
        }
        accepted
    }

    fn write(&mut self, event_type: &str, payload: &Value) -> AdapterResult<()> {
        self.sink.emit(event_type, payload)?;
        self.metrics.set_emitted_docs(self.sink.count());
        Ok(())
    }
}
