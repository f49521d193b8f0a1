//! Event envelopes and the compressed event stream

pub mod envelope;
pub mod error;
pub mod model;
pub mod sink;

pub use envelope::{Envelope, EventContext, ENVELOPE_KEYS};
pub use error::{EventError, EventResult};
pub use model::{encode_bytes, sanitize_payload, EventModel};
pub use sink::{sha256_file, EventSink};
