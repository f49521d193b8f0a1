//! Progress metrics and control-plane signals

pub mod metrics;
pub mod reporter;
pub mod signals;

pub use metrics::{Metrics, Phase};
pub use reporter::{HeartbeatReporter, ReporterState, MIN_INTERVAL_SECONDS};
pub use signals::{
    error_payload, progress_payload, ResultsReady, SignalClient, SignalContext, PROGRESS_KIND,
    RESULTS_READY_KIND,
};
