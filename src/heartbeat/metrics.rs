//! Shared progress metrics
//!
//! Written by the foreground path and read by the heartbeat task. Each key is
//! updated atomically on its own; a snapshot may pair a newer `phase` with an
//! older `emitted_docs`, which is fine for a progress report.

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;
use strum_macros::{Display, EnumString, FromRepr, IntoStaticStr};

/// Lifecycle phase reported in heartbeats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, FromRepr,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Phase {
    #[default]
    Init,
    Start,
    Generate,
    Exec,
    Main,
    Finalize,
    Error,
}

#[derive(Debug, Default)]
pub struct Metrics {
    phase: AtomicU8,
    processed_targets: AtomicU64,
    emitted_docs: AtomicU64,
    extras: Mutex<Map<String, Value>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_repr(self.phase.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Relaxed);
    }

    pub fn processed_targets(&self) -> u64 {
        self.processed_targets.load(Ordering::Relaxed)
    }

    /// Raise the processed count; lower values are ignored
    pub fn advance_processed_targets(&self, count: u64) {
        self.processed_targets.fetch_max(count, Ordering::Relaxed);
    }

    pub fn emitted_docs(&self) -> u64 {
        self.emitted_docs.load(Ordering::Relaxed)
    }

    pub fn set_emitted_docs(&self, count: u64) {
        self.emitted_docs.store(count, Ordering::Relaxed);
    }

    /// Set an open-ended metric such as `last_exit_code`
    pub fn set_extra(&self, key: &str, value: impl Into<Value>) {
        let mut extras = self.extras.lock().unwrap_or_else(|e| e.into_inner());
        extras.insert(key.to_string(), value.into());
    }

    pub fn extra(&self, key: &str) -> Option<Value> {
        let extras = self.extras.lock().unwrap_or_else(|e| e.into_inner());
        extras.get(key).cloned()
    }

    /// Current values as a JSON object
    pub fn snapshot(&self) -> Map<String, Value> {
        let mut map = self
            .extras
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let phase: &'static str = self.phase().into();
        map.insert("phase".to_string(), Value::from(phase));
        map.insert(
            "processed_targets".to_string(),
            Value::from(self.processed_targets()),
        );
        map.insert("emitted_docs".to_string(), Value::from(self.emitted_docs()));
        map
    }
}
