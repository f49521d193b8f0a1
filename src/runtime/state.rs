//! Lifecycle states of one run

use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Init,
    LoadInputs,
    LoadManifest,
    PrepareResources,
    Run,
    Finalize,
    Done,
    Error,
    Cleanup,
}
