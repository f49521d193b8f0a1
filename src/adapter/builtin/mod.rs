//! Adapters shipped with the runtime

pub mod dns;
pub mod jsonl_exec;
pub mod subdomain_synth;

pub use dns::{DnsDomain, DnsKind};
pub use jsonl_exec::JsonlExec;
pub use subdomain_synth::SubdomainSynth;
