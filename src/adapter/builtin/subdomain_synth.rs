//! Synthesizes candidate subdomains from root domains

use super::dns::DnsDomain;
use crate::adapter::emitter::Emitter;
use crate::adapter::error::AdapterResult;
use crate::adapter::traits::{Adapter, AdapterIdentity, AdapterMode, GenerateAdapter};
use crate::heartbeat::Metrics;
use crate::resources::{BatchConfig, Parameters};
use async_trait::async_trait;
use serde_json::Value;

const DEFAULT_PREFIXES: [&str; 3] = ["test1", "test2", "test"];

/// Emits one `dns.domain` per prefix per root target
#[derive(Debug, Default)]
pub struct SubdomainSynth;

crate::adapter!(
    SubdomainSynth,
    "subdomain-synth",
    "generate <prefix>.<root> candidates for each root domain"
);

impl Adapter for SubdomainSynth {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: "subdomain-synth",
            version: "0.1.0",
            produces: &["dns.domain"],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Generate(self)
    }
}

#[async_trait]
impl GenerateAdapter for SubdomainSynth {
    async fn generate(
        &mut self,
        targets: &[String],
        config: &BatchConfig,
        emitter: &mut Emitter<'_>,
        metrics: &Metrics,
    ) -> AdapterResult<()> {
        let prefixes = prefixes(&config.parameters);
        log::debug!("subdomain-synth prefixes: {:?}", prefixes);

        for (index, root) in targets.iter().enumerate() {
            for prefix in &prefixes {
                emitter.emit(&DnsDomain::subdomain(prefix, root))?;
            }
            metrics.advance_processed_targets(index as u64 + 1);
            if (index + 1) % 500 == 0 {
                tokio::task::yield_now().await;
            }
        }
        Ok(())
    }
}

// `prefixes` must be a non-empty array of strings, anything else means defaults
fn prefixes(parameters: &Parameters) -> Vec<String> {
    let configured: Vec<String> = match parameters.get("prefixes") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(other) => {
            log::warn!("ignoring non-array prefixes parameter: {}", other);
            Vec::new()
        }
        None => Vec::new(),
    };

    if configured.is_empty() {
        DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect()
    } else {
        configured
    }
}
