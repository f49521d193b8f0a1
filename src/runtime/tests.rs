use super::*;
use crate::adapter::builtin::DnsDomain;
use crate::adapter::{
    Adapter, AdapterError, AdapterIdentity, AdapterMode, AdapterResult, CommandAdapter, Emitter,
    GenerateAdapter,
};
use crate::config::RunSettings;
use crate::core::shutdown::ShutdownCoordinator;
use crate::events::sha256_file;
use crate::heartbeat::Metrics;
use crate::process::ToolCommand;
use crate::resources::{BatchConfig, Parameters};
use crate::transport::Transport;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Emits one `dns.domain` per target, named after the target
#[derive(Default)]
struct EchoDomains;

impl Adapter for EchoDomains {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: "echo-domains",
            version: "1.0.0",
            produces: &["dns.domain"],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Generate(self)
    }
}

#[async_trait]
impl GenerateAdapter for EchoDomains {
    async fn generate(
        &mut self,
        targets: &[String],
        config: &BatchConfig,
        emitter: &mut Emitter<'_>,
        metrics: &Metrics,
    ) -> AdapterResult<()> {
        // Resources must already be in place
        if let Some(dir) = &config.resources_dir {
            for entry in std::fs::read_dir(dir).unwrap() {
                let name = entry.unwrap().file_name().to_string_lossy().to_string();
                emitter.emit(&DnsDomain::from_name(&format!("{}.resource.test", name.replace('.', "-"))))?;
            }
        }
        for (i, target) in targets.iter().enumerate() {
            emitter.emit(&DnsDomain::from_name(target))?;
            metrics.advance_processed_targets(i as u64 + 1);
        }
        Ok(())
    }
}

#[derive(Default)]
struct FailingGenerator;

impl Adapter for FailingGenerator {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: "failing",
            version: "0",
            produces: &[],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Generate(self)
    }
}

#[async_trait]
impl GenerateAdapter for FailingGenerator {
    async fn generate(
        &mut self,
        _targets: &[String],
        _config: &BatchConfig,
        emitter: &mut Emitter<'_>,
        _metrics: &Metrics,
    ) -> AdapterResult<()> {
        emitter.emit_value("partial", serde_json::json!({"n": 1}))?;
        Err(AdapterError::collaborator("failing", "generator blew up"))
    }
}

/// Emits nothing and leaves the metrics alone
#[derive(Default)]
struct SilentGenerator;

impl Adapter for SilentGenerator {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: "silent",
            version: "0",
            produces: &[],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Generate(self)
    }
}

#[async_trait]
impl GenerateAdapter for SilentGenerator {
    async fn generate(
        &mut self,
        _targets: &[String],
        _config: &BatchConfig,
        _emitter: &mut Emitter<'_>,
        _metrics: &Metrics,
    ) -> AdapterResult<()> {
        Ok(())
    }
}

/// Sleeps until aborted
#[derive(Default)]
struct Sleeper;

impl Adapter for Sleeper {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: "sleeper",
            version: "0",
            produces: &[],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Generate(self)
    }
}

#[async_trait]
impl GenerateAdapter for Sleeper {
    async fn generate(
        &mut self,
        _targets: &[String],
        _config: &BatchConfig,
        _emitter: &mut Emitter<'_>,
        _metrics: &Metrics,
    ) -> AdapterResult<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

/// Prints domains and junk, keeps only the domains
struct ShellDomains {
    script: &'static str,
}

impl Adapter for ShellDomains {
    fn identity(&self) -> AdapterIdentity {
        AdapterIdentity {
            tool: "shell-domains",
            version: "2.0",
            produces: &["dns.domain"],
        }
    }

    fn mode(&mut self) -> AdapterMode<'_> {
        AdapterMode::Command(self)
    }
}

impl CommandAdapter for ShellDomains {
    fn build_command(
        &mut self,
        _targets: &[String],
        _parameters: &Parameters,
        _workdir: &Path,
    ) -> AdapterResult<Option<ToolCommand>> {
        Ok(Some(ToolCommand::new("sh").args(["-c", self.script])))
    }

    fn handle_output_line(&mut self, line: &str, emitter: &mut Emitter<'_>) -> AdapterResult<()> {
        if !line.contains('.') {
            return Err(AdapterError::collaborator("shell-domains", format!("not a domain: {}", line)));
        }
        emitter.emit(&DnsDomain::from_name(line))
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    vars: HashMap<String, String>,
}

impl Fixture {
    fn new(inputs: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inputs.txt"), inputs).unwrap();
        let mut fixture = Self {
            dir,
            vars: HashMap::new(),
        };
        fixture.set("INPUTS_URL", &fixture.url("inputs.txt"));
        fixture.set("OUTPUT_URL", &fixture.url("out/events.jsonl.gz"));
        fixture.set("SIGNAL_URL", &fixture.url("signals.jsonl"));
        fixture.set("TENANT_ID", "t1");
        fixture.set("RUN_ID", "r1");
        fixture.set("BATCH_ID", "b1");
        fixture.set("OCS_PREFIX", "t1/r1/b1/");
        fixture
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn url(&self, name: &str) -> String {
        format!("file://{}", self.path(name).display())
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn write(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.path(name), contents).unwrap();
    }

    async fn run(&self, adapter: &mut dyn Adapter) -> RunReport {
        let mut shutdown = ShutdownCoordinator::new();
        self.run_with(adapter, &mut shutdown).await
    }

    async fn run_with(&self, adapter: &mut dyn Adapter, shutdown: &mut ShutdownCoordinator) -> RunReport {
        let identity = adapter.identity();
        let vars = self.vars.clone();
        let settings =
            RunSettings::resolve(move |k| vars.get(k).cloned(), identity.tool, identity.version).unwrap();
        let mut runtime = AdapterRuntime::new(settings, Transport::new().unwrap());
        let report = runtime.run(adapter, shutdown).await;
        assert_eq!(runtime.state(), LifecycleState::Cleanup);
        report
    }

    fn signals(&self) -> Vec<Value> {
        std::fs::read_to_string(self.path("signals.jsonl"))
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn uploaded_events(&self) -> Vec<Value> {
        let file = std::fs::File::open(self.path("out/events.jsonl.gz")).unwrap();
        std::io::BufReader::new(GzDecoder::new(file))
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect()
    }
}

fn kinds(signals: &[Value]) -> Vec<String> {
    signals
        .iter()
        .map(|s| format!("{}:{}", s["kind"].as_str().unwrap(), s["phase"].as_str().unwrap_or("-")))
        .collect()
}

#[test]
fn test_parse_targets() {
    assert_eq!(parse_targets("a.com\nb.com\n\n"), ["a.com", "b.com"]);
    assert_eq!(parse_targets("  a.com \r\n\t\n b.com"), ["a.com", "b.com"]);
    assert!(parse_targets("\n \n").is_empty());
}

#[test]
fn test_exit_codes() {
    let config = RuntimeError::from(crate::config::ConfigError::missing("INPUTS_URL"));
    assert_eq!(config.exit_code(), 2);
    assert_eq!(config.category(), ErrorCategory::Config);
    assert_eq!(RuntimeError::Aborted.exit_code(), 1);
    assert_eq!(RuntimeError::Aborted.category(), ErrorCategory::Aborted);

    let integrity = RuntimeError::from(crate::resources::ResourceError::Integrity {
        name: "wordlist".to_string(),
        expected: "deadbeef".to_string(),
        actual: "00".to_string(),
    });
    assert_eq!(integrity.exit_code(), 1);
    assert_eq!(integrity.category(), ErrorCategory::Integrity);
}

#[tokio::test]
async fn test_generate_run_end_to_end() {
    let fixture = Fixture::new("a.com\nb.com\n\n");
    let report = fixture.run(&mut EchoDomains).await;

    assert_eq!(report.exit_code, 0, "{:?}", report.error);
    assert_eq!(report.doc_count, 2);

    let events = fixture.uploaded_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["payload"]["name"], "a.com");
    assert_eq!(events[1]["event_type"], "dns.domain");
    assert_eq!(events[1]["tool"], "echo-domains");

    let upload_sha = sha256_file(&fixture.path("out/events.jsonl.gz")).unwrap();
    assert_eq!(report.events_sha256.as_deref(), Some(upload_sha.as_str()));

    let signals = fixture.signals();
    assert_eq!(
        kinds(&signals),
        ["progress@v1:finalize", "results_ready@v1:-"]
    );
    let ready = &signals[1];
    assert_eq!(ready["doc_count"], 2);
    assert_eq!(ready["events_sha256"], upload_sha);
    assert_eq!(ready["events_blob"], "t1/r1/b1/events.jsonl.gz");
    assert_eq!(signals[0]["processed_targets"], 2);
    assert_eq!(signals[0]["emitted_docs"], 2);

    assert!(!report.workdir.unwrap().exists());
}

#[tokio::test]
async fn test_zero_targets_is_valid() {
    let fixture = Fixture::new("\n\n");
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.doc_count, 0);
    assert!(fixture.uploaded_events().is_empty());
}

#[tokio::test]
async fn test_checksum_mismatch_aborts_before_run() {
    let mut fixture = Fixture::new("a.com\n");
    fixture.write("wordlist.txt", b"alpha\nbeta\n");
    let manifest = serde_json::json!({
        "resources": [{"name": "wordlist", "url": fixture.url("wordlist.txt"), "sha256": "deadbeef"}]
    });
    fixture.write("manifest.json", manifest.to_string().as_bytes());
    fixture.set("RESOURCES_MANIFEST_URL", &fixture.url("manifest.json"));

    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 1);
    assert!(report.events_sha256.is_none());
    assert!(report.error.unwrap().contains("sha256 mismatch"));

    let signals = fixture.signals();
    assert!(signals.iter().all(|s| s["kind"] != "results_ready@v1"));
    assert_eq!(kinds(&signals), ["progress@v1:error", "progress@v1:error"]);
    assert!(signals[0]["error"].as_str().unwrap().contains("wordlist"));

    assert!(!fixture.path("out/events.jsonl.gz").exists());
    assert!(!report.workdir.unwrap().exists());
}

#[tokio::test]
async fn test_verified_resources_reach_collaborator() {
    let mut fixture = Fixture::new("a.com\n");
    fixture.write("words.txt", b"abc");
    let manifest = serde_json::json!({
        "tool": "manifest-tool",
        "tool_version": "9.9.9",
        "resources": [{
            "name": "words",
            "url": fixture.url("words.txt"),
            "sha256": "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        }]
    });
    fixture.write("manifest.json", manifest.to_string().as_bytes());
    fixture.set("RESOURCES_MANIFEST_URL", &fixture.url("manifest.json"));

    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0, "{:?}", report.error);
    assert_eq!(report.doc_count, 2);
    let events = fixture.uploaded_events();
    assert_eq!(events[0]["payload"]["name"], "words-txt.resource.test");
    assert!(events
        .iter()
        .all(|e| e["tool"] == "manifest-tool" && e["tool_version"] == "9.9.9"));

    let signals = fixture.signals();
    let ready = signals.last().unwrap();
    assert_eq!(ready["kind"], "results_ready@v1");
    assert_eq!(ready["tool"], "manifest-tool");
    assert_eq!(ready["tool_version"], "9.9.9");
}

#[tokio::test]
async fn test_processed_targets_set_for_silent_generator() {
    let fixture = Fixture::new("a.com\nb.com\n\n");
    let report = fixture.run(&mut SilentGenerator).await;
    assert_eq!(report.exit_code, 0, "{:?}", report.error);
    assert_eq!(report.doc_count, 0);

    let signals = fixture.signals();
    assert_eq!(kinds(&signals), ["progress@v1:finalize", "results_ready@v1:-"]);
    assert_eq!(signals[0]["processed_targets"], 2);
    assert_eq!(signals[0]["emitted_docs"], 0);
}

#[tokio::test]
async fn test_missing_manifest_degrades() {
    let mut fixture = Fixture::new("a.com\n");
    fixture.set("RESOURCES_MANIFEST_URL", &fixture.url("no-such-manifest.json"));
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.doc_count, 1);
}

#[tokio::test]
async fn test_malformed_manifest_degrades() {
    let mut fixture = Fixture::new("a.com\n");
    fixture.write("manifest.json", b"{not json");
    fixture.set("RESOURCES_MANIFEST_URL", &fixture.url("manifest.json"));
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0);

    fixture.write("manifest.json", br#"{"resources": "nope"}"#);
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn test_missing_inputs_is_fatal() {
    let mut fixture = Fixture::new("");
    fixture.set("INPUTS_URL", &fixture.url("absent.txt"));
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 1);
    assert!(report.error.unwrap().contains("loading inputs failed"));
}

#[tokio::test]
async fn test_command_mode_drops_bad_lines() {
    let fixture = Fixture::new("a.com\nb.com\n");
    let mut adapter = ShellDomains {
        script: "echo a.com; echo garbage; echo www.b.com >&2; exit 3",
    };
    let report = fixture.run(&mut adapter).await;

    assert_eq!(report.exit_code, 0, "{:?}", report.error);
    assert_eq!(report.doc_count, 2);

    let signals = fixture.signals();
    assert_eq!(signals[0]["last_exit_code"], 3);
    assert_eq!(signals[0]["processed_targets"], 2);
    assert_eq!(signals[1]["doc_count"], 2);
}

#[tokio::test]
async fn test_generate_failure_is_fatal() {
    let fixture = Fixture::new("a.com\n");
    let report = fixture.run(&mut FailingGenerator).await;

    assert_eq!(report.exit_code, 1);
    assert_eq!(report.doc_count, 1);
    assert!(!fixture.path("out/events.jsonl.gz").exists());
    let signals = fixture.signals();
    assert_eq!(signals[0]["error"], "failing: generator blew up");
}

#[tokio::test]
async fn test_termination_aborts_and_cleans_up() {
    let fixture = Fixture::new("a.com\n");
    let mut shutdown = ShutdownCoordinator::new();
    let trigger = shutdown.trigger_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.trigger();
    });

    let started = std::time::Instant::now();
    let report = fixture.run_with(&mut Sleeper, &mut shutdown).await;

    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(report.exit_code, 1);
    assert!(report.error.unwrap().contains("aborted"));
    assert!(!report.workdir.unwrap().exists());
    assert_eq!(kinds(&fixture.signals()), ["progress@v1:error", "progress@v1:error"]);
}

#[tokio::test]
async fn test_preserve_workdir() {
    let mut fixture = Fixture::new("a.com\n");
    fixture.set("ADAPTER_PRESERVE_WORKDIR", "yes");
    let report = fixture.run(&mut EchoDomains).await;

    let workdir = report.workdir.unwrap();
    assert!(workdir.join("events.jsonl.gz").is_file());
    assert!(workdir.join("resources").is_dir());
    std::fs::remove_dir_all(workdir).unwrap();
}

#[tokio::test]
async fn test_broken_signal_endpoint_does_not_fail_run() {
    let mut fixture = Fixture::new("a.com\nb.com\n");
    fixture.set("SIGNAL_URL", "http://127.0.0.1:1/signal");
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0);
    assert_eq!(fixture.uploaded_events().len(), 2);
}

#[tokio::test]
async fn test_without_output_or_signal_urls() {
    let mut fixture = Fixture::new("a.com\n");
    fixture.vars.remove("OUTPUT_URL");
    fixture.vars.remove("SIGNAL_URL");
    let report = fixture.run(&mut EchoDomains).await;
    assert_eq!(report.exit_code, 0);
    assert!(report.events_sha256.is_some());
    assert!(fixture.signals().is_empty());
}
