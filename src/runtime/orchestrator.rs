//! Drives one batch from inputs to `results_ready`

use super::error::{RuntimeError, RuntimeResult};
use super::state::LifecycleState;
use super::workdir::WorkDir;
use crate::adapter::{Adapter, AdapterMode, Emitter};
use crate::config::RunSettings;
use crate::core::error_handling::log_error_with_context;
use crate::core::shutdown::{wait_for_shutdown, ShutdownCoordinator};
use crate::core::time::iso_now;
use crate::events::{sha256_file, EventContext, EventError, EventSink};
use crate::heartbeat::{
    error_payload, HeartbeatReporter, Metrics, Phase, ResultsReady, SignalClient, SignalContext,
};
use crate::process::spawn_and_stream;
use crate::resources::{BatchConfig, ResourceMaterializer};
use crate::transport::Transport;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of a run as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub exit_code: i32,
    pub doc_count: u64,
    /// Set only when the event stream was finalized
    pub events_sha256: Option<String>,
    pub workdir: Option<PathBuf>,
    pub error: Option<String>,
}

struct Finalized {
    doc_count: u64,
    events_sha256: String,
}

/// Per-run state shared by the pipeline and cleanup
struct RunContext {
    workdir: WorkDir,
    metrics: Arc<Metrics>,
    signals: SignalClient,
    signal_context: SignalContext,
    reporter: HeartbeatReporter,
    sink: Option<EventSink>,
}

/// The adapter orchestrator
pub struct AdapterRuntime {
    settings: RunSettings,
    transport: Transport,
    state: LifecycleState,
}

impl AdapterRuntime {
    pub fn new(settings: RunSettings, transport: Transport) -> Self {
        Self {
            settings,
            transport,
            state: LifecycleState::Init,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Run the full lifecycle with `adapter`
    ///
    /// Never returns an error: failures are logged once as `FATAL:`, reported
    /// with a best-effort error signal and folded into the report's exit code.
    /// A termination request observed by `shutdown` aborts the pipeline at
    /// its next await point. Cleanup always runs and releases the signal
    /// listeners.
    pub async fn run(&mut self, adapter: &mut dyn Adapter, shutdown: &mut ShutdownCoordinator) -> RunReport {
        let metrics = Arc::new(Metrics::new());
        let signals = SignalClient::new(self.transport.clone(), self.settings.signal_url.clone());
        let signal_context = self.signal_context();

        let workdir = match WorkDir::create(&self.settings.batch_id, self.settings.preserve_workdir) {
            Ok(workdir) => workdir,
            Err(e) => {
                self.transition(LifecycleState::Error);
                log_error_with_context(&e, "Failed to prepare run");
                signals
                    .notify(&error_payload(&signal_context, &e.to_string()), self.settings.timeouts.error_signal)
                    .await;
                shutdown.release();
                return RunReport {
                    exit_code: e.exit_code(),
                    doc_count: 0,
                    events_sha256: None,
                    workdir: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let reporter = HeartbeatReporter::new(
            signals.clone(),
            signal_context.clone(),
            metrics.clone(),
            self.settings.heartbeat_seconds,
            self.settings.timeouts.heartbeat,
        );
        let mut ctx = RunContext {
            workdir,
            metrics,
            signals,
            signal_context,
            reporter,
            sink: None,
        };

        let mut shutdown_rx = shutdown.subscribe();
        let outcome = if shutdown.is_shutdown_requested() {
            Err(RuntimeError::Aborted)
        } else {
            tokio::select! {
                result = self.execute(adapter, &mut ctx) => result,
                _ = wait_for_shutdown(&mut shutdown_rx) => Err(RuntimeError::Aborted),
            }
        };

        let report = match outcome {
            Ok(done) => RunReport {
                exit_code: 0,
                doc_count: done.doc_count,
                events_sha256: Some(done.events_sha256),
                workdir: Some(ctx.workdir.path().to_path_buf()),
                error: None,
            },
            Err(e) => {
                self.fail(&mut ctx, &e).await;
                RunReport {
                    exit_code: e.exit_code(),
                    doc_count: ctx.sink.as_ref().map(EventSink::count).unwrap_or(0),
                    events_sha256: None,
                    workdir: Some(ctx.workdir.path().to_path_buf()),
                    error: Some(e.to_string()),
                }
            }
        };

        self.cleanup(ctx, shutdown).await;
        report
    }

    async fn execute(&mut self, adapter: &mut dyn Adapter, ctx: &mut RunContext) -> RuntimeResult<Finalized> {
        self.transition(LifecycleState::LoadInputs);
        let inputs = self
            .transport
            .fetch_text(&self.settings.inputs_url, self.settings.timeouts.inputs)
            .await
            .map_err(RuntimeError::Inputs)?;
        let targets = parse_targets(&inputs);
        log::info!("Loaded {} targets", targets.len());

        self.transition(LifecycleState::LoadManifest);
        let mut config = self.load_manifest().await;
        config.apply_identity_defaults(&self.settings.tool, &self.settings.tool_version);
        config.set_resources_dir(ctx.workdir.resources_dir());

        self.transition(LifecycleState::PrepareResources);
        if !config.resources.is_empty() {
            ResourceMaterializer::new(
                &self.transport,
                ctx.workdir.resources_dir(),
                self.settings.timeouts.resource,
            )
            .materialize_all(&config.resources)
            .await?;
        }

        self.transition(LifecycleState::Run);
        let sink = ctx
            .sink
            .insert(EventSink::create(ctx.workdir.events_path(), self.event_context(&config))?);
        ctx.metrics.set_phase(Phase::Start);
        ctx.reporter.start();

        let identity = adapter.identity();
        let workdir = ctx.workdir.path();
        let metrics: &Metrics = &ctx.metrics;
        let mut emitter = Emitter::new(&mut *sink, metrics, identity.produces);

        metrics.advance_processed_targets(targets.len() as u64);
        match adapter.mode() {
            AdapterMode::Command(command_adapter) => {
                metrics.set_phase(Phase::Exec);

                if let Some(command) =
                    command_adapter.build_command(&targets, &config.parameters, workdir)?
                {
                    log::info!("Running {}", command.display());
                    let exit_code = spawn_and_stream(&command, workdir, |line| {
                        if let Err(e) = command_adapter.handle_output_line(line, &mut emitter) {
                            log::debug!("dropping output line: {}", e);
                        }
                    })
                    .await?;
                    metrics.set_extra("last_exit_code", exit_code);
                    if exit_code == 0 {
                        log::info!("{} exited with 0", command.program);
                    } else {
                        log::warn!("{} exited with {}", command.program, exit_code);
                    }
                }
                command_adapter.postprocess(workdir, &mut emitter)?;
            }
            AdapterMode::Generate(generator) => {
                metrics.set_phase(Phase::Generate);
                generator
                    .generate(&targets, &config, &mut emitter, metrics)
                    .await?;
            }
        }
        drop(emitter);

        for artifact in adapter.list_artifacts(workdir) {
            log::info!("Artifact {} ({})", artifact.path.display(), artifact.mime_type);
        }

        self.transition(LifecycleState::Finalize);
        metrics.set_phase(Phase::Finalize);
        sink.close()?;
        let doc_count = sink.count();
        let events_path = sink.path().to_path_buf();
        let events_sha256 = sha256_file(&events_path).map_err(|source| EventError::Io {
            operation: "checksum",
            path: events_path.clone(),
            source,
        })?;
        log::info!("Wrote {} events (sha256 {})", doc_count, events_sha256);

        if let Some(output_url) = &self.settings.output_url {
            self.transport
                .push_file(output_url, &events_path, "application/gzip", self.settings.timeouts.upload)
                .await
                .map_err(RuntimeError::Upload)?;
            log::info!("Uploaded event stream");
        }

        ctx.reporter.stop().await;

        let ready = ResultsReady {
            tenant_id: self.settings.tenant_id.clone(),
            run_id: self.settings.run_id.clone(),
            batch_id: self.settings.batch_id.clone(),
            tool: config.tool.clone(),
            tool_version: config.tool_version.clone(),
            doc_count,
            events_blob: self.settings.events_blob(),
            events_sha256: events_sha256.clone(),
            created_at: iso_now(),
            tool_image_digest: self.settings.tool_image_digest.clone(),
        };
        ctx.signals
            .notify(&ready.to_payload(), self.settings.timeouts.results_signal)
            .await;

        self.transition(LifecycleState::Done);
        Ok(Finalized {
            doc_count,
            events_sha256,
        })
    }

    /// A missing or unreadable manifest degrades to an empty config
    async fn load_manifest(&self) -> BatchConfig {
        let url = match &self.settings.resources_manifest_url {
            Some(url) => url,
            None => return BatchConfig::default(),
        };

        let doc = match self
            .transport
            .fetch_json(url, self.settings.timeouts.manifest)
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("manifest: {}", e);
                return BatchConfig::default();
            }
        };

        BatchConfig::from_manifest(&doc).unwrap_or_else(|e| {
            log::warn!("manifest: ignoring malformed document: {}", e);
            BatchConfig::default()
        })
    }

    async fn fail(&mut self, ctx: &mut RunContext, error: &RuntimeError) {
        self.transition(LifecycleState::Error);
        log_error_with_context(error, "Batch run failed");
        ctx.metrics.set_phase(Phase::Error);
        ctx.signals
            .notify(
                &error_payload(&ctx.signal_context, &error.to_string()),
                self.settings.timeouts.error_signal,
            )
            .await;
        ctx.reporter.stop().await;
    }

    async fn cleanup(&mut self, mut ctx: RunContext, shutdown: &mut ShutdownCoordinator) {
        self.transition(LifecycleState::Cleanup);
        ctx.reporter.stop().await;
        if let Some(sink) = ctx.sink.as_mut() {
            if let Err(e) = sink.close() {
                log::debug!("closing event sink during cleanup: {}", e);
            }
        }
        shutdown.release();
        ctx.workdir.cleanup();
    }

    fn transition(&mut self, next: LifecycleState) {
        log::info!("{} -> {}", self.state, next);
        self.state = next;
    }

    /// Envelope identity follows the manifest, falling back to the settings
    fn event_context(&self, config: &BatchConfig) -> EventContext {
        EventContext {
            tool: config.tool.clone(),
            tool_version: config.tool_version.clone(),
            run_id: self.settings.run_id.clone(),
            batch_id: self.settings.batch_id.clone(),
            tool_image_digest: self.settings.tool_image_digest.clone(),
        }
    }

    fn signal_context(&self) -> SignalContext {
        SignalContext {
            tenant_id: self.settings.tenant_id.clone(),
            run_id: self.settings.run_id.clone(),
            batch_id: self.settings.batch_id.clone(),
            tool: self.settings.tool.clone(),
            tool_version: self.settings.tool_version.clone(),
            tool_image_digest: self.settings.tool_image_digest.clone(),
        }
    }
}

/// Non-empty, whitespace-trimmed lines
pub fn parse_targets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
