//! Process startup: arguments, logging, settings, then the run itself

use super::cli::Args;
use crate::adapter::{adapter_names, create_adapter, discover_adapters, AdapterIdentity};
use crate::config::{ConfigError, ConfigResult, RunSettings, SettingsFile};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, LoggingOptions};
use crate::core::shutdown::ShutdownCoordinator;
use crate::runtime::AdapterRuntime;
use crate::transport::Transport;
use clap::Parser;
use colored::Colorize;
use std::path::Path;

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let args = Args::parse();
    let use_color = args.use_color();
    colored::control::set_override(use_color);

    if let Err(e) = init_logging(&LoggingOptions {
        log_level: args.log_level.as_deref(),
        log_format: args.log_format.as_deref(),
        log_file: args.log_file.as_deref(),
        color_enabled: use_color,
    }) {
        eprintln!("FATAL: failed to initialise logging: {}", e);
        return 2;
    }

    if args.list_adapters {
        print_adapters();
        return 0;
    }

    // clap guarantees an adapter name unless listing
    let name = args.adapter.unwrap_or_default();
    let mut adapter = match create_adapter(&name) {
        Some(adapter) => adapter,
        None => {
            let e = ConfigError::unknown_adapter(&name, &adapter_names());
            log_error_with_context(&e, "Adapter selection failed");
            return 2;
        }
    };

    let identity = adapter.identity();
    let settings = match resolve_settings(args.config_file.as_deref(), identity, |name| {
        std::env::var(name).ok()
    }) {
        Ok(settings) => settings,
        Err(e) => {
            log_error_with_context(&e, "Configuration failed");
            return 2;
        }
    };

    let transport = match Transport::new() {
        Ok(transport) => transport,
        Err(e) => {
            log_error_with_context(&e, "HTTP client setup failed");
            return 1;
        }
    };

    log::info!(
        "{} {} starting batch {} (run {})",
        identity.tool,
        identity.version,
        display_or_dash(&settings.batch_id),
        display_or_dash(&settings.run_id)
    );

    let mut shutdown = ShutdownCoordinator::install();
    let mut runtime = AdapterRuntime::new(settings, transport);
    let report = runtime.run(adapter.as_mut(), &mut shutdown).await;

    log::info!(
        "Batch finished with exit code {} ({} events)",
        report.exit_code,
        report.doc_count
    );
    report.exit_code
}

/// Resolve run settings from `env` first, then the settings file
///
/// Empty environment values fall through to the file.
pub fn resolve_settings<F>(
    config_file: Option<&Path>,
    identity: AdapterIdentity,
    env: F,
) -> ConfigResult<RunSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let file = SettingsFile::discover(config_file)?;
    if !file.is_empty() {
        log::debug!("Loaded settings file");
    }
    RunSettings::resolve(
        |name| {
            env(name)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| file.get(name))
        },
        identity.tool,
        identity.version,
    )
}

fn print_adapters() {
    for info in discover_adapters() {
        println!("{:<18} {}", info.name.bold(), info.summary);
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
