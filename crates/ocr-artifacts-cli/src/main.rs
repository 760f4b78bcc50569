//! OCR Artifacts CLI
//!
//! Main entry point for the `ocr-artifacts` tool.
//! This binary loads configuration, installs the default engine configuration
//! and dispatches to a subcommand.

mod commands;
mod config;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use ocr_artifacts_core::ConfigRegistry;
use ocr_artifacts_service::ServiceRegistry;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

use commands::{Command, CommandContext};
use config::CliConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ocr-artifacts", author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT")]
    environment: Option<String>,

    /// Root of the local model store
    #[arg(long, env = "OCR_LOCAL_ROOT")]
    local_root: Option<PathBuf>,

    /// Root of the bundled assets
    #[arg(long, env = "OCR_BUNDLED_ROOT")]
    bundled_root: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let environment = args.environment.unwrap_or_else(config::get_environment);

    let mut config = CliConfig::load_or_default(&args.config_dir, &environment);

    // Override with command-line arguments
    if let Some(local_root) = args.local_root {
        config.storage.local_root = local_root;
    }
    if let Some(bundled_root) = args.bundled_root {
        config.storage.bundled_root = bundled_root;
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    telemetry::init_with_config(telemetry::TelemetryConfig::from(&config.logging));

    debug!("Environment: {}", environment);
    info!(
        local_root = %config.storage.local_root.display(),
        bundled_root = %config.storage.bundled_root.display(),
        "Using artifact stores"
    );

    let ctx = build_context(&config);
    let mut stdout = std::io::stdout().lock();
    let success = commands::run(args.command, &ctx, &mut stdout).await?;

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Wire services from configuration and install the default engine config
fn build_context(config: &CliConfig) -> CommandContext {
    let registry = ConfigRegistry::global();
    if let Some(global) = &config.global {
        info!(strategy = %global.load_strategy, "Installing default engine config");
        registry.set(global.clone());
    }

    let services = ServiceRegistry::new(
        config.storage.local_root.clone(),
        config.storage.bundled_root.clone(),
        config.preferences.path.clone(),
        Duration::from_secs(config.download.timeout_seconds),
        registry,
    );

    CommandContext {
        services,
        global: config.global.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ocr_artifacts_core::LoadStrategy;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve_with_overrides() {
        let args = Args::try_parse_from([
            "ocr-artifacts",
            "--local-root",
            "/tmp/models",
            "resolve",
            "--version",
            "V4",
            "--det",
            "/sdcard/det.onnx",
            "--strategy",
            "assets-first",
        ])
        .unwrap();

        assert_eq!(args.local_root, Some(PathBuf::from("/tmp/models")));
        match args.command {
            Command::Resolve(target) => {
                assert_eq!(target.version.as_deref(), Some("V4"));
                assert_eq!(target.det.as_deref(), Some("/sdcard/det.onnx"));
                assert_eq!(target.strategy, Some(LoadStrategy::AssetsFirst));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_select() {
        let args = Args::try_parse_from(["ocr-artifacts", "select", "V5"]).unwrap();
        assert!(matches!(args.command, Command::Select { ref id } if id == "V5"));
    }
}
