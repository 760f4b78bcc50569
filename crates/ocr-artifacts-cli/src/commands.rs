//! Subcommands

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use ocr_artifacts_core::{EngineConfig, LoadStrategy, PathOverrides, VersionCatalog};
use ocr_artifacts_service::{DownloadOutcome, ServiceRegistry};
use std::io::Write;
use std::sync::Mutex;
use tracing::info;

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the known model versions
    Versions,

    /// Print the resolved artifact paths as JSON
    Resolve(TargetArgs),

    /// Check that every artifact can be loaded
    Validate(TargetArgs),

    /// Load all four artifacts and report their sizes
    Load(TargetArgs),

    /// Fetch missing remote artifacts for a version
    Download {
        /// Model version; defaults to the selected one
        #[arg(long)]
        version: Option<String>,
    },

    /// Persist the selected model version
    Select {
        /// Version identifier, e.g. V4
        id: String,
    },

    /// Print the selected model version
    Selected,
}

/// Version and per-call overrides shared by resolve, validate and load
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Model version; defaults to the selected one
    #[arg(long)]
    pub version: Option<String>,

    /// Detector model path
    #[arg(long)]
    pub det: Option<String>,

    /// Classifier model path
    #[arg(long)]
    pub cls: Option<String>,

    /// Recognizer model path
    #[arg(long)]
    pub rec: Option<String>,

    /// Dictionary path
    #[arg(long)]
    pub dict: Option<String>,

    /// Load strategy (file_first, assets_first, file_only, assets_only)
    #[arg(long)]
    pub strategy: Option<LoadStrategy>,
}

impl TargetArgs {
    /// Per-call configuration, if any flag asks for one
    ///
    /// Without `--strategy` the strategy of `global` is kept, so that a single
    /// path flag does not silently reset it.
    pub fn instance_config(&self, global: Option<&EngineConfig>) -> Option<EngineConfig> {
        let overrides = PathOverrides {
            det: self.det.clone(),
            cls: self.cls.clone(),
            rec: self.rec.clone(),
            dict: self.dict.clone(),
        };
        if overrides.is_empty() && self.strategy.is_none() {
            return None;
        }

        let strategy = self
            .strategy
            .or_else(|| global.map(|config| config.load_strategy))
            .unwrap_or_default();
        let mut config = EngineConfig::new().with_load_strategy(strategy);
        if !overrides.is_empty() {
            config = config.with_path_overrides(overrides);
        }
        Some(config)
    }
}

/// What a command needs besides its arguments
pub struct CommandContext {
    /// Wired services
    pub services: ServiceRegistry,
    /// Default configuration from the config file
    pub global: Option<EngineConfig>,
}

impl CommandContext {
    fn version_id(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_string)
            .unwrap_or_else(|| self.services.preferences().selected_version_id())
    }
}

/// Run a command, writing its output to `out`
///
/// Returns `false` when the command ran but reports failure.
pub async fn run<W: Write>(command: Command, ctx: &CommandContext, out: &mut W) -> Result<bool> {
    match command {
        Command::Versions => list_versions(ctx, out),
        Command::Resolve(target) => {
            let plan = resolve(ctx, &target);
            writeln!(out, "{}", serde_json::to_string_pretty(&plan)?)?;
            Ok(true)
        }
        Command::Validate(target) => {
            let plan = resolve(ctx, &target);
            let result = ctx.services.artifacts().validate(&plan);
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
            Ok(result.is_success())
        }
        Command::Load(target) => {
            let plan = resolve(ctx, &target);
            let artifacts = ctx
                .services
                .artifacts()
                .load(&plan)
                .with_context(|| format!("Failed to load artifacts for {}", plan.version))?;
            writeln!(out, "version:    {}", artifacts.version_id)?;
            writeln!(out, "detector:   {} bytes", artifacts.detector.len())?;
            writeln!(out, "classifier: {} bytes", artifacts.classifier.len())?;
            writeln!(out, "recognizer: {} bytes", artifacts.recognizer.len())?;
            writeln!(out, "dictionary: {} entries", artifacts.dictionary.len())?;
            Ok(true)
        }
        Command::Download { version } => download(ctx, version.as_deref(), out).await,
        Command::Select { id } => {
            if VersionCatalog::get(&id).is_none() {
                anyhow::bail!("Unknown model version {}", id);
            }
            ctx.services
                .preferences()
                .set_selected_version_id(&id)
                .context("Failed to save preferences")?;
            writeln!(out, "Selected {}", VersionCatalog::lookup(&id))?;
            Ok(true)
        }
        Command::Selected => {
            writeln!(out, "{}", ctx.services.preferences().selected_version_id())?;
            Ok(true)
        }
    }
}

fn resolve(ctx: &CommandContext, target: &TargetArgs) -> ocr_artifacts_service::ResolutionPlan {
    let version_id = ctx.version_id(target.version.as_deref());
    let instance = target.instance_config(ctx.global.as_ref());
    ctx.services.artifacts().resolve(&version_id, instance.as_ref())
}

fn list_versions<W: Write>(ctx: &CommandContext, out: &mut W) -> Result<bool> {
    let selected = ctx.services.preferences().selected_version();
    for version in VersionCatalog::all() {
        let marker = if version.id == selected.id { "*" } else { " " };
        let status = if version.is_bundled() {
            "bundled"
        } else if ctx.services.downloads().is_version_downloaded(version) {
            "downloaded"
        } else {
            "remote"
        };
        writeln!(
            out,
            "{} {:<4} {:<10} {}",
            marker, version.id, version.display_name, status
        )?;
    }
    Ok(true)
}

async fn download<W: Write>(ctx: &CommandContext, requested: Option<&str>, out: &mut W) -> Result<bool> {
    let version = VersionCatalog::lookup(&ctx.version_id(requested));
    info!("Downloading models for {}", version);

    let last_percent = Mutex::new(None::<u32>);
    let on_progress = |fraction: f32| {
        let percent = (fraction * 100.0).round() as u32;
        if let Ok(mut last) = last_percent.lock() {
            if *last != Some(percent) {
                *last = Some(percent);
                eprint!("\rDownloading {}: {:>3}%", version.id, percent);
            }
        }
    };

    let outcome = ctx
        .services
        .downloads()
        .download_version(version, &on_progress)
        .await
        .with_context(|| format!("Failed to download models for {}", version))?;

    match outcome {
        DownloadOutcome::AlreadyPresent => {
            writeln!(out, "All models for {} already exist", version)?;
        }
        DownloadOutcome::Downloaded(count) => {
            eprintln!();
            writeln!(out, "Downloaded {} files for {}", count, version)?;
        }
    }
    Ok(true)
}
