//! vitrail: turn an image into a stained glass mosaic from the command line.
//!
//! Loads an image file, drives the mosaic engine with the requested
//! settings, and exports the rendered raster. The `session` subcommand
//! replays a scripted sequence of setting changes the way an interactive
//! front end would, which makes the engine's cache tiers visible.
//!
//! # Usage
//!
//! ```text
//! vitrail render photo.jpg -o mosaic.png --set K=5 --set ColorScheme=pop
//! vitrail session photo.jpg --script steps.json --output-dir frames/
//! vitrail settings
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use vitrail_pipeline::cache::{DEFAULT_CONTOUR_CAPACITY, DEFAULT_FULL_CAPACITY};
use vitrail_pipeline::{
    CacheConfig, EngineConfig, MosaicEngine, RgbImage, Setting, SettingValue, Settings,
};

/// Stained glass mosaics from raster images.
#[derive(Parser)]
#[command(name = "vitrail", version)]
struct Cli {
    /// Log at debug level. `RUST_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one mosaic and write it to a file.
    Render(RenderArgs),
    /// Replay a scripted sequence of setting changes.
    Session(SessionArgs),
    /// List the recognized settings and their defaults.
    Settings,
}

/// Render cache capacities.
#[derive(Args)]
struct CacheArgs {
    /// Finished rasters kept in the full-render cache.
    #[arg(long, default_value_t = DEFAULT_FULL_CAPACITY)]
    full_cache: usize,

    /// Traced region sets kept in the contour cache.
    #[arg(long, default_value_t = DEFAULT_CONTOUR_CAPACITY)]
    contour_cache: usize,
}

impl CacheArgs {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cache: CacheConfig::new(self.full_cache, self.contour_cache),
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Output path; the format follows the extension.
    #[arg(short, long)]
    output: PathBuf,

    /// Set one setting, e.g. `--set K=5`. Repeatable; applied after
    /// `--settings-json`.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(Setting, SettingValue)>,

    /// Full settings as a JSON object, e.g. `{"K": 4, "ColorScheme": "pop"}`.
    /// Missing fields keep their defaults.
    #[arg(long)]
    settings_json: Option<String>,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    cache: CacheArgs,
}

#[derive(Args)]
struct SessionArgs {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// JSON array of `{"setting": NAME, "value": VALUE}` steps.
    #[arg(long)]
    script: PathBuf,

    /// Save every published frame as `frame-NNN.png` in this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(flatten)]
    cache: CacheArgs,
}

/// One scripted setting change.
#[derive(Debug, Deserialize)]
struct Step {
    setting: String,
    value: SettingValue,
}

/// Parse `NAME=VALUE` into a typed assignment.
fn parse_assignment(s: &str) -> Result<(Setting, SettingValue), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    let setting: Setting = name.parse().map_err(|e| format!("{e}"))?;
    let value: SettingValue = value.parse().map_err(|e| format!("{e}"))?;
    Ok((setting, value))
}

/// Install the stderr log subscriber.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "vitrail=debug,vitrail_pipeline=debug"
    } else {
        "vitrail=info,vitrail_pipeline=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_image(path: &Path) -> Result<RgbImage, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "read input image");
    vitrail_pipeline::decode(&bytes).map_err(|e| format!("Error decoding {}: {e}", path.display()))
}

fn save_raster(raster: &Arc<RgbImage>, path: &Path) -> Result<(), String> {
    raster
        .save(path)
        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    info!(path = %path.display(), "wrote mosaic");
    Ok(())
}

fn settings_from_args(args: &RenderArgs) -> Result<Settings, String> {
    let mut settings = match args.settings_json {
        Some(ref json) => serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --settings-json: {e}"))?,
        None => Settings::default(),
    };
    for &(setting, value) in &args.assignments {
        settings
            .set(setting, value)
            .map_err(|e| format!("Error in --set {setting}={value}: {e}"))?;
    }
    Ok(settings)
}

fn run_render(args: &RenderArgs) -> Result<(), String> {
    let settings = settings_from_args(args)?;
    let image = load_image(&args.input)?;

    let mut engine = MosaicEngine::with_config(args.cache.engine_config());
    engine
        .apply_settings(settings)
        .map_err(|e| format!("Error applying settings: {e}"))?;
    let raster = engine
        .set_image(image)
        .map_err(|e| format!("Render error: {e}"))?;
    save_raster(&raster, &args.output)?;

    if args.json {
        let json = serde_json::to_string_pretty(engine.diagnostics())
            .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", engine.diagnostics().report());
    }
    Ok(())
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame-{index:03}.png"))
}

fn run_session(args: &SessionArgs) -> Result<(), String> {
    let script = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("Error reading {}: {e}", args.script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&script)
        .map_err(|e| format!("Error parsing {}: {e}", args.script.display()))?;
    if let Some(ref dir) = args.output_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating {}: {e}", dir.display()))?;
    }

    let image = load_image(&args.input)?;
    let mut engine = MosaicEngine::with_config(args.cache.engine_config());
    let first = engine
        .set_image(image)
        .map_err(|e| format!("Render error: {e}"))?;
    print_step(0, "load image", &engine);
    if let Some(ref dir) = args.output_dir {
        save_raster(&first, &frame_path(dir, 0))?;
    }

    let mut failures = 0_usize;
    for (i, step) in steps.iter().enumerate() {
        let index = i + 1;
        let label = format!("{}={}", step.setting, step.value);
        match engine.set(&step.setting, step.value) {
            Ok(Some(raster)) => {
                print_step(index, &label, &engine);
                if let Some(ref dir) = args.output_dir {
                    save_raster(&raster, &frame_path(dir, index))?;
                }
            }
            Ok(None) => println!("{index:>4}  {label:<28} (no image loaded)"),
            Err(e) => {
                failures += 1;
                warn!(step = index, %e, "step rejected");
                println!("{index:>4}  {label:<28} rejected: {e}");
            }
        }
    }

    println!();
    println!("{}", engine.diagnostics().report());

    if failures > 0 {
        return Err(format!("{failures} of {} steps were rejected", steps.len()));
    }
    Ok(())
}

fn print_step(index: usize, label: &str, engine: &MosaicEngine) {
    let Some(last) = engine.diagnostics().last.as_ref() else {
        return;
    };
    let ms = last.total.as_secs_f64() * 1000.0;
    println!(
        "{index:>4}  {label:<28} {:<18} {ms:>9.3}ms",
        last.outcome.to_string(),
    );
}

fn print_settings() {
    let defaults = Settings::default();
    println!(
        "{:<14} {:<22} {:>10}  {}",
        "Setting", "Type", "Default", "Affects clustering"
    );
    println!("{}", "-".repeat(68));
    for setting in Setting::ALL {
        println!(
            "{:<14} {:<22} {:>10}  {}",
            setting.name(),
            setting.value_type(),
            defaults.value(setting).to_string(),
            if setting.affects_clustering() { "yes" } else { "no" },
        );
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Render(ref args) => run_render(args),
        Command::Session(ref args) => run_session(args),
        Command::Settings => {
            print_settings();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}
