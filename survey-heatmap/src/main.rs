#![cfg(feature = "generator")]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use survey_core::{Clock, ManualClock, SimSettings, Simulation, SystemClock};
use survey_heatmap::generator::build_survey_image;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs a scripted survey headless and writes its coverage heat map", long_about = None)]
struct Args {
    /// JSON settings file; defaults apply when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Lua control script, overriding the one named in the settings
    #[arg(long)]
    script: Option<PathBuf>,

    /// Where to write the heat map PNG
    #[arg(short, long, default_value = "coverage.png")]
    output: PathBuf,

    /// Run on a virtual clock as fast as possible instead of in real time
    #[arg(short, long)]
    fast: bool,

    /// Enable debug logging of every host call
    #[arg(short, long)]
    debug: bool,
}

fn load_settings(args: &Args) -> Result<SimSettings> {
    let mut settings = match &args.settings {
        Some(path) => SimSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SimSettings::default(),
    };
    if let Some(script) = &args.script {
        settings.script_path = script.clone();
    }
    Ok(settings)
}

fn run(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;
    let simulation = Simulation::new(settings).context("Invalid settings")?;
    log::info!(
        "Running {} at {}x simulation speed",
        simulation.settings().script_path.display(),
        simulation.settings().simulation_speed
    );

    let clock: Box<dyn Clock> = if args.fast {
        Box::new(ManualClock::new())
    } else {
        Box::new(SystemClock::new())
    };
    let outcome = simulation.run(clock, None).context("Survey failed")?;

    for line in outcome.report.to_string().lines() {
        log::info!("{}", line);
    }
    log::info!(
        "{} photos, {} path samples",
        outcome.report.photo_count,
        outcome.report.path_samples
    );

    let image = build_survey_image(&outcome.coverage).context("Failed to build heat map")?;
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(err) = run(&args) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
