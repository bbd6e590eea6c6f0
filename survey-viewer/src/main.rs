use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use macroquad::window::Conf;
use survey_core::SimSettings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live view of a scripted aerial survey", long_about = None)]
struct Args {
    /// JSON settings file; defaults apply when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Lua control script, overriding the one named in the settings
    #[arg(long)]
    script: Option<PathBuf>,

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
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn window_conf() -> Conf {
    let defaults = SimSettings::default();
    Conf {
        window_title: "Drone Survey".to_owned(),
        window_width: defaults.width as i32,
        window_height: defaults.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{:#}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = survey_viewer_lib::run(settings).await {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
