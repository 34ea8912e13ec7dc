//! `lumen`: render a built-in scene with progressive photon mapping.

mod cli;
mod scenes;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use lumen_renderer::{PhotonMapper, RenderConfig};

use cli::Args;

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    args.apply(&mut config);

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mapper = PhotonMapper::new(config).context("invalid render configuration")?;
    let scene = scenes::build(&args)?;
    let gamma = scene.camera().gamma();
    let tone_map = mapper.config().tone_map;

    if let Some(dir) = &args.snapshots {
        fs::create_dir_all(dir).with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }

    let film = mapper.render_with(&scene, |report, film| {
        if let Some(dir) = &args.snapshots {
            let path = dir.join(format!("iteration_{:04}.png", report.iteration + 1));
            if let Err(err) = film.tone_map(gamma, tone_map).save(&path) {
                warn!("Could not write snapshot {}: {}", path.display(), err);
            }
        }
    });

    film.tone_map(gamma, tone_map)
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Done after {} iterations", film.iterations());
    Ok(())
}
