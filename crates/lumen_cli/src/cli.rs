use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::{RenderConfig, ToneMap};

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Closed room with an area light, a mirror ball and a glass ball
    Cornell,
    /// Open floor lit by a point light and a spot light
    Spheres,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ToneMapArg {
    Normalize,
    Clamp,
}

impl From<ToneMapArg> for ToneMap {
    fn from(arg: ToneMapArg) -> Self {
        match arg {
            ToneMapArg::Normalize => ToneMap::Normalize,
            ToneMapArg::Clamp => ToneMap::Clamp,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Progressive photon-mapping renderer")]
pub struct Args {
    /// Output image (.png, .jpg, ... by extension)
    #[arg(short, long, default_value = "lumen.png")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value = "cornell")]
    pub scene: SceneKind,

    /// Image width in pixels
    #[arg(long, default_value = "512")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "512")]
    pub height: u32,

    /// JSON render configuration; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of progressive iterations
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// Photons emitted per iteration
    #[arg(short, long)]
    pub photons: Option<usize>,

    /// Initial gather radius
    #[arg(long)]
    pub radius: Option<f32>,

    /// Camera rays per pixel per iteration
    #[arg(long)]
    pub spp: Option<u32>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum)]
    pub tone_map: Option<ToneMapArg>,

    /// OBJ mesh placed in the middle of the scene
    #[arg(long)]
    pub mesh: Option<PathBuf>,

    /// Image texture for the floor
    #[arg(long)]
    pub floor_texture: Option<PathBuf>,

    /// Write a tone-mapped snapshot here after every iteration
    #[arg(long)]
    pub snapshots: Option<PathBuf>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(photons) = self.photons {
            config.photons_per_iteration = photons;
        }
        if let Some(radius) = self.radius {
            config.initial_radius = radius;
        }
        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(tone_map) = self.tone_map {
            config.tone_map = tone_map.into();
        }
    }
}
