//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// How averaged radiance is mapped into displayable range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMap {
    /// Divide by the brightest channel in the image
    #[default]
    Normalize,
    /// Clamp every channel to 1
    Clamp,
}

/// Settings for one progressive photon-mapping render.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Photons emitted per iteration (across all lights)
    pub photons_per_iteration: usize,
    /// Number of progressive passes
    pub iterations: u32,
    /// Maximum path length for photons and camera rays
    pub max_depth: u32,
    /// Camera rays per pixel per iteration
    pub samples_per_pixel: u32,
    /// Gather radius of the first iteration
    pub initial_radius: f32,
    /// Fraction of photons kept between iterations, in (0, 1)
    pub alpha: f32,
    /// Minimum ray parameter for secondary rays
    pub ray_epsilon: f32,
    /// Camera paths stop once every throughput channel falls below this
    pub throughput_cutoff: f32,
    /// Fixed number of photon work units per iteration
    pub photon_workers: usize,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    pub seed: u64,
    pub tone_map: ToneMap,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            photons_per_iteration: 200_000,
            iterations: 16,
            max_depth: 16,
            samples_per_pixel: 1,
            initial_radius: 0.2,
            alpha: 0.75,
            ray_epsilon: 1e-4,
            throughput_cutoff: 1e-4,
            photon_workers: 64,
            bucket_size: 32,
            seed: 0x5EED,
            tone_map: ToneMap::Normalize,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));
        if self.iterations == 0 {
            return invalid("iterations must be at least 1");
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1");
        }
        if self.photon_workers == 0 {
            return invalid("photon_workers must be at least 1");
        }
        if self.bucket_size == 0 {
            return invalid("bucket_size must be at least 1");
        }
        if !(self.initial_radius > 0.0 && self.initial_radius.is_finite()) {
            return invalid("initial_radius must be positive");
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return invalid("alpha must lie in (0, 1)");
        }
        if !(self.ray_epsilon >= 0.0) {
            return invalid("ray_epsilon must be non-negative");
        }
        if !(self.throughput_cutoff >= 0.0) {
            return invalid("throughput_cutoff must be non-negative");
        }
        Ok(())
    }
}

/// Radius for the pass after `iteration`: `r * sqrt((i + α) / (i + 1))`.
pub fn shrink_radius(radius: f32, iteration: u32, alpha: f32) -> f32 {
    let i = iteration as f32;
    radius * ((i + alpha) / (i + 1.0)).sqrt()
}
