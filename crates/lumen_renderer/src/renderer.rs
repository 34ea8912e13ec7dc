//! Progressive photon-mapping driver.
//!
//! Every iteration traces a fresh photon map, gathers it from every pixel
//! with the current radius, adds the result to the film and then shrinks
//! the radius. Averaging the iterations converges to the unbiased image.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::config::{shrink_radius, RenderConfig};
use crate::error::RenderResult;
use crate::film::Film;
use crate::integrator::GatherContext;
use crate::photon::PhotonMap;
use crate::scene::Scene;
use crate::tracer::{total_power, trace_photons};

/// Summary of a finished iteration, passed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct IterationReport {
    /// 0-based iteration index
    pub iteration: u32,
    pub photons_stored: usize,
    /// Gather radius used by this iteration
    pub radius: f32,
    pub elapsed: Duration,
}

pub struct PhotonMapper {
    config: RenderConfig,
}

impl PhotonMapper {
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render all iterations and return the accumulated film.
    pub fn render(&self, scene: &Scene) -> Film {
        self.render_with(scene, |_, _| {})
    }

    /// Like [`render`](Self::render), calling `on_iteration` after every pass.
    pub fn render_with<F>(&self, scene: &Scene, mut on_iteration: F) -> Film
    where
        F: FnMut(&IterationReport, &Film),
    {
        let config = &self.config;
        let camera = scene.camera();
        let (width, height) = (camera.image_width, camera.image_height);
        let buckets = generate_buckets(width, height, config.bucket_size);
        let mut film = Film::new(width, height);
        let mut radius = config.initial_radius;

        info!(
            "Rendering {}x{}: {} iterations, {} photons per iteration, {} buckets",
            width,
            height,
            config.iterations,
            config.photons_per_iteration,
            buckets.len()
        );
        if scene.light_count() == 0 {
            warn!("Scene has no lights; only background and ambient light will be visible");
        }

        for iteration in 0..config.iterations {
            let start = Instant::now();
            info!("Iteration {}/{}: tracing photons", iteration + 1, config.iterations);

            let photons = trace_photons(scene, config, iteration);
            let stored = photons.len();
            info!("Stored {} photons (total power {:?})", stored, total_power(&photons));

            let map = PhotonMap::build(photons);
            info!("Built k-d tree over {} photons", map.len());

            let ctx = GatherContext {
                scene,
                photons: &map,
                radius,
                emitted: config.photons_per_iteration,
                config,
            };

            let done = AtomicUsize::new(0);
            let results: Vec<BucketResult> = buckets
                .par_iter()
                .map(|bucket| {
                    let result = render_bucket(bucket, &ctx, iteration);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("Bucket {}/{} done", finished, buckets.len());
                    result
                })
                .collect();

            let skipped: usize = results.iter().map(|r| film.add_bucket(r)).sum();
            if skipped > 0 {
                debug!("Skipped {} invalid pixel values", skipped);
            }
            film.finish_iteration();

            let report = IterationReport {
                iteration,
                photons_stored: stored,
                radius,
                elapsed: start.elapsed(),
            };
            info!(
                "Iteration {}/{} finished in {:.2?} (radius {:.5})",
                iteration + 1,
                config.iterations,
                report.elapsed,
                radius
            );

            radius = shrink_radius(radius, iteration, config.alpha);
            on_iteration(&report, &film);
        }

        film
    }
}
