//! Image tiles for the gather pass.
//!
//! Every iteration re-renders the whole frame one tile at a time; tiles are
//! independent and each draws from its own seeded generator.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::integrator::GatherContext;
use crate::sampling::stream_seed;
use lumen_math::{is_valid_color, Color};

/// Offset that keeps camera streams apart from photon work-unit streams.
const CAMERA_STREAM: u64 = 1 << 32;

/// Pixel rectangle `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in render order; also selects the tile's random stream
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Squared distance from the tile centre to `(cx, cy)`.
    fn distance2_to(&self, cx: f32, cy: f32) -> f32 {
        let x = self.x as f32 + 0.5 * self.width as f32 - cx;
        let y = self.y as f32 + 0.5 * self.height as f32 - cy;
        x * x + y * y
    }
}

/// Cover a `width x height` image with tiles of at most `bucket_size`
/// pixels a side, ordered centre-out.
///
/// Edge tiles are clipped to the image. Equidistant tiles keep row-major
/// order, so the result and its indices are fully determined by the inputs.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width)
                .step_by(size as usize)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        })
        .collect();

    let (cx, cy) = (0.5 * width as f32, 0.5 * height as f32);
    buckets.sort_by(|a, b| a.distance2_to(cx, cy).total_cmp(&b.distance2_to(cx, cy)));
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }
    buckets
}

/// Per-iteration radiance of one tile, row-major.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

/// Render one bucket for `iteration`.
///
/// Each pixel is the mean of `samples_per_pixel` camera paths. Invalid
/// path values are dropped and count as black.
pub fn render_bucket(bucket: &Bucket, ctx: &GatherContext<'_>, iteration: u32) -> BucketResult {
    let config = ctx.config;
    let camera = ctx.scene.camera();
    let mut rng = StdRng::seed_from_u64(stream_seed(
        config.seed,
        iteration as u64,
        CAMERA_STREAM + bucket.index as u64,
    ));
    let scale = 1.0 / config.samples_per_pixel as f32;

    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let mut color = Color::ZERO;
            for _ in 0..config.samples_per_pixel {
                let ray = camera.sample_ray(bucket.x + local_x, bucket.y + local_y, &mut rng);
                let sample = ctx.radiance(&ray, &mut rng);
                if is_valid_color(sample) {
                    color += sample;
                }
            }
            pixels.push(color * scale);
        }
    }

    BucketResult::new(*bucket, pixels)
}
