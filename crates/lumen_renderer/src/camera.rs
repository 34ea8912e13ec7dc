//! Perspective camera.
//!
//! The image plane sits at `focus_dist` in front of the eye. With a zero
//! defocus angle every ray starts at the eye (pinhole); otherwise ray origins
//! are spread over a lens disk whose rays all converge on that plane.

use crate::sampling::{gen_f32, in_unit_disk};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Image plane and lens derived from the camera settings.
#[derive(Debug, Clone, Copy)]
struct Projection {
    /// Centre of the top-left pixel on the focus plane
    origin_pixel: Vec3,
    /// One pixel step to the right
    step_x: Vec3,
    /// One pixel step down
    step_y: Vec3,
    /// Lens disk half-axes (zero for a pinhole)
    lens_x: Vec3,
    lens_y: Vec3,
}

impl Projection {
    const UNSET: Self = Self {
        origin_pixel: Vec3::ZERO,
        step_x: Vec3::ZERO,
        step_y: Vec3::ZERO,
        lens_x: Vec3::ZERO,
        lens_y: Vec3::ZERO,
    };
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    eye: Vec3,
    target: Vec3,
    up: Vec3,

    /// Vertical field of view, degrees
    vfov: f32,
    /// Cone angle subtended by the lens at the focus plane, degrees
    defocus_angle: f32,
    focus_dist: f32,
    gamma: f32,

    projection: Projection,
}

impl Camera {
    /// 800x450 pinhole at the origin looking down -Z.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 450,
            eye: Vec3::ZERO,
            target: -Vec3::Z,
            up: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            gamma: 2.0,
            projection: Projection::UNSET,
        };
        camera.initialize();
        camera
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    pub fn with_position(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        self.eye = eye;
        self.target = target;
        self.up = up;
        self
    }

    /// Field of view, lens cone angle (both degrees) and focus distance.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle.max(0.0);
        self.focus_dist = focus_dist;
        self
    }

    /// Display gamma used when the film is tone mapped.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Recompute the projection. Builders do not call this themselves.
    pub fn initialize(&mut self) {
        let back = (self.eye - self.target).normalize_or_zero();
        let right = self.up.cross(back).normalize_or_zero();
        let up = back.cross(right);

        let half_height = (0.5 * self.vfov.to_radians()).tan() * self.focus_dist;
        let half_width = half_height * self.image_width as f32 / self.image_height as f32;

        let step_x = right * (2.0 * half_width / self.image_width as f32);
        let step_y = -up * (2.0 * half_height / self.image_height as f32);
        let top_left = self.eye - back * self.focus_dist - right * half_width + up * half_height;

        let lens_radius = self.focus_dist * (0.5 * self.defocus_angle.to_radians()).tan();

        self.projection = Projection {
            origin_pixel: top_left + 0.5 * (step_x + step_y),
            step_x,
            step_y,
            lens_x: right * lens_radius,
            lens_y: up * lens_radius,
        };
    }

    /// Unit-direction ray through a random point of pixel `(x, y)`,
    /// counted from the top-left corner.
    pub fn sample_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let p = &self.projection;
        let jitter_x = gen_f32(rng) - 0.5;
        let jitter_y = gen_f32(rng) - 0.5;
        let target = p.origin_pixel + (x as f32 + jitter_x) * p.step_x + (y as f32 + jitter_y) * p.step_y;

        let origin = if self.defocus_angle > 0.0 {
            let d = in_unit_disk(rng);
            self.eye + d.x * p.lens_x + d.y * p.lens_y
        } else {
            self.eye
        };
        Ray::new(origin, (target - origin).normalize())
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn position(&self) -> Vec3 {
        self.eye
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_default_gamma_and_position() {
        let camera = pinhole(800, 600);
        assert_eq!(camera.position(), Vec3::ZERO);
        assert_eq!(camera.gamma(), 2.0);
        assert_eq!(Camera::new().with_gamma(2.2).gamma(), 2.2);
    }

    #[test]
    fn test_zero_resolution_is_clamped() {
        let camera = Camera::new().with_resolution(0, 0);
        assert_eq!((camera.image_width, camera.image_height), (1, 1));
    }

    #[test]
    fn test_ray_directions() {
        let camera = pinhole(100, 100);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.sample_ray(50, 50, &mut rng);
        assert!(ray.direction.z < -0.99);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);

        // Top-left looks up and left, bottom-right down and right
        let ray = camera.sample_ray(0, 0, &mut rng);
        assert!(ray.direction.x < 0.0 && ray.direction.y > 0.0);
        let ray = camera.sample_ray(99, 99, &mut rng);
        assert!(ray.direction.x > 0.0 && ray.direction.y < 0.0);
    }

    #[test]
    fn test_field_of_view_edges() {
        // 90 degrees: the image plane at distance 1 spans [-1, 1]
        let camera = pinhole(2, 2);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..64 {
            let ray = camera.sample_ray(1, 0, &mut rng);
            let p = ray.at(-1.0 / ray.direction.z);
            assert!((0.0..=1.0 + 1e-4).contains(&p.x));
            assert!((0.0..=1.0 + 1e-4).contains(&p.y));
        }
    }

    #[test]
    fn test_lens_camera_focuses() {
        let mut camera = Camera::new()
            .with_resolution(64, 64)
            .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
            .with_lens(40.0, 10.0, 5.0);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);
        let mut origins_differ = false;
        for _ in 0..32 {
            let ray = camera.sample_ray(32, 32, &mut rng);
            origins_differ |= ray.origin != Vec3::ZERO;
            // Rays through the central pixel meet the focus plane near the axis
            let p = ray.at((-5.0 - ray.origin.z) / ray.direction.z);
            assert!(p.x.abs() < 0.2 && p.y.abs() < 0.2);
        }
        assert!(origins_differ);
    }
}
