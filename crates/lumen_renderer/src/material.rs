//! Scattering models.
//!
//! All directions are expressed in the local shading frame (`z` is the
//! shading normal) and both point away from the surface: `incoming` toward
//! the previous vertex of the walk, `outgoing` toward the next one. Opaque
//! materials are two-sided; the hemisphere is chosen by the sign of
//! `incoming.z`.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::hittable::HitSurface;
use crate::sampling::{cosine_hemisphere, gen_f32, power_cosine};
use lumen_core::Texture;
use lumen_math::{max_channel, Color, Frame, Vec3};
use rand::RngCore;

/// Which end of the light path a walk started from.
///
/// Refraction scales radiance by the squared index ratio but leaves
/// importance untouched, so the dielectric needs to know the direction of
/// transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Photon tracing from the lights
    Light,
    /// Eye rays from the camera
    Camera,
}

/// Kind of lobe a sample was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterKind {
    /// Drawn from a cosine-weighted diffuse lobe
    Diffuse,
    /// Mirror, refraction, glossy lobe or absorption; walks continue
    Specular,
}

/// One importance-sampled scattering event.
#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    /// Outgoing direction (local frame)
    pub direction: Vec3,
    /// Probability of this sample including lobe selection
    pub pdf: f32,
    /// BSDF value for the sampled pair
    pub weight: Color,
    pub kind: ScatterKind,
}

impl BsdfSample {
    /// Absorbed sample: zero weight with a pdf of one so callers never divide by zero.
    pub fn absorbed() -> Self {
        Self {
            direction: Vec3::Z,
            pdf: 1.0,
            weight: Color::ZERO,
            kind: ScatterKind::Specular,
        }
    }

    pub fn is_absorbed(&self) -> bool {
        self.weight == Color::ZERO
    }

    /// Path throughput factor `weight * |cos| / pdf`.
    pub fn throughput(&self) -> Color {
        self.weight * self.direction.z.abs() / self.pdf
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Evaluate the BSDF for a pair of local directions.
    fn shade(&self, incoming: Vec3, outgoing: Vec3, mode: TransportMode) -> Color;

    /// Importance-sample an outgoing direction.
    fn sample(&self, incoming: Vec3, mode: TransportMode, rng: &mut dyn RngCore) -> BsdfSample;

    /// Surfaces with a diffuse component. Photons are stored here and eye
    /// walks gather here, whichever lobe a sample would pick.
    fn is_diffuse(&self) -> bool {
        false
    }

    /// Optional color texture modulating the BSDF.
    fn texture(&self) -> Option<&Texture> {
        None
    }

    /// Texture modulation at a hit, white when untextured.
    fn texture_color(&self, surface: &HitSurface) -> Color {
        match self.texture() {
            Some(texture) if surface.has_texture => texture.sample(surface.uv),
            _ => Color::ONE,
        }
    }
}

/// Material of an empty hit record. Absorbs everything.
pub struct Absorber;

impl Material for Absorber {
    fn shade(&self, _incoming: Vec3, _outgoing: Vec3, _mode: TransportMode) -> Color {
        Color::ZERO
    }

    fn sample(&self, _incoming: Vec3, _mode: TransportMode, _rng: &mut dyn RngCore) -> BsdfSample {
        BsdfSample::absorbed()
    }
}

/// Static absorber instance for `HitRecord::default()`.
pub static ABSORBER: Absorber = Absorber;

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Color,
    texture: Option<Arc<Texture>>,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Material for Lambertian {
    fn shade(&self, incoming: Vec3, outgoing: Vec3, _mode: TransportMode) -> Color {
        if !same_hemisphere(incoming, outgoing) {
            return Color::ZERO;
        }
        self.albedo / PI
    }

    fn sample(&self, incoming: Vec3, _mode: TransportMode, rng: &mut dyn RngCore) -> BsdfSample {
        let direction = flip_to(cosine_hemisphere(rng), incoming);
        let pdf = direction.z.abs() / PI;
        if pdf <= 0.0 {
            return BsdfSample::absorbed();
        }
        BsdfSample {
            direction,
            pdf,
            weight: self.albedo / PI,
            kind: ScatterKind::Diffuse,
        }
    }

    fn is_diffuse(&self) -> bool {
        true
    }

    fn texture(&self) -> Option<&Texture> {
        self.texture.as_deref()
    }
}

/// Phong material: a Lambertian lobe plus a glossy lobe around the mirror direction.
///
/// The lobe is picked with probability proportional to its reflectance;
/// whatever is left over is absorbed.
#[derive(Clone)]
pub struct Glossy {
    diffuse: Color,
    specular: Color,
    exponent: f32,
    texture: Option<Arc<Texture>>,
}

impl Glossy {
    /// - `diffuse`: Lambertian reflectance
    /// - `specular`: glossy reflectance
    /// - `exponent`: Phong exponent, higher is sharper
    pub fn new(diffuse: Color, specular: Color, exponent: f32) -> Self {
        Self {
            diffuse,
            specular,
            exponent: exponent.max(0.0),
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Probabilities of sampling the diffuse and the glossy lobe.
    fn lobe_probabilities(&self) -> (f32, f32) {
        let total = self.diffuse + self.specular;
        let p_reflect = max_channel(total).min(1.0);
        let sum = total.element_sum();
        if sum <= 0.0 {
            return (0.0, 0.0);
        }
        let p_diffuse = p_reflect * self.diffuse.element_sum() / sum;
        (p_diffuse, p_reflect - p_diffuse)
    }

    fn glossy_value(&self, incoming: Vec3, outgoing: Vec3) -> Color {
        let cos_alpha = mirror(incoming).dot(outgoing).max(0.0);
        self.specular * (self.exponent + 2.0) / (2.0 * PI) * cos_alpha.powf(self.exponent)
    }
}

impl Material for Glossy {
    fn shade(&self, incoming: Vec3, outgoing: Vec3, _mode: TransportMode) -> Color {
        if !same_hemisphere(incoming, outgoing) {
            return Color::ZERO;
        }
        self.diffuse / PI + self.glossy_value(incoming, outgoing)
    }

    fn sample(&self, incoming: Vec3, _mode: TransportMode, rng: &mut dyn RngCore) -> BsdfSample {
        let (p_diffuse, p_glossy) = self.lobe_probabilities();
        let u = gen_f32(rng);

        if u < p_diffuse {
            let direction = flip_to(cosine_hemisphere(rng), incoming);
            let pdf = p_diffuse * direction.z.abs() / PI;
            if pdf <= 0.0 {
                return BsdfSample::absorbed();
            }
            return BsdfSample {
                direction,
                pdf,
                weight: self.diffuse / PI,
                kind: ScatterKind::Diffuse,
            };
        }

        if u < p_diffuse + p_glossy {
            let lobe = Frame::from_normal(mirror(incoming));
            let local = power_cosine(rng, self.exponent);
            let direction = lobe.to_world(local);
            if !same_hemisphere(incoming, direction) {
                return BsdfSample::absorbed();
            }
            let lobe_pdf = (self.exponent + 1.0) / (2.0 * PI) * local.z.powf(self.exponent);
            let pdf = p_glossy * lobe_pdf;
            if pdf <= 0.0 {
                return BsdfSample::absorbed();
            }
            return BsdfSample {
                direction,
                pdf,
                weight: self.glossy_value(incoming, direction),
                kind: ScatterKind::Specular,
            };
        }

        BsdfSample::absorbed()
    }

    fn is_diffuse(&self) -> bool {
        true
    }

    fn texture(&self) -> Option<&Texture> {
        self.texture.as_deref()
    }
}

/// Perfect mirror.
#[derive(Clone)]
pub struct Mirror {
    color: Color,
}

impl Mirror {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Material for Mirror {
    /// Delta distribution: zero for any finite pair of directions.
    fn shade(&self, _incoming: Vec3, _outgoing: Vec3, _mode: TransportMode) -> Color {
        Color::ZERO
    }

    fn sample(&self, incoming: Vec3, _mode: TransportMode, _rng: &mut dyn RngCore) -> BsdfSample {
        specular_sample(mirror(incoming), self.color)
    }
}

/// Dielectric (glass) material.
///
/// The shading normal points to the outside, so `incoming.z > 0` means the
/// walk is entering the medium.
#[derive(Clone)]
pub struct Dielectric {
    color: Color,
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(color: Color, ior: f32) -> Self {
        Self { color, ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, eta_i: f32, eta_t: f32) -> f32 {
        let r0 = ((eta_i - eta_t) / (eta_i + eta_t)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn shade(&self, _incoming: Vec3, _outgoing: Vec3, _mode: TransportMode) -> Color {
        Color::ZERO
    }

    fn sample(&self, incoming: Vec3, mode: TransportMode, rng: &mut dyn RngCore) -> BsdfSample {
        let entering = incoming.z > 0.0;
        let (eta_i, eta_t) = if entering { (1.0, self.ior) } else { (self.ior, 1.0) };
        let eta = eta_i / eta_t;

        let cos_i = incoming.z.abs();
        let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);

        let reflected = mirror(incoming);
        if sin2_t >= 1.0 {
            // Total internal reflection
            return specular_sample(reflected, self.color);
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        // Schlick uses the cosine on the optically thinner side
        let cos_fresnel = if eta_i <= eta_t { cos_i } else { cos_t };
        if gen_f32(rng) < Self::reflectance(cos_fresnel, eta_i, eta_t) {
            return specular_sample(reflected, self.color);
        }

        let normal = Vec3::Z * incoming.z.signum();
        let refracted = (-incoming * eta + normal * (eta * cos_i - cos_t)).normalize_or_zero();

        let mut color = self.color;
        if mode == TransportMode::Camera && eta_t > eta_i {
            color *= eta * eta;
        }
        specular_sample(refracted, color)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Deterministic pdf-1 sample whose throughput is exactly `color`.
fn specular_sample(direction: Vec3, color: Color) -> BsdfSample {
    if direction.z.abs() <= f32::EPSILON {
        return BsdfSample::absorbed();
    }
    BsdfSample {
        direction,
        pdf: 1.0,
        weight: color / direction.z.abs(),
        kind: ScatterKind::Specular,
    }
}

/// Mirror a local direction about the shading normal.
#[inline]
fn mirror(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, -v.y, v.z)
}

#[inline]
fn same_hemisphere(a: Vec3, b: Vec3) -> bool {
    a.z * b.z > 0.0
}

/// Move a z-up sample to the side of `reference`.
#[inline]
fn flip_to(v: Vec3, reference: Vec3) -> Vec3 {
    if reference.z < 0.0 {
        Vec3::new(v.x, v.y, -v.z)
    } else {
        v
    }
}
