use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The direction is not required to be unit length. Parametric distances
/// are measured in multiples of `direction`, so callers that transform rays
/// (e.g. into an object's local space) keep `t` consistent between spaces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Copy of this ray with a unit-length direction.
    pub fn normalized(&self) -> Self {
        Self::new(self.origin, self.direction.normalize())
    }
}
