// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod frame;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use frame::Frame;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// RGB color in linear space.
pub type Color = Vec3;

/// Largest channel of a color.
#[inline]
pub fn max_channel(c: Color) -> f32 {
    c.max_element()
}

/// True when every channel is finite and non-negative.
///
/// Photon power and pixel samples failing this test are dropped.
#[inline]
pub fn is_valid_color(c: Color) -> bool {
    c.is_finite() && c.min_element() >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_channel() {
        assert_eq!(max_channel(Color::new(0.1, 0.7, 0.3)), 0.7);
        assert_eq!(max_channel(Color::ZERO), 0.0);
    }

    #[test]
    fn test_valid_color() {
        assert!(is_valid_color(Color::new(0.0, 1.0, 2.0)));
        assert!(!is_valid_color(Color::new(-0.1, 1.0, 2.0)));
        assert!(!is_valid_color(Color::new(f32::NAN, 0.0, 0.0)));
        assert!(!is_valid_color(Color::new(0.0, f32::INFINITY, 0.0)));
    }
}
