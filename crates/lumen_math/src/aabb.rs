use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (octree).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

/// Minimum extent of a padded box along any axis.
const MIN_EXTENT: f32 = 0.0001;

impl Aabb {
    /// Create a new AABB from three intervals, padding flat axes.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(
            Interval::new(lo.x, hi.x),
            Interval::new(lo.y, hi.y),
            Interval::new(lo.z, hi.z),
        )
    }

    /// Bounding box of a triangle, padded so axis-aligned triangles keep volume.
    pub fn from_triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::from_points(a.min(b).min(c), a.max(b).max(c))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub fn extent(&self) -> Vec3 {
        self.max() - self.min()
    }

    /// Returns true if the box contains nothing.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Inclusive box/box overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !self.x.intersect(&other.x).is_empty()
            && !self.y.intersect(&other.y).is_empty()
            && !self.z.intersect(&other.z).is_empty()
    }

    /// One of the eight children obtained by halving every axis.
    ///
    /// Bit 0 of `index` selects the upper half in X, bit 1 in Y, bit 2 in Z.
    pub fn octant(&self, index: usize) -> Aabb {
        let lo = self.min();
        let hi = self.max();
        let mid = self.centroid();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if index & bit != 0 {
                Interval::new(mid, hi)
            } else {
                Interval::new(lo, mid)
            }
        };
        Aabb {
            x: pick(1, lo.x, mid.x, hi.x),
            y: pick(2, lo.y, mid.y, hi.y),
            z: pick(4, lo.z, mid.z, hi.z),
        }
    }

    /// Clip a ray parameter range against this box using the slab method.
    ///
    /// Returns the parameter range inside the box, or `None` on a miss.
    pub fn hit_range(&self, r: &Ray, mut ray_t: Interval) -> Option<Interval> {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (slab.min - r.origin[axis]) * adinv;
            let mut t1 = (slab.max - r.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // f32::max/min ignore the NaN produced by 0 * inf
            ray_t.min = ray_t.min.max(t0);
            ray_t.max = ray_t.max.min(t1);
            if ray_t.max < ray_t.min {
                return None;
            }
        }
        Some(ray_t)
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}
