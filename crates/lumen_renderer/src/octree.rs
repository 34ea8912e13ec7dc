//! Octree over the triangles of one mesh.
//!
//! Nodes live in a flat arena and refer to their children by index. Each
//! inner node splits its box into eight octants; a triangle goes into every
//! octant its padded bounding box overlaps, so a triangle may be listed in
//! several leaves but is never missing from one it touches.

use crate::hittable::HitRecord;
use lumen_math::{Aabb, Interval, Ray};

/// Leaves hold at most this many triangles unless `MAX_DEPTH` is reached.
pub const LEAF_MAX_TRIANGLES: usize = 8;

/// Depth at which subdivision stops regardless of triangle count.
pub const MAX_DEPTH: u32 = 8;

#[derive(Debug, Clone)]
struct OctreeNode {
    bounds: Aabb,
    /// Triangle indices (leaves only)
    triangles: Vec<u32>,
    /// Arena indices of non-empty children (empty for leaves)
    children: Vec<u32>,
}

impl OctreeNode {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Build and traversal statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: u32,
    /// Sum of leaf triangle counts (duplicates included)
    pub triangle_refs: usize,
}

#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    stats: OctreeStats,
}

impl Octree {
    /// Build over `triangle_bounds[i]` for every triangle `i`, rooted at `bounds`.
    ///
    /// An empty triangle list gives a single empty leaf that every query misses.
    pub fn build(bounds: Aabb, triangle_bounds: &[Aabb]) -> Self {
        let mut octree = Self {
            nodes: Vec::new(),
            stats: OctreeStats::default(),
        };
        let all: Vec<u32> = (0..triangle_bounds.len() as u32).collect();
        octree.build_node(bounds, all, triangle_bounds, 0);

        log::debug!(
            "Octree: {} triangles, {} nodes, {} leaves, depth {}, {} leaf references",
            triangle_bounds.len(),
            octree.stats.nodes,
            octree.stats.leaves,
            octree.stats.max_depth,
            octree.stats.triangle_refs
        );
        octree
    }

    fn build_node(&mut self, bounds: Aabb, triangles: Vec<u32>, triangle_bounds: &[Aabb], depth: u32) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(OctreeNode {
            bounds,
            triangles: Vec::new(),
            children: Vec::new(),
        });
        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        if triangles.len() > LEAF_MAX_TRIANGLES && depth < MAX_DEPTH {
            let octants: Vec<(Aabb, Vec<u32>)> = (0..8)
                .map(|i| {
                    let child_bounds = bounds.octant(i);
                    let subset: Vec<u32> = triangles
                        .iter()
                        .copied()
                        .filter(|&t| triangle_bounds[t as usize].overlaps(&child_bounds))
                        .collect();
                    (child_bounds, subset)
                })
                .filter(|(_, subset)| !subset.is_empty())
                .collect();

            // Splitting helps only if some octant gets fewer triangles
            let splits = octants.iter().any(|(_, subset)| subset.len() < triangles.len());
            if splits {
                let children: Vec<u32> = octants
                    .into_iter()
                    .map(|(child_bounds, subset)| self.build_node(child_bounds, subset, triangle_bounds, depth + 1))
                    .collect();
                self.nodes[index as usize].children = children;
                return index;
            }
        }

        self.stats.leaves += 1;
        self.stats.triangle_refs += triangles.len();
        self.nodes[index as usize].triangles = triangles;
        index
    }

    pub fn stats(&self) -> OctreeStats {
        self.stats
    }

    /// Walk the nodes the ray passes through, nearest first.
    ///
    /// `test` intersects one triangle against the shared record and returns
    /// true if it recorded a closer hit. Returns true if any call did.
    pub fn traverse<'a, F>(&self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32, mut test: F) -> bool
    where
        F: FnMut(u32, &Ray, &mut HitRecord<'a>) -> bool,
    {
        let Some(root) = self.nodes.first() else {
            return false;
        };
        if root.bounds.hit_range(ray, Interval::new(t_min, rec.t)).is_none() {
            return false;
        }
        self.visit(0, ray, rec, t_min, &mut test)
    }

    fn visit<'a, F>(&self, node: u32, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32, test: &mut F) -> bool
    where
        F: FnMut(u32, &Ray, &mut HitRecord<'a>) -> bool,
    {
        let node = &self.nodes[node as usize];
        if node.is_leaf() {
            let mut hit = false;
            for &triangle in &node.triangles {
                hit |= test(triangle, ray, rec);
            }
            return hit;
        }

        // Children the ray enters before the current closest hit, by entry distance
        let mut order = [(0.0_f32, 0_u32); 8];
        let mut count = 0;
        for &child in &node.children {
            if let Some(range) = self.nodes[child as usize]
                .bounds
                .hit_range(ray, Interval::new(t_min, rec.t))
            {
                order[count] = (range.min, child);
                count += 1;
            }
        }
        let order = &mut order[..count];
        order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut hit = false;
        for &(entry, child) in order.iter() {
            if entry >= rec.t {
                break;
            }
            let found = self.visit(child, ray, rec, t_min, test);
            hit |= found;
            // Later children start beyond this box, so nothing there can be closer
            if found && self.nodes[child as usize].bounds.contains(rec.surface.position) {
                break;
            }
        }
        hit
    }
}
