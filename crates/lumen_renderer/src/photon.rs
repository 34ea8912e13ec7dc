//! Photon storage and the k-d tree used for density estimation.
//!
//! The tree is built once per iteration over the photons of that iteration
//! and is read-only afterwards, so all gather workers share it by reference.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use lumen_math::{Color, Vec3};

/// A photon deposited on a diffuse surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    /// Unit direction back towards where the photon came from
    pub direction: Vec3,
    pub power: Color,
}

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index into [`PhotonMap::photons`]
    pub index: usize,
    /// Squared distance to the query point
    pub dist2: f32,
}

impl Eq for Neighbor {}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2
            .total_cmp(&other.dist2)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const NONE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct KdNode {
    photon: u32,
    axis: u8,
    left: u32,
    right: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PhotonMap {
    photons: Vec<Photon>,
    nodes: Vec<KdNode>,
    root: u32,
}

impl PhotonMap {
    /// Balanced k-d tree: the splitting axis cycles x, y, z with depth and
    /// every node holds the median photon of its subtree.
    pub fn build(photons: Vec<Photon>) -> Self {
        let mut order: Vec<u32> = (0..photons.len() as u32).collect();
        let mut map = Self {
            nodes: Vec::with_capacity(photons.len()),
            photons,
            root: NONE,
        };
        map.root = map.build_node(&mut order, 0);
        map
    }

    fn build_node(&mut self, order: &mut [u32], depth: usize) -> u32 {
        if order.is_empty() {
            return NONE;
        }
        let axis = depth % 3;
        let mid = (order.len() - 1) / 2;
        let photons = &self.photons;
        order.select_nth_unstable_by(mid, |&a, &b| {
            photons[a as usize].position[axis].total_cmp(&photons[b as usize].position[axis])
        });

        let index = self.nodes.len() as u32;
        self.nodes.push(KdNode {
            photon: order[mid],
            axis: axis as u8,
            left: NONE,
            right: NONE,
        });
        let (below, rest) = order.split_at_mut(mid);
        let left = self.build_node(below, depth + 1);
        let right = self.build_node(&mut rest[1..], depth + 1);
        let node = &mut self.nodes[index as usize];
        node.left = left;
        node.right = right;
        index
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    pub fn photon(&self, index: usize) -> &Photon {
        &self.photons[index]
    }

    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// The `min(k, len)` photons closest to `point`, nearest first.
    pub fn k_nearest(&self, point: Vec3, k: usize) -> Vec<Neighbor> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.visit_nearest(self.root, point, k, &mut heap);
        heap.into_sorted_vec()
    }

    fn visit_nearest(&self, node: u32, point: Vec3, k: usize, heap: &mut BinaryHeap<Neighbor>) {
        if node == NONE {
            return;
        }
        let n = self.nodes[node as usize];
        let position = self.photons[n.photon as usize].position;
        let candidate = Neighbor {
            index: n.photon as usize,
            dist2: point.distance_squared(position),
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|top| candidate < *top) {
            heap.pop();
            heap.push(candidate);
        }

        let diff = point[n.axis as usize] - position[n.axis as usize];
        let (near, far) = if diff < 0.0 { (n.left, n.right) } else { (n.right, n.left) };
        self.visit_nearest(near, point, k, heap);
        let bound = heap.peek().map_or(f32::INFINITY, |top| top.dist2);
        if heap.len() < k || diff * diff < bound {
            self.visit_nearest(far, point, k, heap);
        }
    }

    /// Indices of all photons with squared distance below `radius2`.
    pub fn within_radius(&self, point: Vec3, radius2: f32) -> Vec<usize> {
        let mut found = Vec::new();
        if radius2 > 0.0 {
            self.visit_radius(self.root, point, radius2, &mut found);
        }
        found
    }

    fn visit_radius(&self, node: u32, point: Vec3, radius2: f32, found: &mut Vec<usize>) {
        if node == NONE {
            return;
        }
        let n = self.nodes[node as usize];
        let position = self.photons[n.photon as usize].position;
        if point.distance_squared(position) < radius2 {
            found.push(n.photon as usize);
        }

        let diff = point[n.axis as usize] - position[n.axis as usize];
        let (near, far) = if diff < 0.0 { (n.left, n.right) } else { (n.right, n.left) };
        self.visit_radius(near, point, radius2, found);
        if diff * diff < radius2 {
            self.visit_radius(far, point, radius2, found);
        }
    }
}
