// Copyright @yucwang 2026

use crate::core::interaction::HitPayload;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::shapes::triangle::Triangle;

const SAH_BUCKETS: usize = 12;
const TRAVERSAL_COST: Float = 1.0;

#[derive(Clone, Copy)]
enum BVHNodeKind {
    Leaf { start: usize, count: usize },
    Interior { left: usize, right: usize },
}

#[derive(Clone, Copy)]
struct BVHNode {
    bounds: AABB,
    kind: BVHNodeKind,
}

#[derive(Clone, Copy, Default)]
struct Bucket {
    count: usize,
    bounds: AABB,
}

pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    triangles: Vec<Triangle>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
}

impl BVH {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self::with_max_leaf_size(triangles, 4)
    }

    pub fn with_max_leaf_size(triangles: Vec<Triangle>, max_leaf_size: usize) -> Self {
        let prim_bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();
        let prim_centroids: Vec<Vector3f> = prim_bounds.iter().map(|b| b.center()).collect();
        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * triangles.len() / max_leaf_size.max(1) + 1),
            indices: (0..triangles.len()).collect(),
            triangles,
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
        };

        if !bvh.indices.is_empty() {
            let count = bvh.indices.len();
            bvh.build(0, count);
        }

        bvh
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn ray_intersection<'a>(&'a self, ray: &Ray3f) -> Option<HitPayload<'a>> {
        let mut closest = HitPayload::default();
        if self.nodes.is_empty() {
            return None;
        }

        let mut stack = Vec::with_capacity(64);
        stack.push(0usize);

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if node.bounds.ray_entry(ray, closest.distance).is_none() {
                continue;
            }

            match node.kind {
                BVHNodeKind::Leaf { start, count } => {
                    for &prim_idx in &self.indices[start..start + count] {
                        let triangle = &self.triangles[prim_idx];
                        if let Some((t, barycentric)) = triangle.ray_intersection(ray) {
                            if t < closest.distance {
                                closest = HitPayload {
                                    distance: t,
                                    triangle: Some(triangle),
                                    triangle_index: prim_idx,
                                    barycentric,
                                };
                            }
                        }
                    }
                }
                BVHNodeKind::Interior { left, right } => {
                    // Visit the nearer child first so its hits prune the farther one.
                    let t_left = self.nodes[left].bounds.ray_entry(ray, closest.distance);
                    let t_right = self.nodes[right].bounds.ray_entry(ray, closest.distance);
                    match (t_left, t_right) {
                        (Some(tl), Some(tr)) => {
                            if tl <= tr {
                                stack.push(right);
                                stack.push(left);
                            } else {
                                stack.push(left);
                                stack.push(right);
                            }
                        }
                        (Some(_), None) => stack.push(left),
                        (None, Some(_)) => stack.push(right),
                        (None, None) => {}
                    }
                }
            }
        }

        if closest.is_hit() {
            Some(closest)
        } else {
            None
        }
    }

    // Early-out traversal for occlusion queries.
    pub fn any_intersection(&self, ray: &Ray3f) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.ray_intersect(ray) {
                continue;
            }
            match node.kind {
                BVHNodeKind::Leaf { start, count } => {
                    let hit = self.indices[start..start + count]
                        .iter()
                        .any(|&idx| self.triangles[idx].ray_intersection(ray).is_some());
                    if hit {
                        return true;
                    }
                }
                BVHNodeKind::Interior { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        false
    }

    fn push_leaf(&mut self, bounds: AABB, start: usize, count: usize) -> usize {
        self.nodes.push(BVHNode { bounds, kind: BVHNodeKind::Leaf { start, count } });
        self.nodes.len() - 1
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let (bounds, centroid_bounds) = self.compute_bounds(start, end);
        let count = end - start;
        if count <= self.max_leaf_size {
            return self.push_leaf(bounds, start, count);
        }

        let axis = centroid_bounds.max_extent();
        let axis_min = centroid_bounds.p_min[axis];
        let axis_extent = centroid_bounds.p_max[axis] - axis_min;
        if axis_extent < 1e-6 {
            // All centroids coincide, splitting cannot separate them.
            return self.push_leaf(bounds, start, count);
        }

        let bucket_of = |c: Float| -> usize {
            let b = ((c - axis_min) / axis_extent * SAH_BUCKETS as Float) as usize;
            b.min(SAH_BUCKETS - 1)
        };

        let mut buckets = [Bucket::default(); SAH_BUCKETS];
        for &idx in &self.indices[start..end] {
            let b = bucket_of(self.prim_centroids[idx][axis]);
            buckets[b].count += 1;
            buckets[b].bounds.expand_by_aabb(&self.prim_bounds[idx]);
        }

        // Sweep from both ends so each split's cost is O(1).
        let mut below_area = [0.0 as Float; SAH_BUCKETS - 1];
        let mut below_count = [0usize; SAH_BUCKETS - 1];
        let mut acc = Bucket::default();
        for i in 0..(SAH_BUCKETS - 1) {
            acc.count += buckets[i].count;
            acc.bounds.expand_by_aabb(&buckets[i].bounds);
            below_area[i] = acc.bounds.surface_area();
            below_count[i] = acc.count;
        }

        let parent_area = bounds.surface_area().max(1e-6);
        let mut best_split = 0usize;
        let mut best_cost = Float::MAX;
        let mut acc = Bucket::default();
        for i in (0..(SAH_BUCKETS - 1)).rev() {
            acc.count += buckets[i + 1].count;
            acc.bounds.expand_by_aabb(&buckets[i + 1].bounds);
            let cost = TRAVERSAL_COST
                + (below_count[i] as Float * below_area[i] + acc.count as Float * acc.bounds.surface_area())
                    / parent_area;
            if cost < best_cost {
                best_cost = cost;
                best_split = i;
            }
        }

        if best_cost >= count as Float {
            return self.push_leaf(bounds, start, count);
        }

        let mut mid = start;
        for i in start..end {
            let idx = self.indices[i];
            if bucket_of(self.prim_centroids[idx][axis]) <= best_split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }

        if mid == start || mid == end {
            return self.push_leaf(bounds, start, count);
        }

        // Reserve the parent slot, then patch it once both children exist.
        let node_idx = self.push_leaf(bounds, start, count);
        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[node_idx].kind = BVHNodeKind::Interior { left, right };
        node_idx
    }

    fn compute_bounds(&self, start: usize, end: usize) -> (AABB, AABB) {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_centroids[idx]);
        }
        (bounds, centroid_bounds)
    }
}

// Build-once wrapper owned by a render command. `build` is the only way out of Unbuilt.
pub enum AccelerationStructure {
    Unbuilt,
    Built(BVH),
}

impl Default for AccelerationStructure {
    fn default() -> Self {
        AccelerationStructure::Unbuilt
    }
}

impl AccelerationStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, triangles: Vec<Triangle>, max_leaf_size: usize) {
        if self.is_valid() {
            return;
        }
        if triangles.is_empty() {
            log::debug!("Skipping acceleration structure build: no triangles");
            return;
        }

        let triangle_count = triangles.len();
        let bvh = BVH::with_max_leaf_size(triangles, max_leaf_size);
        log::debug!("Built BVH: {} triangles, {} nodes", triangle_count, bvh.node_count());
        *self = AccelerationStructure::Built(bvh);
    }

    pub fn invalidate(&mut self) {
        *self = AccelerationStructure::Unbuilt;
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, AccelerationStructure::Built(_))
    }

    pub fn bvh(&self) -> Option<&BVH> {
        match self {
            AccelerationStructure::Built(bvh) => Some(bvh),
            AccelerationStructure::Unbuilt => None,
        }
    }

    // Nearest hit only. The payload is left untouched on a miss.
    pub fn trace<'a>(&'a self, ray: &Ray3f, payload: &mut HitPayload<'a>) -> bool {
        match self.bvh().and_then(|bvh| bvh.ray_intersection(ray)) {
            Some(hit) => {
                *payload = hit;
                true
            }
            None => false,
        }
    }

    pub fn occluded(&self, ray: &Ray3f) -> bool {
        self.bvh().map_or(false, |bvh| bvh.any_intersection(ray))
    }
}
