//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in one flat buffer. Sibling pairs are allocated at consecutive
//! indices, so an internal node only stores the index of its left child.

use prism_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

use crate::geometry::Geometry;
use crate::hittable::{ObjectId, ShapeHit};

/// Maximum primitives per leaf node before splitting.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 2;

/// Build-time tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvhOptions {
    /// Ranges with at most this many objects become leaves (minimum 1)
    pub max_leaf_size: usize,
}

impl Default for BvhOptions {
    fn default() -> Self {
        Self {
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
        }
    }
}

/// A node of the flat hierarchy.
///
/// `count > 0` marks a leaf covering objects `index..index + count`.
/// `count == 0` marks an internal node whose children sit at `index` and
/// `index + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bbox: Aabb,
    pub index: u32,
    pub count: u32,
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Flat BVH over a scene's geometry buffer. Node 0 is the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build a hierarchy over `objects`, reordering them in place.
    ///
    /// Each range is sorted by bounding-box minimum along a random axis and
    /// split at its midpoint index. Object ids handed out by
    /// [`Bvh::intersect`] refer to the reordered buffer.
    pub fn build(
        objects: &mut [Geometry],
        time0: f32,
        time1: f32,
        options: &BvhOptions,
        rng: &mut dyn RngCore,
    ) -> Self {
        if objects.is_empty() {
            return Self::default();
        }

        let mut builder = Builder {
            nodes: Vec::with_capacity(2 * objects.len()),
            time0,
            time1,
            max_leaf_size: options.max_leaf_size.max(1),
        };
        builder.nodes.push(placeholder());
        builder.build_node(0, objects, 0, rng);

        let bvh = Self {
            nodes: builder.nodes,
        };
        log::info!(
            "BVH built: {} objects, {} nodes, depth {}",
            objects.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        bvh
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Bounds of the whole hierarchy.
    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map(|n| n.bbox).unwrap_or(Aabb::EMPTY)
    }

    /// Number of levels from the root to the deepest leaf.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[BvhNode], idx: usize) -> usize {
            let node = &nodes[idx];
            if node.is_leaf() {
                1
            } else {
                let left = node.index as usize;
                1 + walk(nodes, left).max(walk(nodes, left + 1))
            }
        }

        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Closest hit among `objects` (the buffer the BVH was built over).
    pub fn intersect(
        &self,
        objects: &[Geometry],
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<(ObjectId, ShapeHit)> {
        if self.nodes.is_empty() {
            return None;
        }
        self.hit_node(0, objects, ray, ray_t, rng)
    }

    fn hit_node(
        &self,
        idx: usize,
        objects: &[Geometry],
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<(ObjectId, ShapeHit)> {
        let node = &self.nodes[idx];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        if node.is_leaf() {
            let start = node.index as usize;
            let end = start + node.count as usize;
            let mut closest = None;
            let mut search = ray_t;

            for (id, object) in objects[start..end].iter().enumerate() {
                if let Some(hit) = object.intersect(ray, search, rng) {
                    search = search.with_max(hit.t);
                    closest = Some(((start + id) as ObjectId, hit));
                }
            }
            return closest;
        }

        let left = node.index as usize;
        let hit_left = self.hit_node(left, objects, ray, ray_t, rng);

        // Only check right up to closest hit
        let right_t = match hit_left {
            Some((_, hit)) => ray_t.with_max(hit.t),
            None => ray_t,
        };
        let hit_right = self.hit_node(left + 1, objects, ray, right_t, rng);

        hit_right.or(hit_left)
    }
}

struct Builder {
    nodes: Vec<BvhNode>,
    time0: f32,
    time1: f32,
    max_leaf_size: usize,
}

impl Builder {
    /// Fill node `idx` for `objects`, which start at `offset` in the full buffer.
    fn build_node(
        &mut self,
        idx: usize,
        objects: &mut [Geometry],
        offset: usize,
        rng: &mut dyn RngCore,
    ) {
        let bbox = objects.iter().fold(Aabb::EMPTY, |acc, o| {
            Aabb::surrounding(&acc, &o.bounding_box(self.time0, self.time1))
        });

        if objects.len() <= self.max_leaf_size {
            self.nodes[idx] = BvhNode {
                bbox,
                index: offset as u32,
                count: objects.len() as u32,
            };
            return;
        }

        let axis = rng.gen_range(0..3usize);
        let (time0, time1) = (self.time0, self.time1);
        objects.sort_by(|a, b| {
            let a_min = a.bounding_box(time0, time1).axis_interval(axis).min;
            let b_min = b.bounding_box(time0, time1).axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        });

        let left = self.nodes.len();
        self.nodes.push(placeholder());
        self.nodes.push(placeholder());
        self.nodes[idx] = BvhNode {
            bbox,
            index: left as u32,
            count: 0,
        };

        // Split at midpoint
        let mid = objects.len() / 2;
        let (left_objects, right_objects) = objects.split_at_mut(mid);
        self.build_node(left, left_objects, offset, rng);
        self.build_node(left + 1, right_objects, offset + mid, rng);
    }
}

fn placeholder() -> BvhNode {
    BvhNode {
        bbox: Aabb::EMPTY,
        index: 0,
        count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::material::MaterialId;
    use crate::sphere::Sphere;
    use prism_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spheres(n: usize) -> Vec<Geometry> {
        (0..n)
            .map(|i| {
                Geometry::new(
                    Shape::Sphere(Sphere::new(Vec3::new(i as f32, 0.0, -5.0), 0.5)),
                    MaterialId(0),
                )
            })
            .collect()
    }

    fn build(objects: &mut [Geometry], max_leaf_size: usize) -> Bvh {
        let mut rng = StdRng::seed_from_u64(42);
        Bvh::build(objects, 0.0, 1.0, &BvhOptions { max_leaf_size }, &mut rng)
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = build(&mut [], 2);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);

        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        assert!(bvh.intersect(&[], &ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut objects = spheres(1);
        let bvh = build(&mut objects, 2);

        // Should create a leaf
        assert_eq!(bvh.nodes().len(), 1);
        assert!(bvh.nodes()[0].is_leaf());

        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let hit = bvh.intersect(&objects, &ray, Interval::new(0.001, f32::INFINITY), &mut rng);
        assert!(hit.is_some());
    }

    #[test]
    fn test_two_objects_share_a_leaf() {
        let mut objects = spheres(2);
        let bvh = build(&mut objects, 2);

        assert_eq!(bvh.nodes().len(), 1);
        assert_eq!(bvh.nodes()[0].count, 2);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut objects = spheres(10);
        let bvh = build(&mut objects, 2);
        let mut rng = StdRng::seed_from_u64(42);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z, 0.0);
        let (id, hit) = bvh
            .intersect(&objects, &ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        let rec = objects[id as usize].evaluate(&ray, hit, id);

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
        assert!((rec.p.x - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_node_boxes_enclose_children() {
        let mut objects = spheres(37);
        let bvh = build(&mut objects, 1);
        let nodes = bvh.nodes();

        for node in nodes {
            let min = node.bbox.min() - Vec3::splat(1e-5);
            let max = node.bbox.max() + Vec3::splat(1e-5);
            let inside = |b: &Aabb| b.min().cmpge(min).all() && b.max().cmple(max).all();

            if node.is_leaf() {
                let start = node.index as usize;
                for object in &objects[start..start + node.count as usize] {
                    assert!(inside(&object.bounding_box(0.0, 1.0)));
                }
            } else {
                let left = node.index as usize;
                assert!(inside(&nodes[left].bbox));
                assert!(inside(&nodes[left + 1].bbox));
            }
        }
    }

    #[test]
    fn test_leaves_cover_every_object_once() {
        let mut objects = spheres(23);
        let bvh = build(&mut objects, 3);
        let mut seen = vec![0u32; objects.len()];

        for node in bvh.nodes().iter().filter(|n| n.is_leaf()) {
            assert!(node.count <= 3);
            for i in node.index..node.index + node.count {
                seen[i as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_depth_is_logarithmic() {
        let mut objects = spheres(64);
        let bvh = build(&mut objects, 1);
        assert_eq!(bvh.depth(), 7);
    }
}
