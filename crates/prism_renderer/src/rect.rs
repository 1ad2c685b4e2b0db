//! Axis-aligned rectangles and the boxes built from them.

use crate::geometry::GeometryError;
use crate::hittable::{Intersect, ShapeHit, Surface};
use prism_math::{axis, Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Orientation of an axis-aligned rectangle, named by the two axes it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Spans X and Y, constant Z
    XY,
    /// Spans X and Z, constant Y
    XZ,
    /// Spans Y and Z, constant X
    YZ,
}

impl Plane {
    /// Axis indices as (constant axis, first span axis, second span axis).
    #[inline]
    pub const fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (2, 0, 1),
            Plane::XZ => (1, 0, 2),
            Plane::YZ => (0, 1, 2),
        }
    }
}

/// A rectangle lying in a plane of constant `k` along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    plane: Plane,
    k: f32,
    a: Interval,
    b: Interval,
    /// +1 when the outward normal points along +axis, -1 otherwise
    facing: f32,
}

impl Rect {
    /// Create a rectangle spanning `a` and `b` on the plane's two free axes.
    pub fn new(plane: Plane, a: Interval, b: Interval, k: f32) -> Self {
        Self {
            plane,
            k,
            a: Interval::new(a.min.min(a.max), a.min.max(a.max)),
            b: Interval::new(b.min.min(b.max), b.min.max(b.max)),
            facing: 1.0,
        }
    }

    /// Create a rectangle from two opposite corners.
    ///
    /// Exactly one coordinate must be shared by both corners; it becomes the
    /// constant axis.
    pub fn from_corners(p0: Vec3, p1: Vec3) -> Result<Self, GeometryError> {
        let plane = match (p0.x == p1.x, p0.y == p1.y, p0.z == p1.z) {
            (true, false, false) => Plane::YZ,
            (false, true, false) => Plane::XZ,
            (false, false, true) => Plane::XY,
            _ => return Err(GeometryError::NotAxisAligned { p0, p1 }),
        };
        let (k_axis, a_axis, b_axis) = plane.axes();
        Ok(Self::new(
            plane,
            Interval::new(axis(p0, a_axis), axis(p1, a_axis)),
            Interval::new(axis(p0, b_axis), axis(p1, b_axis)),
            axis(p0, k_axis),
        ))
    }

    /// Same rectangle with its outward normal pointing along -axis.
    pub fn flipped(mut self) -> Self {
        self.facing = -self.facing;
        self
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    fn outward_normal(&self) -> Vec3 {
        let mut n = [0.0; 3];
        n[self.plane.axes().0] = self.facing;
        Vec3::from_array(n)
    }
}

impl Intersect for Rect {
    fn intersect(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<ShapeHit> {
        let (k_axis, a_axis, b_axis) = self.plane.axes();

        // Solve origin + t * direction == k on the constant axis, then check the
        // remaining two coordinates against the rectangle bounds.
        let t = (self.k - axis(ray.origin(), k_axis)) / axis(ray.direction(), k_axis);
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        if !self.a.contains(axis(p, a_axis)) || !self.b.contains(axis(p, b_axis)) {
            return None;
        }
        Some(ShapeHit::new(t))
    }

    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface {
        let (k_axis, a_axis, b_axis) = self.plane.axes();
        let mut point = ray.at(hit.t).to_array();
        // Snap onto the plane to remove drift from the t round trip
        point[k_axis] = self.k;

        Surface {
            point: Vec3::from_array(point),
            outward_normal: self.outward_normal(),
            u: span_fraction(point[a_axis], self.a),
            v: span_fraction(point[b_axis], self.b),
        }
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        let (k_axis, a_axis, b_axis) = self.plane.axes();
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        lo[k_axis] = self.k;
        hi[k_axis] = self.k;
        lo[a_axis] = self.a.min;
        hi[a_axis] = self.a.max;
        lo[b_axis] = self.b.min;
        hi[b_axis] = self.b.max;
        // Aabb pads the flat axis
        Aabb::from_points(Vec3::from_array(lo), Vec3::from_array(hi))
    }
}

/// An axis-aligned box made of six rectangles.
///
/// The index of the face that produced the closest hit travels in
/// `ShapeHit::face`, so `surface` never has to guess it back from `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    faces: [Rect; 6],
}

impl Cuboid {
    pub fn new(p0: Vec3, p1: Vec3) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);
        let x = Interval::new(min.x, max.x);
        let y = Interval::new(min.y, max.y);
        let z = Interval::new(min.z, max.z);

        let faces = [
            Rect::new(Plane::XY, x, y, max.z),
            Rect::new(Plane::XY, x, y, min.z).flipped(),
            Rect::new(Plane::XZ, x, z, max.y),
            Rect::new(Plane::XZ, x, z, min.y).flipped(),
            Rect::new(Plane::YZ, y, z, max.x),
            Rect::new(Plane::YZ, y, z, min.x).flipped(),
        ];
        Self { min, max, faces }
    }
}

impl Intersect for Cuboid {
    fn intersect(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<ShapeHit> {
        let mut closest: Option<ShapeHit> = None;
        let mut interval = ray_t;

        for (index, face) in self.faces.iter().enumerate() {
            if let Some(hit) = face.intersect(ray, interval, rng) {
                interval = interval.with_max(hit.t);
                closest = Some(ShapeHit::with_face(hit.t, index as u8));
            }
        }
        closest
    }

    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface {
        self.faces[hit.face as usize % 6].surface(ray, hit)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        Aabb::from_points(self.min, self.max)
    }
}

/// Position of `x` across `span` in [0, 1]; a zero-width span maps to 0.
fn span_fraction(x: f32, span: Interval) -> f32 {
    let size = span.size();
    if size > 0.0 {
        (x - span.min) / size
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[test]
    fn test_rect_from_corners() {
        let rect = Rect::from_corners(Vec3::new(0.0, 0.0, -2.0), Vec3::new(1.0, 1.0, -2.0)).unwrap();
        assert_eq!(rect.plane(), Plane::XY);

        let rect = Rect::from_corners(Vec3::new(3.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)).unwrap();
        assert_eq!(rect.plane(), Plane::YZ);

        assert!(Rect::from_corners(Vec3::ZERO, Vec3::ONE).is_err());
        assert!(Rect::from_corners(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_rect_hit_and_uv() {
        let rect = Rect::from_corners(Vec3::new(-1.0, -1.0, -3.0), Vec3::new(1.0, 1.0, -3.0)).unwrap();
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_Z, 0.0);

        let hit = rect
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng())
            .unwrap();
        assert!((hit.t - 3.0).abs() < 1e-5);

        let s = rect.surface(&ray, hit);
        assert!((s.u - 0.75).abs() < 1e-5);
        assert!((s.v - 0.5).abs() < 1e-5);
        assert_eq!(s.outward_normal, Vec3::Z);
        assert_eq!(s.point.z, -3.0);
    }

    #[test]
    fn test_degenerate_rect_has_finite_uv() {
        let sliver = Rect::new(Plane::XY, Interval::new(0.0, 0.0), Interval::new(-1.0, 1.0), -3.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);

        let hit = sliver
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng())
            .unwrap();
        let s = sliver.surface(&ray, hit);
        assert_eq!(s.u, 0.0);
        assert!((s.v - 0.5).abs() < 1e-5);

        let flat = Cuboid::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let edge_on = Ray::new(Vec3::new(0.2, 0.0, 3.0), Vec3::NEG_Z, 0.0);
        let hit = flat
            .intersect(&edge_on, Interval::new(0.001, f32::INFINITY), &mut rng())
            .unwrap();
        let s = flat.surface(&edge_on, hit);
        assert!((s.u - 0.6).abs() < 1e-5);
        assert_eq!(s.v, 0.0);
    }

    #[test]
    fn test_rect_miss_outside_bounds_and_parallel() {
        let rect = Rect::from_corners(Vec3::new(-1.0, -1.0, -3.0), Vec3::new(1.0, 1.0, -3.0)).unwrap();
        let outside = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_Z, 0.0);
        let parallel = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::X, 0.0);
        let interval = Interval::new(0.001, f32::INFINITY);

        assert!(rect.intersect(&outside, interval, &mut rng()).is_none());
        assert!(rect.intersect(&parallel, interval, &mut rng()).is_none());
    }

    #[test]
    fn test_rect_bbox_is_padded() {
        let rect = Rect::from_corners(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 1.0)).unwrap();
        let bbox = rect.bounding_box(0.0, 1.0);

        assert!(bbox.y.size() > 0.0);
        assert!(bbox.y.contains(2.0));
    }

    #[test]
    fn test_cuboid_reports_nearest_face() {
        let cuboid = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let interval = Interval::new(0.001, f32::INFINITY);

        // From +Z looking down -Z: the max-z face (index 0) is nearest
        let ray = Ray::new(Vec3::new(0.2, 0.3, 5.0), Vec3::NEG_Z, 0.0);
        let hit = cuboid.intersect(&ray, interval, &mut rng()).unwrap();
        assert_eq!(hit.face, 0);
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert_eq!(cuboid.surface(&ray, hit).outward_normal, Vec3::Z);

        // From -X looking along +X: the min-x face (index 5) faces -X
        let ray = Ray::new(Vec3::new(-5.0, 0.1, 0.1), Vec3::X, 0.0);
        let hit = cuboid.intersect(&ray, interval, &mut rng()).unwrap();
        assert_eq!(hit.face, 5);
        assert_eq!(cuboid.surface(&ray, hit).outward_normal, Vec3::NEG_X);
    }

    #[test]
    fn test_cuboid_from_inside_hits_far_face() {
        let cuboid = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);

        let hit = cuboid
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng())
            .unwrap();
        assert_eq!(hit.face, 2);
        assert!((hit.t - 1.0).abs() < 1e-5);
    }
}
