//! Intersection contract shared by every geometry variant.
//!
//! Intersection is split in two phases: `Intersect::intersect` only finds the
//! ray parameter (plus which face was struck), and `Intersect::surface`
//! reconstructs point, normal and texture coordinates for the single closest
//! hit. BVH traversal only ever pays for the cheap first phase.

use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::material::MaterialId;

/// Index of a geometry record in the scene's object buffer.
pub type ObjectId = u32;

/// Result of the first intersection phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    /// Ray parameter of the intersection
    pub t: f32,
    /// Which face was hit, for shapes that have several (0 otherwise)
    pub face: u8,
}

impl ShapeHit {
    #[inline]
    pub fn new(t: f32) -> Self {
        Self { t, face: 0 }
    }

    #[inline]
    pub fn with_face(t: f32, face: u8) -> Self {
        Self { t, face }
    }
}

/// Surface attributes in the shape's own space, before face orientation.
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub point: Vec3,
    /// Geometric normal pointing out of the shape (unit length)
    pub outward_normal: Vec3,
    pub u: f32,
    pub v: f32,
}

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    pub object: ObjectId,
    pub material: MaterialId,
}

impl HitRecord {
    /// Build a record from object-space surface data, orienting the normal
    /// against `ray`.
    pub fn from_surface(
        ray: &Ray,
        t: f32,
        surface: Surface,
        object: ObjectId,
        material: MaterialId,
    ) -> Self {
        let (front_face, normal) = face_normal(ray, surface.outward_normal);
        Self {
            p: surface.point,
            normal,
            u: surface.u,
            v: surface.v,
            t,
            front_face,
            object,
            material,
        }
    }

    /// The geometric normal pointing out of the surface, recovered from the
    /// stored (ray-facing) normal and the face flag.
    #[inline]
    pub fn outward_normal(&self) -> Vec3 {
        if self.front_face {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// Orient `outward_normal` against the ray direction.
///
/// Returns the front-face flag and the normal to store: if the ray and the
/// outward normal point the same way we are inside the surface.
#[inline]
pub fn face_normal(ray: &Ray, outward_normal: Vec3) -> (bool, Vec3) {
    let front_face = ray.direction().dot(outward_normal) < 0.0;
    let normal = if front_face {
        outward_normal
    } else {
        -outward_normal
    };
    (front_face, normal)
}

/// Trait for shapes that can be hit by rays.
///
/// Implementors are plain value types stored inline in the geometry buffer;
/// dispatch happens through the `Shape` enum rather than trait objects.
pub trait Intersect {
    /// Find the nearest intersection strictly inside `ray_t`.
    ///
    /// Only participating media consume randomness.
    fn intersect(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<ShapeHit>;

    /// Reconstruct the surface at a hit previously returned by `intersect`.
    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface;

    /// Bounds of the shape over the shutter interval `[time0, time1]`.
    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normal_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 0.0);
        let (front, n) = face_normal(&ray, Vec3::Z);

        assert!(front);
        assert_eq!(n, Vec3::Z);
    }

    #[test]
    fn test_face_normal_back() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let (front, n) = face_normal(&ray, Vec3::NEG_Z);

        assert!(!front);
        assert_eq!(n, Vec3::Z);
        assert!(ray.direction().dot(n) <= 0.0);
    }
}
