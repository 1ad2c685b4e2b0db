//! Scene geometry: a closed set of shapes plus an optional affine placement.
//!
//! Geometry records live in one flat `Vec<Geometry>` owned by the scene and are
//! addressed by index. Shapes are dispatched by `match` instead of trait
//! objects so the buffer stays contiguous and traversal avoids indirect calls.

use crate::hittable::{HitRecord, Intersect, ObjectId, ShapeHit, Surface};
use crate::material::MaterialId;
use crate::rect::{Cuboid, Rect};
use crate::sphere::{MovingSphere, Sphere};
use crate::volume::Volume;
use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors raised while constructing geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("rectangle corners {p0} and {p1} must share exactly one coordinate")]
    NotAxisAligned { p0: Vec3, p1: Vec3 },

    #[error("volume density must be positive and finite, got {0}")]
    InvalidDensity(f32),
}

/// Every intersectable primitive the renderer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    MovingSphere(MovingSphere),
    Rect(Rect),
    Cuboid(Cuboid),
    Volume(Volume),
}

impl Shape {
    /// Wrap `boundary` in a constant-density medium.
    pub fn volume(boundary: Shape, density: f32) -> Result<Shape, GeometryError> {
        if !(density.is_finite() && density > 0.0) {
            return Err(GeometryError::InvalidDensity(density));
        }
        Ok(Shape::Volume(Volume::new(boundary, density)))
    }

    pub fn is_volume(&self) -> bool {
        matches!(self, Shape::Volume(_))
    }
}

impl Intersect for Shape {
    #[inline]
    fn intersect(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<ShapeHit> {
        match self {
            Shape::Sphere(s) => s.intersect(ray, ray_t, rng),
            Shape::MovingSphere(s) => s.intersect(ray, ray_t, rng),
            Shape::Rect(s) => s.intersect(ray, ray_t, rng),
            Shape::Cuboid(s) => s.intersect(ray, ray_t, rng),
            Shape::Volume(s) => s.intersect(ray, ray_t, rng),
        }
    }

    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface {
        match self {
            Shape::Sphere(s) => s.surface(ray, hit),
            Shape::MovingSphere(s) => s.surface(ray, hit),
            Shape::Rect(s) => s.surface(ray, hit),
            Shape::Cuboid(s) => s.surface(ray, hit),
            Shape::Volume(s) => s.surface(ray, hit),
        }
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        match self {
            Shape::Sphere(s) => s.bounding_box(time0, time1),
            Shape::MovingSphere(s) => s.bounding_box(time0, time1),
            Shape::Rect(s) => s.bounding_box(time0, time1),
            Shape::Cuboid(s) => s.bounding_box(time0, time1),
            Shape::Volume(s) => s.bounding_box(time0, time1),
        }
    }
}

/// Rotation about the Y axis, stored as its sine/cosine pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationY {
    sin_theta: f32,
    cos_theta: f32,
}

impl RotationY {
    pub fn from_degrees(angle: f32) -> Self {
        let (sin_theta, cos_theta) = angle.to_radians().sin_cos();
        Self {
            sin_theta,
            cos_theta,
        }
    }

    /// Rotate by +θ (object space to world space).
    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Rotate by -θ (world space to object space).
    #[inline]
    pub fn apply_inverse(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

/// Placement of a shape in the world: rotate about Y first, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub translation: Option<Vec3>,
    pub rotation_y: Option<RotationY>,
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        self.translation.is_none() && self.rotation_y.is_none()
    }

    /// Bring a world-space ray into object space.
    #[inline]
    pub fn to_object(&self, ray: &Ray) -> Ray {
        let mut origin = ray.origin();
        let mut direction = ray.direction();
        if let Some(offset) = self.translation {
            origin -= offset;
        }
        if let Some(rotation) = self.rotation_y {
            origin = rotation.apply_inverse(origin);
            direction = rotation.apply_inverse(direction);
        }
        Ray::new(origin, direction, ray.time())
    }

    /// Map an object-space point back to world space.
    #[inline]
    pub fn point_to_world(&self, mut p: Vec3) -> Vec3 {
        if let Some(rotation) = self.rotation_y {
            p = rotation.apply(p);
        }
        if let Some(offset) = self.translation {
            p += offset;
        }
        p
    }

    /// Map an object-space direction (normal) back to world space.
    #[inline]
    pub fn vector_to_world(&self, v: Vec3) -> Vec3 {
        match self.rotation_y {
            Some(rotation) => rotation.apply(v),
            None => v,
        }
    }

    /// World-space bounds of an object-space box.
    pub fn bounds_to_world(&self, bbox: Aabb) -> Aabb {
        let bbox = match self.rotation_y {
            Some(rotation) => {
                let (lo, hi) = bbox.corners().iter().map(|c| rotation.apply(*c)).fold(
                    (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                    |(lo, hi), c| (lo.min(c), hi.max(c)),
                );
                Aabb::from_points(lo, hi)
            }
            None => bbox,
        };
        match self.translation {
            Some(offset) => bbox.translate(offset),
            None => bbox,
        }
    }
}

/// One entry of the scene's geometry buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub shape: Shape,
    pub transform: Transform,
    pub material: MaterialId,
}

impl Geometry {
    pub fn new(shape: Shape, material: MaterialId) -> Self {
        Self {
            shape,
            transform: Transform::default(),
            material,
        }
    }

    /// Move the shape by `offset` in world space.
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.transform.translation = Some(offset);
        self
    }

    /// Rotate the shape about the world Y axis by `degrees`.
    pub fn rotated_y(mut self, degrees: f32) -> Self {
        self.transform.rotation_y = Some(RotationY::from_degrees(degrees));
        self
    }

    /// First intersection phase: nearest `t` inside `ray_t`, if any.
    ///
    /// Rotation and translation preserve the ray parameter, so the `t`
    /// found in object space is valid in world space.
    #[inline]
    pub fn intersect(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<ShapeHit> {
        if self.transform.is_identity() {
            self.shape.intersect(ray, ray_t, rng)
        } else {
            self.shape.intersect(&self.transform.to_object(ray), ray_t, rng)
        }
    }

    /// Second phase: full hit record for a hit returned by `intersect`.
    pub fn evaluate(&self, ray: &Ray, hit: ShapeHit, object: ObjectId) -> HitRecord {
        let local_ray = self.transform.to_object(ray);
        let surface = self.shape.surface(&local_ray, hit);

        if self.shape.is_volume() {
            // Isotropic media: fixed normal, always a front face
            return HitRecord {
                p: self.transform.point_to_world(surface.point),
                normal: surface.outward_normal,
                u: surface.u,
                v: surface.v,
                t: hit.t,
                front_face: true,
                object,
                material: self.material,
            };
        }

        let world = Surface {
            point: self.transform.point_to_world(surface.point),
            outward_normal: self.transform.vector_to_world(surface.outward_normal),
            ..surface
        };
        HitRecord::from_surface(ray, hit.t, world, object, self.material)
    }

    /// World-space bounds over the shutter interval.
    pub fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.transform
            .bounds_to_world(self.shape.bounding_box(time0, time1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_cube() -> Shape {
        Shape::Cuboid(Cuboid::new(Vec3::ZERO, Vec3::ONE))
    }

    #[test]
    fn test_rotation_round_trip() {
        let rotation = RotationY::from_degrees(37.0);
        let v = Vec3::new(1.0, 2.0, -3.0);

        assert!((rotation.apply_inverse(rotation.apply(v)) - v).length() < 1e-5);
        // +90 degrees takes +X to -Z
        let quarter = RotationY::from_degrees(90.0);
        assert!((quarter.apply(Vec3::X) - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_translated_sphere_hit_point() {
        let geometry = Geometry::new(Shape::Sphere(Sphere::new(Vec3::ZERO, 1.0)), MaterialId(0))
            .translated(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let hit = geometry
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        let rec = geometry.evaluate(&ray, hit, 3);

        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!(rec.front_face);
        assert_eq!(rec.object, 3);
    }

    #[test]
    fn test_rotated_box_bounds() {
        let geometry = Geometry::new(unit_cube(), MaterialId(0)).rotated_y(45.0);
        let bbox = geometry.bounding_box(0.0, 1.0);
        let diagonal = std::f32::consts::SQRT_2;

        assert!((bbox.x.size() - diagonal).abs() < 1e-4);
        assert!((bbox.y.size() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotated_box_normal_is_world_space() {
        // A cube rotated 90 degrees still has an axis-aligned face towards +Z
        let geometry = Geometry::new(
            Shape::Cuboid(Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0))),
            MaterialId(0),
        )
        .rotated_y(90.0)
        .translated(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let hit = geometry
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        let rec = geometry.evaluate(&ray, hit, 0);

        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!((rec.normal - Vec3::Z).length() < 1e-4);
        assert!(rec.front_face);
    }

    #[test]
    fn test_invalid_volume_density() {
        let boundary = Shape::Sphere(Sphere::new(Vec3::ZERO, 1.0));
        assert!(Shape::volume(boundary.clone(), 0.0).is_err());
        assert!(Shape::volume(boundary.clone(), f32::NAN).is_err());
        assert!(Shape::volume(boundary, 0.5).unwrap().is_volume());
    }
}
