//! Sphere primitives for ray tracing, static and linearly moving.

use crate::hittable::{Intersect, ShapeHit, Surface};
use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Solve the ray/sphere quadratic in its half-b form.
///
/// With `h = d·(C−O)` the roots are `(h ± √(h² − a·c)) / a`; the nearer
/// root wins unless it falls outside `ray_t`, in which case the farther one is
/// tried before giving up.
#[inline]
fn hit_sphere(center: Vec3, radius: f32, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }
    Some(root)
}

#[inline]
fn sphere_surface(center: Vec3, radius: f32, ray: &Ray, t: f32) -> Surface {
    let point = ray.at(t);
    let outward_normal = (point - center) / radius;
    let (u, v) = sphere_uv(outward_normal);
    Surface {
        point,
        outward_normal,
        u,
        v,
    }
}

fn sphere_box(center: Vec3, radius: f32) -> Aabb {
    let rvec = Vec3::splat(radius);
    Aabb::from_points(center - rvec, center + rvec)
}

/// Get the UV coordinates for a point on the unit sphere.
///
/// u: angle around the Y axis starting from X = -1, v: angle from Y = -1 to
/// Y = +1, both mapped to [0, 1].
pub fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}

impl Intersect for Sphere {
    fn intersect(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<ShapeHit> {
        hit_sphere(self.center, self.radius, ray, ray_t).map(ShapeHit::new)
    }

    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface {
        sphere_surface(self.center, self.radius, ray, hit.t)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        sphere_box(self.center, self.radius)
    }
}

/// A sphere whose center travels along `direction` at `speed` units per unit
/// of shutter time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingSphere {
    center: Vec3,
    radius: f32,
    velocity: Vec3,
}

impl MovingSphere {
    pub fn new(center: Vec3, radius: f32, direction: Vec3, speed: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            velocity: direction * speed,
        }
    }

    /// Center position at shutter time `time`.
    #[inline]
    pub fn center_at(&self, time: f32) -> Vec3 {
        self.center + self.velocity * time
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Intersect for MovingSphere {
    fn intersect(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<ShapeHit> {
        hit_sphere(self.center_at(ray.time()), self.radius, ray, ray_t).map(ShapeHit::new)
    }

    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface {
        sphere_surface(self.center_at(ray.time()), self.radius, ray, hit.t)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        Aabb::surrounding(
            &sphere_box(self.center_at(time0), self.radius),
            &sphere_box(self.center_at(time1), self.radius),
        )
    }
}
