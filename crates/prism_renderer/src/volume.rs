//! Constant-density participating medium.

use crate::geometry::Shape;
use crate::hittable::{Intersect, ShapeHit, Surface};
use crate::sampling::gen_f32;
use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A convex boundary filled with a homogeneous medium.
///
/// A ray crossing the medium scatters after a random free-flight distance
/// `-ln(ξ) / density`; if that distance exceeds the chord through the boundary
/// the ray passes straight through.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    boundary: Box<Shape>,
    neg_inv_density: f32,
}

impl Volume {
    pub fn new(boundary: Shape, density: f32) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: -1.0 / density,
        }
    }

    pub fn boundary(&self) -> &Shape {
        &self.boundary
    }

    pub fn density(&self) -> f32 {
        -1.0 / self.neg_inv_density
    }
}

impl Intersect for Volume {
    fn intersect(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<ShapeHit> {
        // Entry and exit points along the whole line, then clipped to ray_t.
        let entry = self.boundary.intersect(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .intersect(ray, Interval::new(entry.t + 0.0001, f32::INFINITY), rng)?;

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        if t_enter < 0.0 {
            t_enter = 0.0;
        }

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // 1 - ξ keeps the argument of ln in (0, 1]
        let hit_distance = self.neg_inv_density * (1.0 - gen_f32(rng)).ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }
        Some(ShapeHit::new(t_enter + hit_distance / ray_length))
    }

    /// Scattering inside a medium has no preferred orientation; the normal is
    /// an arbitrary fixed axis and the hit always counts as a front face.
    fn surface(&self, ray: &Ray, hit: ShapeHit) -> Surface {
        Surface {
            point: ray.at(hit.t),
            outward_normal: Vec3::X,
            u: 0.0,
            v: 0.0,
        }
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.boundary.bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Sphere;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dense_volume_scatters_inside_boundary() {
        let volume = Volume::new(Shape::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0)), 1e6);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(9);

        let hit = volume
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!(hit.t >= 4.0 && hit.t < 4.01);
    }

    #[test]
    fn test_thin_volume_mostly_passes_through() {
        let volume = Volume::new(Shape::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0)), 1e-4);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(9);

        let hits = (0..1000)
            .filter(|_| {
                volume
                    .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
                    .is_some()
            })
            .count();
        assert!(hits < 20, "hits = {hits}");
    }

    #[test]
    fn test_volume_misses_when_ray_misses_boundary() {
        let volume = Volume::new(Shape::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0)), 1e6);
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(9);

        assert!(volume
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_none());
        assert_eq!(volume.bounding_box(0.0, 1.0).centroid(), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_volume_from_inside_starts_at_origin() {
        let volume = Volume::new(Shape::Sphere(Sphere::new(Vec3::ZERO, 2.0)), 1e6);
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(2);

        let hit = volume
            .intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!(hit.t < 0.01);
    }
}
