//! The scene aggregate: geometry, materials, acceleration structure, camera
//! and background.
//!
//! A scene is populated once, has its BVH built once, and is then only read
//! during rendering, so it can be shared by reference across worker threads.

use prism_math::{Aabb, Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use crate::bvh::{Bvh, BvhOptions};
use crate::camera::Camera;
use crate::geometry::Geometry;
use crate::hittable::{HitRecord, ObjectId, ShapeHit};
use crate::material::{Material, MaterialId};

/// Errors raised while assembling a scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("object {object} references material {material}, but only {count} materials exist")]
    UnknownMaterial {
        object: usize,
        material: u32,
        count: usize,
    },

    #[error("volume object {0} must use an isotropic material")]
    VolumeNeedsIsotropic(usize),
}

/// Color returned for rays that escape the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(Color),
    /// Blend from `horizon` (ray pointing down) to `zenith` (ray pointing up)
    Gradient { horizon: Color, zenith: Color },
}

impl Background {
    /// White-to-blue sky.
    pub fn sky() -> Self {
        Background::Gradient {
            horizon: Color::ONE,
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }

    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Solid(color) => *color,
            Background::Gradient { horizon, zenith } => {
                let unit_direction = ray.direction().normalize_or_zero();
                let t = 0.5 * (unit_direction.y + 1.0);
                horizon.lerp(*zenith, t)
            }
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::ZERO)
    }
}

/// Everything the renderer reads.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub background: Background,
    pub camera: Camera,
    objects: Vec<Geometry>,
    materials: Vec<Material>,
    bvh: Option<Bvh>,
}

impl Scene {
    pub fn new(camera: Camera, background: Background) -> Self {
        Self {
            background,
            camera,
            ..Default::default()
        }
    }

    /// Append a material and return its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    /// Append an object after checking its material reference.
    ///
    /// Invalidates any previously built BVH.
    pub fn add_object(&mut self, geometry: Geometry) -> Result<ObjectId, SceneError> {
        let object = self.objects.len();
        let material = self
            .materials
            .get(geometry.material.index())
            .ok_or(SceneError::UnknownMaterial {
                object,
                material: geometry.material.0,
                count: self.materials.len(),
            })?;

        if geometry.shape.is_volume() && !material.is_isotropic() {
            return Err(SceneError::VolumeNeedsIsotropic(object));
        }

        self.objects.push(geometry);
        self.bvh = None;
        Ok(object as ObjectId)
    }

    /// Build the acceleration structure over the shutter interval.
    ///
    /// Reorders the object buffer: ids returned by `add_object` are not
    /// valid afterwards.
    pub fn build_bvh(&mut self, time0: f32, time1: f32, options: &BvhOptions, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let bvh = Bvh::build(&mut self.objects, time0, time1, options, &mut rng);
        self.bvh = Some(bvh);
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub fn objects(&self) -> &[Geometry] {
        &self.objects
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    #[inline]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Closest hit along `ray` within `(t_min, t_max)`.
    ///
    /// Uses the BVH when one has been built, a linear scan otherwise.
    pub fn intersect(
        &self,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        let ray_t = Interval::new(t_min, t_max);
        let closest = match &self.bvh {
            Some(bvh) if !bvh.is_empty() => bvh.intersect(&self.objects, ray, ray_t, rng),
            _ => self.closest_linear(ray, ray_t, rng),
        };
        closest.map(|(id, hit)| self.objects[id as usize].evaluate(ray, hit, id))
    }

    /// Brute-force closest hit over every object, ignoring the BVH.
    pub fn intersect_linear(
        &self,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        self.closest_linear(ray, Interval::new(t_min, t_max), rng)
            .map(|(id, hit)| self.objects[id as usize].evaluate(ray, hit, id))
    }

    fn closest_linear(
        &self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<(ObjectId, ShapeHit)> {
        let mut closest = None;
        let mut search = ray_t;

        for (id, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.intersect(ray, search, rng) {
                search = search.with_max(hit.t);
                closest = Some((id as ObjectId, hit));
            }
        }
        closest
    }

    /// Bounds of every object over the given time window.
    pub fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.objects.iter().fold(Aabb::EMPTY, |acc, o| {
            Aabb::surrounding(&acc, &o.bounding_box(time0, time1))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::sphere::Sphere;
    use prism_math::Vec3;

    fn sphere_at(z: f32, material: MaterialId) -> Geometry {
        Geometry::new(Shape::Sphere(Sphere::new(Vec3::new(0.0, 0.0, z), 0.5)), material)
    }

    #[test]
    fn test_unknown_material_rejected() {
        let mut scene = Scene::default();
        let err = scene.add_object(sphere_at(-1.0, MaterialId(3))).unwrap_err();
        assert_eq!(
            err,
            SceneError::UnknownMaterial {
                object: 0,
                material: 3,
                count: 0
            }
        );
    }

    #[test]
    fn test_volume_requires_isotropic() {
        let mut scene = Scene::default();
        let diffuse = scene.add_material(Material::lambertian(Color::ONE));
        let fog = scene.add_material(Material::isotropic(Color::ONE));
        let boundary = Shape::Sphere(Sphere::new(Vec3::ZERO, 1.0));
        let volume = Shape::volume(boundary, 0.5).unwrap();

        assert_eq!(
            scene.add_object(Geometry::new(volume.clone(), diffuse)),
            Err(SceneError::VolumeNeedsIsotropic(0))
        );
        assert_eq!(scene.add_object(Geometry::new(volume, fog)), Ok(0));
    }

    #[test]
    fn test_intersect_closest_with_and_without_bvh() {
        let mut scene = Scene::default();
        let mat = scene.add_material(Material::lambertian(Color::splat(0.5)));
        for z in [-3.0, -1.0, -6.0, -2.0] {
            scene.add_object(sphere_at(z, mat)).unwrap();
        }
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let linear = scene.intersect(&ray, 0.001, f32::INFINITY, &mut rng).unwrap();
        assert!((linear.t - 0.5).abs() < 1e-5);

        scene.build_bvh(0.0, 1.0, &BvhOptions::default(), 7);
        let accelerated = scene.intersect(&ray, 0.001, f32::INFINITY, &mut rng).unwrap();
        assert!((accelerated.t - 0.5).abs() < 1e-5);
        assert_eq!(accelerated.material, mat);
    }

    #[test]
    fn test_gradient_background() {
        let sky = Background::sky();
        let up = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let down = Ray::new(Vec3::ZERO, -Vec3::Y, 0.0);

        assert!((sky.color(&up) - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((sky.color(&down) - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_empty_scene_misses() {
        let mut scene = Scene::default();
        scene.build_bvh(0.0, 1.0, &BvhOptions::default(), 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        assert!(scene.intersect(&ray, 0.001, f32::INFINITY, &mut rng).is_none());
        assert_eq!(scene.bounding_box(0.0, 1.0), Aabb::EMPTY);
    }
}
