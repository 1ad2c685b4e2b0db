//! Surface scattering behaviours.
//!
//! Materials form a closed set, stored contiguously in the scene and
//! addressed from geometry by [`MaterialId`].

use prism_math::{near_zero, Color, Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};
use crate::texture::Texture;

/// Index of a material in the scene's material buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Outcome of a successful scatter event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Fraction of light carried by the scattered ray, per channel
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How light interacts with a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Ideal diffuse reflector (solid color or textured)
    Lambertian { albedo: Texture },
    /// Specular reflector. `fuzz` 0.0 = perfect mirror, 1.0 = very rough
    Metal { albedo: Color, fuzz: f32 },
    /// Glass-like refractor with index of refraction `ior`
    Dielectric { ior: f32 },
    /// Emitter that never scatters
    DiffuseLight { emit: Color },
    /// Uniform phase function for participating media
    Isotropic { albedo: Texture },
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian {
            albedo: Texture::Solid(albedo),
        }
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric { ior }
    }

    pub fn diffuse_light(emit: Color) -> Self {
        Material::DiffuseLight { emit }
    }

    pub fn isotropic(albedo: Color) -> Self {
        Material::Isotropic {
            albedo: Texture::Solid(albedo),
        }
    }

    pub fn is_isotropic(&self) -> bool {
        matches!(self, Material::Isotropic { .. })
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::DiffuseLight { .. })
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` when the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian { albedo } => {
                let mut direction = rec.normal + random_unit_vector(rng);

                // Catch degenerate scatter direction
                if near_zero(direction, 1e-8) {
                    direction = rec.normal;
                }

                Some(ScatterResult {
                    attenuation: albedo.value(rec.u, rec.v, rec.p),
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let direction = reflected + *fuzz * random_in_unit_sphere(rng);

                // Fuzz pushed the ray below the surface
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }

                Some(ScatterResult {
                    attenuation: *albedo,
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                })
            }
            Material::Dielectric { ior } => {
                let ratio = if rec.front_face { 1.0 / ior } else { *ior };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                let cannot_refract = ratio * sin_theta > 1.0;
                let direction = if cannot_refract || reflectance(cos_theta, ratio) > gen_f32(rng)
                {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, ratio)
                };

                Some(ScatterResult {
                    attenuation: Color::ONE,
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                })
            }
            Material::DiffuseLight { .. } => None,
            Material::Isotropic { albedo } => Some(ScatterResult {
                attenuation: albedo.value(rec.u, rec.v, rec.p),
                scattered: Ray::new(rec.p, random_unit_vector(rng), ray_in.time()),
            }),
        }
    }

    /// Light emitted at the hit point. Black for everything but lights.
    pub fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        match self {
            Material::DiffuseLight { emit } => *emit,
            _ => Color::ZERO,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::lambertian(Color::splat(0.5))
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance
#[inline]
fn reflectance(cosine: f32, ratio: f32) -> f32 {
    let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
