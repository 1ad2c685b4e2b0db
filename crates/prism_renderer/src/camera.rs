//! Camera for ray generation.
//!
//! [`Camera`] holds the user-facing parameters. [`Camera::view`] resolves them
//! against an image size into a [`CameraView`] that generates rays.

use prism_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::{gen_f32, gen_range, random_in_unit_disk};

/// Camera placement, lens and shutter.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Lens diameter; 0 disables depth of field
    pub aperture: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f32,

    // Shutter interval sampled for motion blur
    pub shutter_open: f32,
    pub shutter_close: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            shutter_open: 0.0,
            shutter_close: 0.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the shutter interval rays are time-stamped within.
    pub fn with_shutter(mut self, open: f32, close: f32) -> Self {
        self.shutter_open = open;
        self.shutter_close = close;
        self
    }

    /// Resolve the viewport for a `width` x `height` image.
    pub fn view(&self, width: u32, height: u32) -> CameraView {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (width / height);

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / width;
        let pixel_delta_v = viewport_v / height;

        // Calculate upper left pixel location
        let viewport_upper_left =
            self.look_from - self.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;

        let lens_radius = self.aperture / 2.0;

        CameraView {
            center: self.look_from,
            pixel00_loc: viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v),
            pixel_delta_u,
            pixel_delta_v,
            defocus_disk_u: u * lens_radius,
            defocus_disk_v: v * lens_radius,
            lens_radius,
            shutter_open: self.shutter_open,
            shutter_close: self.shutter_close,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// A camera resolved for one image size.
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    lens_radius: f32,
    shutter_open: f32,
    shutter_close: f32,
}

impl CameraView {
    /// Generate a ray for pixel (i, j) with random sampling. Row 0 is the top.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);
        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;
        self.ray_through(pixel_sample, rng)
    }

    /// Ray through the exact centre of pixel (i, j), lens and time still sampled.
    pub fn get_center_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let pixel_center =
            self.pixel00_loc + (i as f32) * self.pixel_delta_u + (j as f32) * self.pixel_delta_v;
        self.ray_through(pixel_center, rng)
    }

    fn ray_through(&self, target: Vec3, rng: &mut dyn RngCore) -> Ray {
        let ray_origin = if self.lens_radius <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_time = if self.shutter_close > self.shutter_open {
            gen_range(rng, self.shutter_open, self.shutter_close)
        } else {
            self.shutter_open
        };

        Ray::new(ray_origin, target - ray_origin, ray_time)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_center_ray() {
        let view = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .view(101, 101);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = view.get_center_ray(50, 50, &mut rng);
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction().normalize() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_camera_row_zero_is_top() {
        let view = Camera::new().view(100, 50);
        let mut rng = StdRng::seed_from_u64(42);

        let top_left = view.get_ray(0, 0, &mut rng).direction();
        let bottom_right = view.get_ray(99, 49, &mut rng).direction();
        assert!(top_left.y > 0.0 && top_left.x < 0.0);
        assert!(bottom_right.y < 0.0 && bottom_right.x > 0.0);
        // 2:1 aspect: horizontal extent is twice the vertical one
        assert!((top_left.x / top_left.y + 2.0).abs() < 0.1);
    }

    #[test]
    fn test_camera_shutter_and_aperture() {
        let view = Camera::new()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.5, 5.0)
            .with_shutter(0.25, 0.75)
            .view(64, 64);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let ray = view.get_ray(32, 32, &mut rng);
            assert!((0.25..0.75).contains(&ray.time()));
            let offset = ray.origin() - Vec3::new(0.0, 0.0, 5.0);
            assert!(offset.length() <= 0.25 + 1e-5);
            assert!(offset.z.abs() < 1e-5);
        }
    }

    #[test]
    fn test_camera_closed_shutter_fixed_time() {
        let view = Camera::new().with_shutter(0.4, 0.4).view(8, 8);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(view.get_ray(3, 3, &mut rng).time(), 0.4);
    }
}
