//! Procedural and image textures sampled by materials.

use std::sync::Arc;

use prism_math::{Color, Vec3};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::sampling::random_unit_vector;

/// Something a material can look its albedo up in.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    /// A single constant color
    Solid(Color),
    /// 3D checker pattern alternating on the sign of sin(sx)·sin(sy)·sin(sz)
    Checker { even: Color, odd: Color, scale: f32 },
    /// Smooth Perlin noise
    Noise {
        color: Color,
        scale: f32,
        perlin: Arc<Perlin>,
    },
    /// Veined marble: phase-shifted sine driven by turbulence
    Marble {
        color: Color,
        scale: f32,
        turbulence: f32,
        perlin: Arc<Perlin>,
    },
    /// Decoded bitmap addressed by (u, v)
    Image(Arc<ImageTexture>),
}

impl Texture {
    pub fn solid(r: f32, g: f32, b: f32) -> Self {
        Texture::Solid(Color::new(r, g, b))
    }

    /// Sample the texture at surface coordinates `(u, v)` and point `p`.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker { even, odd, scale } => {
                let sines = (scale * p.x).sin() * (scale * p.y).sin() * (scale * p.z).sin();
                if sines > 0.0 {
                    *even
                } else {
                    *odd
                }
            }
            Texture::Noise {
                color,
                scale,
                perlin,
            } => *color * 0.5 * (1.0 + perlin.noise(*scale * p)),
            Texture::Marble {
                color,
                scale,
                turbulence,
                perlin,
            } => *color * 0.5 * (1.0 + (scale * p.z + turbulence * perlin.turbulence(p, 7)).sin()),
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

impl Default for Texture {
    fn default() -> Self {
        Texture::Solid(Color::splat(0.5))
    }
}

const POINT_COUNT: usize = 256;

/// Gradient-lattice Perlin noise.
#[derive(Debug, Clone, PartialEq)]
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT).map(|_| random_unit_vector(rng)).collect();
        Self {
            gradients,
            perm_x: permutation(rng),
            perm_y: permutation(rng),
            perm_z: permutation(rng),
        }
    }

    /// Noise value in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let f = p - p.floor();
        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[((i + di as i64) & 255) as usize]
                        ^ self.perm_y[((j + dj as i64) & 255) as usize]
                        ^ self.perm_z[((k + dk as i64) & 255) as usize];
                    *cell = self.gradients[index];
                }
            }
        }
        trilinear(&c, f)
    }

    /// Sum of `depth` octaves of absolute noise.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp);
            weight *= 0.5;
            temp *= 2.0;
        }
        accum.abs()
    }
}

fn permutation(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();
    p.shuffle(rng);
    p
}

/// Hermite-smoothed trilinear blend of the eight corner gradients.
fn trilinear(c: &[[[Vec3; 2]; 2]; 2], f: Vec3) -> f32 {
    let s = f * f * (Vec3::splat(3.0) - 2.0 * f);
    let mut accum = 0.0;

    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight = f - Vec3::new(fi, fj, fk);
                accum += (fi * s.x + (1.0 - fi) * (1.0 - s.x))
                    * (fj * s.y + (1.0 - fj) * (1.0 - s.y))
                    * (fk * s.z + (1.0 - fk) * (1.0 - s.z))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}

/// A decoded image in linear RGB, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageTexture {
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Sample at UV coordinates (bilinear filtering).
    ///
    /// UVs are clamped to [0, 1] with (0, 0) at the bottom-left. A texture
    /// with no pixel data samples as solid cyan so missing images stand out.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.width == 0 || self.height == 0 || self.pixels.is_empty() {
            return Color::new(0.0, 1.0, 1.0);
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0); // Flip V for image coordinates

        let x = u * (self.width - 1) as f32;
        let y = v * (self.height - 1) as f32;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(Color::ZERO)
    }
}
