//! Prism math - vector, ray and bounding-box primitives shared by the
//! path tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Colors share the vector representation (linear RGB, 0-1 nominal).
pub type Color = Vec3;

/// Returns true if every component of `v` is within `eps` of zero.
#[inline]
pub fn near_zero(v: Vec3, eps: f32) -> bool {
    v.x.abs() < eps && v.y.abs() < eps && v.z.abs() < eps
}

/// Component of `v` along `axis` (0=X, 1=Y, 2=Z).
#[inline]
pub fn axis(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}
