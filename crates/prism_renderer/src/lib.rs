//! Prism renderer: CPU path tracing.
//!
//! A Monte Carlo path tracer over a closed set of analytic shapes and
//! materials, accelerated by a flat BVH and driven by a pool of worker
//! threads.

mod bucket;
mod bvh;
mod camera;
mod error;
mod geometry;
mod hittable;
mod material;
mod rect;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;
mod volume;

pub use bucket::{generate_buckets, generate_work, render_bucket, Bucket, BucketResult, WorkUnit};
pub use bvh::{Bvh, BvhNode, BvhOptions, DEFAULT_MAX_LEAF_SIZE};
pub use camera::{Camera, CameraView};
pub use error::RenderError;
pub use geometry::{Geometry, GeometryError, RotationY, Shape, Transform};
pub use hittable::{face_normal, HitRecord, Intersect, ObjectId, ShapeHit, Surface};
pub use material::{reflect, refract, Material, MaterialId, ScatterResult};
pub use rect::{Cuboid, Plane, Rect};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render_pixel, ImageBuffer, PixelSink,
    RenderControl, RenderSettings, RenderStats, Renderer, T_MIN,
};
pub use sampling::{
    gen_f32, random_in_unit_disk, random_in_unit_sphere, random_unit_vector, worker_rng,
};
pub use scene::{Background, Scene, SceneError};
pub use sphere::{sphere_uv, MovingSphere, Sphere};
pub use texture::{ImageTexture, Perlin, Texture};
pub use volume::Volume;

/// Re-export common math types from prism_math
pub use prism_math::{Aabb, Color, Interval, Ray, Vec3};
