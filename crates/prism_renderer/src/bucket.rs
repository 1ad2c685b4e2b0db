//! Work units handed out to render workers.
//!
//! The image is cut into rectangular buckets: full-width scanlines by
//! default, or square tiles visited from the centre outwards.

use prism_math::Color;
use rand::RngCore;

use crate::camera::CameraView;
use crate::renderer::{render_pixel, RenderSettings};
use crate::scene::Scene;

/// How the image is divided between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkUnit {
    /// One image row per claim
    #[default]
    Scanline,
    /// Square tiles of `size` pixels in spiral order
    Bucket { size: u32 },
}

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Split an image into the buckets workers claim, in claim order.
pub fn generate_work(width: u32, height: u32, unit: WorkUnit) -> Vec<Bucket> {
    match unit {
        WorkUnit::Scanline => (0..height)
            .map(|y| Bucket::new(0, y, width, 1, y as usize))
            .collect(),
        WorkUnit::Bucket { size } => generate_buckets(width, height, size.max(1)),
    }
}

/// Generate square buckets for an image, sorted in spiral order from center.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let dx = b.x as f32 + b.width as f32 / 2.0 - center_x;
        let dy = b.y as f32 + b.height as f32 / 2.0 - center_y;
        dx * dx + dy * dy
    };
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket to a vector of linear colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    view: &CameraView,
    scene: &Scene,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(
                view,
                scene,
                bucket.x + local_x,
                bucket.y + local_y,
                settings,
                rng,
            );
            pixels.push(color);
        }
    }

    pixels
}

/// A rendered bucket on its way back to the sink.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Absolute image coordinates paired with each color.
    pub fn iter_pixels(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        let bucket = self.bucket;
        self.pixels.iter().enumerate().map(move |(i, color)| {
            let i = i as u32;
            (bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4);

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!((first.x, first.y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_scanline_work() {
        let rows = generate_work(7, 5, WorkUnit::Scanline);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|b| b.width == 7 && b.height == 1));
        assert_eq!(rows[3].y, 3);
    }

    #[test]
    fn test_result_pixel_coordinates() {
        let bucket = Bucket::new(10, 20, 3, 2, 0);
        let result = BucketResult::new(bucket, vec![Color::ZERO; 6]);
        let coords: Vec<(u32, u32)> = result.iter_pixels().map(|(x, y, _)| (x, y)).collect();

        assert_eq!(
            coords,
            vec![(10, 20), (11, 20), (12, 20), (10, 21), (11, 21), (12, 21)]
        );
    }
}
