//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with configurable depth
//! - Anti-aliasing via multi-sampling
//! - A fixed worker pool claiming work units from an atomic counter
//! - Gamma correction at the output boundary

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use prism_math::{Color, Interval, Ray};
use rand::RngCore;

use crate::bucket::{generate_work, render_bucket, BucketResult, WorkUnit};
use crate::bvh::BvhOptions;
use crate::camera::CameraView;
use crate::error::RenderError;
use crate::sampling::worker_rng;
use crate::scene::Scene;

/// Lower bound on hit distances, keeps bounced rays off their own surface.
pub const T_MIN: f32 = 0.001;

/// Paths whose throughput drops below this in every channel are terminated.
const ATTENUATION_EPSILON: f32 = 1e-6;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_bounces: u32,
    /// Worker thread count
    pub threads: usize,
    /// Base seed; worker `i` draws from a stream derived from `seed` and `i`
    pub seed: u64,
    pub work_unit: WorkUnit,
    pub bvh: BvhOptions,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            samples_per_pixel: 500,
            max_bounces: 50,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            seed: 0,
            work_unit: WorkUnit::Scanline,
            bvh: BvhOptions::default(),
        }
    }
}

impl RenderSettings {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_bounces: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_work_unit(mut self, work_unit: WorkUnit) -> Self {
        self.work_unit = work_unit;
        self
    }

    /// Reject values the render loop cannot run with.
    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |msg: &str| Err(RenderError::InvalidSettings(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("image width and height must be positive");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be positive");
        }
        if self.threads == 0 {
            return invalid("thread count must be positive");
        }
        if let WorkUnit::Bucket { size: 0 } = self.work_unit {
            return invalid("bucket size must be positive");
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// Follows the path for at most `max_bounces` surface interactions,
/// accumulating emission weighted by the product of attenuations so far.
/// Zero bounces is exactly black.
pub fn ray_color(ray: &Ray, scene: &Scene, max_bounces: u32, rng: &mut dyn RngCore) -> Color {
    let mut color = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for _ in 0..max_bounces {
        let Some(rec) = scene.intersect(&ray, T_MIN, f32::INFINITY, rng) else {
            return color + throughput * scene.background.color(&ray);
        };
        let Some(material) = scene.material(rec.material) else {
            return color;
        };

        color += throughput * material.emitted(&ray, &rec);

        let Some(scatter) = material.scatter(&ray, &rec, rng) else {
            return color;
        };
        if scatter.attenuation.max_element() < ATTENUATION_EPSILON {
            return color;
        }

        throughput *= scatter.attenuation;
        ray = scatter.scattered;
    }

    color
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    view: &CameraView,
    scene: &Scene,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..settings.samples_per_pixel {
        let ray = view.get_ray(x, y, rng);
        let sample = ray_color(&ray, scene, settings.max_bounces, rng);
        // A degenerate path only darkens its own sample
        pixel_color += Color::select(sample.is_nan_mask(), Color::ZERO, sample);
    }

    // Average the samples
    pixel_color / settings.samples_per_pixel.max(1) as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Displayable range of a gamma-corrected channel.
const INTENSITY: Interval = Interval::new(0.0, 1.0);

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (255.0 * INTENSITY.clamp(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Receives finished pixels. Colors are linear, averaged over all samples.
pub trait PixelSink {
    fn set_pixel(&mut self, x: u32, y: u32, color: Color);
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::ZERO)
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Gamma-corrected RGB bytes, row-major from the top row.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgb8(*c)).collect()
    }
}

impl PixelSink for ImageBuffer {
    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.set(x, y, color);
    }
}

/// Cooperative stop flag shared between a renderer and its callers.
#[derive(Debug, Clone, Default)]
pub struct RenderControl {
    cancelled: Arc<AtomicBool>,
}

impl RenderControl {
    /// Ask workers to stop at their next claim.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub work_units: usize,
    pub pixels: u64,
    pub elapsed: Duration,
}

/// Multi-threaded renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    settings: RenderSettings,
    control: RenderControl,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Result<Self, RenderError> {
        settings.validate()?;
        Ok(Self {
            settings,
            control: RenderControl::default(),
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Handle that can cancel a render running on another thread.
    pub fn control(&self) -> RenderControl {
        self.control.clone()
    }

    /// Render `scene` into `sink`, writing every pixel exactly once.
    ///
    /// Workers claim work units from a shared counter and send finished
    /// units back to the calling thread, which owns the sink.
    pub fn render<S: PixelSink + ?Sized>(
        &self,
        scene: &Scene,
        sink: &mut S,
    ) -> Result<RenderStats, RenderError> {
        let settings = &self.settings;
        let start = Instant::now();

        let work = generate_work(settings.width, settings.height, settings.work_unit);
        let total = work.len();
        let view = scene.camera.view(settings.width, settings.height);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .thread_name(|i| format!("prism-worker-{i}"))
            .build()?;

        log::info!(
            "Rendering {}x{} @ {} spp, {} bounces, {} threads, {} work units",
            settings.width,
            settings.height,
            settings.samples_per_pixel,
            settings.max_bounces,
            settings.threads,
            total
        );

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<BucketResult>();

        let (completed, pixels) = pool.in_place_scope(|s| {
            for worker_id in 0..settings.threads {
                let tx = tx.clone();
                let (next, work, control) = (&next, &work, &self.control);

                s.spawn(move |_| {
                    let mut rng = worker_rng(settings.seed, worker_id);
                    let mut claimed = 0usize;

                    while !control.is_cancelled() {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(bucket) = work.get(index) else {
                            break;
                        };
                        let pixels = render_bucket(bucket, &view, scene, settings, &mut rng);
                        claimed += 1;
                        if tx.send(BucketResult::new(*bucket, pixels)).is_err() {
                            break;
                        }
                    }
                    log::debug!("worker {worker_id} finished after {claimed} work units");
                });
            }
            drop(tx);

            let mut completed = 0usize;
            let mut pixels = 0u64;
            let mut last_decile = 0;

            for result in rx {
                for (x, y, color) in result.iter_pixels() {
                    sink.set_pixel(x, y, color);
                    pixels += 1;
                }
                completed += 1;

                let decile = completed * 10 / total;
                if decile > last_decile {
                    last_decile = decile;
                    log::info!("Progress: {}% ({completed}/{total})", decile * 10);
                }
            }
            (completed, pixels)
        });

        if completed < total {
            log::warn!("Render cancelled: {completed}/{total} work units done");
            return Err(RenderError::Cancelled { completed, total });
        }

        let stats = RenderStats {
            work_units: completed,
            pixels,
            elapsed: start.elapsed(),
        };
        log::info!("Render finished in {:.2?}", stats.elapsed);
        Ok(stats)
    }
}
