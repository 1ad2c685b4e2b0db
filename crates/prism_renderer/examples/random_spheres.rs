//! Render the classic field of random spheres without a scene file.
//!
//! Run with: cargo run --example random_spheres --release

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};

use prism_renderer::{
    Background, BvhOptions, Camera, Color, Geometry, ImageBuffer, Material, ObjectId,
    RenderSettings, Renderer, Scene, SceneError, Shape, Sphere, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: u32 = 400;
const HEIGHT: u32 = 225;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut scene = build_scene(7)?;
    scene.build_bvh(0.0, 0.0, &BvhOptions::default(), 7);
    log::info!("Created {} objects", scene.objects().len());

    let settings = RenderSettings::default()
        .with_resolution(WIDTH, HEIGHT)
        .with_quality(32, 16);
    let renderer = Renderer::new(settings)?;

    let mut image = ImageBuffer::new(WIDTH, HEIGHT);
    let stats = renderer.render(&scene, &mut image)?;
    log::info!("Rendered in {:?}", stats.elapsed);

    let filename = "random_spheres.ppm";
    save_ppm(&image, filename)?;
    log::info!("Saved to {}", filename);
    Ok(())
}

fn build_scene(seed: u64) -> Result<Scene, Box<dyn Error>> {
    let camera = Camera::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0);
    let mut scene = Scene::new(camera, Background::sky());

    add(
        &mut scene,
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(Color::splat(0.5)),
    )?;
    add(&mut scene, Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5))?;
    add(
        &mut scene,
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    )?;
    add(
        &mut scene,
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    )?;

    let mut rng = StdRng::seed_from_u64(seed);
    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            let material = if choose_mat < 0.8 {
                let albedo = Color::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                Material::lambertian(albedo)
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                );
                Material::metal(albedo, rng.gen_range(0.0..0.5))
            } else {
                Material::dielectric(1.5)
            };
            add(&mut scene, center, 0.2, material)?;
        }
    }

    Ok(scene)
}

fn add(scene: &mut Scene, center: Vec3, radius: f32, material: Material) -> Result<ObjectId, SceneError> {
    let id = scene.add_material(material);
    scene.add_object(Geometry::new(Shape::Sphere(Sphere::new(center, radius)), id))
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(filename)?);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    writer.flush()
}
