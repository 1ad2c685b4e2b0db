//! Conversion of a [`SceneDescription`] into a renderable [`Scene`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use prism_math::Vec3;
use prism_renderer::{
    Background, Camera, Cuboid, Geometry, GeometryError, Material, MovingSphere, Perlin, Rect,
    Scene, SceneError, Shape, Sphere, Texture,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::description::{
    BackgroundDescription, CameraDescription, MaterialDescription, ObjectDescription,
    SceneDescription, ShapeDescription, TextureDescription, VolumeDescription,
};
use crate::texture::{TextureCache, TextureError};

/// Seed of the Perlin lattice shared by noise and marble textures.
const PERLIN_SEED: u64 = 0x5EED;

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object {index}: {source}")]
    Geometry {
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type LoadResult<T> = Result<T, SceneLoadError>;

/// Load a scene file. Image textures resolve relative to the file's directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<Scene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| SceneLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let scene = load_scene_from_str(&json, base_dir)?;
    log::info!(
        "Loaded scene {}: {} objects, {} materials",
        path.display(),
        scene.objects().len(),
        scene.materials().len()
    );
    Ok(scene)
}

/// Parse scene JSON, resolving image textures against `base_dir`.
pub fn load_scene_from_str(json: &str, base_dir: &Path) -> LoadResult<Scene> {
    let description: SceneDescription = serde_json::from_str(json)?;
    build_scene(&description, base_dir)
}

/// Populate a scene from an already parsed description.
pub fn build_scene(description: &SceneDescription, base_dir: &Path) -> LoadResult<Scene> {
    let mut builder = SceneBuilder {
        textures: TextureCache::with_base_dir(base_dir),
        perlin: None,
    };

    let mut scene = Scene::new(
        camera(&description.camera),
        background(&description.background),
    );

    for (index, object) in description.objects.iter().enumerate() {
        let material = builder.material(&object.material)?;
        let material = scene.add_material(material);
        let geometry = builder
            .geometry(object, material)
            .map_err(|source| SceneLoadError::Geometry { index, source })?;
        scene.add_object(geometry)?;
    }

    Ok(scene)
}

fn vec3(t: [f32; 3]) -> Vec3 {
    Vec3::from_array(t)
}

fn camera(desc: &CameraDescription) -> Camera {
    let look_from = vec3(desc.position);
    let look_at = vec3(desc.look_at);
    let focus_dist = desc
        .focus_distance
        .unwrap_or_else(|| (look_from - look_at).length());

    Camera::new()
        .with_position(look_from, look_at, vec3(desc.world_up))
        .with_lens(desc.vertical_fov, desc.aperture, focus_dist)
        .with_shutter(desc.time_shutter_open, desc.time_shutter_close)
}

fn background(desc: &BackgroundDescription) -> Background {
    match desc {
        BackgroundDescription::Solid(color) => Background::Solid(vec3(*color)),
        BackgroundDescription::Gradient { horizon, zenith } => Background::Gradient {
            horizon: vec3(*horizon),
            zenith: vec3(*zenith),
        },
    }
}

struct SceneBuilder {
    textures: TextureCache,
    perlin: Option<Arc<Perlin>>,
}

impl SceneBuilder {
    fn perlin(&mut self) -> Arc<Perlin> {
        self.perlin
            .get_or_insert_with(|| {
                let mut rng = StdRng::seed_from_u64(PERLIN_SEED);
                Arc::new(Perlin::new(&mut rng))
            })
            .clone()
    }

    fn texture(&mut self, desc: &TextureDescription) -> LoadResult<Texture> {
        let texture = match desc {
            TextureDescription::SolidColor { color } => Texture::Solid(vec3(*color)),
            TextureDescription::Checkerboard { even, odd, scale } => Texture::Checker {
                even: vec3(*even),
                odd: vec3(*odd),
                scale: *scale,
            },
            TextureDescription::Noise { color, scale } => Texture::Noise {
                color: vec3(*color),
                scale: *scale,
                perlin: self.perlin(),
            },
            TextureDescription::Marble {
                color,
                scale,
                turbulence,
            } => Texture::Marble {
                color: vec3(*color),
                scale: *scale,
                turbulence: *turbulence,
                perlin: self.perlin(),
            },
            TextureDescription::Image { filename } => Texture::Image(self.textures.load(filename)?),
        };
        Ok(texture)
    }

    fn material(&mut self, desc: &MaterialDescription) -> LoadResult<Material> {
        let material = match desc {
            MaterialDescription::LambertianColor { albedo } => Material::lambertian(vec3(*albedo)),
            MaterialDescription::LambertianTexture { texture } => Material::Lambertian {
                albedo: self.texture(texture)?,
            },
            MaterialDescription::Metal { albedo, fuzz } => Material::metal(vec3(*albedo), *fuzz),
            MaterialDescription::Dielectric { ior } => Material::dielectric(*ior),
            MaterialDescription::DiffuseLight { color } => Material::diffuse_light(vec3(*color)),
            MaterialDescription::Isotropic { color } => Material::isotropic(vec3(*color)),
        };
        Ok(material)
    }

    fn geometry(
        &self,
        desc: &ObjectDescription,
        material: prism_renderer::MaterialId,
    ) -> Result<Geometry, GeometryError> {
        let mut shape = match &desc.shape {
            ShapeDescription::Sphere { center, radius } => {
                Shape::Sphere(Sphere::new(vec3(*center), *radius))
            }
            ShapeDescription::MovingSphere {
                center,
                radius,
                direction,
                speed,
            } => Shape::MovingSphere(MovingSphere::new(
                vec3(*center),
                *radius,
                vec3(*direction),
                *speed,
            )),
            ShapeDescription::Rectangle {
                lower_corner,
                upper_corner,
            } => Shape::Rect(Rect::from_corners(vec3(*lower_corner), vec3(*upper_corner))?),
            ShapeDescription::Box {
                lower_corner,
                upper_corner,
            } => Shape::Cuboid(Cuboid::new(vec3(*lower_corner), vec3(*upper_corner))),
        };

        if let Some(VolumeDescription::ConstantMedium { density }) = &desc.volume {
            shape = Shape::volume(shape, *density)?;
        }

        let mut geometry = Geometry::new(shape, material);
        if let Some(degrees) = desc.rotate_y {
            geometry = geometry.rotated_y(degrees);
        }
        if let Some(offset) = desc.translate {
            geometry = geometry.translated(vec3(offset));
        }
        Ok(geometry)
    }
}
