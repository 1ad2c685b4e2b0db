//! Serde model of the JSON scene format.
//!
//! Every object carries its own material inline. Tagged enums use a `type`
//! field; unknown tags fail deserialization.

use serde::{Deserialize, Serialize};

pub type Triple = [f32; 3];

/// Top-level scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub background: BackgroundDescription,
    pub camera: CameraDescription,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

/// Either a plain RGB triple or a vertical sky gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackgroundDescription {
    Solid(Triple),
    Gradient { horizon: Triple, zenith: Triple },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDescription {
    pub position: Triple,
    pub look_at: Triple,
    #[serde(default = "default_world_up")]
    pub world_up: Triple,
    pub vertical_fov: f32,
    #[serde(default)]
    pub aperture: f32,
    /// Defaults to the distance between `position` and `lookAt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_distance: Option<f32>,
    #[serde(default)]
    pub time_shutter_open: f32,
    #[serde(default)]
    pub time_shutter_close: f32,
}

fn default_world_up() -> Triple {
    [0.0, 1.0, 0.0]
}

/// One renderable object: a shape, its material and optional modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    #[serde(flatten)]
    pub shape: ShapeDescription,
    pub material: MaterialDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<Triple>,
    /// Rotation about the Y axis in degrees
    #[serde(
        default,
        rename = "rotateY",
        alias = "rotate_y",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotate_y: Option<f32>,
    /// Turns the shape into the boundary of a participating medium
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeDescription {
    Sphere {
        center: Triple,
        radius: f32,
    },
    MovingSphere {
        center: Triple,
        radius: f32,
        direction: Triple,
        speed: f32,
    },
    Rectangle {
        #[serde(rename = "lowerCorner")]
        lower_corner: Triple,
        #[serde(rename = "upperCorner")]
        upper_corner: Triple,
    },
    Box {
        #[serde(rename = "lowerCorner")]
        lower_corner: Triple,
        #[serde(rename = "upperCorner")]
        upper_corner: Triple,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialDescription {
    LambertianColor { albedo: Triple },
    LambertianTexture { texture: TextureDescription },
    Metal { albedo: Triple, fuzz: f32 },
    Dielectric { ior: f32 },
    DiffuseLight { color: Triple },
    Isotropic { color: Triple },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TextureDescription {
    SolidColor {
        color: Triple,
    },
    Checkerboard {
        even: Triple,
        odd: Triple,
        scale: f32,
    },
    Noise {
        color: Triple,
        scale: f32,
    },
    Marble {
        color: Triple,
        scale: f32,
        turbulence: f32,
    },
    Image {
        filename: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VolumeDescription {
    ConstantMedium { density: f32 },
}
