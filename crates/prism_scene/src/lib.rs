//! Prism scene files.
//!
//! Reads the JSON scene format into a [`prism_renderer::Scene`]:
//!
//! ```ignore
//! use prism_scene::load_scene;
//!
//! let scene = load_scene("scenes/cornell_smoke.json")?;
//! println!("Loaded {} objects", scene.objects().len());
//! ```

pub mod description;
pub mod loader;
pub mod texture;

pub use description::SceneDescription;
pub use loader::{build_scene, load_scene, load_scene_from_str, LoadResult, SceneLoadError};
pub use texture::{load_texture_file, srgb_to_linear, TextureCache, TextureError};
