//! # Scene
//!
//! This crate contains everything the campus tour knows about its world before a
//! single GPU call is made: the configuration, the scene description, model
//! placement, the scripted camera path and the asset loaders.
//!
//! ## Modules
//!
//! - `config`: Loads the TOML configuration file and falls back to the built-in tour settings.
//! - `campus`: Parses a `.campus` scene description into model placements.
//! - `placement`: Resolves a placement record into a cached world transform.
//! - `camera`: `CameraSample`, the fixed `Projection` and the view-projection math.
//! - `path`: The piecewise camera path evaluated from elapsed time.
//! - `models`: Loads OBJ meshes into flat, non-indexed vertex lists.
//! - `texture`: Decodes texture images and uploads them to the gpu.
//! - `structs`: GPU-compatible vertex and uniform layouts.
//!
//! ## Usage
//!
//! ```no_run
//! use scene::{CameraPath, Projection};
//!
//! let path = CameraPath::campus_tour();
//! let projection = Projection::default();
//!
//! // Path time is wall clock seconds scaled by ten
//! let sample = path.evaluate(2.5 * 10.0);
//! let view_proj = projection.calc_matrix() * sample.view_matrix();
//! ```
mod config;
mod campus;
mod placement;
mod camera;
mod path;
mod models;
mod texture;
mod structs;

pub use config::{Config, WindowSettings, CameraSettings, PathSettings, SceneSettings, TextLabel, AngleUnit};
pub use campus::{load_campus, parse_campus};
pub use placement::{ModelPlacement, resolve};
pub use camera::{CameraSample, Projection, OPENGL_TO_WGPU_MATRIX};
pub use path::{CameraPath, PathEnd, Poly, TimeSegment, SegmentTracker, BREAKPOINTS};
pub use models::{load_obj, load_obj_buf, MeshData};
pub use texture::{load_image, create_texture, GpuTexture};
pub use structs::{CameraUniform, ModelUniform, Vertex};
