//! # Jovian
//!
//! **A tilted gas giant turning under a spotlight, rendered with wgpu.**
//!
//! The interesting part is [`orientation`]: the planet's attitude is a unit
//! quaternion, started from a fixed axial tilt and advanced every frame by a
//! small rotation about the planet's own spin axis. Everything else is the
//! plumbing to put that on screen.
//!
//! ## Quick Start
//!
//! ```no_run
//! use jovian::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = Config::default();
//!
//!     run_with_config(AppConfig::from(&config.window), move |ctx| {
//!         ctx.background(Color::BLACK);
//!         let mut planet = Planet::new(ctx, &config.planet, &config.atmosphere);
//!
//!         move |frame| {
//!             planet.advance();
//!             planet.draw(frame);
//!         }
//!     })
//! }
//! ```
//!
//! ## Layout
//!
//! - [`orientation`]: tilt, per-frame spin, drift control. Pure math, `f64`.
//! - [`Planet`]: core and atmosphere meshes driven by an [`OrientationModel`].
//! - [`run`] and [`run_with_config`]: window, event loop and the frame closure.
//! - [`MeshPass`]: depth-tested lit rendering of the queued draws.
//! - [`Config`]: RON configuration with defaults for every field.

mod app;
mod camera;
mod color;
mod config;
mod error;
mod gpu;
mod handles;
mod light;
mod logging;
mod material;
mod mesh;
mod mesh_pass;
pub mod orientation;
mod planet;
mod scene;
mod texture;

pub use app::{AppConfig, Frame, SetupContext, run, run_with_config};
pub use camera::Camera;
pub use color::Color;
pub use config::{
    AtmosphereConfig, CONFIG_FILE_NAME, CameraConfig, Config, DebugConfig, LightConfig,
    PlanetConfig, WindowConfig,
};
pub use error::{AppError, ConfigError, GpuError};
pub use gpu::GpuContext;
pub use handles::{MeshId, TextureId};
pub use light::{LightUniforms, SpotLight};
pub use logging::{DEFAULT_FILTER, config_env_filter, init_logging};
pub use material::{Material, MaterialUniforms, Shading};
pub use mesh::{Mesh, SphereGeometry, Topology, Transform, Vertex3d};
pub use mesh_pass::{DrawUniforms, MeshPass, SceneUniforms};
pub use orientation::{Orientation, OrientationModel, Tilt, advance};
pub use planet::Planet;
pub use scene::{DrawLayer, QueuedMesh, Scene};
pub use texture::Texture;

// Re-export glam types for convenience
pub use glam::{DQuat, DVec3, Mat4, Quat, Vec3};
