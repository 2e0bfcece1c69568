//! Scene Builder: environment setup, room geometry, camera control binding
//! and the per-frame light animation.
//!
//! # Invariants
//! - Setup never overwrites an existing high score.
//! - `create_walls` adds exactly one group of five meshes to the scene.
//! - `create_windowed_wall` never touches the scene.
//! - One call to `advance_frame` is one frame: one time step, one render.

mod builder;
mod config;
mod controls;
mod environment;
mod error;
mod frame;
mod walls;

pub use builder::SceneBuilder;
pub use config::{AxesConfig, CameraConfig, FrameConfig, LightingConfig, RoomConfig, SceneConfig};
pub use controls::bind_orbit_controls;
pub use environment::{Environment, SurfaceInfo, setup_environment};
pub use error::SetupError;
pub use frame::FrameLoop;
pub use walls::{WINDOW_SIZE, WallBuilder};

pub fn crate_info() -> &'static str {
    "roomscene-builder v0.1.0"
}
