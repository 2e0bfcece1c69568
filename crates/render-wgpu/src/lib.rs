//! wgpu render backend for the room scene.
//!
//! Draws every box mesh as an instanced unit cube with Lambert shading from
//! the scene's ambient and point lights, plus line geometry for the light and
//! axes helpers.
//!
//! # Invariants
//! - Renderer never mutates the scene or camera.
//! - Sample count is fixed at construction from the antialias flag.
//! - Shadow parameters are carried by the scene but no shadow pass is drawn.

mod gpu;
mod lines;
mod shaders;

pub use gpu::{SurfaceTarget, WgpuRenderer};
pub use lines::{LineVertex, axes_lines, light_helper_lines, scene_lines};
