//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - Antialiasing is chosen once from the device pixel ratio.
//!
//! The wgpu backend lives in `roomscene-render-wgpu`; [`DebugTextRenderer`]
//! renders to a string for the CLI, logging and tests.

mod config;
mod renderer;

pub use config::{PowerPreference, RendererConfig, ShadowMapType, antialias_for_pixel_ratio};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "roomscene-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
