//! Scene graph: the single mutable tree the room demo renders every frame.
//!
//! # Invariants
//! - One scene per application instance; nodes are only added, never removed.
//! - Every mutation bumps the scene revision.
//! - The sun position is a pure function of the accumulated time.

pub mod camera;
pub mod node;
pub mod scene;
pub mod sun;

pub use camera::PerspectiveCamera;
pub use node::{
    AmbientLight, AxesHelper, BoxGeometry, LambertMaterial, Mesh, Node, NodeKind, PointLight,
    PointLightHelper, ShadowConfig,
};
pub use scene::{Scene, SceneItem};
pub use sun::SunOrbit;

pub fn crate_info() -> &'static str {
    "roomscene-scene v0.1.0"
}
