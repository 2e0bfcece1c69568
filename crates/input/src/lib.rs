//! Camera control binding: pointer input mapped to orbit controls.
//!
//! # Invariants
//! - Controls only ever write the camera position and target.
//! - Polar angle stays within the configured range, away from the poles.
//! - Pending deltas decay by `1 - damping_factor` per `update()`.

pub mod action;
pub mod orbit;

pub use action::{ControlAction, PIXELS_PER_LINE, PointerButton, PointerTracker};
pub use orbit::{OrbitControls, OrbitSettings};

pub fn crate_info() -> &'static str {
    "roomscene-input v0.1.0"
}
