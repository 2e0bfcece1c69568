//! Developer Tooling: frame timing stats panel, scene inspector.
//!
//! # Invariants
//! - Tools only observe; nothing here mutates the scene.

mod inspector;
mod stats;

pub use inspector::{SceneInspector, SceneSummary};
pub use stats::{FrameStats, OverlayAnchor, OverlayStyle, StatsPanel};

pub fn crate_info() -> &'static str {
    "roomscene-tools v0.1.0"
}
