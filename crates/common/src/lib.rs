//! Shared types used across the room scene crates.

pub mod types;

pub use types::{Color, NodeId, Transform};
