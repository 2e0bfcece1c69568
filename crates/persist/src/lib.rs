//! Persistence: small durable key-value state that survives restarts.
//!
//! # Invariants
//! - Defaults are written only when a key is absent.
//! - The on-disk file is replaced atomically on every write.

mod store;

pub use store::{
    FileStore, HIGH_SCORE_DEFAULT, HIGH_SCORE_KEY, KeyValueStore, MemoryStore, StorageFile,
    StoreError, ensure_high_score, high_score,
};

pub fn crate_info() -> &'static str {
    "roomscene-persist v0.1.0"
}
