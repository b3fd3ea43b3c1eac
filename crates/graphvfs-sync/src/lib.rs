//! GraphVFS Sync - turns the remote delta feed into change event streams
//!
//! This crate provides:
//! - [`snapshot`] - One round of delta items with per-round path reconstruction
//! - [`engine`] - The per-drive polling loop and change classification
//! - [`session`] - Reference-counted watch sessions, one engine per drive
//!
//! ## Flow
//!
//! ```text
//! IDeltaSource ──→ DeltaEngine ──→ broadcast<ChangeBatch> ──→ WatchHandle (xN)
//!                      │
//!                 DeltaSnapshot (previous round)
//! ```

pub mod engine;
pub mod session;
pub mod snapshot;


pub use engine::{DeltaEngine, EngineState};
pub use session::{WatchHandle, WatchRegistry};
pub use snapshot::{DeltaSnapshot, SnapshotPaths};
