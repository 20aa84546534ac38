//! Filesystem mutation primitives.
//!
//! # Responsibility
//! - Snapshot documents before mutation.
//! - Replace documents atomically.
//!
//! # Invariants
//! - No document is rewritten without a successful snapshot first (enforced
//!   by `crate::service::note_updater`).

pub mod atomic;
pub mod backup;
