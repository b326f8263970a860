//! Storage ports for the production workflow engine.
//!
//! The engine persists through four narrow ports:
//! - workflow records (system of record, compare-and-swap stage commits)
//! - append-only transition history
//! - append-only gate validation audit
//! - a read-only photo count lookup
//!
//! Design stance:
//! - A transactional backend remains the source of truth in production.
//! - The in-memory adapter is deterministic and test-friendly.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use traits::{GateAuditLog, PhotoCounter, ProductionStorage, TransitionLog, WorkflowStore};
