//! Stage-gate workflow engine for Ridgeline production pipelines
//!
//! The engine advances a production workflow through a fixed, ordered
//! sequence of stages. Forward progress is blocked behind per-stage hard
//! requirements; a supervised bypass can force past a failed gate but
//! never past the stage ordering itself; and every attempted advance
//! leaves exactly one audit record, whatever the outcome.
//!
//! # Architecture
//!
//! The [`ProductionOrchestrator`] composes specialized components:
//!
//! - [`StageGraph`] — owns the ordered stage list; classifies a requested
//!   move as forward or corrective and rejects forward skips
//! - [`GateValidator`] — pure evaluation of stage-entry and stage-exit
//!   requirements against flags and photo counts
//! - [`TransitionExecutor`] — runs one advance end to end: ordering check,
//!   gate evaluation, audit write, stage commit, history write
//! - [`BypassController`] — the only path to a forced advance; demands an
//!   actor and a justification and audits both
//! - [`FlagUpdater`] — merges document flag updates without touching the
//!   stage, on the same history timeline
//!
//! # Example
//!
//! ```no_run
//! use production_engine::ProductionOrchestrator;
//! use production_storage::memory::InMemoryProductionStore;
//! use production_types::{ActorId, ProductionStage, SubjectRef, TenantId};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryProductionStore::new());
//! let orchestrator = ProductionOrchestrator::from_storage(store);
//!
//! let workflow = orchestrator
//!     .create_workflow(
//!         TenantId::new("acme-roofing"),
//!         SubjectRef::job("job-42"),
//!         ActorId::new("pm-1"),
//!     )
//!     .await?;
//! assert_eq!(workflow.current_stage, ProductionStage::SubmitDocuments);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod bypass;
pub mod error;
pub mod executor;
pub mod flag_updater;
pub mod gate_validator;
pub mod orchestrator;
pub mod stage_graph;

pub use bypass::{BypassController, BypassGrant};
pub use error::{EngineError, EngineResult};
pub use executor::{AdvanceOutcome, TransitionExecutor};
pub use flag_updater::FlagUpdater;
pub use gate_validator::{GateReport, GateValidator};
pub use orchestrator::{ProductionOrchestrator, WorkflowWithHistory};
pub use stage_graph::{MoveKind, StageGraph};
