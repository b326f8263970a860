//! Production workflow domain types for Ridgeline
//!
//! A production workflow tracks one roofing job (or project) through a
//! fixed, ordered sequence of stages, from document submission to
//! close-out. These types are the shared vocabulary of the engine:
//!
//! - **ProductionStage**: the closed set of stages a job passes through.
//! - **DocumentFlags**: the boolean progress flags (NOC uploaded, permit
//!   approved, materials delivered, ...) that gate stage entry and exit.
//! - **ProductionWorkflow**: one job's production run - its current stage
//!   and flag state.
//! - **StageTransitionRecord**: immutable history entry, written once per
//!   committed stage change or flag update.
//! - **GateValidationRecord**: immutable audit entry, written once per
//!   attempted stage advance regardless of outcome.
//!
//! # Design Principles
//!
//! 1. Stages are a closed enum, matched exhaustively. No string-keyed
//!    stage dispatch.
//! 2. History and audit records are append-only and never mutated.
//! 3. Exactly one workflow exists per subject, enforced at the store.

#![deny(unsafe_code)]

mod flags;
mod records;
mod stage;
mod workflow;

pub use flags::*;
pub use records::*;
pub use stage::*;
pub use workflow::*;
