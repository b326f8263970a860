//! History and audit records
//!
//! Two append-only record types share the workflow timeline:
//!
//! - [`StageTransitionRecord`]: written once per committed change, either
//!   a stage advance or a flag update (which keeps `from_stage ==
//!   to_stage`).
//! - [`GateValidationRecord`]: written once per *attempted* advance,
//!   whatever the outcome. Rejected attempts leave only this record.

use crate::{ActorId, ProductionStage, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one gate validation attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    /// All gate requirements were met
    Passed,
    /// One or more requirements were unmet and no bypass was granted
    Failed,
    /// Requirements were unmet but a supervised bypass forced the advance
    Bypassed,
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Bypassed => "bypassed",
        }
    }
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One committed change on the workflow timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageTransitionRecord {
    /// Unique record id
    pub id: String,
    /// The workflow this record belongs to
    pub workflow_id: WorkflowId,
    /// Stage before the change
    pub from_stage: ProductionStage,
    /// Stage after the change (equal to `from_stage` for flag updates)
    pub to_stage: ProductionStage,
    /// Who made the change
    pub actor: ActorId,
    /// Free-text notes
    pub notes: String,
    /// When the change was committed
    pub recorded_at: DateTime<Utc>,
}

impl StageTransitionRecord {
    pub fn new(
        workflow_id: WorkflowId,
        from_stage: ProductionStage,
        to_stage: ProductionStage,
        actor: ActorId,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_id,
            from_stage,
            to_stage,
            actor,
            notes: notes.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Audit entry for one attempted stage advance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateValidationRecord {
    /// Unique record id
    pub id: String,
    /// The workflow this record belongs to
    pub workflow_id: WorkflowId,
    /// Stage the advance started from
    pub from_stage: ProductionStage,
    /// Requested target stage
    pub to_stage: ProductionStage,
    /// What happened
    pub outcome: GateOutcome,
    /// Unmet requirements, in evaluation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    /// Structured detail payload (photo counts, move kind, ...)
    pub details: serde_json::Value,
    /// Who authorized the bypass, when one was granted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_actor: Option<ActorId>,
    /// Why the bypass was granted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_reason: Option<String>,
    /// Who attempted the advance
    pub checked_by: ActorId,
    /// When the attempt was validated
    pub checked_at: DateTime<Utc>,
}

impl GateValidationRecord {
    pub fn new(
        workflow_id: WorkflowId,
        from_stage: ProductionStage,
        to_stage: ProductionStage,
        outcome: GateOutcome,
        checked_by: ActorId,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_id,
            from_stage,
            to_stage,
            outcome,
            failures: Vec::new(),
            details: serde_json::Value::Null,
            bypass_actor: None,
            bypass_reason: None,
            checked_by,
            checked_at: Utc::now(),
        }
    }

    pub fn with_failures(mut self, failures: Vec<String>) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_bypass(mut self, actor: ActorId, reason: impl Into<String>) -> Self {
        self.bypass_actor = Some(actor);
        self.bypass_reason = Some(reason.into());
        self
    }
}
