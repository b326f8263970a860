//! Production workflows: one job's run through the stage pipeline
//!
//! A ProductionWorkflow tracks the current stage and flag state for a
//! single subject (a job or a project, never both). It is created once
//! when production begins and only mutated by the engine.

use crate::{DocumentFlags, ProductionStage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a production workflow
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub String);

impl WorkflowId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tenant (contractor company) identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the person (or system) performing an operation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Subject ──────────────────────────────────────────────────────────

/// What the workflow is about: a job or a project, exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectRef {
    Job(String),
    Project(String),
}

impl SubjectRef {
    pub fn job(id: impl Into<String>) -> Self {
        Self::Job(id.into())
    }

    pub fn project(id: impl Into<String>) -> Self {
        Self::Project(id.into())
    }

    /// The underlying job/project id.
    pub fn id(&self) -> &str {
        match self {
            Self::Job(id) | Self::Project(id) => id,
        }
    }
}

impl std::fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Job(id) => write!(f, "job:{}", id),
            Self::Project(id) => write!(f, "project:{}", id),
        }
    }
}

// ── Workflow ─────────────────────────────────────────────────────────

/// One subject's production run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductionWorkflow {
    /// Unique workflow identifier
    pub id: WorkflowId,
    /// Owning tenant
    pub tenant: TenantId,
    /// The job or project this run belongs to
    pub subject: SubjectRef,
    /// Current stage
    pub current_stage: ProductionStage,
    /// Document/progress flag state
    pub flags: DocumentFlags,
    /// Who started production
    pub created_by: ActorId,
    /// When the workflow was created
    pub created_at: DateTime<Utc>,
    /// When the workflow was last updated
    pub updated_at: DateTime<Utc>,
}

impl ProductionWorkflow {
    /// Create a new workflow at the given initial stage with no flags set.
    pub fn new(
        tenant: TenantId,
        subject: SubjectRef,
        initial_stage: ProductionStage,
        created_by: ActorId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::generate(),
            tenant,
            subject,
            current_stage: initial_stage,
            flags: DocumentFlags::none(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_flags(mut self, flags: DocumentFlags) -> Self {
        self.flags = flags;
        self
    }
}
