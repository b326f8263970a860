use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use production_types::{
    DocumentFlags, GateValidationRecord, ProductionStage, ProductionWorkflow,
    StageTransitionRecord, SubjectRef, TenantId, WorkflowId,
};

/// Storage interface for workflow records.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert a newly created workflow. Fails with `Conflict` if the
    /// subject already has one.
    async fn insert(&self, workflow: ProductionWorkflow) -> StorageResult<()>;

    /// Get one workflow by id.
    async fn get(&self, id: &WorkflowId) -> StorageResult<Option<ProductionWorkflow>>;

    /// Get the workflow for a subject, if production has begun.
    async fn get_by_subject(
        &self,
        tenant: &TenantId,
        subject: &SubjectRef,
    ) -> StorageResult<Option<ProductionWorkflow>>;

    /// Commit a stage change, compare-and-swap on the current stage.
    ///
    /// Fails with `Conflict` when the stored stage no longer matches
    /// `expected_from` (a concurrent advance won the race).
    async fn update_stage(
        &self,
        id: &WorkflowId,
        expected_from: ProductionStage,
        to: ProductionStage,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Replace the flag state. The stage is untouched.
    async fn update_flags(
        &self,
        id: &WorkflowId,
        flags: DocumentFlags,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()>;
}

/// Append-only store for the transition history timeline.
#[async_trait]
pub trait TransitionLog: Send + Sync {
    async fn append(&self, record: StageTransitionRecord) -> StorageResult<()>;

    /// Records for one workflow, oldest first.
    async fn list_for(&self, workflow_id: &WorkflowId) -> StorageResult<Vec<StageTransitionRecord>>;
}

/// Append-only store for gate validation audit records.
#[async_trait]
pub trait GateAuditLog: Send + Sync {
    async fn append(&self, record: GateValidationRecord) -> StorageResult<()>;

    /// Records for one workflow, oldest first.
    async fn list_for(&self, workflow_id: &WorkflowId)
        -> StorageResult<Vec<GateValidationRecord>>;
}

/// Read-only photo count lookup for a subject.
///
/// Kept as its own narrow port so gate evaluation stays a pure function
/// of values handed to it.
#[async_trait]
pub trait PhotoCounter: Send + Sync {
    async fn count_for_subject(&self, subject: &SubjectRef) -> StorageResult<u32>;
}

/// Unified storage bundle for callers that wire one backend everywhere.
pub trait ProductionStorage:
    WorkflowStore + TransitionLog + GateAuditLog + PhotoCounter + Send + Sync
{
}

impl<T> ProductionStorage for T where
    T: WorkflowStore + TransitionLog + GateAuditLog + PhotoCounter + Send + Sync
{
}
