//! Flag updater: document-status changes on the workflow timeline
//!
//! Flag updates never touch the stage and are never gate-checked; they
//! are how the gates become satisfiable. Each non-empty update appends a
//! history record whose from and to stage both equal the current stage,
//! so document progress is auditable on the same timeline as stage
//! changes.

use crate::{EngineError, EngineResult};
use chrono::Utc;
use production_storage::{TransitionLog, WorkflowStore};
use production_types::{
    ActorId, FlagPatch, ProductionWorkflow, StageTransitionRecord, WorkflowId,
};
use std::sync::Arc;

/// Applies partial flag updates to a workflow
pub struct FlagUpdater {
    workflows: Arc<dyn WorkflowStore>,
    transitions: Arc<dyn TransitionLog>,
}

impl FlagUpdater {
    pub fn new(workflows: Arc<dyn WorkflowStore>, transitions: Arc<dyn TransitionLog>) -> Self {
        Self {
            workflows,
            transitions,
        }
    }

    /// Merge `patch` into the workflow's flags and record the change.
    ///
    /// An empty patch is a no-op and leaves no history record.
    pub async fn update_flags(
        &self,
        workflow_id: &WorkflowId,
        patch: &FlagPatch,
        actor: &ActorId,
    ) -> EngineResult<ProductionWorkflow> {
        let mut workflow = self
            .workflows
            .get(workflow_id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;

        if patch.is_empty() {
            return Ok(workflow);
        }

        workflow.flags.apply(patch);
        let now = Utc::now();
        self.workflows
            .update_flags(workflow_id, workflow.flags, now)
            .await?;
        workflow.updated_at = now;

        let stage = workflow.current_stage;
        self.transitions
            .append(StageTransitionRecord::new(
                workflow_id.clone(),
                stage,
                stage,
                actor.clone(),
                format!("Document updates: {}", patch.summary()),
            ))
            .await?;

        tracing::info!(
            workflow = %workflow_id,
            updates = %patch.summary(),
            "document flags updated"
        );

        Ok(workflow)
    }
}
