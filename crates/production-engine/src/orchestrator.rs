//! Production orchestrator: the engine's entry point
//!
//! The orchestrator composes the stage graph, gate validator, transition
//! executor, bypass controller, and flag updater behind the operations a
//! request handler needs: create (idempotent), read with history,
//! advance, advance with bypass, and flag updates. It holds no mutable
//! state of its own; everything lives in the backing stores, so one
//! orchestrator serves any number of concurrent workflows.

use crate::bypass::BypassController;
use crate::executor::{AdvanceOutcome, TransitionExecutor};
use crate::flag_updater::FlagUpdater;
use crate::gate_validator::GateValidator;
use crate::stage_graph::StageGraph;
use crate::{EngineError, EngineResult};
use production_storage::{
    GateAuditLog, PhotoCounter, ProductionStorage, StorageError, TransitionLog, WorkflowStore,
};
use production_types::{
    ActorId, FlagPatch, GateValidationRecord, ProductionStage, ProductionWorkflow,
    StageTransitionRecord, SubjectRef, TenantId, WorkflowId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A workflow together with its full timeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowWithHistory {
    pub workflow: ProductionWorkflow,
    /// Committed changes, oldest first
    pub transitions: Vec<StageTransitionRecord>,
    /// Every validation attempt, oldest first
    pub gate_checks: Vec<GateValidationRecord>,
}

/// The engine facade consumed by request handlers
pub struct ProductionOrchestrator {
    workflows: Arc<dyn WorkflowStore>,
    transitions: Arc<dyn TransitionLog>,
    gate_audits: Arc<dyn GateAuditLog>,
    graph: StageGraph,
    executor: Arc<TransitionExecutor>,
    bypass: BypassController,
    flag_updater: FlagUpdater,
}

impl ProductionOrchestrator {
    /// Build an orchestrator over the standard Ridgeline pipeline.
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        transitions: Arc<dyn TransitionLog>,
        gate_audits: Arc<dyn GateAuditLog>,
        photos: Arc<dyn PhotoCounter>,
    ) -> Self {
        Self::with_config(
            workflows,
            transitions,
            gate_audits,
            photos,
            StageGraph::standard(),
            GateValidator::standard(),
        )
    }

    /// Build an orchestrator with a custom stage graph and rule set,
    /// for tenants running a non-standard pipeline.
    pub fn with_config(
        workflows: Arc<dyn WorkflowStore>,
        transitions: Arc<dyn TransitionLog>,
        gate_audits: Arc<dyn GateAuditLog>,
        photos: Arc<dyn PhotoCounter>,
        graph: StageGraph,
        validator: GateValidator,
    ) -> Self {
        let executor = Arc::new(TransitionExecutor::new(
            workflows.clone(),
            transitions.clone(),
            gate_audits.clone(),
            photos,
            graph.clone(),
            validator,
        ));
        let flag_updater = FlagUpdater::new(workflows.clone(), transitions.clone());
        Self {
            workflows,
            transitions,
            gate_audits,
            graph,
            bypass: BypassController::new(executor.clone()),
            flag_updater,
            executor,
        }
    }

    /// Convenience constructor for a single backend implementing every
    /// port.
    pub fn from_storage<S: ProductionStorage + 'static>(storage: Arc<S>) -> Self {
        Self::new(
            storage.clone(),
            storage.clone(),
            storage.clone(),
            storage,
        )
    }

    // ── Caller contract ──────────────────────────────────────────────

    /// Start production for a subject. Idempotent: if the subject
    /// already has a workflow, the existing one is returned unchanged.
    pub async fn create_workflow(
        &self,
        tenant: TenantId,
        subject: SubjectRef,
        actor: ActorId,
    ) -> EngineResult<ProductionWorkflow> {
        if let Some(existing) = self.workflows.get_by_subject(&tenant, &subject).await? {
            return Ok(existing);
        }

        let workflow =
            ProductionWorkflow::new(tenant.clone(), subject.clone(), self.graph.initial_stage(), actor);
        match self.workflows.insert(workflow.clone()).await {
            Ok(()) => {
                tracing::info!(
                    workflow = %workflow.id,
                    subject = %workflow.subject,
                    "production workflow created"
                );
                Ok(workflow)
            }
            // Lost a creation race; the stored instance wins.
            Err(StorageError::Conflict(_)) => self
                .workflows
                .get_by_subject(&tenant, &subject)
                .await?
                .ok_or_else(|| EngineError::WorkflowNotFound(subject.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a subject's workflow with its full timeline.
    pub async fn get_workflow(
        &self,
        tenant: &TenantId,
        subject: &SubjectRef,
    ) -> EngineResult<WorkflowWithHistory> {
        let workflow = self
            .workflows
            .get_by_subject(tenant, subject)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(subject.to_string()))?;
        let transitions = self.transitions.list_for(&workflow.id).await?;
        let gate_checks = self.gate_audits.list_for(&workflow.id).await?;
        Ok(WorkflowWithHistory {
            workflow,
            transitions,
            gate_checks,
        })
    }

    /// Attempt a stage advance.
    pub async fn advance(
        &self,
        workflow_id: &WorkflowId,
        to_stage: ProductionStage,
        actor: &ActorId,
        notes: Option<String>,
    ) -> EngineResult<AdvanceOutcome> {
        self.executor
            .advance(workflow_id, to_stage, actor, notes, None)
            .await
    }

    /// Attempt a stage advance with a supervised bypass of the gate
    /// requirements. The justification is mandatory.
    pub async fn advance_bypassed(
        &self,
        workflow_id: &WorkflowId,
        to_stage: ProductionStage,
        actor: &ActorId,
        reason: &str,
        notes: Option<String>,
    ) -> EngineResult<AdvanceOutcome> {
        self.bypass
            .force_advance(workflow_id, to_stage, actor, reason, notes)
            .await
    }

    /// Merge document flag updates into a workflow.
    pub async fn update_flags(
        &self,
        workflow_id: &WorkflowId,
        patch: &FlagPatch,
        actor: &ActorId,
    ) -> EngineResult<ProductionWorkflow> {
        self.flag_updater.update_flags(workflow_id, patch, actor).await
    }
}
