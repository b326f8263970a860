//! Transition executor: runs one stage advance end to end
//!
//! The executor enforces the sequencing invariant, evaluates the gates,
//! and commits. Ordering violations are rejected before anything is
//! written; every attempt that reaches gate evaluation persists exactly
//! one audit record, and the audit write lands before the stage commit so
//! a commit failure can never lose the trail.

use crate::bypass::BypassGrant;
use crate::gate_validator::GateValidator;
use crate::stage_graph::StageGraph;
use crate::{EngineError, EngineResult};
use chrono::Utc;
use production_storage::{GateAuditLog, PhotoCounter, TransitionLog, WorkflowStore};
use production_types::{
    ActorId, GateOutcome, GateValidationRecord, ProductionStage, StageTransitionRecord, WorkflowId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a committed stage advance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub workflow_id: WorkflowId,
    pub previous_stage: ProductionStage,
    pub new_stage: ProductionStage,
    /// True when the gate requirements were actually met
    pub gate_validated: bool,
    /// True when a bypass overrode a failed gate
    pub gate_bypassed: bool,
}

/// Orchestrates a single stage advance against the backing stores
pub struct TransitionExecutor {
    workflows: Arc<dyn WorkflowStore>,
    transitions: Arc<dyn TransitionLog>,
    gate_audits: Arc<dyn GateAuditLog>,
    photos: Arc<dyn PhotoCounter>,
    graph: StageGraph,
    validator: GateValidator,
}

impl TransitionExecutor {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        transitions: Arc<dyn TransitionLog>,
        gate_audits: Arc<dyn GateAuditLog>,
        photos: Arc<dyn PhotoCounter>,
        graph: StageGraph,
        validator: GateValidator,
    ) -> Self {
        Self {
            workflows,
            transitions,
            gate_audits,
            photos,
            graph,
            validator,
        }
    }

    /// Attempt to advance a workflow to `to_stage`.
    ///
    /// With a [`BypassGrant`], a failed gate is overridden and audited as
    /// bypassed; when the gate passes on its own the outcome stays
    /// `passed` and the grant is recorded but not engaged. The sequencing
    /// invariant is checked first and cannot be bypassed.
    pub async fn advance(
        &self,
        workflow_id: &WorkflowId,
        to_stage: ProductionStage,
        actor: &ActorId,
        notes: Option<String>,
        bypass: Option<BypassGrant>,
    ) -> EngineResult<AdvanceOutcome> {
        let workflow = self
            .workflows
            .get(workflow_id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;
        let from_stage = workflow.current_stage;

        // Structural precondition. Rejections leave no audit record.
        let move_kind = self.graph.check_ordering(from_stage, to_stage)?;

        let photo_count = self.photos.count_for_subject(&workflow.subject).await?;
        let report =
            self.validator
                .evaluate(from_stage, to_stage, move_kind, &workflow.flags, photo_count);

        let bypass_engaged = !report.passed && bypass.is_some();
        let outcome = if report.passed {
            GateOutcome::Passed
        } else if bypass_engaged {
            GateOutcome::Bypassed
        } else {
            GateOutcome::Failed
        };

        let mut audit = GateValidationRecord::new(
            workflow_id.clone(),
            from_stage,
            to_stage,
            outcome,
            actor.clone(),
        )
        .with_failures(report.failures.clone())
        .with_details(report.details_value());
        if let Some(grant) = &bypass {
            audit = audit.with_bypass(grant.actor().clone(), grant.reason());
        }

        // The audit record must be durable before the stage commit.
        self.gate_audits.append(audit).await?;

        if outcome == GateOutcome::Failed {
            tracing::debug!(
                workflow = %workflow_id,
                from = %from_stage,
                to = %to_stage,
                failures = report.failures.len(),
                "gate validation failed"
            );
            return Err(EngineError::GateFailed {
                from: from_stage,
                to: to_stage,
                failures: report.failures,
            });
        }

        self.workflows
            .update_stage(workflow_id, from_stage, to_stage, Utc::now())
            .await?;

        let notes = notes.unwrap_or_else(|| {
            if bypass_engaged {
                format!(
                    "Stage advanced from {} to {} (gate bypassed)",
                    from_stage, to_stage
                )
            } else {
                format!("Stage advanced from {} to {}", from_stage, to_stage)
            }
        });
        self.transitions
            .append(StageTransitionRecord::new(
                workflow_id.clone(),
                from_stage,
                to_stage,
                actor.clone(),
                notes,
            ))
            .await?;

        if bypass_engaged {
            tracing::warn!(
                workflow = %workflow_id,
                from = %from_stage,
                to = %to_stage,
                actor = %actor,
                "stage advanced with gate bypassed"
            );
        } else {
            tracing::info!(
                workflow = %workflow_id,
                from = %from_stage,
                to = %to_stage,
                "stage advanced"
            );
        }

        Ok(AdvanceOutcome {
            workflow_id: workflow_id.clone(),
            previous_stage: from_stage,
            new_stage: to_stage,
            gate_validated: report.passed,
            gate_bypassed: bypass_engaged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bypass::BypassController;
    use production_storage::memory::InMemoryProductionStore;
    use production_types::{
        DocumentFlag, DocumentFlags, ProductionWorkflow, SubjectRef, TenantId,
    };

    fn make_executor(store: &Arc<InMemoryProductionStore>) -> TransitionExecutor {
        TransitionExecutor::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            StageGraph::standard(),
            GateValidator::standard(),
        )
    }

    async fn seed_workflow(
        store: &Arc<InMemoryProductionStore>,
        stage: ProductionStage,
        flags: DocumentFlags,
    ) -> WorkflowId {
        let mut workflow = ProductionWorkflow::new(
            TenantId::new("acme-roofing"),
            SubjectRef::job("job-1"),
            stage,
            ActorId::new("pm-1"),
        );
        workflow.flags = flags;
        let id = workflow.id.clone();
        store.insert(workflow).await.unwrap();
        id
    }

    fn actor() -> ActorId {
        ActorId::new("pm-1")
    }

    #[tokio::test]
    async fn forward_skip_rejected_without_audit_record() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        // Flags fully set: the skip must fail regardless of flag state.
        let mut flags = DocumentFlags::none();
        for flag in DocumentFlag::ALL {
            flags.set(flag, true);
        }
        let id = seed_workflow(&store, ProductionStage::SubmitDocuments, flags).await;

        let result = executor
            .advance(
                &id,
                ProductionStage::MaterialsOrdered,
                &actor(),
                None,
                None,
            )
            .await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition { .. })
        ));

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert!(audits.is_empty());
        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.current_stage, ProductionStage::SubmitDocuments);
    }

    #[tokio::test]
    async fn failed_gate_persists_audit_and_keeps_stage() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let id = seed_workflow(
            &store,
            ProductionStage::SubmitDocuments,
            DocumentFlags::none(),
        )
        .await;

        let result = executor
            .advance(&id, ProductionStage::PermitSubmitted, &actor(), None, None)
            .await;
        match result {
            Err(EngineError::GateFailed { failures, .. }) => {
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected GateFailed, got {:?}", other),
        }

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].outcome, GateOutcome::Failed);
        assert_eq!(audits[0].failures.len(), 2);

        let transitions = TransitionLog::list_for(store.as_ref(), &id).await.unwrap();
        assert!(transitions.is_empty());
        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.current_stage, ProductionStage::SubmitDocuments);
    }

    #[tokio::test]
    async fn passing_gate_commits_and_writes_both_records() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let flags = DocumentFlags::none()
            .with(DocumentFlag::NocUploaded, true)
            .with(DocumentFlag::PermitApplicationSubmitted, true);
        let id = seed_workflow(&store, ProductionStage::SubmitDocuments, flags).await;

        let outcome = executor
            .advance(&id, ProductionStage::PermitSubmitted, &actor(), None, None)
            .await
            .unwrap();
        assert_eq!(outcome.previous_stage, ProductionStage::SubmitDocuments);
        assert_eq!(outcome.new_stage, ProductionStage::PermitSubmitted);
        assert!(outcome.gate_validated);
        assert!(!outcome.gate_bypassed);

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.current_stage, ProductionStage::PermitSubmitted);

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].outcome, GateOutcome::Passed);

        let transitions = TransitionLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(transitions.len(), 1);
        assert_eq!(
            transitions[0].notes,
            "Stage advanced from submit_documents to permit_submitted"
        );
    }

    #[tokio::test]
    async fn photo_shortfall_blocks_work_start() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let flags = DocumentFlags::none()
            .with(DocumentFlag::PermitApproved, true)
            .with(DocumentFlag::MaterialsDelivered, true);
        let id = seed_workflow(&store, ProductionStage::MaterialsDelivered, flags).await;
        store
            .set_photo_count(SubjectRef::job("job-1"), 4)
            .unwrap();

        let result = executor
            .advance(&id, ProductionStage::InProgress, &actor(), None, None)
            .await;
        assert!(matches!(result, Err(EngineError::GateFailed { .. })));

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(
            audits[0].details.get("photos_required"),
            Some(&serde_json::Value::from(5))
        );
        assert_eq!(
            audits[0].details.get("photos_actual"),
            Some(&serde_json::Value::from(4))
        );

        // With enough photos the same advance succeeds.
        store
            .set_photo_count(SubjectRef::job("job-1"), 5)
            .unwrap();
        let outcome = executor
            .advance(&id, ProductionStage::InProgress, &actor(), None, None)
            .await
            .unwrap();
        assert!(outcome.gate_validated);
    }

    #[tokio::test]
    async fn bypass_overrides_failed_gate_and_is_audited() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let id = seed_workflow(
            &store,
            ProductionStage::SubmitDocuments,
            DocumentFlags::none(),
        )
        .await;

        let grant =
            BypassController::grant(&ActorId::new("supervisor-1"), "homeowner escalation")
                .unwrap();
        let outcome = executor
            .advance(
                &id,
                ProductionStage::PermitSubmitted,
                &actor(),
                None,
                Some(grant),
            )
            .await
            .unwrap();
        assert!(!outcome.gate_validated);
        assert!(outcome.gate_bypassed);

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.current_stage, ProductionStage::PermitSubmitted);

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].outcome, GateOutcome::Bypassed);
        assert_eq!(
            audits[0].bypass_reason.as_deref(),
            Some("homeowner escalation")
        );
        assert_eq!(
            audits[0].bypass_actor,
            Some(ActorId::new("supervisor-1"))
        );

        let transitions = TransitionLog::list_for(store.as_ref(), &id).await.unwrap();
        assert!(transitions[0].notes.ends_with("(gate bypassed)"));
    }

    #[tokio::test]
    async fn bypass_on_passing_gate_records_passed() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let flags = DocumentFlags::none()
            .with(DocumentFlag::NocUploaded, true)
            .with(DocumentFlag::PermitApplicationSubmitted, true);
        let id = seed_workflow(&store, ProductionStage::SubmitDocuments, flags).await;

        let grant =
            BypassController::grant(&ActorId::new("supervisor-1"), "belt and suspenders").unwrap();
        let outcome = executor
            .advance(
                &id,
                ProductionStage::PermitSubmitted,
                &actor(),
                None,
                Some(grant),
            )
            .await
            .unwrap();
        // The gate held on its own: no override took place.
        assert!(outcome.gate_validated);
        assert!(!outcome.gate_bypassed);

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(audits[0].outcome, GateOutcome::Passed);
        // The justification is still on the record.
        assert!(audits[0].bypass_reason.is_some());
    }

    #[tokio::test]
    async fn corrective_move_commits_without_content_gates() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let id = seed_workflow(&store, ProductionStage::InProgress, DocumentFlags::none()).await;

        let outcome = executor
            .advance(
                &id,
                ProductionStage::MaterialsOnHold,
                &actor(),
                Some("supplier recalled the shingle lot".to_string()),
                None,
            )
            .await
            .unwrap();
        assert!(outcome.gate_validated);

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].outcome, GateOutcome::Passed);
        assert_eq!(
            audits[0].details.get("move"),
            Some(&serde_json::Value::from("corrective"))
        );

        let transitions = TransitionLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(transitions[0].notes, "supplier recalled the shingle lot");
    }

    #[tokio::test]
    async fn unknown_workflow_is_not_found() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);

        let result = executor
            .advance(
                &WorkflowId::new("missing"),
                ProductionStage::PermitSubmitted,
                &actor(),
                None,
                None,
            )
            .await;
        assert!(matches!(result, Err(EngineError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn every_attempt_writes_exactly_one_audit_record() {
        let store = Arc::new(InMemoryProductionStore::new());
        let executor = make_executor(&store);
        let id = seed_workflow(
            &store,
            ProductionStage::SubmitDocuments,
            DocumentFlags::none(),
        )
        .await;

        // Failed attempt.
        let _ = executor
            .advance(&id, ProductionStage::PermitSubmitted, &actor(), None, None)
            .await;
        // Bypassed attempt.
        let grant = BypassController::grant(&ActorId::new("supervisor-1"), "override").unwrap();
        let _ = executor
            .advance(
                &id,
                ProductionStage::PermitSubmitted,
                &actor(),
                None,
                Some(grant),
            )
            .await
            .unwrap();
        // Corrective attempt (passes).
        let _ = executor
            .advance(
                &id,
                ProductionStage::SubmitDocuments,
                &actor(),
                None,
                None,
            )
            .await
            .unwrap();

        let audits = GateAuditLog::list_for(store.as_ref(), &id).await.unwrap();
        assert_eq!(audits.len(), 3);
        assert_eq!(audits[0].outcome, GateOutcome::Failed);
        assert_eq!(audits[1].outcome, GateOutcome::Bypassed);
        assert_eq!(audits[2].outcome, GateOutcome::Passed);
    }
}
