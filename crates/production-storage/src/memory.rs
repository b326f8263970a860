//! In-memory reference implementation of the storage ports.
//!
//! This adapter is deterministic and test-friendly. Production
//! deployments should use a transactional backend as the source of truth.

use crate::traits::{GateAuditLog, PhotoCounter, TransitionLog, WorkflowStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use production_types::{
    DocumentFlags, GateValidationRecord, ProductionStage, ProductionWorkflow,
    StageTransitionRecord, SubjectRef, TenantId, WorkflowId,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage adapter implementing all four ports.
#[derive(Default)]
pub struct InMemoryProductionStore {
    workflows: RwLock<HashMap<WorkflowId, ProductionWorkflow>>,
    transitions: RwLock<Vec<StageTransitionRecord>>,
    gate_audits: RwLock<Vec<GateValidationRecord>>,
    photo_counts: RwLock<HashMap<SubjectRef, u32>>,
}

impl InMemoryProductionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: set the photo count reported for a subject.
    pub fn set_photo_count(&self, subject: SubjectRef, count: u32) -> StorageResult<()> {
        let mut guard = self
            .photo_counts
            .write()
            .map_err(|_| StorageError::Backend("photo count lock poisoned".to_string()))?;
        guard.insert(subject, count);
        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for InMemoryProductionStore {
    async fn insert(&self, workflow: ProductionWorkflow) -> StorageResult<()> {
        let mut guard = self
            .workflows
            .write()
            .map_err(|_| StorageError::Backend("workflow lock poisoned".to_string()))?;

        if guard.contains_key(&workflow.id) {
            return Err(StorageError::Conflict(format!(
                "workflow {} already exists",
                workflow.id
            )));
        }
        if guard
            .values()
            .any(|w| w.tenant == workflow.tenant && w.subject == workflow.subject)
        {
            return Err(StorageError::Conflict(format!(
                "subject {} already has a workflow",
                workflow.subject
            )));
        }

        guard.insert(workflow.id.clone(), workflow);
        Ok(())
    }

    async fn get(&self, id: &WorkflowId) -> StorageResult<Option<ProductionWorkflow>> {
        let guard = self
            .workflows
            .read()
            .map_err(|_| StorageError::Backend("workflow lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn get_by_subject(
        &self,
        tenant: &TenantId,
        subject: &SubjectRef,
    ) -> StorageResult<Option<ProductionWorkflow>> {
        let guard = self
            .workflows
            .read()
            .map_err(|_| StorageError::Backend("workflow lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .find(|w| &w.tenant == tenant && &w.subject == subject)
            .cloned())
    }

    async fn update_stage(
        &self,
        id: &WorkflowId,
        expected_from: ProductionStage,
        to: ProductionStage,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut guard = self
            .workflows
            .write()
            .map_err(|_| StorageError::Backend("workflow lock poisoned".to_string()))?;
        let workflow = guard
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("workflow {} not found", id)))?;

        if workflow.current_stage != expected_from {
            return Err(StorageError::Conflict(format!(
                "stale stage commit: expected {}, found {}",
                expected_from, workflow.current_stage
            )));
        }

        workflow.current_stage = to;
        workflow.updated_at = updated_at;
        Ok(())
    }

    async fn update_flags(
        &self,
        id: &WorkflowId,
        flags: DocumentFlags,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut guard = self
            .workflows
            .write()
            .map_err(|_| StorageError::Backend("workflow lock poisoned".to_string()))?;
        let workflow = guard
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("workflow {} not found", id)))?;
        workflow.flags = flags;
        workflow.updated_at = updated_at;
        Ok(())
    }
}

#[async_trait]
impl TransitionLog for InMemoryProductionStore {
    async fn append(&self, record: StageTransitionRecord) -> StorageResult<()> {
        let mut guard = self
            .transitions
            .write()
            .map_err(|_| StorageError::Backend("transition lock poisoned".to_string()))?;
        guard.push(record);
        Ok(())
    }

    async fn list_for(
        &self,
        workflow_id: &WorkflowId,
    ) -> StorageResult<Vec<StageTransitionRecord>> {
        let guard = self
            .transitions
            .read()
            .map_err(|_| StorageError::Backend("transition lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| &r.workflow_id == workflow_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GateAuditLog for InMemoryProductionStore {
    async fn append(&self, record: GateValidationRecord) -> StorageResult<()> {
        let mut guard = self
            .gate_audits
            .write()
            .map_err(|_| StorageError::Backend("gate audit lock poisoned".to_string()))?;
        guard.push(record);
        Ok(())
    }

    async fn list_for(
        &self,
        workflow_id: &WorkflowId,
    ) -> StorageResult<Vec<GateValidationRecord>> {
        let guard = self
            .gate_audits
            .read()
            .map_err(|_| StorageError::Backend("gate audit lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| &r.workflow_id == workflow_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PhotoCounter for InMemoryProductionStore {
    async fn count_for_subject(&self, subject: &SubjectRef) -> StorageResult<u32> {
        let guard = self
            .photo_counts
            .read()
            .map_err(|_| StorageError::Backend("photo count lock poisoned".to_string()))?;
        Ok(guard.get(subject).copied().unwrap_or(0))
    }
}
