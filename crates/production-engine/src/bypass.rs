//! Supervised gate bypass
//!
//! A bypass forces a transition past a failed gate. It is constrained:
//! the grant carries who authorized it and why, both mandatory, and the
//! stage ordering invariant still applies. [`BypassGrant`] can only be
//! built through [`BypassController::grant`], so an unjustified bypass
//! cannot reach the executor.

use crate::executor::{AdvanceOutcome, TransitionExecutor};
use crate::{EngineError, EngineResult};
use production_types::{ActorId, ProductionStage, WorkflowId};
use std::sync::Arc;

/// A validated authorization to override a failed gate
#[derive(Clone, Debug)]
pub struct BypassGrant {
    actor: ActorId,
    reason: String,
}

impl BypassGrant {
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The only entry point for forced advances
pub struct BypassController {
    executor: Arc<TransitionExecutor>,
}

impl BypassController {
    pub fn new(executor: Arc<TransitionExecutor>) -> Self {
        Self { executor }
    }

    /// Validate a bypass request into a grant.
    pub fn grant(actor: &ActorId, reason: &str) -> EngineResult<BypassGrant> {
        if actor.as_str().trim().is_empty() {
            return Err(EngineError::InvalidBypass(
                "bypass requires an authorizing actor".to_string(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::InvalidBypass(
                "bypass requires a justification".to_string(),
            ));
        }
        Ok(BypassGrant {
            actor: actor.clone(),
            reason: reason.to_string(),
        })
    }

    /// Advance with a bypass grant for the gate requirements.
    pub async fn force_advance(
        &self,
        workflow_id: &WorkflowId,
        to_stage: ProductionStage,
        actor: &ActorId,
        reason: &str,
        notes: Option<String>,
    ) -> EngineResult<AdvanceOutcome> {
        let grant = Self::grant(actor, reason)?;
        self.executor
            .advance(workflow_id, to_stage, actor, notes, Some(grant))
            .await
    }
}
