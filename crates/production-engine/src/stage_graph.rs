//! Stage graph: the ordered catalog of production stages
//!
//! The graph answers one structural question: is a requested move a
//! forward step, a correction, or an illegal skip? Forward progress is
//! strictly sequential; backward and same-rank moves are always
//! structurally allowed so supervisors can correct mistakes. This check
//! runs before gate validation and is never waivable by bypass.

use crate::{EngineError, EngineResult};
use production_types::ProductionStage;

/// Classification of a structurally legal move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// The next stage in sequence
    Forward,
    /// A backward or same-rank move, used for corrections
    Corrective,
}

/// The immutable, ordered stage catalog
///
/// Owned configuration rather than ambient global state, so engines with
/// per-tenant stage orderings can coexist.
#[derive(Clone, Debug)]
pub struct StageGraph {
    order: Vec<ProductionStage>,
}

impl StageGraph {
    /// The canonical Ridgeline production pipeline.
    pub fn standard() -> Self {
        Self {
            order: vec![
                ProductionStage::SubmitDocuments,
                ProductionStage::PermitSubmitted,
                ProductionStage::PermitApproved,
                ProductionStage::MaterialsOrdered,
                ProductionStage::MaterialsOnHold,
                ProductionStage::MaterialsDelivered,
                ProductionStage::InProgress,
                ProductionStage::Complete,
                ProductionStage::FinalInspection,
                ProductionStage::FinalCheckNeeded,
                ProductionStage::Closed,
            ],
        }
    }

    /// Build a graph from a custom stage ordering.
    pub fn with_order(order: Vec<ProductionStage>) -> EngineResult<Self> {
        if order.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "stage ordering must not be empty".to_string(),
            ));
        }
        for (i, stage) in order.iter().enumerate() {
            if order[..i].contains(stage) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate stage in ordering: {}",
                    stage
                )));
            }
        }
        Ok(Self { order })
    }

    /// The stage a freshly created workflow starts in.
    pub fn initial_stage(&self) -> ProductionStage {
        // Constructors guarantee a non-empty ordering.
        self.order[0]
    }

    /// All stages, in pipeline order.
    pub fn stages(&self) -> &[ProductionStage] {
        &self.order
    }

    /// 1-based position of a stage in the pipeline.
    pub fn rank(&self, stage: ProductionStage) -> Option<u32> {
        self.order
            .iter()
            .position(|s| *s == stage)
            .map(|i| i as u32 + 1)
    }

    /// Classify a requested move, rejecting forward skips.
    pub fn check_ordering(
        &self,
        from: ProductionStage,
        to: ProductionStage,
    ) -> EngineResult<MoveKind> {
        let from_rank = self.rank(from).ok_or_else(|| EngineError::InvalidTransition {
            from,
            to,
            reason: format!("stage {} is not part of this pipeline", from),
        })?;
        let to_rank = self.rank(to).ok_or_else(|| EngineError::InvalidTransition {
            from,
            to,
            reason: format!("stage {} is not part of this pipeline", to),
        })?;

        if to_rank <= from_rank {
            Ok(MoveKind::Corrective)
        } else if to_rank == from_rank + 1 {
            Ok(MoveKind::Forward)
        } else {
            Err(EngineError::InvalidTransition {
                from,
                to,
                reason: "cannot skip stages, must progress sequentially".to_string(),
            })
        }
    }
}

impl Default for StageGraph {
    fn default() -> Self {
        Self::standard()
    }
}
