//! Production stages: the fixed states a roofing job passes through
//!
//! The stage set is closed. Ordering (which stage follows which) is owned
//! by the engine's stage graph, not by this enum, so per-tenant orderings
//! remain possible without touching the type.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the fixed production stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStage {
    /// Initial document collection (NOC, permit application)
    SubmitDocuments,
    /// Permit application filed with the municipality
    PermitSubmitted,
    /// Permit approved, work may be scheduled
    PermitApproved,
    /// Roofing materials ordered from the supplier
    MaterialsOrdered,
    /// Material order held (supplier delay, change order)
    MaterialsOnHold,
    /// Materials on site
    MaterialsDelivered,
    /// Crew on the roof
    InProgress,
    /// Build complete, awaiting inspection
    Complete,
    /// Final inspection underway
    FinalInspection,
    /// Inspection surfaced items needing a final check
    FinalCheckNeeded,
    /// Job closed out
    Closed,
}

impl ProductionStage {
    /// Stable wire name for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitDocuments => "submit_documents",
            Self::PermitSubmitted => "permit_submitted",
            Self::PermitApproved => "permit_approved",
            Self::MaterialsOrdered => "materials_ordered",
            Self::MaterialsOnHold => "materials_on_hold",
            Self::MaterialsDelivered => "materials_delivered",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::FinalInspection => "final_inspection",
            Self::FinalCheckNeeded => "final_check_needed",
            Self::Closed => "closed",
        }
    }

    /// Check if this is the close-out stage.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for ProductionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a stage name received at a transport boundary.
#[derive(Debug, thiserror::Error)]
#[error("unknown production stage: '{0}'")]
pub struct StageParseError(pub String);

impl FromStr for ProductionStage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit_documents" => Ok(Self::SubmitDocuments),
            "permit_submitted" => Ok(Self::PermitSubmitted),
            "permit_approved" => Ok(Self::PermitApproved),
            "materials_ordered" => Ok(Self::MaterialsOrdered),
            "materials_on_hold" => Ok(Self::MaterialsOnHold),
            "materials_delivered" => Ok(Self::MaterialsDelivered),
            "in_progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            "final_inspection" => Ok(Self::FinalInspection),
            "final_check_needed" => Ok(Self::FinalCheckNeeded),
            "closed" => Ok(Self::Closed),
            other => Err(StageParseError(other.to_string())),
        }
    }
}
