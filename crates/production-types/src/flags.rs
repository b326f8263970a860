//! Document and progress flags
//!
//! Flags are the evidence the gate rules check: a workflow cannot enter
//! `materials_ordered` until the NOC is uploaded, cannot close until the
//! final inspection passed, and so on. Flag updates never change the
//! stage; they are merged through [`FlagPatch`] and summarized into the
//! history timeline.

use serde::{Deserialize, Serialize};

/// One of the tracked document/progress flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFlag {
    NocUploaded,
    PermitApplicationSubmitted,
    PermitApproved,
    MaterialsOrdered,
    MaterialsDelivered,
    WorkCompleted,
    FinalInspectionPassed,
}

impl DocumentFlag {
    /// All flags, in the fixed order used for deterministic summaries.
    pub const ALL: [DocumentFlag; 7] = [
        Self::NocUploaded,
        Self::PermitApplicationSubmitted,
        Self::PermitApproved,
        Self::MaterialsOrdered,
        Self::MaterialsDelivered,
        Self::WorkCompleted,
        Self::FinalInspectionPassed,
    ];

    /// Stable field name for this flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NocUploaded => "noc_uploaded",
            Self::PermitApplicationSubmitted => "permit_application_submitted",
            Self::PermitApproved => "permit_approved",
            Self::MaterialsOrdered => "materials_ordered",
            Self::MaterialsDelivered => "materials_delivered",
            Self::WorkCompleted => "work_completed",
            Self::FinalInspectionPassed => "final_inspection_passed",
        }
    }
}

impl std::fmt::Display for DocumentFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full flag state carried by a workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFlags {
    pub noc_uploaded: bool,
    pub permit_application_submitted: bool,
    pub permit_approved: bool,
    pub materials_ordered: bool,
    pub materials_delivered: bool,
    pub work_completed: bool,
    pub final_inspection_passed: bool,
}

impl DocumentFlags {
    /// All flags false; the state of a freshly created workflow.
    pub fn none() -> Self {
        Self::default()
    }

    /// Read one flag.
    pub fn is_set(&self, flag: DocumentFlag) -> bool {
        match flag {
            DocumentFlag::NocUploaded => self.noc_uploaded,
            DocumentFlag::PermitApplicationSubmitted => self.permit_application_submitted,
            DocumentFlag::PermitApproved => self.permit_approved,
            DocumentFlag::MaterialsOrdered => self.materials_ordered,
            DocumentFlag::MaterialsDelivered => self.materials_delivered,
            DocumentFlag::WorkCompleted => self.work_completed,
            DocumentFlag::FinalInspectionPassed => self.final_inspection_passed,
        }
    }

    /// Write one flag.
    pub fn set(&mut self, flag: DocumentFlag, value: bool) {
        match flag {
            DocumentFlag::NocUploaded => self.noc_uploaded = value,
            DocumentFlag::PermitApplicationSubmitted => {
                self.permit_application_submitted = value
            }
            DocumentFlag::PermitApproved => self.permit_approved = value,
            DocumentFlag::MaterialsOrdered => self.materials_ordered = value,
            DocumentFlag::MaterialsDelivered => self.materials_delivered = value,
            DocumentFlag::WorkCompleted => self.work_completed = value,
            DocumentFlag::FinalInspectionPassed => self.final_inspection_passed = value,
        }
    }

    /// Merge a partial update into this flag set.
    pub fn apply(&mut self, patch: &FlagPatch) {
        for (flag, value) in patch.entries() {
            self.set(flag, value);
        }
    }

    pub fn with(mut self, flag: DocumentFlag, value: bool) -> Self {
        self.set(flag, value);
        self
    }
}

/// A partial flag update. Fields left `None` are untouched.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct FlagPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noc_uploaded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_application_submitted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_ordered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_delivered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_inspection_passed: Option<bool>,
}

impl FlagPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, flag: DocumentFlag, value: bool) -> Self {
        match flag {
            DocumentFlag::NocUploaded => self.noc_uploaded = Some(value),
            DocumentFlag::PermitApplicationSubmitted => {
                self.permit_application_submitted = Some(value)
            }
            DocumentFlag::PermitApproved => self.permit_approved = Some(value),
            DocumentFlag::MaterialsOrdered => self.materials_ordered = Some(value),
            DocumentFlag::MaterialsDelivered => self.materials_delivered = Some(value),
            DocumentFlag::WorkCompleted => self.work_completed = Some(value),
            DocumentFlag::FinalInspectionPassed => self.final_inspection_passed = Some(value),
        }
        self
    }

    fn get(&self, flag: DocumentFlag) -> Option<bool> {
        match flag {
            DocumentFlag::NocUploaded => self.noc_uploaded,
            DocumentFlag::PermitApplicationSubmitted => self.permit_application_submitted,
            DocumentFlag::PermitApproved => self.permit_approved,
            DocumentFlag::MaterialsOrdered => self.materials_ordered,
            DocumentFlag::MaterialsDelivered => self.materials_delivered,
            DocumentFlag::WorkCompleted => self.work_completed,
            DocumentFlag::FinalInspectionPassed => self.final_inspection_passed,
        }
    }

    /// Fields present in this patch, in [`DocumentFlag::ALL`] order.
    pub fn entries(&self) -> Vec<(DocumentFlag, bool)> {
        DocumentFlag::ALL
            .iter()
            .filter_map(|flag| self.get(*flag).map(|value| (*flag, value)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Deterministic one-line summary of the patch, used in history notes,
    /// e.g. "materials_ordered: true, materials_delivered: false".
    pub fn summary(&self) -> String {
        self.entries()
            .iter()
            .map(|(flag, value)| format!("{}: {}", flag, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
