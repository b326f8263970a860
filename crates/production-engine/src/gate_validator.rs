//! Gate validator: checks whether a stage transition's requirements hold
//!
//! The validator is a pure function of the move being attempted, the
//! workflow's flag state, and the subject's photo count. It produces no
//! side effects, accumulates every unmet requirement rather than
//! short-circuiting, and evaluates rules in a fixed order so identical
//! inputs always yield identical reports.
//!
//! Corrective (backward or same-rank) moves skip content gates entirely:
//! the exit tables encode forward readiness, and applying them to a
//! supervisory rollback would block the correction itself.

use crate::stage_graph::MoveKind;
use production_types::{DocumentFlag, DocumentFlags, ProductionStage};
use serde_json::{Map, Value};

/// Result of evaluating the gates for one attempted move
#[derive(Clone, Debug)]
pub struct GateReport {
    /// True when every requirement was met
    pub passed: bool,
    /// Unmet requirements, in evaluation order
    pub failures: Vec<String>,
    /// Structured detail payload (move kind, photo counts)
    pub details: Map<String, Value>,
}

impl GateReport {
    /// The detail payload as a JSON value, for audit records.
    pub fn details_value(&self) -> Value {
        Value::Object(self.details.clone())
    }
}

/// Evaluates stage-entry and stage-exit requirements
///
/// The requirement tables are owned configuration, so per-tenant rule
/// variants can coexist; [`GateValidator::standard`] builds the canonical
/// Ridgeline rule set.
#[derive(Clone, Debug)]
pub struct GateValidator {
    /// Flags that must be true to leave a stage
    exit_requirements: Vec<(ProductionStage, Vec<DocumentFlag>)>,
    /// Minimum photo counts to enter a stage
    photo_minimums: Vec<(ProductionStage, u32)>,
}

impl GateValidator {
    /// The canonical Ridgeline rule set.
    pub fn standard() -> Self {
        Self {
            exit_requirements: vec![
                (
                    ProductionStage::SubmitDocuments,
                    vec![
                        DocumentFlag::NocUploaded,
                        DocumentFlag::PermitApplicationSubmitted,
                    ],
                ),
                (
                    ProductionStage::PermitSubmitted,
                    vec![DocumentFlag::PermitApproved],
                ),
                (
                    ProductionStage::MaterialsOrdered,
                    vec![DocumentFlag::MaterialsOrdered],
                ),
                (
                    ProductionStage::InProgress,
                    vec![DocumentFlag::WorkCompleted],
                ),
            ],
            photo_minimums: vec![
                (ProductionStage::InProgress, 5),
                (ProductionStage::Complete, 10),
                (ProductionStage::FinalInspection, 15),
            ],
        }
    }

    /// Build a validator with custom requirement tables.
    pub fn new(
        exit_requirements: Vec<(ProductionStage, Vec<DocumentFlag>)>,
        photo_minimums: Vec<(ProductionStage, u32)>,
    ) -> Self {
        Self {
            exit_requirements,
            photo_minimums,
        }
    }

    /// Evaluate every gate rule for the attempted move.
    pub fn evaluate(
        &self,
        from: ProductionStage,
        to: ProductionStage,
        move_kind: MoveKind,
        flags: &DocumentFlags,
        photo_count: u32,
    ) -> GateReport {
        let mut details = Map::new();

        if move_kind == MoveKind::Corrective {
            details.insert("move".to_string(), Value::from("corrective"));
            return GateReport {
                passed: true,
                failures: Vec::new(),
                details,
            };
        }
        details.insert("move".to_string(), Value::from("forward"));

        let mut failures = Vec::new();

        // Rule 1: stage-exit requirements on the stage being left.
        if let Some((_, required)) = self
            .exit_requirements
            .iter()
            .find(|(stage, _)| *stage == from)
        {
            for flag in required {
                if !flags.is_set(*flag) {
                    failures.push(format!("cannot leave {}: {} required", from, describe(*flag)));
                }
            }
        }

        // Rule 2: no material order without the NOC on file.
        if to == ProductionStage::MaterialsOrdered && !flags.noc_uploaded {
            failures
                .push("NOC document must be uploaded before ordering materials".to_string());
        }

        // Rule 3: no work on the roof without an approved permit.
        if matches!(
            to,
            ProductionStage::InProgress | ProductionStage::Complete
        ) && !flags.permit_approved
        {
            failures.push(format!("permit must be approved before entering {}", to));
        }

        // Rule 4: no work start without materials on site.
        if to == ProductionStage::InProgress && !flags.materials_delivered {
            failures.push("materials must be delivered before work can begin".to_string());
        }

        // Rule 5: photo documentation minimums.
        if let Some((_, required)) = self.photo_minimums.iter().find(|(stage, _)| *stage == to) {
            if photo_count < *required {
                failures.push(format!(
                    "at least {} photos are required to enter {} ({} on file)",
                    required, to, photo_count
                ));
                details.insert("photos_required".to_string(), Value::from(*required));
                details.insert("photos_actual".to_string(), Value::from(photo_count));
            }
        }

        // Rule 6: no final inspection before the work is done.
        if to == ProductionStage::FinalInspection && !flags.work_completed {
            failures.push("work must be completed before final inspection".to_string());
        }

        // Rule 7: no close-out without a passed final inspection.
        if to == ProductionStage::Closed && !flags.final_inspection_passed {
            failures
                .push("final inspection must pass before the job can be closed".to_string());
        }

        GateReport {
            passed: failures.is_empty(),
            failures,
            details,
        }
    }
}

impl Default for GateValidator {
    fn default() -> Self {
        Self::standard()
    }
}

fn describe(flag: DocumentFlag) -> &'static str {
    match flag {
        DocumentFlag::NocUploaded => "NOC uploaded",
        DocumentFlag::PermitApplicationSubmitted => "permit application submitted",
        DocumentFlag::PermitApproved => "permit approved",
        DocumentFlag::MaterialsOrdered => "materials ordered",
        DocumentFlag::MaterialsDelivered => "materials delivered",
        DocumentFlag::WorkCompleted => "work completed",
        DocumentFlag::FinalInspectionPassed => "final inspection passed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(
        validator: &GateValidator,
        from: ProductionStage,
        to: ProductionStage,
        flags: &DocumentFlags,
        photos: u32,
    ) -> GateReport {
        validator.evaluate(from, to, MoveKind::Forward, flags, photos)
    }

    #[test]
    fn test_exit_requirements_accumulate() {
        let validator = GateValidator::standard();
        let report = forward(
            &validator,
            ProductionStage::SubmitDocuments,
            ProductionStage::PermitSubmitted,
            &DocumentFlags::none(),
            0,
        );
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].contains("NOC uploaded"));
        assert!(report.failures[1].contains("permit application submitted"));
    }

    #[test]
    fn test_exit_requirements_satisfied() {
        let validator = GateValidator::standard();
        let flags = DocumentFlags::none()
            .with(DocumentFlag::NocUploaded, true)
            .with(DocumentFlag::PermitApplicationSubmitted, true);
        let report = forward(
            &validator,
            ProductionStage::SubmitDocuments,
            ProductionStage::PermitSubmitted,
            &flags,
            0,
        );
        assert!(report.passed);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_noc_gate_on_material_order() {
        let validator = GateValidator::standard();
        // Every other flag set; only the NOC is missing.
        let mut flags = DocumentFlags::none();
        for flag in DocumentFlag::ALL {
            flags.set(flag, flag != DocumentFlag::NocUploaded);
        }
        let report = forward(
            &validator,
            ProductionStage::PermitApproved,
            ProductionStage::MaterialsOrdered,
            &flags,
            0,
        );
        assert!(!report.passed);
        assert_eq!(
            report.failures,
            vec!["NOC document must be uploaded before ordering materials".to_string()]
        );
    }

    #[test]
    fn test_work_start_requirements() {
        let validator = GateValidator::standard();
        let flags = DocumentFlags::none()
            .with(DocumentFlag::PermitApproved, true)
            .with(DocumentFlag::MaterialsDelivered, true);

        let report = forward(
            &validator,
            ProductionStage::MaterialsDelivered,
            ProductionStage::InProgress,
            &flags,
            5,
        );
        assert!(report.passed);

        // One photo short: fails and reports required vs actual.
        let report = forward(
            &validator,
            ProductionStage::MaterialsDelivered,
            ProductionStage::InProgress,
            &flags,
            4,
        );
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.details.get("photos_required"), Some(&Value::from(5)));
        assert_eq!(report.details.get("photos_actual"), Some(&Value::from(4)));
    }

    #[test]
    fn test_work_start_without_permit_or_materials() {
        let validator = GateValidator::standard();
        let report = forward(
            &validator,
            ProductionStage::MaterialsDelivered,
            ProductionStage::InProgress,
            &DocumentFlags::none(),
            0,
        );
        assert!(!report.passed);
        // Permit, delivery, and photo rules all fire.
        assert_eq!(report.failures.len(), 3);
    }

    #[test]
    fn test_closure_gate() {
        let validator = GateValidator::standard();
        let mut flags = DocumentFlags::none();
        for flag in DocumentFlag::ALL {
            flags.set(flag, flag != DocumentFlag::FinalInspectionPassed);
        }
        let report = forward(
            &validator,
            ProductionStage::FinalCheckNeeded,
            ProductionStage::Closed,
            &flags,
            100,
        );
        assert!(!report.passed);
        assert_eq!(
            report.failures,
            vec!["final inspection must pass before the job can be closed".to_string()]
        );
    }

    #[test]
    fn test_corrective_move_skips_content_gates() {
        let validator = GateValidator::standard();
        let report = validator.evaluate(
            ProductionStage::InProgress,
            ProductionStage::MaterialsOnHold,
            MoveKind::Corrective,
            &DocumentFlags::none(),
            0,
        );
        assert!(report.passed);
        assert!(report.failures.is_empty());
        assert_eq!(report.details.get("move"), Some(&Value::from("corrective")));
    }

    #[test]
    fn test_output_is_stable() {
        let validator = GateValidator::standard();
        let first = forward(
            &validator,
            ProductionStage::SubmitDocuments,
            ProductionStage::PermitSubmitted,
            &DocumentFlags::none(),
            0,
        );
        let second = forward(
            &validator,
            ProductionStage::SubmitDocuments,
            ProductionStage::PermitSubmitted,
            &DocumentFlags::none(),
            0,
        );
        assert_eq!(first.failures, second.failures);
        assert_eq!(first.details, second.details);
    }

    #[test]
    fn test_custom_tables() {
        let validator = GateValidator::new(
            vec![(
                ProductionStage::SubmitDocuments,
                vec![DocumentFlag::NocUploaded],
            )],
            vec![],
        );
        let report = forward(
            &validator,
            ProductionStage::SubmitDocuments,
            ProductionStage::PermitSubmitted,
            &DocumentFlags::none(),
            0,
        );
        assert_eq!(report.failures.len(), 1);

        // No photo minimums in this rule set.
        let flags = DocumentFlags::none()
            .with(DocumentFlag::PermitApproved, true)
            .with(DocumentFlag::MaterialsDelivered, true);
        let report = forward(
            &validator,
            ProductionStage::MaterialsDelivered,
            ProductionStage::InProgress,
            &flags,
            0,
        );
        assert!(report.passed);
    }
}
