//! Dependent-resource cascade planning
//!
//! A cascade is computed as a declarative list of deletions to attempt; the
//! scanner executes the plan and folds each success into the record list.
//! This keeps the decision (which dependents to touch) separate from the
//! execution (gateway calls and their partial failures).

use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};

/// One deletion a cascade wants performed
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDeletion {
    pub resource_type: ResourceKind,
    pub resource_id: String,
    pub reason: String,
}

impl PlannedDeletion {
    /// Convert a completed deletion into its audit record
    pub fn into_record(self) -> OutcomeRecord {
        OutcomeRecord::new(
            self.resource_type,
            self.resource_id,
            Action::Deleted,
            self.reason,
        )
    }
}

/// Plan the snapshot deletions implied by deregistering an image.
///
/// One entry per block-device mapping that carries a snapshot id, in mapping
/// order. Execution is best-effort per snapshot: a failed deletion drops only
/// that entry's record.
pub fn image_snapshot_cascade(image_id: &str, snapshot_ids: &[String]) -> Vec<PlannedDeletion> {
    snapshot_ids
        .iter()
        .map(|snapshot_id| PlannedDeletion {
            resource_type: ResourceKind::Snapshot,
            resource_id: snapshot_id.clone(),
            reason: format!("Snapshot associated with deregistered AMI {image_id}"),
        })
        .collect()
}
