//! Audit record types produced by a sweep
//!
//! Every completed reclamation action (and every notify decision) yields
//! exactly one [`OutcomeRecord`]. Records are immutable once appended to the
//! [`RunReport`] and live only for the duration of one run.

use crate::resource_kind::ResourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The action recorded for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resource was deleted (volumes, snapshots, images, load balancers)
    Deleted,
    /// Resource was released back to the provider (Elastic IPs)
    Released,
    /// Resource was flagged for a human, no destructive call was made
    Notify,
}

/// One audit entry for a completed action or notify decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Provider identifier of the resource acted upon
    pub resource_id: String,
    /// Kind of resource
    pub resource_type: ResourceKind,
    /// What was done
    pub action: Action,
    /// Policy explanation, referencing the threshold that triggered it
    pub reason: String,
    /// When the record was created (not when the resource was created)
    pub timestamp: DateTime<Utc>,
}

impl OutcomeRecord {
    /// Create a record stamped with the current instant
    pub fn new(
        resource_type: ResourceKind,
        resource_id: impl Into<String>,
        action: Action,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_type,
            action,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered list of outcome records from one sweep
///
/// Owned exclusively by the orchestrator while the run is in flight, handed
/// to the report publisher at the end, then discarded.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    records: Vec<OutcomeRecord>,
}

impl RunReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record
    pub fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    /// Append a scanner's records, preserving their order
    pub fn extend(&mut self, records: Vec<OutcomeRecord>) {
        self.records.extend(records);
    }

    /// All records, in the order they were produced
    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
