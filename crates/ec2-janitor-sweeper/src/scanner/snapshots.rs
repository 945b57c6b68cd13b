//! Expired-snapshot scanner
//!
//! The age gate applies before any volume lookup: snapshots within retention
//! are kept without ever querying their linked volume. For the rest, the
//! linked volume's state decides eligibility; `NotFound` on that lookup is a
//! policy input (dangling reference), not a failure.

use crate::aws::{AwsError, Ec2Operations};
use crate::config::PolicyConfig;
use crate::policy::{self, VolumeLinkage};
use chrono::Utc;
use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};
use tracing::{debug, error, info, warn};

/// Delete snapshots past retention whose linked volume is gone, detached,
/// or was never set.
pub async fn scan_snapshots(
    ec2: &impl Ec2Operations,
    config: &PolicyConfig,
) -> Result<Vec<OutcomeRecord>, AwsError> {
    let snapshots = ec2.list_snapshots().await?;
    let now = Utc::now();
    let mut records = Vec::new();

    for snapshot in snapshots {
        let (Some(snapshot_id), Some(start_time)) =
            (snapshot.snapshot_id.as_deref(), snapshot.start_time)
        else {
            warn!("Snapshot missing id or start time, skipping");
            continue;
        };

        let age = policy::age_days(now, start_time);
        if age < config.snapshot_retention_days {
            debug!(snapshot_id = %snapshot_id, age_days = age, "Snapshot within retention, keeping");
            continue;
        }

        let linkage = match resolve_linkage(ec2, snapshot.volume_id.as_deref()).await {
            Ok(linkage) => linkage,
            Err(e) => {
                error!(
                    snapshot_id = %snapshot_id,
                    volume_id = ?snapshot.volume_id,
                    error = %e,
                    "Failed to describe linked volume"
                );
                continue;
            }
        };

        let Some(reason) = policy::snapshot_reason(&linkage, age, config.snapshot_retention_days)
        else {
            debug!(snapshot_id = %snapshot_id, "Linked volume attached, keeping snapshot");
            continue;
        };

        match ec2.delete_snapshot(snapshot_id).await {
            Ok(()) => {
                info!(snapshot_id = %snapshot_id, age_days = age, "Deleted snapshot");
                records.push(OutcomeRecord::new(
                    ResourceKind::Snapshot,
                    snapshot_id,
                    Action::Deleted,
                    reason,
                ));
            }
            Err(e) => {
                error!(snapshot_id = %snapshot_id, error = %e, "Failed to delete snapshot");
            }
        }
    }

    Ok(records)
}

/// Resolve how a snapshot relates to its linked volume.
///
/// No volume id means the lookup is never attempted. A non-NotFound lookup
/// failure propagates so the caller can skip just this snapshot.
async fn resolve_linkage(
    ec2: &impl Ec2Operations,
    volume_id: Option<&str>,
) -> Result<VolumeLinkage, AwsError> {
    let Some(volume_id) = volume_id else {
        return Ok(VolumeLinkage::NeverLinked);
    };

    match ec2.describe_volume(volume_id).await? {
        None => Ok(VolumeLinkage::Missing {
            volume_id: volume_id.to_string(),
        }),
        Some(volume) if volume.attachment_count == 0 => Ok(VolumeLinkage::Detached {
            volume_id: volume_id.to_string(),
        }),
        Some(_) => Ok(VolumeLinkage::Attached),
    }
}
