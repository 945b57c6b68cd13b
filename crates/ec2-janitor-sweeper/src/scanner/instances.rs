//! Idle-instance scanner (notify-only)
//!
//! The only scanner that never makes a destructive call: an idle instance is
//! reported for a human to act on. Only `running` instances are considered,
//! filtered at the inventory query rather than post-filtered here.

use crate::aws::{AwsError, CloudWatchOperations, Ec2Operations};
use crate::config::PolicyConfig;
use crate::policy;
use chrono::{Duration, Utc};
use ec2_janitor_common::defaults::{IDLE_METRIC_PERIOD_SECS, IDLE_WINDOW_DAYS};
use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};
use tracing::{debug, error, info, warn};

/// Report running instances whose trailing-window average CPU is at or
/// below the idle threshold.
pub async fn scan_instances(
    ec2: &impl Ec2Operations,
    metrics: &impl CloudWatchOperations,
    config: &PolicyConfig,
) -> Result<Vec<OutcomeRecord>, AwsError> {
    let instances = ec2.list_running_instances().await?;
    let window_end = Utc::now();
    let window_start = window_end - Duration::days(IDLE_WINDOW_DAYS);
    let mut records = Vec::new();

    for instance in instances {
        let (Some(instance_id), Some(_launch_time)) =
            (instance.instance_id.as_deref(), instance.launch_time)
        else {
            warn!("Instance missing id or launch time, skipping");
            continue;
        };

        let datapoints = match metrics
            .average_cpu_datapoints(instance_id, window_start, window_end, IDLE_METRIC_PERIOD_SECS)
            .await
        {
            Ok(datapoints) => datapoints,
            Err(e) => {
                error!(instance_id = %instance_id, error = %e, "Failed to fetch CPU metrics");
                continue;
            }
        };

        let average = policy::average_cpu(&datapoints);
        let Some(reason) = policy::idle_reason(average, config.idle_cpu_threshold) else {
            debug!(instance_id = %instance_id, average_cpu = average, "Instance busy, keeping quiet");
            continue;
        };

        info!(instance_id = %instance_id, average_cpu = average, "Instance is idle");
        records.push(OutcomeRecord::new(
            ResourceKind::Instance,
            instance_id,
            Action::Notify,
            reason,
        ));
    }

    Ok(records)
}
