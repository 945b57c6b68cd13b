//! Run report persistence and alert dispatch
//!
//! Two independent, best-effort outputs per run: the full record list is
//! archived as JSON in S3 keyed by run timestamp, and SNS carries two
//! summary messages, a count-by-resource-type digest for deleted/released
//! records and a per-record listing for notify records. Each message is
//! dispatched only when its record subset is non-empty. Failures here are
//! logged and never affect the run's terminal state.

use crate::aws::context::AwsContext;
use crate::config::ReportConfig;
use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use ec2_janitor_common::{Action, OutcomeRecord, RunReport};
use tracing::{error, info, warn};

/// Report publishing consumed by the orchestrator.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait Publish: Send + Sync {
    /// Durably archive the full record list, keyed by run timestamp
    async fn persist(&self, report: &RunReport) -> Result<()>;

    /// Dispatch the human-readable summaries derived from the record list
    async fn alert(&self, report: &RunReport) -> Result<()>;
}

/// Publishes run reports to S3 and alerts to SNS
pub struct S3SnsPublisher {
    s3: aws_sdk_s3::Client,
    sns: aws_sdk_sns::Client,
    bucket: String,
    topic_arn: Option<String>,
}

impl S3SnsPublisher {
    /// Create a publisher from a pre-loaded AWS context
    pub fn new(ctx: &AwsContext, config: &ReportConfig) -> Self {
        Self {
            s3: ctx.s3_client(),
            sns: ctx.sns_client(),
            bucket: config.log_bucket.clone(),
            topic_arn: config.sns_topic_arn.clone(),
        }
    }
}

impl Publish for S3SnsPublisher {
    async fn persist(&self, report: &RunReport) -> Result<()> {
        let key = format!("{}-summary.json", Utc::now().format("%Y-%m-%d-%H%M%S"));
        let body = serde_json::to_vec_pretty(report.records())
            .context("Failed to serialize run report")?;

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .context("Failed to upload run report")?;

        info!(bucket = %self.bucket, key = %key, records = report.len(), "Uploaded run report");
        Ok(())
    }

    async fn alert(&self, report: &RunReport) -> Result<()> {
        let Some(topic_arn) = &self.topic_arn else {
            warn!("SNS topic not configured, skipping alert dispatch");
            return Ok(());
        };

        let now = Utc::now();

        // The two messages are independent; one failing does not stop the other.
        if let Some(message) = cleanup_summary(report.records(), now) {
            match self
                .sns
                .publish()
                .topic_arn(topic_arn)
                .subject("EC2 Cost Optimization Cleanup Summary")
                .message(message)
                .send()
                .await
            {
                Ok(_) => info!("Cleanup summary notification sent"),
                Err(e) => error!(error = ?e, "Failed to send cleanup summary notification"),
            }
        }

        if let Some(message) = idle_alert(report.records(), now) {
            match self
                .sns
                .publish()
                .topic_arn(topic_arn)
                .subject("EC2 Idle Resource Notification")
                .message(message)
                .send()
                .await
            {
                Ok(_) => info!("Idle resource notification sent"),
                Err(e) => error!(error = ?e, "Failed to send idle resource notification"),
            }
        }

        Ok(())
    }
}

/// Count records per resource type, preserving first-seen order.
fn count_by_type(records: &[&OutcomeRecord]) -> Vec<(&'static str, usize)> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for record in records {
        let label = record.resource_type.label();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
}

/// Summary message for deleted/released records; `None` when there were none.
pub fn cleanup_summary(records: &[OutcomeRecord], now: DateTime<Utc>) -> Option<String> {
    let acted: Vec<&OutcomeRecord> = records
        .iter()
        .filter(|r| matches!(r.action, Action::Deleted | Action::Released))
        .collect();
    if acted.is_empty() {
        return None;
    }

    let lines: Vec<String> = count_by_type(&acted)
        .into_iter()
        .map(|(label, count)| format!("{count} {label}(s)"))
        .collect();

    Some(format!(
        "AWS EC2 Cleanup Summary:\n\n{}\n\nTimestamp: {} UTC",
        lines.join("\n"),
        now.format("%Y-%m-%d %H:%M:%S")
    ))
}

/// Per-record listing for notify records; `None` when there were none.
pub fn idle_alert(records: &[OutcomeRecord], now: DateTime<Utc>) -> Option<String> {
    let notify: Vec<&OutcomeRecord> = records
        .iter()
        .filter(|r| r.action == Action::Notify)
        .collect();
    if notify.is_empty() {
        return None;
    }

    let lines: Vec<String> = notify
        .iter()
        .map(|r| format!("{} {} - {}", r.resource_type.label(), r.resource_id, r.reason))
        .collect();

    Some(format!(
        "AWS EC2 Cost Alert:\n\n{}\n\nTimestamp: {} UTC",
        lines.join("\n"),
        now.format("%Y-%m-%d %H:%M:%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec2_janitor_common::ResourceKind;

    fn record(kind: ResourceKind, id: &str, action: Action) -> OutcomeRecord {
        OutcomeRecord::new(kind, id, action, "test reason")
    }

    #[test]
    fn test_summary_groups_by_type_in_record_order() {
        let records = vec![
            record(ResourceKind::Volume, "vol-1", Action::Deleted),
            record(ResourceKind::Snapshot, "snap-1", Action::Deleted),
            record(ResourceKind::ElasticIp, "eipalloc-1", Action::Released),
        ];
        let message = cleanup_summary(&records, Utc::now()).unwrap();

        let expected = "1 EBS Volume(s)\n1 EBS Snapshot(s)\n1 Elastic IP(s)";
        assert!(message.contains(expected), "got: {message}");
        assert!(message.starts_with("AWS EC2 Cleanup Summary:"));
    }

    #[test]
    fn test_summary_counts_repeated_types() {
        let records = vec![
            record(ResourceKind::Volume, "vol-1", Action::Deleted),
            record(ResourceKind::Volume, "vol-2", Action::Deleted),
            record(ResourceKind::Image, "ami-1", Action::Deleted),
        ];
        let message = cleanup_summary(&records, Utc::now()).unwrap();
        assert!(message.contains("2 EBS Volume(s)"));
        assert!(message.contains("1 AMI(s)"));
    }

    #[test]
    fn test_summary_ignores_notify_records() {
        let records = vec![record(ResourceKind::Instance, "i-1", Action::Notify)];
        assert!(cleanup_summary(&records, Utc::now()).is_none());
    }

    #[test]
    fn test_idle_alert_lists_each_record() {
        let records = vec![
            record(ResourceKind::Volume, "vol-1", Action::Deleted),
            record(ResourceKind::Instance, "i-1", Action::Notify),
            record(ResourceKind::Instance, "i-2", Action::Notify),
        ];
        let message = idle_alert(&records, Utc::now()).unwrap();
        assert!(message.contains("EC2 Instance i-1 - test reason"));
        assert!(message.contains("EC2 Instance i-2 - test reason"));
        assert!(!message.contains("vol-1"));
    }

    #[test]
    fn test_empty_report_produces_no_messages() {
        assert!(cleanup_summary(&[], Utc::now()).is_none());
        assert!(idle_alert(&[], Utc::now()).is_none());
    }
}
