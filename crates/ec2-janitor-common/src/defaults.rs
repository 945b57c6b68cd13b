//! Default policy thresholds and reporting constants
//!
//! These constants are the documented defaults for every policy knob; each
//! can be overridden through the CLI or its environment variable.

/// Default minimum age in days before an unattached EBS volume is deleted
pub const DEFAULT_VOLUME_AGE_DAYS: i64 = 7;

/// Default retention in days for EBS snapshots
pub const DEFAULT_SNAPSHOT_RETENTION_DAYS: i64 = 30;

/// Default retention in days for AMIs
pub const DEFAULT_IMAGE_RETENTION_DAYS: i64 = 60;

/// Default average-CPU percentage at or below which a running instance is
/// reported as idle
pub const DEFAULT_IDLE_CPU_THRESHOLD: f64 = 5.0;

/// Default minimum age in minutes before a targetless load balancer is deleted
pub const DEFAULT_LB_MIN_AGE_MINUTES: i64 = 60;

/// Default S3 bucket for the persisted run report
pub const DEFAULT_LOG_BUCKET: &str = "ec2-cost-logs";

/// Trailing window in days over which instance CPU utilization is averaged
pub const IDLE_WINDOW_DAYS: i64 = 7;

/// Sample granularity in seconds for the CPU utilization query (one per day)
pub const IDLE_METRIC_PERIOD_SECS: i32 = 86_400;
