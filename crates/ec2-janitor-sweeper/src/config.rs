//! Configuration types for a sweep
//!
//! The policy thresholds are loaded once before any scan runs and passed by
//! reference into the scanners; nothing reads configuration mid-run.

use anyhow::{bail, Result};
use ec2_janitor_common::defaults::{
    DEFAULT_IDLE_CPU_THRESHOLD, DEFAULT_IMAGE_RETENTION_DAYS, DEFAULT_LB_MIN_AGE_MINUTES,
    DEFAULT_LOG_BUCKET, DEFAULT_SNAPSHOT_RETENTION_DAYS, DEFAULT_VOLUME_AGE_DAYS,
};

/// Policy thresholds for one sweep
///
/// All thresholds are non-negative; a zero threshold means "always eligible".
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Minimum age in days before an unattached volume is deleted
    pub volume_age_days: i64,
    /// Retention in days for snapshots
    pub snapshot_retention_days: i64,
    /// Retention in days for images
    pub image_retention_days: i64,
    /// Average-CPU percentage at or below which a running instance is idle
    pub idle_cpu_threshold: f64,
    /// Minimum age in minutes before a targetless load balancer is deleted
    pub lb_min_age_minutes: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            volume_age_days: DEFAULT_VOLUME_AGE_DAYS,
            snapshot_retention_days: DEFAULT_SNAPSHOT_RETENTION_DAYS,
            image_retention_days: DEFAULT_IMAGE_RETENTION_DAYS,
            idle_cpu_threshold: DEFAULT_IDLE_CPU_THRESHOLD,
            lb_min_age_minutes: DEFAULT_LB_MIN_AGE_MINUTES,
        }
    }
}

impl PolicyConfig {
    /// Reject negative thresholds before any scan runs
    pub fn validate(&self) -> Result<()> {
        if self.volume_age_days < 0 {
            bail!("volume-age-days must be non-negative, got {}", self.volume_age_days);
        }
        if self.snapshot_retention_days < 0 {
            bail!(
                "snapshot-retention-days must be non-negative, got {}",
                self.snapshot_retention_days
            );
        }
        if self.image_retention_days < 0 {
            bail!(
                "image-retention-days must be non-negative, got {}",
                self.image_retention_days
            );
        }
        if self.idle_cpu_threshold < 0.0 {
            bail!(
                "idle-cpu-threshold must be non-negative, got {}",
                self.idle_cpu_threshold
            );
        }
        if self.lb_min_age_minutes < 0 {
            bail!(
                "lb-min-age-minutes must be non-negative, got {}",
                self.lb_min_age_minutes
            );
        }
        Ok(())
    }
}

/// Where the run report and alerts go
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// S3 bucket receiving the JSON run report
    pub log_bucket: String,
    /// SNS topic for alert dispatch; alerting is skipped when unset
    pub sns_topic_arn: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_bucket: DEFAULT_LOG_BUCKET.to_string(),
            sns_topic_arn: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = PolicyConfig::default();
        assert_eq!(config.volume_age_days, 7);
        assert_eq!(config.snapshot_retention_days, 30);
        assert_eq!(config.image_retention_days, 60);
        assert_eq!(config.idle_cpu_threshold, 5.0);
        assert_eq!(config.lb_min_age_minutes, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_thresholds_are_valid() {
        let config = PolicyConfig {
            volume_age_days: 0,
            snapshot_retention_days: 0,
            image_retention_days: 0,
            idle_cpu_threshold: 0.0,
            lb_min_age_minutes: 0,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_thresholds_are_rejected() {
        let config = PolicyConfig {
            snapshot_retention_days: -1,
            ..PolicyConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("snapshot-retention-days"));

        let config = PolicyConfig {
            idle_cpu_threshold: -0.5,
            ..PolicyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
