//! Pure policy evaluators
//!
//! One decision function per resource type, mapping observed attributes and
//! the current instant to an action verdict. Each returns `Some(reason)` when
//! the resource is eligible for its action and `None` when it must be kept;
//! the reason string names the threshold that triggered the verdict and ends
//! up verbatim in the audit record.
//!
//! All thresholds are non-negative; a zero threshold makes every resource of
//! that type eligible.

use chrono::{DateTime, Utc};

/// Volume state in which deletion is permitted
pub const VOLUME_STATE_AVAILABLE: &str = "available";

/// Whole elapsed days between two instants, truncating any fractional day
pub fn age_days(now: DateTime<Utc>, created: DateTime<Utc>) -> i64 {
    (now - created).num_days()
}

/// Whole elapsed minutes between two instants
pub fn age_minutes(now: DateTime<Utc>, created: DateTime<Utc>) -> i64 {
    (now - created).num_minutes()
}

/// Unattached-volume policy: eligible iff the volume is `available` and at
/// least `threshold_days` old.
pub fn volume_reason(state: &str, age_days: i64, threshold_days: i64) -> Option<String> {
    if state != VOLUME_STATE_AVAILABLE {
        return None;
    }
    if age_days < threshold_days {
        return None;
    }
    Some(format!(
        "Unattached and older than {threshold_days} days (age {age_days} days)"
    ))
}

/// How a snapshot relates to the volume it was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeLinkage {
    /// The snapshot carries no volume id at all
    NeverLinked,
    /// The linked volume no longer exists
    Missing { volume_id: String },
    /// The linked volume exists but has no instance attachments
    Detached { volume_id: String },
    /// The linked volume is attached to an instance
    Attached,
}

/// Snapshot retention policy: the age gate applies first, then the linkage
/// determines eligibility. An attached linked volume keeps the snapshot.
pub fn snapshot_reason(
    linkage: &VolumeLinkage,
    age_days: i64,
    threshold_days: i64,
) -> Option<String> {
    if age_days < threshold_days {
        return None;
    }
    match linkage {
        VolumeLinkage::NeverLinked => Some(format!(
            "Not linked to any volume and past {threshold_days}-day retention (age {age_days} days)"
        )),
        VolumeLinkage::Missing { volume_id } => Some(format!(
            "Linked volume {volume_id} not found (possibly deleted), past {threshold_days}-day retention (age {age_days} days)"
        )),
        VolumeLinkage::Detached { volume_id } => Some(format!(
            "Linked volume {volume_id} not attached to any instance, past {threshold_days}-day retention (age {age_days} days)"
        )),
        VolumeLinkage::Attached => None,
    }
}

/// Image retention policy: eligible iff at least `threshold_days` old.
pub fn image_reason(age_days: i64, threshold_days: i64) -> Option<String> {
    if age_days < threshold_days {
        return None;
    }
    Some(format!(
        "Older than {threshold_days} days (age {age_days} days)"
    ))
}

/// Average of the fetched CPU samples.
///
/// Zero samples yield an average of 0, which classifies the instance as
/// idle. A freshly launched instance with no metrics yet is therefore
/// flagged; callers must not change this without signoff, since it alters
/// observable reclamation behavior.
pub fn average_cpu(datapoints: &[f64]) -> f64 {
    if datapoints.is_empty() {
        return 0.0;
    }
    datapoints.iter().sum::<f64>() / datapoints.len() as f64
}

/// Idle-instance policy: eligible for notification iff the window average is
/// at or below the threshold.
pub fn idle_reason(average_cpu: f64, threshold: f64) -> Option<String> {
    if average_cpu > threshold {
        return None;
    }
    Some(format!(
        "Idle: average CPU {average_cpu:.2}% <= {threshold}% over the last 7 days"
    ))
}

/// Unused-load-balancer policy: eligible iff at least `threshold_minutes`
/// old and no target group has any registered target.
pub fn load_balancer_reason(
    age_minutes: i64,
    threshold_minutes: i64,
    has_targets: bool,
) -> Option<String> {
    if has_targets || age_minutes < threshold_minutes {
        return None;
    }
    Some(format!(
        "No registered targets and older than {threshold_minutes} minutes (age {age_minutes} minutes)"
    ))
}

/// Unattached-address policy: eligible iff the address is associated with
/// neither an instance nor a network interface. Age is irrelevant here.
pub fn address_reason(
    instance_id: Option<&str>,
    network_interface_id: Option<&str>,
) -> Option<String> {
    if instance_id.is_some() || network_interface_id.is_some() {
        return None;
    }
    Some("Unattached Elastic IP consuming cost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_age_truncates_fractional_days() {
        let created = now() - Duration::hours(47);
        assert_eq!(age_days(now(), created), 1);
    }

    #[test]
    fn test_volume_other_states_never_eligible() {
        for state in ["in-use", "creating", "deleting", "error"] {
            assert!(volume_reason(state, 1000, 7).is_none(), "state {state}");
        }
    }

    #[test]
    fn test_volume_age_gate() {
        assert!(volume_reason("available", 6, 7).is_none());
        let reason = volume_reason("available", 7, 7).unwrap();
        assert!(reason.contains("older than 7 days"));
        assert!(reason.contains("age 7 days"));
    }

    #[test]
    fn test_volume_zero_threshold_always_eligible() {
        assert!(volume_reason("available", 0, 0).is_some());
    }

    #[test]
    fn test_snapshot_age_gate_beats_linkage() {
        // Younger than retention: kept even when the volume is gone
        let linkage = VolumeLinkage::Missing {
            volume_id: "vol-1".to_string(),
        };
        assert!(snapshot_reason(&linkage, 29, 30).is_none());
        assert!(snapshot_reason(&VolumeLinkage::NeverLinked, 0, 30).is_none());
    }

    #[test]
    fn test_snapshot_linkage_reasons_are_distinct() {
        let orphan = snapshot_reason(&VolumeLinkage::NeverLinked, 40, 30).unwrap();
        let missing = snapshot_reason(
            &VolumeLinkage::Missing {
                volume_id: "vol-1".to_string(),
            },
            40,
            30,
        )
        .unwrap();
        let detached = snapshot_reason(
            &VolumeLinkage::Detached {
                volume_id: "vol-1".to_string(),
            },
            40,
            30,
        )
        .unwrap();

        assert!(orphan.contains("Not linked to any volume"));
        assert!(missing.contains("not found"));
        assert!(detached.contains("not attached to any instance"));
        assert_ne!(orphan, missing);
        assert_ne!(missing, detached);
    }

    #[test]
    fn test_snapshot_attached_volume_keeps_snapshot() {
        assert!(snapshot_reason(&VolumeLinkage::Attached, 400, 30).is_none());
    }

    #[test]
    fn test_image_age_gate() {
        assert!(image_reason(59, 60).is_none());
        assert!(image_reason(60, 60).is_some());
    }

    #[test]
    fn test_average_cpu_of_samples() {
        assert_eq!(average_cpu(&[2.0, 4.0, 6.0]), 4.0);
    }

    #[test]
    fn test_zero_datapoints_average_zero_always_idle() {
        let avg = average_cpu(&[]);
        assert_eq!(avg, 0.0);
        // 0 <= threshold for any non-negative threshold
        assert!(idle_reason(avg, 0.0).is_some());
        assert!(idle_reason(avg, 5.0).is_some());
    }

    #[test]
    fn test_busy_instance_not_idle() {
        assert!(idle_reason(42.0, 5.0).is_none());
        // Boundary: equal to threshold is idle
        assert!(idle_reason(5.0, 5.0).is_some());
    }

    #[test]
    fn test_load_balancer_requires_both_conditions() {
        assert!(load_balancer_reason(120, 60, true).is_none());
        assert!(load_balancer_reason(30, 60, false).is_none());
        let reason = load_balancer_reason(120, 60, false).unwrap();
        assert!(reason.contains("older than 60 minutes"));
    }

    #[test]
    fn test_address_requires_both_absent() {
        assert!(address_reason(Some("i-1"), None).is_none());
        assert!(address_reason(None, Some("eni-1")).is_none());
        assert!(address_reason(Some("i-1"), Some("eni-1")).is_none());
        assert!(address_reason(None, None).is_some());
    }
}
