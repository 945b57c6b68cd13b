//! Unattached-volume scanner

use crate::aws::{AwsError, Ec2Operations};
use crate::config::PolicyConfig;
use crate::policy;
use chrono::Utc;
use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};
use tracing::{debug, error, info, warn};

/// Delete `available` volumes older than the configured threshold.
pub async fn scan_volumes(
    ec2: &impl Ec2Operations,
    config: &PolicyConfig,
) -> Result<Vec<OutcomeRecord>, AwsError> {
    let volumes = ec2.list_volumes().await?;
    let now = Utc::now();
    let mut records = Vec::new();

    for volume in volumes {
        let Some(create_time) = volume.create_time else {
            warn!(volume_id = %volume.volume_id, "Volume missing creation time, skipping");
            continue;
        };

        let age = policy::age_days(now, create_time);
        let Some(reason) = policy::volume_reason(&volume.state, age, config.volume_age_days)
        else {
            debug!(
                volume_id = %volume.volume_id,
                state = %volume.state,
                age_days = age,
                "Keeping volume"
            );
            continue;
        };

        match ec2.delete_volume(&volume.volume_id).await {
            Ok(()) => {
                info!(volume_id = %volume.volume_id, age_days = age, "Deleted volume");
                records.push(OutcomeRecord::new(
                    ResourceKind::Volume,
                    &volume.volume_id,
                    Action::Deleted,
                    reason,
                ));
            }
            Err(e) => {
                error!(volume_id = %volume.volume_id, error = %e, "Failed to delete volume");
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::ec2::MockEc2Operations;
    use crate::aws::types::VolumeDescriptor;
    use chrono::Duration;

    fn volume(id: &str, state: &str, age_days: i64) -> VolumeDescriptor {
        VolumeDescriptor {
            volume_id: id.to_string(),
            state: state.to_string(),
            create_time: Some(Utc::now() - Duration::days(age_days)),
            attachment_count: 0,
        }
    }

    #[tokio::test]
    async fn deletes_old_available_volume() {
        let mut ec2 = MockEc2Operations::new();
        ec2.expect_list_volumes()
            .returning(|| Ok(vec![volume("vol-1", "available", 10)]));
        ec2.expect_delete_volume()
            .withf(|id| id == "vol-1")
            .returning(|_| Ok(()));

        let records = scan_volumes(&ec2, &PolicyConfig::default()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_id, "vol-1");
        assert_eq!(records[0].resource_type, ResourceKind::Volume);
        assert_eq!(records[0].action, Action::Deleted);
        assert!(records[0].reason.contains("older than 7 days"));
    }

    #[tokio::test]
    async fn never_touches_attached_volumes_regardless_of_age() {
        let mut ec2 = MockEc2Operations::new();
        ec2.expect_list_volumes()
            .returning(|| Ok(vec![volume("vol-1", "in-use", 1000)]));
        ec2.expect_delete_volume().never();

        let records = scan_volumes(&ec2, &PolicyConfig::default()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn young_volume_is_kept() {
        let mut ec2 = MockEc2Operations::new();
        ec2.expect_list_volumes()
            .returning(|| Ok(vec![volume("vol-1", "available", 3)]));
        ec2.expect_delete_volume().never();

        let records = scan_volumes(&ec2, &PolicyConfig::default()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn delete_failure_yields_no_record_and_scan_continues() {
        let mut ec2 = MockEc2Operations::new();
        ec2.expect_list_volumes().returning(|| {
            Ok(vec![
                volume("vol-1", "available", 10),
                volume("vol-2", "available", 10),
            ])
        });
        ec2.expect_delete_volume().returning(|id| {
            if id == "vol-1" {
                Err(AwsError::Sdk {
                    code: Some("VolumeInUse".to_string()),
                    message: "still busy".to_string(),
                })
            } else {
                Ok(())
            }
        });

        let records = scan_volumes(&ec2, &PolicyConfig::default()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_id, "vol-2");
    }

    #[tokio::test]
    async fn malformed_volume_is_skipped_with_no_record() {
        let mut ec2 = MockEc2Operations::new();
        ec2.expect_list_volumes().returning(|| {
            Ok(vec![VolumeDescriptor {
                volume_id: "vol-1".to_string(),
                state: "available".to_string(),
                create_time: None,
                attachment_count: 0,
            }])
        });
        ec2.expect_delete_volume().never();

        let records = scan_volumes(&ec2, &PolicyConfig::default()).await.unwrap();
        assert!(records.is_empty());
    }
}
