//! Expired-image scanner with snapshot cascade
//!
//! Deregistering an image cascades to the snapshots its block devices map
//! to. The cascade is best-effort: a failed mapped-snapshot deletion drops
//! only that snapshot's record and never undoes the image deregistration.

use crate::aws::{AwsError, Ec2Operations};
use crate::cascade;
use crate::config::PolicyConfig;
use crate::policy;
use chrono::Utc;
use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};
use tracing::{debug, error, info, warn};

/// Deregister images past retention and delete their mapped snapshots.
pub async fn scan_images(
    ec2: &impl Ec2Operations,
    config: &PolicyConfig,
) -> Result<Vec<OutcomeRecord>, AwsError> {
    let images = ec2.list_images().await?;
    let now = Utc::now();
    let mut records = Vec::new();

    for image in images {
        let (Some(image_id), Some(creation_date)) =
            (image.image_id.as_deref(), image.creation_date)
        else {
            warn!("Image missing id or creation date, skipping");
            continue;
        };

        let age = policy::age_days(now, creation_date);
        let Some(reason) = policy::image_reason(age, config.image_retention_days) else {
            debug!(image_id = %image_id, age_days = age, "Image within retention, keeping");
            continue;
        };

        if let Err(e) = ec2.deregister_image(image_id).await {
            error!(image_id = %image_id, error = %e, "Failed to deregister image");
            continue;
        }
        info!(image_id = %image_id, name = ?image.name, age_days = age, "Deregistered image");
        records.push(OutcomeRecord::new(
            ResourceKind::Image,
            image_id,
            Action::Deleted,
            reason,
        ));

        for planned in cascade::image_snapshot_cascade(image_id, &image.snapshot_ids) {
            match ec2.delete_snapshot(&planned.resource_id).await {
                Ok(()) => {
                    info!(
                        snapshot_id = %planned.resource_id,
                        image_id = %image_id,
                        "Deleted mapped snapshot"
                    );
                    records.push(planned.into_record());
                }
                Err(e) => {
                    error!(
                        snapshot_id = %planned.resource_id,
                        image_id = %image_id,
                        error = %e,
                        "Failed to delete mapped snapshot"
                    );
                }
            }
        }
    }

    Ok(records)
}
