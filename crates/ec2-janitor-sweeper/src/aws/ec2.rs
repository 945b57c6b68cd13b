//! EC2 inventory gateway
//!
//! Wraps the EC2 SDK client behind [`Ec2Operations`] so scanners can be
//! tested against mocks. Every wrapper returns a typed [`AwsError`] instead
//! of a broad error; `describe_volume` maps `InvalidVolume.NotFound` to
//! `Ok(None)` because snapshot linkage resolution treats a missing volume as
//! a policy input, not a failure.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{classify_sdk_error, AwsError};
use crate::aws::types::{
    AddressDescriptor, ImageDescriptor, InstanceDescriptor, SnapshotDescriptor, VolumeDescriptor,
};
use aws_sdk_ec2::types::{Filter, Image, Instance, Snapshot, Volume};
use aws_sdk_ec2::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

/// EC2 operations used by the sweep engine.
///
/// Abstracts the EC2 client to enable unit testing of scanner logic without
/// hitting real AWS.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait Ec2Operations: Send + Sync {
    /// List all EBS volumes in the account
    async fn list_volumes(&self) -> Result<Vec<VolumeDescriptor>, AwsError>;

    /// Describe one volume; `Ok(None)` if it no longer exists
    async fn describe_volume(&self, volume_id: &str)
        -> Result<Option<VolumeDescriptor>, AwsError>;

    /// Delete a volume
    async fn delete_volume(&self, volume_id: &str) -> Result<(), AwsError>;

    /// List all snapshots owned by the account
    async fn list_snapshots(&self) -> Result<Vec<SnapshotDescriptor>, AwsError>;

    /// Delete a snapshot
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), AwsError>;

    /// List all images owned by the account
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>, AwsError>;

    /// Deregister an image
    async fn deregister_image(&self, image_id: &str) -> Result<(), AwsError>;

    /// List instances in the `running` state (filtered at the query)
    async fn list_running_instances(&self) -> Result<Vec<InstanceDescriptor>, AwsError>;

    /// List all Elastic IP allocations
    async fn list_addresses(&self) -> Result<Vec<AddressDescriptor>, AwsError>;

    /// Release an Elastic IP allocation
    async fn release_address(&self, allocation_id: &str) -> Result<(), AwsError>;
}

/// EC2 client for the sweep engine
pub struct Ec2Client {
    client: Client,
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from the environment)
    pub async fn new(region: &str) -> Self {
        Self::from_context(&AwsContext::new(region).await)
    }
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}

impl Ec2Operations for Ec2Client {
    async fn list_volumes(&self) -> Result<Vec<VolumeDescriptor>, AwsError> {
        let response = self
            .client
            .describe_volumes()
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let volumes: Vec<_> = response.volumes().iter().map(volume_descriptor).collect();
        debug!(count = volumes.len(), "Listed volumes");
        Ok(volumes)
    }

    async fn describe_volume(
        &self,
        volume_id: &str,
    ) -> Result<Option<VolumeDescriptor>, AwsError> {
        match self
            .client
            .describe_volumes()
            .volume_ids(volume_id)
            .send()
            .await
        {
            Ok(response) => Ok(response.volumes().first().map(volume_descriptor)),
            Err(e) => {
                let err = classify_sdk_error(&e);
                if err.is_not_found() {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_volume()
            .volume_id(volume_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }

    async fn list_snapshots(&self) -> Result<Vec<SnapshotDescriptor>, AwsError> {
        let response = self
            .client
            .describe_snapshots()
            .owner_ids("self")
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let snapshots: Vec<_> = response
            .snapshots()
            .iter()
            .map(snapshot_descriptor)
            .collect();
        debug!(count = snapshots.len(), "Listed snapshots");
        Ok(snapshots)
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_snapshot()
            .snapshot_id(snapshot_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<ImageDescriptor>, AwsError> {
        let response = self
            .client
            .describe_images()
            .owners("self")
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let images: Vec<_> = response.images().iter().map(image_descriptor).collect();
        debug!(count = images.len(), "Listed images");
        Ok(images)
    }

    async fn deregister_image(&self, image_id: &str) -> Result<(), AwsError> {
        self.client
            .deregister_image()
            .image_id(image_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }

    async fn list_running_instances(&self) -> Result<Vec<InstanceDescriptor>, AwsError> {
        let response = self
            .client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name("instance-state-name")
                    .values("running")
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let instances: Vec<_> = response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .map(instance_descriptor)
            .collect();
        debug!(count = instances.len(), "Listed running instances");
        Ok(instances)
    }

    async fn list_addresses(&self) -> Result<Vec<AddressDescriptor>, AwsError> {
        let response = self
            .client
            .describe_addresses()
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let addresses: Vec<_> = response
            .addresses()
            .iter()
            .map(address_descriptor)
            .collect();
        debug!(count = addresses.len(), "Listed Elastic IPs");
        Ok(addresses)
    }

    async fn release_address(&self, allocation_id: &str) -> Result<(), AwsError> {
        self.client
            .release_address()
            .allocation_id(allocation_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }
}

fn to_utc(dt: &aws_sdk_ec2::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn volume_descriptor(volume: &Volume) -> VolumeDescriptor {
    VolumeDescriptor {
        volume_id: volume.volume_id().unwrap_or_default().to_string(),
        state: volume
            .state()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        create_time: volume.create_time().and_then(to_utc),
        attachment_count: volume.attachments().len(),
    }
}

fn snapshot_descriptor(snapshot: &Snapshot) -> SnapshotDescriptor {
    SnapshotDescriptor {
        snapshot_id: snapshot.snapshot_id().map(str::to_string),
        volume_id: snapshot.volume_id().map(str::to_string),
        start_time: snapshot.start_time().and_then(to_utc),
    }
}

fn image_descriptor(image: &Image) -> ImageDescriptor {
    let snapshot_ids = image
        .block_device_mappings()
        .iter()
        .filter_map(|mapping| mapping.ebs())
        .filter_map(|ebs| ebs.snapshot_id())
        .map(str::to_string)
        .collect();

    ImageDescriptor {
        image_id: image.image_id().map(str::to_string),
        name: image.name().map(str::to_string),
        // CreationDate comes back as an RFC 3339 string, not a DateTime
        creation_date: image
            .creation_date()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc)),
        snapshot_ids,
    }
}

fn instance_descriptor(instance: &Instance) -> InstanceDescriptor {
    InstanceDescriptor {
        instance_id: instance.instance_id().map(str::to_string),
        launch_time: instance.launch_time().and_then(to_utc),
    }
}

fn address_descriptor(address: &aws_sdk_ec2::types::Address) -> AddressDescriptor {
    AddressDescriptor {
        allocation_id: address.allocation_id().map(str::to_string),
        public_ip: address.public_ip().map(str::to_string),
        instance_id: address.instance_id().map(str::to_string),
        network_interface_id: address.network_interface_id().map(str::to_string),
    }
}
