//! Resource descriptors returned by the gateway wrappers
//!
//! One struct per resource type, carrying only the attributes the policy
//! evaluators read. Descriptors are read-only inputs; mutation happens
//! exclusively through gateway calls. Optional fields model the provider's
//! sparse responses; a missing required field makes the descriptor malformed
//! and the scanner skips it with a warning.

use chrono::{DateTime, Utc};

/// An EBS volume
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    pub volume_id: String,
    /// Provider state string, e.g. "available" or "in-use"
    pub state: String,
    pub create_time: Option<DateTime<Utc>>,
    /// Number of instance attachments currently recorded
    pub attachment_count: usize,
}

/// An EBS snapshot
#[derive(Debug, Clone)]
pub struct SnapshotDescriptor {
    pub snapshot_id: Option<String>,
    /// The volume the snapshot was taken from, if the provider still reports one
    pub volume_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
}

/// A machine image and the snapshots its block devices map to
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    pub image_id: Option<String>,
    pub name: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    /// Snapshot ids from the image's block-device mappings
    pub snapshot_ids: Vec<String>,
}

/// A running EC2 instance
#[derive(Debug, Clone)]
pub struct InstanceDescriptor {
    pub instance_id: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
}

/// An application or network load balancer
#[derive(Debug, Clone)]
pub struct LoadBalancerDescriptor {
    pub arn: Option<String>,
    pub name: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
}

/// An Elastic IP allocation
#[derive(Debug, Clone)]
pub struct AddressDescriptor {
    pub allocation_id: Option<String>,
    pub public_ip: Option<String>,
    /// Instance the address is associated with, if any
    pub instance_id: Option<String>,
    /// Network interface the address is associated with, if any
    pub network_interface_id: Option<String>,
}
