//! AWS resource types and scan ordering
//!
//! Provides a consistent scan order across the sweep engine. Scanners run in
//! dependency order so that side effects of earlier scans are visible to
//! later ones within a single run.

use serde::{Deserialize, Serialize};

/// Types of AWS resources managed by ec2-janitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// EBS volume
    #[serde(rename = "EBS Volume")]
    Volume,
    /// EBS snapshot (scanned after volumes so fresh orphans are caught)
    #[serde(rename = "EBS Snapshot")]
    Snapshot,
    /// Machine image, deregistration cascades to its mapped snapshots
    #[serde(rename = "AMI")]
    Image,
    /// EC2 instance (notify-only, never deleted)
    #[serde(rename = "EC2 Instance")]
    Instance,
    /// Application/network load balancer
    #[serde(rename = "Load Balancer")]
    LoadBalancer,
    /// Elastic IP address
    #[serde(rename = "Elastic IP")]
    ElasticIp,
}

impl ResourceKind {
    /// Human-readable label used in audit records and alert messages
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Volume => "EBS Volume",
            ResourceKind::Snapshot => "EBS Snapshot",
            ResourceKind::Image => "AMI",
            ResourceKind::Instance => "EC2 Instance",
            ResourceKind::LoadBalancer => "Load Balancer",
            ResourceKind::ElasticIp => "Elastic IP",
        }
    }

    /// Get scan priority (lower number = scanned first)
    ///
    /// Scanners run in a fixed order:
    /// - 0: Delete unattached volumes
    /// - 1: Delete expired snapshots (volumes orphaned in step 0 are
    ///   detected as dangling references here)
    /// - 2: Report idle instances
    /// - 3: Release unattached Elastic IPs
    /// - 4: Delete targetless load balancers
    /// - 5: Deregister expired images and their mapped snapshots
    ///
    /// Deleting a volume does not retroactively delete its snapshots, so
    /// running the snapshot scan after the volume scan maximizes orphan
    /// detection within a single run.
    pub fn scan_priority(self) -> u8 {
        match self {
            ResourceKind::Volume => 0,
            ResourceKind::Snapshot => 1,
            ResourceKind::Instance => 2,
            ResourceKind::ElasticIp => 3,
            ResourceKind::LoadBalancer => 4,
            ResourceKind::Image => 5,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
