//! Unattached Elastic IP scanner
//!
//! The only policy with no time dimension: an address associated with
//! neither an instance nor a network interface is released immediately.

use crate::aws::{AwsError, Ec2Operations};
use crate::policy;
use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};
use tracing::{debug, error, info, warn};

/// Release Elastic IPs that are not associated with anything.
pub async fn scan_addresses(ec2: &impl Ec2Operations) -> Result<Vec<OutcomeRecord>, AwsError> {
    let addresses = ec2.list_addresses().await?;
    let mut records = Vec::new();

    for address in addresses {
        let Some(allocation_id) = address.allocation_id.as_deref() else {
            warn!(public_ip = ?address.public_ip, "Address missing allocation id, skipping");
            continue;
        };

        let Some(reason) = policy::address_reason(
            address.instance_id.as_deref(),
            address.network_interface_id.as_deref(),
        ) else {
            debug!(
                allocation_id = %allocation_id,
                public_ip = ?address.public_ip,
                "Elastic IP in use, keeping"
            );
            continue;
        };

        match ec2.release_address(allocation_id).await {
            Ok(()) => {
                info!(
                    allocation_id = %allocation_id,
                    public_ip = ?address.public_ip,
                    "Released Elastic IP"
                );
                records.push(OutcomeRecord::new(
                    ResourceKind::ElasticIp,
                    allocation_id,
                    Action::Released,
                    reason,
                ));
            }
            Err(e) => {
                error!(allocation_id = %allocation_id, error = %e, "Failed to release Elastic IP");
            }
        }
    }

    Ok(records)
}
