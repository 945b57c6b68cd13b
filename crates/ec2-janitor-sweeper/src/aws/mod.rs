//! AWS client modules for the sweep engine
//!
//! Thin wrappers around the AWS SDK clients:
//! - EC2: volumes, snapshots, images, instances, Elastic IPs
//! - ELBv2: load balancers, target groups, listeners
//! - CloudWatch: instance CPU utilization
//!
//! Each wrapper exposes an operations trait so scanners can be unit tested
//! against mocks without hitting real AWS.

pub mod cloudwatch;
pub mod context;
pub mod ec2;
pub mod elb;
pub mod error;
pub mod types;

// Core clients
pub use cloudwatch::{CloudWatchClient, CloudWatchOperations};
pub use context::{AwsContext, FromAwsContext};
pub use ec2::{Ec2Client, Ec2Operations};
pub use elb::{ElbClient, ElbOperations};

// Error handling
pub use error::{classify_aws_error, classify_sdk_error, AwsError};

// Resource descriptors
pub use types::{
    AddressDescriptor, ImageDescriptor, InstanceDescriptor, LoadBalancerDescriptor,
    SnapshotDescriptor, VolumeDescriptor,
};
