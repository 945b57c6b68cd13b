//! Run orchestration
//!
//! Sequences all six scanners in a fixed order, collects their records into
//! one report, and hands it to the publisher. Scanners run sequentially, not
//! concurrently: the snapshot scan depends on the volume scan's side effects,
//! and the provider's shared request-rate budget is better served by
//! serialization than parallel fan-out.
//!
//! A scanner whose top-level listing fails is logged and contributes zero
//! records; the run proceeds unconditionally and [`Sweeper::run`] always
//! returns, even when every scanner failed. An empty report is a valid
//! terminal output, not an error.

use crate::aws::{CloudWatchOperations, Ec2Operations, ElbOperations};
use crate::config::PolicyConfig;
use crate::report::Publish;
use crate::scanner;
use ec2_janitor_common::{ResourceKind, RunReport};
use tracing::{error, info};

/// One sweep over every managed resource type
pub struct Sweeper<E, L, M, P> {
    ec2: E,
    elb: L,
    metrics: M,
    publisher: P,
    policy: PolicyConfig,
}

impl<E, L, M, P> Sweeper<E, L, M, P>
where
    E: Ec2Operations,
    L: ElbOperations,
    M: CloudWatchOperations,
    P: Publish,
{
    pub fn new(ec2: E, elb: L, metrics: M, publisher: P, policy: PolicyConfig) -> Self {
        Self {
            ec2,
            elb,
            metrics,
            publisher,
            policy,
        }
    }

    /// Run all scanners, publish the aggregated report, and return it.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new();
        info!("Starting reclamation sweep");

        // Fixed scan order per ResourceKind::scan_priority: volumes before
        // snapshots so volumes orphaned this run are caught as dangling
        // references by the snapshot scan.
        match scanner::scan_volumes(&self.ec2, &self.policy).await {
            Ok(records) => report.extend(records),
            Err(e) => scanner_failed(ResourceKind::Volume, &e),
        }
        match scanner::scan_snapshots(&self.ec2, &self.policy).await {
            Ok(records) => report.extend(records),
            Err(e) => scanner_failed(ResourceKind::Snapshot, &e),
        }
        match scanner::scan_instances(&self.ec2, &self.metrics, &self.policy).await {
            Ok(records) => report.extend(records),
            Err(e) => scanner_failed(ResourceKind::Instance, &e),
        }
        match scanner::scan_addresses(&self.ec2).await {
            Ok(records) => report.extend(records),
            Err(e) => scanner_failed(ResourceKind::ElasticIp, &e),
        }
        match scanner::scan_load_balancers(&self.elb, &self.policy).await {
            Ok(records) => report.extend(records),
            Err(e) => scanner_failed(ResourceKind::LoadBalancer, &e),
        }
        match scanner::scan_images(&self.ec2, &self.policy).await {
            Ok(records) => report.extend(records),
            Err(e) => scanner_failed(ResourceKind::Image, &e),
        }

        info!(records = report.len(), "Sweep complete");

        // Reporting is best-effort; the run terminates normally either way.
        if let Err(e) = self.publisher.persist(&report).await {
            error!(error = %e, "Failed to persist run report");
        }
        if let Err(e) = self.publisher.alert(&report).await {
            error!(error = %e, "Failed to dispatch alerts");
        }

        report
    }
}

fn scanner_failed(kind: ResourceKind, error: &crate::aws::AwsError) {
    error!(
        resource_type = %kind,
        error = %error,
        "Scanner failed, no records produced for this resource type"
    );
}
