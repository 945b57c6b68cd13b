//! ec2-janitor: policy-driven reclamation of idle AWS compute resources
//!
//! One invocation is one sweep: unattached volumes, expired snapshots and
//! images, idle instances, targetless load balancers, and unattached Elastic
//! IPs are evaluated against the configured thresholds and deleted, released,
//! or reported. Designed to run from any scheduler; the run itself holds no
//! state between invocations.

use anyhow::Result;
use clap::Parser;
use ec2_janitor_common::defaults::{
    DEFAULT_IDLE_CPU_THRESHOLD, DEFAULT_IMAGE_RETENTION_DAYS, DEFAULT_LB_MIN_AGE_MINUTES,
    DEFAULT_LOG_BUCKET, DEFAULT_SNAPSHOT_RETENTION_DAYS, DEFAULT_VOLUME_AGE_DAYS,
};
use ec2_janitor_sweeper::aws::{
    AwsContext, CloudWatchClient, Ec2Client, ElbClient, FromAwsContext,
};
use ec2_janitor_sweeper::config::{PolicyConfig, ReportConfig};
use ec2_janitor_sweeper::orchestrator::Sweeper;
use ec2_janitor_sweeper::report::S3SnsPublisher;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ec2-janitor")]
#[command(about = "Reclaims idle AWS compute resources by retention policy")]
#[command(version)]
struct Args {
    /// AWS region to sweep
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// Minimum age in days before an unattached EBS volume is deleted
    #[arg(long, env = "EBS_VOLUME_AGE_DAYS", default_value_t = DEFAULT_VOLUME_AGE_DAYS)]
    volume_age_days: i64,

    /// Retention in days for EBS snapshots
    #[arg(long, env = "SNAPSHOT_RETENTION_DAYS", default_value_t = DEFAULT_SNAPSHOT_RETENTION_DAYS)]
    snapshot_retention_days: i64,

    /// Retention in days for AMIs
    #[arg(long, env = "AMI_RETENTION_DAYS", default_value_t = DEFAULT_IMAGE_RETENTION_DAYS)]
    image_retention_days: i64,

    /// Average-CPU percentage at or below which a running instance is reported idle
    #[arg(long, env = "IDLE_CPU_THRESHOLD", default_value_t = DEFAULT_IDLE_CPU_THRESHOLD)]
    idle_cpu_threshold: f64,

    /// Minimum age in minutes before a targetless load balancer is deleted
    #[arg(long, env = "LB_MIN_AGE_MINUTES", default_value_t = DEFAULT_LB_MIN_AGE_MINUTES)]
    lb_min_age_minutes: i64,

    /// S3 bucket receiving the JSON run report
    #[arg(long, env = "LOG_S3_BUCKET", default_value = DEFAULT_LOG_BUCKET)]
    log_bucket: String,

    /// SNS topic ARN for alert dispatch (alerting is skipped when unset)
    #[arg(long, env = "SNS_TOPIC_ARN")]
    sns_topic_arn: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error with its cause chain
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "\nError: {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  Caused by: {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let policy = PolicyConfig {
        volume_age_days: args.volume_age_days,
        snapshot_retention_days: args.snapshot_retention_days,
        image_retention_days: args.image_retention_days,
        idle_cpu_threshold: args.idle_cpu_threshold,
        lb_min_age_minutes: args.lb_min_age_minutes,
    };
    policy.validate()?;

    let report_config = ReportConfig {
        log_bucket: args.log_bucket,
        sns_topic_arn: args.sns_topic_arn,
    };

    info!(region = %args.region, policy = ?policy, "Starting sweep");

    let aws = AwsContext::new(&args.region).await;
    let sweeper = Sweeper::new(
        Ec2Client::from_context(&aws),
        ElbClient::from_context(&aws),
        CloudWatchClient::from_context(&aws),
        S3SnsPublisher::new(&aws, &report_config),
        policy,
    );

    let report = sweeper.run().await;
    info!(records = report.len(), "Run finished");

    Ok(())
}
