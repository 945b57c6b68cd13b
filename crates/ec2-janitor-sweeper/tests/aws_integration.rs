//! Live AWS integration tests
//!
//! These hit real AWS and require credentials; they are skipped in regular
//! test runs. They only list resources and never delete anything.

use ec2_janitor_sweeper::aws::{
    AwsContext, CloudWatchClient, CloudWatchOperations, Ec2Client, Ec2Operations, FromAwsContext,
};

/// Get the AWS region for tests.
///
/// Checks AWS_REGION, then AWS_DEFAULT_REGION, then falls back to us-east-1.
fn test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn list_volumes_returns_wellformed_descriptors() {
    let ctx = AwsContext::new(&test_region()).await;
    let ec2 = Ec2Client::from_context(&ctx);

    let volumes = ec2.list_volumes().await.expect("describe_volumes failed");
    for volume in volumes {
        assert!(!volume.volume_id.is_empty());
        assert!(!volume.state.is_empty());
    }
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn describe_missing_volume_maps_not_found_to_none() {
    let ctx = AwsContext::new(&test_region()).await;
    let ec2 = Ec2Client::from_context(&ctx);

    let result = ec2
        .describe_volume("vol-0123456789abcdef0")
        .await
        .expect("lookup should not error on a missing volume");
    assert!(result.is_none());
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn cpu_metrics_window_query_succeeds() {
    let ctx = AwsContext::new(&test_region()).await;
    let cloudwatch = CloudWatchClient::from_context(&ctx);

    let end = chrono::Utc::now();
    let start = end - chrono::Duration::days(7);
    // A nonexistent instance yields zero datapoints, not an error
    let datapoints = cloudwatch
        .average_cpu_datapoints("i-0123456789abcdef0", start, end, 86_400)
        .await
        .expect("get_metric_statistics failed");
    assert!(datapoints.is_empty());
}
