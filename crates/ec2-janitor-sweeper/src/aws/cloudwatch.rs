//! CloudWatch metrics gateway
//!
//! Used only by the idle-instance scanner to fetch daily average CPU
//! utilization over the trailing evaluation window.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{classify_sdk_error, AwsError};
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use aws_sdk_cloudwatch::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

const NAMESPACE: &str = "AWS/EC2";
const METRIC_NAME: &str = "CPUUtilization";

/// CloudWatch operations used by the sweep engine.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait CloudWatchOperations: Send + Sync {
    /// Fetch per-period average CPU utilization samples for an instance.
    ///
    /// Returns one value per period within the window; an instance with no
    /// metrics yet yields an empty vector.
    async fn average_cpu_datapoints(
        &self,
        instance_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        period_secs: i32,
    ) -> Result<Vec<f64>, AwsError>;
}

/// CloudWatch client for the sweep engine
pub struct CloudWatchClient {
    client: Client,
}

impl CloudWatchClient {
    /// Create a new CloudWatch client (loads AWS config from the environment)
    pub async fn new(region: &str) -> Self {
        Self::from_context(&AwsContext::new(region).await)
    }
}

impl FromAwsContext for CloudWatchClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudwatch_client(),
        }
    }
}

impl CloudWatchOperations for CloudWatchClient {
    async fn average_cpu_datapoints(
        &self,
        instance_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        period_secs: i32,
    ) -> Result<Vec<f64>, AwsError> {
        let response = self
            .client
            .get_metric_statistics()
            .namespace(NAMESPACE)
            .metric_name(METRIC_NAME)
            .dimensions(
                Dimension::builder()
                    .name("InstanceId")
                    .value(instance_id)
                    .build(),
            )
            .start_time(AwsDateTime::from_secs(window_start.timestamp()))
            .end_time(AwsDateTime::from_secs(window_end.timestamp()))
            .period(period_secs)
            .statistics(Statistic::Average)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let values: Vec<f64> = response
            .datapoints()
            .iter()
            .filter_map(|d| d.average())
            .collect();

        debug!(
            instance_id = %instance_id,
            samples = values.len(),
            "Fetched CPU utilization datapoints"
        );
        Ok(values)
    }
}
