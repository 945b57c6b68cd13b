//! ELBv2 inventory gateway
//!
//! Wraps the ELBv2 SDK client behind [`ElbOperations`]. Target-group and
//! listener enumeration back the load-balancer scanner's cascade: listeners
//! are deleted before the load balancer itself, and a load balancer is only
//! eligible when every one of its target groups is empty.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{classify_sdk_error, AwsError};
use crate::aws::types::LoadBalancerDescriptor;
use aws_sdk_elasticloadbalancingv2::Client;
use chrono::DateTime;
use tracing::debug;

/// ELBv2 operations used by the sweep engine.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait ElbOperations: Send + Sync {
    /// List all load balancers in the account
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancerDescriptor>, AwsError>;

    /// List the ARNs of every target group attached to a load balancer
    async fn list_target_group_arns(&self, lb_arn: &str) -> Result<Vec<String>, AwsError>;

    /// Count registered targets (healthy or not) in a target group
    async fn target_count(&self, target_group_arn: &str) -> Result<usize, AwsError>;

    /// List the ARNs of every listener attached to a load balancer
    async fn list_listener_arns(&self, lb_arn: &str) -> Result<Vec<String>, AwsError>;

    /// Delete a listener
    async fn delete_listener(&self, listener_arn: &str) -> Result<(), AwsError>;

    /// Delete a load balancer
    async fn delete_load_balancer(&self, lb_arn: &str) -> Result<(), AwsError>;
}

/// ELBv2 client for the sweep engine
pub struct ElbClient {
    client: Client,
}

impl ElbClient {
    /// Create a new ELBv2 client (loads AWS config from the environment)
    pub async fn new(region: &str) -> Self {
        Self::from_context(&AwsContext::new(region).await)
    }
}

impl FromAwsContext for ElbClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.elb_client(),
        }
    }
}

impl ElbOperations for ElbClient {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancerDescriptor>, AwsError> {
        let response = self
            .client
            .describe_load_balancers()
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let load_balancers: Vec<_> = response
            .load_balancers()
            .iter()
            .map(|lb| LoadBalancerDescriptor {
                arn: lb.load_balancer_arn().map(str::to_string),
                name: lb.load_balancer_name().map(str::to_string),
                created_time: lb
                    .created_time()
                    .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
            })
            .collect();
        debug!(count = load_balancers.len(), "Listed load balancers");
        Ok(load_balancers)
    }

    async fn list_target_group_arns(&self, lb_arn: &str) -> Result<Vec<String>, AwsError> {
        let response = self
            .client
            .describe_target_groups()
            .load_balancer_arn(lb_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(response
            .target_groups()
            .iter()
            .filter_map(|tg| tg.target_group_arn())
            .map(str::to_string)
            .collect())
    }

    async fn target_count(&self, target_group_arn: &str) -> Result<usize, AwsError> {
        let response = self
            .client
            .describe_target_health()
            .target_group_arn(target_group_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(response.target_health_descriptions().len())
    }

    async fn list_listener_arns(&self, lb_arn: &str) -> Result<Vec<String>, AwsError> {
        let response = self
            .client
            .describe_listeners()
            .load_balancer_arn(lb_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(response
            .listeners()
            .iter()
            .filter_map(|l| l.listener_arn())
            .map(str::to_string)
            .collect())
    }

    async fn delete_listener(&self, listener_arn: &str) -> Result<(), AwsError> {
        self.client
            .delete_listener()
            .listener_arn(listener_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }

    async fn delete_load_balancer(&self, lb_arn: &str) -> Result<(), AwsError> {
        self.client
            .delete_load_balancer()
            .load_balancer_arn(lb_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        Ok(())
    }
}
