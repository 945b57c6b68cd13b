//! Unused-load-balancer scanner with listener cascade
//!
//! A load balancer is eligible only when every one of its target groups has
//! zero registered targets; enumeration short-circuits on the first group
//! with a target. Listeners are deleted before the load balancer itself, but
//! listener cleanup is advisory: its failures never block the deletion.

use crate::aws::{AwsError, ElbOperations};
use crate::config::PolicyConfig;
use crate::policy;
use chrono::{DateTime, Utc};
use ec2_janitor_common::{Action, OutcomeRecord, ResourceKind};
use tracing::{debug, error, info, warn};

/// Delete load balancers past the minimum age with no registered targets.
pub async fn scan_load_balancers(
    elb: &impl ElbOperations,
    config: &PolicyConfig,
) -> Result<Vec<OutcomeRecord>, AwsError> {
    let load_balancers = elb.list_load_balancers().await?;
    let now = Utc::now();
    let mut records = Vec::new();

    for lb in load_balancers {
        let (Some(arn), Some(name), Some(created_time)) =
            (lb.arn.as_deref(), lb.name.as_deref(), lb.created_time)
        else {
            warn!("Load balancer missing ARN, name, or creation time, skipping");
            continue;
        };

        match sweep_one(elb, arn, name, created_time, now, config).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                error!(load_balancer = %name, error = %e, "Failed checking/deleting load balancer");
            }
        }
    }

    Ok(records)
}

async fn sweep_one(
    elb: &impl ElbOperations,
    arn: &str,
    name: &str,
    created_time: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &PolicyConfig,
) -> Result<Option<OutcomeRecord>, AwsError> {
    let age = policy::age_minutes(now, created_time);
    let has_targets = has_registered_targets(elb, arn).await?;

    let Some(reason) = policy::load_balancer_reason(age, config.lb_min_age_minutes, has_targets)
    else {
        debug!(
            load_balancer = %name,
            age_minutes = age,
            has_targets,
            "Keeping load balancer"
        );
        return Ok(None);
    };

    match elb.list_listener_arns(arn).await {
        Ok(listener_arns) => {
            for listener_arn in listener_arns {
                match elb.delete_listener(&listener_arn).await {
                    Ok(()) => {
                        info!(listener = %listener_arn, load_balancer = %name, "Deleted listener");
                    }
                    Err(e) => {
                        warn!(
                            listener = %listener_arn,
                            load_balancer = %name,
                            error = %e,
                            "Failed to delete listener"
                        );
                    }
                }
            }
        }
        Err(e) => {
            warn!(
                load_balancer = %name,
                error = %e,
                "Failed to list listeners, proceeding with deletion"
            );
        }
    }

    elb.delete_load_balancer(arn).await?;
    info!(load_balancer = %name, arn = %arn, "Deleted load balancer");
    Ok(Some(OutcomeRecord::new(
        ResourceKind::LoadBalancer,
        arn,
        Action::Deleted,
        reason,
    )))
}

/// Whether any target group of the load balancer has a registered target.
///
/// Short-circuits on the first group with a target; concluding "no targets"
/// requires enumerating every group.
async fn has_registered_targets(
    elb: &impl ElbOperations,
    lb_arn: &str,
) -> Result<bool, AwsError> {
    for target_group_arn in elb.list_target_group_arns(lb_arn).await? {
        if elb.target_count(&target_group_arn).await? > 0 {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::elb::MockElbOperations;
    use crate::aws::types::LoadBalancerDescriptor;
    use chrono::Duration;

    fn load_balancer(name: &str, age_minutes: i64) -> LoadBalancerDescriptor {
        LoadBalancerDescriptor {
            arn: Some(format!("arn:aws:elasticloadbalancing:lb/{name}")),
            name: Some(name.to_string()),
            created_time: Some(Utc::now() - Duration::minutes(age_minutes)),
        }
    }

    #[tokio::test]
    async fn target_in_any_group_blocks_deletion() {
        let mut elb = MockElbOperations::new();
        elb.expect_list_load_balancers()
            .returning(|| Ok(vec![load_balancer("lb-1", 120)]));
        elb.expect_list_target_group_arns()
            .returning(|_| Ok(vec!["tg-1".to_string(), "tg-2".to_string()]));
        // First group is empty, second has one registered target
        elb.expect_target_count()
            .returning(|tg| Ok(if tg == "tg-2" { 1 } else { 0 }));
        elb.expect_delete_load_balancer().never();
        elb.expect_delete_listener().never();

        let records = scan_load_balancers(&elb, &PolicyConfig::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn young_load_balancer_is_kept() {
        let mut elb = MockElbOperations::new();
        elb.expect_list_load_balancers()
            .returning(|| Ok(vec![load_balancer("lb-1", 10)]));
        elb.expect_list_target_group_arns().returning(|_| Ok(vec![]));
        elb.expect_delete_load_balancer().never();

        let records = scan_load_balancers(&elb, &PolicyConfig::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn eligible_load_balancer_loses_listeners_then_itself() {
        let mut elb = MockElbOperations::new();
        elb.expect_list_load_balancers()
            .returning(|| Ok(vec![load_balancer("lb-1", 120)]));
        elb.expect_list_target_group_arns()
            .returning(|_| Ok(vec!["tg-1".to_string()]));
        elb.expect_target_count().returning(|_| Ok(0));
        elb.expect_list_listener_arns()
            .returning(|_| Ok(vec!["listener-1".to_string(), "listener-2".to_string()]));
        elb.expect_delete_listener().times(2).returning(|_| Ok(()));
        elb.expect_delete_load_balancer().returning(|_| Ok(()));

        let records = scan_load_balancers(&elb, &PolicyConfig::default())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_type, ResourceKind::LoadBalancer);
        assert!(records[0].reason.contains("older than 60 minutes"));
    }

    #[tokio::test]
    async fn listener_failures_do_not_block_deletion() {
        let mut elb = MockElbOperations::new();
        elb.expect_list_load_balancers()
            .returning(|| Ok(vec![load_balancer("lb-1", 120)]));
        elb.expect_list_target_group_arns().returning(|_| Ok(vec![]));
        elb.expect_list_listener_arns().returning(|_| {
            Err(AwsError::Sdk {
                code: None,
                message: "listener listing broke".to_string(),
            })
        });
        elb.expect_delete_load_balancer().returning(|_| Ok(()));

        let records = scan_load_balancers(&elb, &PolicyConfig::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn per_lb_failure_continues_the_scan() {
        let mut elb = MockElbOperations::new();
        elb.expect_list_load_balancers()
            .returning(|| Ok(vec![load_balancer("lb-1", 120), load_balancer("lb-2", 120)]));
        elb.expect_list_target_group_arns().returning(|arn| {
            if arn.contains("lb-1") {
                Err(AwsError::Throttled {
                    message: "slow down".to_string(),
                })
            } else {
                Ok(vec![])
            }
        });
        elb.expect_list_listener_arns().returning(|_| Ok(vec![]));
        elb.expect_delete_load_balancer()
            .withf(|arn| arn.contains("lb-2"))
            .returning(|_| Ok(()));

        let records = scan_load_balancers(&elb, &PolicyConfig::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].resource_id.contains("lb-2"));
    }
}
