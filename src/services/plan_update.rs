//! Bounded-retry plan update
//!
//! Plan updates are read-modify-write under optimistic concurrency: every
//! attempt re-fetches the plan, merges the wizard values, and puts the
//! result, so a conflicting write by the controller only costs a retry.

use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::events::PlanEvent;
use crate::kube::ClientError;
use crate::models::{update_plan_from_values, MigPlan, PlanValues};

use super::PlanService;

/// Total update attempts before giving up
pub const PLAN_UPDATE_TOTAL_TRIES: u32 = 6;
/// Fixed delay between update attempts
pub const PLAN_UPDATE_RETRY_PERIOD: Duration = Duration::from_secs(5);

impl PlanService {
    /// Persist wizard values onto the named plan, retrying on contention.
    ///
    /// A successful attempt publishes the updated plan and stops the
    /// sequence. Exhausting all attempts raises the update-failure alert and
    /// leaves no partial state behind — every attempt starts from a fresh
    /// read.
    pub async fn update_plan(&self, values: PlanValues) -> Result<MigPlan> {
        for attempt in 1..=PLAN_UPDATE_TOTAL_TRIES {
            match self.put_plan(&values).await {
                Ok(plan) => {
                    self.send(PlanEvent::PlanListUpdated(Box::new(plan.clone())));
                    return Ok(plan);
                }
                Err(err) => {
                    tracing::warn!(
                        plan = %values.plan_name,
                        attempt,
                        error = %err,
                        "plan update attempt failed"
                    );
                    if attempt < PLAN_UPDATE_TOTAL_TRIES {
                        tokio::time::sleep(PLAN_UPDATE_RETRY_PERIOD).await;
                    }
                }
            }
        }
        self.alerts().error_timeout("Failed to update plan");
        Err(anyhow!(
            "failed to update plan \"{}\" after {} attempts",
            values.plan_name,
            PLAN_UPDATE_TOTAL_TRIES
        ))
    }

    /// One get-merge-put attempt.
    async fn put_plan(&self, values: &PlanValues) -> Result<MigPlan, ClientError> {
        let current = self.get_plan(&values.plan_name).await?;
        let updated = update_plan_from_values(&current, values);
        let body = serde_json::to_value(&updated)?;
        let response = self
            .client()
            .put(&self.plan_descriptor(), &current.metadata.name, body)
            .await?;
        Ok(serde_json::from_value(response)?)
    }
}
