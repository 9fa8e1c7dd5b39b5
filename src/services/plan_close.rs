//! Plan close tracking and close/delete orchestration
//!
//! Closing a plan is a write (`closed: true`, PV selection cleared) followed
//! by polling for the controller's `Closed` condition. Close-and-delete
//! additionally deletes the plan resource once the close has been observed.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::events::PlanEvent;
use crate::models::{PlanValues, CONDITION_CLOSED};
use crate::poller::{poll_until, PollOutcome, PollingSupervisor, Verdict};

use super::{PlanService, PLAN_CLOSE_TASK};

/// Ticks before close tracking gives up
pub const PLAN_CLOSE_TICKS: u32 = 8;
/// Fixed period between close ticks
pub const PLAN_CLOSE_PERIOD: Duration = Duration::from_millis(5000);

impl PlanService {
    pub fn start_close_polling(&self, supervisor: &PollingSupervisor, plan_name: &str) {
        let service = self.clone();
        let plan_name = plan_name.to_string();
        supervisor.start(PLAN_CLOSE_TASK, async move {
            service.check_closed_status(&plan_name).await
        });
    }

    pub fn stop_close_polling(&self, supervisor: &PollingSupervisor) -> bool {
        supervisor.stop(PLAN_CLOSE_TASK)
    }

    /// Run the close machine to completion.
    ///
    /// Max 8 ticks, 5 s apart. A `Closed` condition publishes `PlanClosed`
    /// and stops; exhausting the budget publishes `PlanCloseFailed` and
    /// raises a timeout alert.
    pub async fn check_closed_status(&self, plan_name: &str) -> PollOutcome {
        let outcome = poll_until(
            || self.get_plan(plan_name),
            |result| match result {
                Err(err) => {
                    tracing::warn!(plan = plan_name, error = %err, "plan close fetch failed");
                    Verdict::Continue
                }
                Ok(plan) => {
                    if plan.has_condition(CONDITION_CLOSED) {
                        self.send(PlanEvent::PlanClosed {
                            plan_name: plan_name.to_string(),
                        });
                        Verdict::Success
                    } else {
                        Verdict::Continue
                    }
                }
            },
            PLAN_CLOSE_PERIOD,
            PLAN_CLOSE_TICKS,
        )
        .await;

        if outcome == PollOutcome::Exhausted {
            self.send(PlanEvent::PlanCloseFailed {
                plan_name: plan_name.to_string(),
                message: "Failed to close plan".to_string(),
            });
            self.alerts().error_timeout("Timed out during plan close");
        }
        outcome
    }

    /// Close a plan: persist `closed: true` and start close polling.
    pub async fn close_plan(&self, supervisor: &PollingSupervisor, plan_name: &str) -> Result<()> {
        match self.update_plan(PlanValues::closing(plan_name)).await {
            Ok(_) => {
                self.start_close_polling(supervisor, plan_name);
                Ok(())
            }
            Err(err) => {
                self.send(PlanEvent::PlanCloseFailed {
                    plan_name: plan_name.to_string(),
                    message: err.to_string(),
                });
                self.alerts().error_timeout("Plan close request failed");
                Err(err)
            }
        }
    }

    /// Close a plan, wait for the controller to confirm, then delete it.
    ///
    /// The close machine runs inline here rather than under the supervisor:
    /// the delete must not happen until the `Closed` condition has been
    /// observed.
    pub async fn close_and_delete_plan(&self, plan_name: &str) -> Result<()> {
        let closed = async {
            self.update_plan(PlanValues::closing(plan_name))
                .await
                .context("plan close update failed")?;
            match self.check_closed_status(plan_name).await {
                PollOutcome::Success => Ok(()),
                outcome => Err(anyhow!("plan close did not complete: {:?}", outcome)),
            }
        }
        .await;

        let deleted = match closed {
            Ok(()) => self
                .client()
                .delete(&self.plan_descriptor(), plan_name)
                .await
                .with_context(|| format!("failed to delete plan \"{}\"", plan_name)),
            Err(err) => Err(err),
        };

        match deleted {
            Ok(()) => {
                self.send(PlanEvent::PlanRemoved {
                    plan_name: plan_name.to_string(),
                });
                self.alerts()
                    .success_timeout(format!("Successfully removed plan \"{}\"!", plan_name));
                Ok(())
            }
            Err(err) => {
                self.alerts().error_timeout("Plan delete request failed");
                Err(err)
            }
        }
    }
}
