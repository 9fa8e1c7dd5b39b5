//! Plan status polling machine
//!
//! Tracks a plan through Pending → {Ready, Critical, TimedOut}. Each tick
//! publishes the latest fetched plan so observers see live progress; the
//! terminal decision is read off the plan's conditions.

use std::time::Duration;

use crate::events::{PlanEvent, PlanStatusState};
use crate::models::{CATEGORY_CRITICAL, CONDITION_PLAN_CONFLICT, CONDITION_READY};
use crate::poller::{poll_until, PollOutcome, PollingSupervisor, Verdict};

use super::{PlanService, PLAN_STATUS_TASK};

/// Ticks before the status machine gives up
pub const PLAN_STATUS_TICKS: u32 = 10;
/// Fixed period between status ticks
pub const PLAN_STATUS_PERIOD: Duration = Duration::from_millis(5000);

impl PlanService {
    /// Start status polling for `plan_name` under the supervisor.
    pub fn start_status_polling(&self, supervisor: &PollingSupervisor, plan_name: &str) {
        let service = self.clone();
        let plan_name = plan_name.to_string();
        supervisor.start(PLAN_STATUS_TASK, async move {
            service.check_plan_status(&plan_name).await
        });
    }

    pub fn stop_status_polling(&self, supervisor: &PollingSupervisor) -> bool {
        supervisor.stop(PLAN_STATUS_TASK)
    }

    /// Run the status machine to completion.
    ///
    /// Max 10 ticks, 5 s apart. A `Ready` condition is terminal success; a
    /// `Critical`-category or `PlanConflict` condition is terminal failure,
    /// carrying the condition's message. Exhausting the budget publishes
    /// `TimedOut`. Fetch errors are logged and polling continues.
    pub async fn check_plan_status(&self, plan_name: &str) -> PollOutcome {
        let outcome = poll_until(
            || {
                self.send(PlanEvent::PlanStatusChanged(PlanStatusState::Pending));
                self.get_plan(plan_name)
            },
            |result| match result {
                Err(err) => {
                    tracing::warn!(plan = plan_name, error = %err, "plan status fetch failed");
                    Verdict::Continue
                }
                Ok(plan) => {
                    self.send(PlanEvent::CurrentPlanUpdated(Box::new(plan.clone())));
                    if plan.has_condition(CONDITION_READY) {
                        self.send(PlanEvent::PlanStatusChanged(PlanStatusState::Ready));
                        Verdict::Success
                    } else if let Some(critical) = plan.find_condition_by_category(CATEGORY_CRITICAL)
                    {
                        self.send(PlanEvent::PlanStatusChanged(PlanStatusState::Critical {
                            message: critical.message.clone(),
                        }));
                        Verdict::Failure
                    } else if let Some(conflict) = plan.find_condition(CONDITION_PLAN_CONFLICT) {
                        self.send(PlanEvent::PlanStatusChanged(PlanStatusState::Critical {
                            message: conflict.message.clone(),
                        }));
                        Verdict::Failure
                    } else {
                        Verdict::Continue
                    }
                }
            },
            PLAN_STATUS_PERIOD,
            PLAN_STATUS_TICKS,
        )
        .await;

        if outcome == PollOutcome::Exhausted {
            self.send(PlanEvent::PlanStatusChanged(PlanStatusState::TimedOut));
        }
        outcome
    }
}
