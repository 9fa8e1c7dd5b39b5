//! Service layer for plan lifecycle operations
//!
//! Services sit between the consumer-facing event channel and the cluster
//! clients: they run the polling machines, the retried plan write path, and
//! the PV fetches, and publish results via [`crate::events`]. Everything a
//! service needs (client, control-plane coordinates, event and alert
//! channels) is injected at construction.

mod plan_close;
mod plan_status;
mod plan_update;
mod pv_discovery;

pub use plan_close::{PLAN_CLOSE_PERIOD, PLAN_CLOSE_TICKS};
pub use plan_status::{PLAN_STATUS_PERIOD, PLAN_STATUS_TICKS};
pub use plan_update::{PLAN_UPDATE_RETRY_PERIOD, PLAN_UPDATE_TOTAL_TRIES};
pub use pv_discovery::PV_DISCOVERY_TICKS;

use std::sync::Arc;

use crate::alerts::AlertEmitter;
use crate::config::MigMeta;
use crate::events::{EventSender, PlanEvent};
use crate::kube::{ClientError, ClusterClient, MigResourceKind, ResourceDescriptor};
use crate::models::MigPlan;

/// Logical task name for plan status polling
pub const PLAN_STATUS_TASK: &str = "plan-status";
/// Logical task name for plan close polling
pub const PLAN_CLOSE_TASK: &str = "plan-close";
/// Logical task name for PV discovery polling
pub const PV_DISCOVERY_TASK: &str = "pv-discovery";

/// Plan lifecycle operations against the control-plane cluster
#[derive(Clone)]
pub struct PlanService {
    client: Arc<dyn ClusterClient>,
    meta: MigMeta,
    events: EventSender,
    alerts: AlertEmitter,
}

impl PlanService {
    pub fn new(
        client: Arc<dyn ClusterClient>,
        meta: MigMeta,
        events: EventSender,
        alerts: AlertEmitter,
    ) -> Self {
        Self {
            client,
            meta,
            events,
            alerts,
        }
    }

    pub(crate) fn client(&self) -> &Arc<dyn ClusterClient> {
        &self.client
    }

    pub(crate) fn alerts(&self) -> &AlertEmitter {
        &self.alerts
    }

    pub(crate) fn plan_descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::mig(MigResourceKind::MigPlan, &self.meta.namespace)
    }

    pub(crate) fn send(&self, event: PlanEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.events.send(event);
    }

    /// Fetch the named plan from the control-plane cluster.
    pub async fn get_plan(&self, plan_name: &str) -> Result<MigPlan, ClientError> {
        let value = self.client.get(&self.plan_descriptor(), plan_name).await?;
        Ok(serde_json::from_value(value)?)
    }
}
