//! Persistent-volume discovery polling and PV detail fetches
//!
//! PV discovery is the generic machine: the caller supplies the fetch and
//! the evaluate step (what "found" means depends on the wizard page driving
//! it), while the engine contributes the tick budget, cancellation, and the
//! timeout signal. Exhaustion is reported as a timeout only — it is not
//! dressed up as an empty discovery result.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde_json::Value;

use crate::events::PlanEvent;
use crate::kube::{ClientFactory, ResourceDescriptor};
use crate::poller::{poll_until, PollOutcome, PollingSupervisor, Verdict};

use super::{PlanService, PV_DISCOVERY_TASK};

/// Ticks before PV discovery gives up
pub const PV_DISCOVERY_TICKS: u32 = 20;

impl PlanService {
    /// Start PV discovery polling under the supervisor.
    pub fn start_pv_discovery<T, E, F, Fut, V>(
        &self,
        supervisor: &PollingSupervisor,
        period: Duration,
        fetch: F,
        evaluate: V,
    ) where
        T: Send + 'static,
        E: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        V: FnMut(&Result<T, E>) -> Verdict + Send + 'static,
    {
        let service = self.clone();
        supervisor.start(PV_DISCOVERY_TASK, async move {
            service.check_pvs(period, fetch, evaluate).await
        });
    }

    pub fn stop_pv_discovery(&self, supervisor: &PollingSupervisor) -> bool {
        supervisor.stop(PV_DISCOVERY_TASK)
    }

    /// Run PV discovery to completion.
    ///
    /// Max 20 ticks on the caller-supplied period; either terminal verdict
    /// stops the loop. Exhaustion publishes `PvDiscoveryTimedOut` and raises
    /// the discovery timeout alert.
    pub async fn check_pvs<T, E, F, Fut, V>(
        &self,
        period: Duration,
        fetch: F,
        evaluate: V,
    ) -> PollOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        V: FnMut(&Result<T, E>) -> Verdict,
    {
        let outcome = poll_until(fetch, evaluate, period, PV_DISCOVERY_TICKS).await;
        if outcome == PollOutcome::Exhausted {
            self.alerts().error_timeout("Timed out during PV discovery");
            self.send(PlanEvent::PvDiscoveryTimedOut);
        }
        outcome
    }

    /// Fetch the details of the named persistent volumes from a cluster.
    ///
    /// Individual fetch failures are absorbed: the published list carries
    /// whatever settled successfully. Only failing to reach the cluster at
    /// all is reported as a fetch failure.
    pub async fn get_pv_resources(
        &self,
        factory: &dyn ClientFactory,
        cluster_name: &str,
        pv_names: &[String],
    ) {
        match self.fetch_pv_resources(factory, cluster_name, pv_names).await {
            Ok(pvs) => self.send(PlanEvent::PvResourcesFetched(pvs)),
            Err(err) => {
                tracing::warn!(cluster = cluster_name, error = %err, "PV detail fetch failed");
                self.send(PlanEvent::PvResourcesFetchFailed(
                    "Failed to get pv details".to_string(),
                ));
            }
        }
    }

    async fn fetch_pv_resources(
        &self,
        factory: &dyn ClientFactory,
        cluster_name: &str,
        pv_names: &[String],
    ) -> Result<Vec<Value>> {
        let client = factory
            .for_cluster(cluster_name)
            .await
            .with_context(|| format!("failed to build client for cluster '{}'", cluster_name))?;

        let resource = ResourceDescriptor::persistent_volume();
        let fetches = pv_names.iter().map(|name| {
            let client = client.clone();
            let resource = resource.clone();
            async move { (name, client.get(&resource, name).await) }
        });

        let mut pvs = Vec::new();
        for (name, result) in join_all(fetches).await {
            match result {
                Ok(pv) => pvs.push(pv),
                Err(err) => {
                    tracing::debug!(pv = %name, error = %err, "skipping unreadable PV")
                }
            }
        }
        Ok(pvs)
    }
}
