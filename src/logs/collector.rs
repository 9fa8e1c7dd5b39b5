//! Cross-cluster log collection
//!
//! One-shot fan-out/fan-in pipeline: discover the cluster topology on the
//! host, fetch controller logs from the host's configuration namespace,
//! fetch velero/restic pod lists and logs from the remote clusters named by
//! the plan, and assemble the result tree once everything has settled.
//! Individual pod/log fetch failures are absorbed; a failure during setup
//! (topology listing, client construction) aborts the run.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde_json::Value;

use crate::config::MigMeta;
use crate::events::{EventSender, PlanEvent};
use crate::kube::{ClientError, ClientFactory, ClusterClient, ListOptions, MigResourceKind, ResourceDescriptor};
use crate::models::{MigCluster, MigMigration, MigPlan};

use super::tree::{ClusterRole, LogEntry, MigrationLogTree, PodRole};

/// Label selector for migration controller pods
pub const CONTROLLER_POD_LABEL: &str = "control-plane=controller-manager";
/// Label selector for velero pods
pub const VELERO_POD_LABEL: &str = "component=velero";
/// Label selector for restic pods
pub const RESTIC_POD_LABEL: &str = "name=restic";

/// One-shot log aggregation over the clusters involved in a plan
pub struct LogCollector {
    factory: Arc<dyn ClientFactory>,
    meta: MigMeta,
    events: EventSender,
}

struct RemoteCluster {
    name: String,
    is_source: bool,
    client: Arc<dyn ClusterClient>,
}

#[derive(Default)]
struct RemotePods {
    velero: Vec<String>,
    restic: Vec<String>,
}

impl LogCollector {
    pub fn new(factory: Arc<dyn ClientFactory>, meta: MigMeta, events: EventSender) -> Self {
        Self {
            factory,
            meta,
            events,
        }
    }

    /// Collect logs for a plan and its migrations.
    ///
    /// Publishes `LogsCollected` with the finished tree, or
    /// `LogsCollectionFailed` when the run aborts; no partial tree is ever
    /// published.
    pub async fn collect(
        &self,
        plan: &MigPlan,
        migrations: &[MigMigration],
    ) -> Result<MigrationLogTree> {
        match self.collect_inner(plan, migrations).await {
            Ok(tree) => {
                let _ = self
                    .events
                    .send(PlanEvent::LogsCollected(Box::new(tree.clone())));
                Ok(tree)
            }
            Err(err) => {
                tracing::warn!(plan = plan.name(), error = %err, "log collection failed");
                let _ = self
                    .events
                    .send(PlanEvent::LogsCollectionFailed("Failed to get logs".to_string()));
                Err(err)
            }
        }
    }

    async fn collect_inner(
        &self,
        plan: &MigPlan,
        migrations: &[MigMigration],
    ) -> Result<MigrationLogTree> {
        let host_client = self.factory.host();

        // Topology: list the registered clusters and find the host.
        let cluster_resource =
            ResourceDescriptor::mig(MigResourceKind::MigCluster, &self.meta.namespace);
        let items = host_client
            .list(&cluster_resource, &ListOptions::default())
            .await
            .context("Failed to list migration clusters")?;
        let clusters: Vec<MigCluster> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(cluster) => Some(cluster),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unparsable cluster resource");
                    None
                }
            })
            .collect();

        let host = clusters
            .iter()
            .find(|c| c.spec.is_host_cluster)
            .context("no host cluster registered")?;
        let host_name = host.name().to_string();
        let source_name = plan
            .spec
            .src_mig_cluster_ref
            .as_ref()
            .map(|r| r.name.clone())
            .context("plan has no source cluster reference")?;
        let target_name = plan
            .spec
            .dest_mig_cluster_ref
            .as_ref()
            .map(|r| r.name.clone())
            .context("plan has no target cluster reference")?;

        let mut tree = MigrationLogTree::new(
            plan.clone(),
            migrations.to_vec(),
            &source_name,
            &target_name,
            &host_name,
        );

        // Controller pods run on the host in the configuration namespace.
        let controller_pods = host_client
            .list(
                &ResourceDescriptor::pod(&self.meta.config_namespace),
                &ListOptions::labels(CONTROLLER_POD_LABEL),
            )
            .await
            .context("Failed to list controller pods")?;
        tree.host.controller = self
            .fetch_logs(
                host_client.clone(),
                &host_name,
                &self.meta.config_namespace,
                pod_names(&controller_pods),
            )
            .await;

        // Remote worklist: clusters the plan names, excluding the host. The
        // host stands in for any role the worklist does not cover.
        let mut remotes = Vec::new();
        for cluster in clusters.iter().filter(|c| {
            !c.spec.is_host_cluster && (c.name() == source_name || c.name() == target_name)
        }) {
            let client = self
                .factory
                .for_cluster(cluster.name())
                .await
                .with_context(|| {
                    format!("failed to build client for cluster '{}'", cluster.name())
                })?;
            remotes.push(RemoteCluster {
                name: cluster.name().to_string(),
                is_source: cluster.name() == source_name,
                client,
            });
        }
        if remotes.len() < 2 {
            if !remotes.iter().any(|c| c.is_source) {
                remotes.push(RemoteCluster {
                    name: host_name.clone(),
                    is_source: true,
                    client: host_client.clone(),
                });
            }
            if !remotes.iter().any(|c| !c.is_source) {
                remotes.push(RemoteCluster {
                    name: host_name.clone(),
                    is_source: false,
                    client: host_client.clone(),
                });
            }
        }

        // Two concurrent pod-list calls per cluster; one settle-barrier
        // across all clusters. A cluster with no reachable pods contributes
        // empty lists.
        let pod_resource = ResourceDescriptor::pod(&self.meta.namespace);
        let pod_lists: Vec<RemotePods> = join_all(remotes.iter().map(|cluster| {
            let pod_resource = pod_resource.clone();
            async move {
                let velero_opts = ListOptions::labels(VELERO_POD_LABEL);
                let restic_opts = ListOptions::labels(RESTIC_POD_LABEL);
                let (velero, restic) = tokio::join!(
                    cluster.client.list(&pod_resource, &velero_opts),
                    cluster.client.list(&pod_resource, &restic_opts),
                );
                RemotePods {
                    velero: settled_pod_names(velero, &cluster.name, VELERO_POD_LABEL),
                    restic: settled_pod_names(restic, &cluster.name, RESTIC_POD_LABEL),
                }
            }
        }))
        .await;

        // Log fetches for every discovered pod; second settle-barrier. A pod
        // whose log fetch fails is absent from its slot.
        let mut fetches = Vec::new();
        for (cluster, pods) in remotes.iter().zip(&pod_lists) {
            let role = if cluster.is_source {
                ClusterRole::Source
            } else {
                ClusterRole::Target
            };
            for (pod_role, names) in [(PodRole::Velero, &pods.velero), (PodRole::Restic, &pods.restic)]
            {
                for pod in names {
                    let client = cluster.client.clone();
                    let cluster_name = cluster.name.clone();
                    let namespace = self.meta.namespace.clone();
                    let pod = pod.clone();
                    fetches.push(async move {
                        match client.pod_logs(&namespace, &pod).await {
                            Ok(log) => Some((role, pod_role, LogEntry { pod_name: pod, log })),
                            Err(err) => {
                                tracing::warn!(
                                    cluster = %cluster_name,
                                    pod = %pod,
                                    error = %err,
                                    "pod log fetch failed"
                                );
                                None
                            }
                        }
                    });
                }
            }
        }
        for (role, pod_role, entry) in join_all(fetches).await.into_iter().flatten() {
            tree.cluster_mut(role).entries_mut(pod_role).push(entry);
        }

        Ok(tree)
    }

    /// Fetch logs for a list of pods on one cluster, keeping what settles.
    async fn fetch_logs(
        &self,
        client: Arc<dyn ClusterClient>,
        cluster_name: &str,
        namespace: &str,
        pods: Vec<String>,
    ) -> Vec<LogEntry> {
        let fetches = pods.into_iter().map(|pod| {
            let client = client.clone();
            let namespace = namespace.to_string();
            let cluster_name = cluster_name.to_string();
            async move {
                match client.pod_logs(&namespace, &pod).await {
                    Ok(log) => Some(LogEntry { pod_name: pod, log }),
                    Err(err) => {
                        tracing::warn!(
                            cluster = %cluster_name,
                            pod = %pod,
                            error = %err,
                            "pod log fetch failed"
                        );
                        None
                    }
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }
}

/// Pod names out of a list response.
fn pod_names(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|pod| {
            pod.get("metadata")
                .and_then(|meta| meta.get("name"))
                .and_then(|name| name.as_str())
                .map(String::from)
        })
        .collect()
}

/// Pod names out of a settled list result, empty when the call failed.
fn settled_pod_names(
    result: Result<Vec<Value>, ClientError>,
    cluster: &str,
    label: &str,
) -> Vec<String> {
    match result {
        Ok(items) => pod_names(&items),
        Err(err) => {
            tracing::warn!(cluster, label, error = %err, "pod list failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_names_skips_malformed_items() {
        let items = vec![
            serde_json::json!({ "metadata": { "name": "velero-1" } }),
            serde_json::json!({ "metadata": {} }),
            serde_json::json!({}),
            serde_json::json!({ "metadata": { "name": "velero-2" } }),
        ];
        assert_eq!(pod_names(&items), vec!["velero-1", "velero-2"]);
    }
}
