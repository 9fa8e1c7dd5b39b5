//! Per-cluster client abstraction
//!
//! [`ClusterClient`] is the seam between the engine and a single cluster's
//! API server. The polling machines and the log collector only ever talk to
//! this trait, which keeps them testable against scripted fakes and keeps the
//! kube plumbing in one place.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, LogParams, PostParams};
use kube::core::DynamicObject;
use serde_json::Value;
use thiserror::Error;

use super::resources::ResourceDescriptor;

/// Transport-level failure talking to a cluster API server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("client configuration error: {0}")]
    Config(String),
}

/// Options for list calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub label_selector: Option<String>,
}

impl ListOptions {
    pub fn labels(selector: impl Into<String>) -> Self {
        Self {
            label_selector: Some(selector.into()),
        }
    }
}

/// Handle to one cluster's API server.
///
/// Every call is asynchronous and may fail; callers decide per call site
/// whether a failure is fatal or absorbed (see the log collector's
/// settle-barriers). Payloads are dynamic JSON values, deserialized into
/// typed models where the caller needs structure.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        options: &ListOptions,
    ) -> Result<Vec<Value>, ClientError>;

    async fn get(&self, resource: &ResourceDescriptor, name: &str) -> Result<Value, ClientError>;

    async fn put(
        &self,
        resource: &ResourceDescriptor,
        name: &str,
        body: Value,
    ) -> Result<Value, ClientError>;

    async fn delete(&self, resource: &ResourceDescriptor, name: &str) -> Result<(), ClientError>;

    /// Fetch the full text log of one pod.
    async fn pod_logs(&self, namespace: &str, pod_name: &str) -> Result<String, ClientError>;
}

/// kube-backed [`ClusterClient`] implementation
#[derive(Clone)]
pub struct KubeClusterClient {
    client: kube::Client,
}

impl KubeClusterClient {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn dynamic_api(&self, resource: &ResourceDescriptor) -> Api<DynamicObject> {
        let ar = resource.api_resource();
        match resource.namespace() {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        options: &ListOptions,
    ) -> Result<Vec<Value>, ClientError> {
        let api = self.dynamic_api(resource);
        let mut params = ListParams::default();
        if let Some(selector) = &options.label_selector {
            params = params.labels(selector);
        }
        let list = api.list(&params).await?;
        list.items
            .into_iter()
            .map(|obj| serde_json::to_value(obj).map_err(ClientError::from))
            .collect()
    }

    async fn get(&self, resource: &ResourceDescriptor, name: &str) -> Result<Value, ClientError> {
        let api = self.dynamic_api(resource);
        let obj = api.get(name).await?;
        Ok(serde_json::to_value(obj)?)
    }

    async fn put(
        &self,
        resource: &ResourceDescriptor,
        name: &str,
        body: Value,
    ) -> Result<Value, ClientError> {
        let api = self.dynamic_api(resource);
        let obj: DynamicObject = serde_json::from_value(body)?;
        let replaced = api.replace(name, &PostParams::default(), &obj).await?;
        Ok(serde_json::to_value(replaced)?)
    }

    async fn delete(&self, resource: &ResourceDescriptor, name: &str) -> Result<(), ClientError> {
        let api = self.dynamic_api(resource);
        let _ = api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn pod_logs(&self, namespace: &str, pod_name: &str) -> Result<String, ClientError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let logs = pods.logs(pod_name, &LogParams::default()).await?;
        Ok(logs)
    }
}
