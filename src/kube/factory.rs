//! Client factory for multi-cluster access
//!
//! A migration involves up to three clusters. The factory hands out the host
//! (control-plane) client and builds per-cluster clients on demand; it is
//! passed explicitly into the components that fan out across clusters rather
//! than being reached through ambient state.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{ClientError, ClusterClient, KubeClusterClient};
use super::{create_client, create_client_for_context};

#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Client for the control-plane cluster.
    fn host(&self) -> Arc<dyn ClusterClient>;

    /// Client for a registered remote cluster, addressed by its MigCluster name.
    async fn for_cluster(&self, name: &str) -> Result<Arc<dyn ClusterClient>, ClientError>;
}

/// kube-backed factory mapping cluster names onto kubeconfig contexts
pub struct KubeClientFactory {
    host: Arc<KubeClusterClient>,
}

impl KubeClientFactory {
    /// Connect to the host cluster using the default kubeconfig strategy.
    pub async fn connect() -> anyhow::Result<Self> {
        let client = create_client().await?;
        Ok(Self::new(client))
    }

    pub fn new(host_client: kube::Client) -> Self {
        Self {
            host: Arc::new(KubeClusterClient::new(host_client)),
        }
    }
}

#[async_trait]
impl ClientFactory for KubeClientFactory {
    fn host(&self) -> Arc<dyn ClusterClient> {
        self.host.clone()
    }

    async fn for_cluster(&self, name: &str) -> Result<Arc<dyn ClusterClient>, ClientError> {
        let client = create_client_for_context(name)
            .await
            .map_err(|err| ClientError::Config(err.to_string()))?;
        Ok(Arc::new(KubeClusterClient::new(client)))
    }
}
