//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API servers involved in a migration:
//! the host (control-plane) cluster via the default kubeconfig strategy, and
//! remote source/target clusters via named kubeconfig contexts.
//!
//! Supports HTTP/HTTPS proxy configuration via standard environment variables:
//! - `HTTP_PROXY` / `http_proxy`: HTTP proxy URL
//! - `HTTPS_PROXY` / `https_proxy`: HTTPS proxy URL
//! - `NO_PROXY` / `no_proxy`: Comma-separated list of hosts to bypass proxy
//!
//! Automatically detects internal cluster hosts and adds them to NO_PROXY
//! to prevent proxy issues with corporate environments.

mod client;
mod factory;
mod resources;

pub use client::{ClientError, ClusterClient, KubeClusterClient, ListOptions};
pub use factory::{ClientFactory, KubeClientFactory};
pub use resources::{MigResourceKind, ResourceDescriptor, MIG_GROUP, MIG_VERSION};

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use url::Url;

/// Initialize and return a Kubernetes client for the host cluster
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    bypass_proxy_for_cluster(&config);
    let client = Client::try_from(config)?;
    Ok(client)
}

/// Initialize a Kubernetes client for a specific kubeconfig context.
///
/// Remote migration clusters are addressed by context name, so the kubeconfig
/// is expected to carry one context per registered cluster.
pub async fn create_client_for_context(context: &str) -> Result<Client> {
    let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let config = Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .with_context(|| format!("Failed to load kubeconfig context '{}'", context))?;
    bypass_proxy_for_cluster(&config);
    let client = Client::try_from(config)?;
    Ok(client)
}

/// Add the cluster API server host to NO_PROXY when it looks internal.
fn bypass_proxy_for_cluster(config: &Config) {
    let cluster_url = config.cluster_url.to_string();
    if let Ok(url) = Url::parse(&cluster_url) {
        if let Some(host) = url.host_str() {
            ensure_no_proxy_bypass(host);
        }
    }
}

/// Ensure that a host is included in NO_PROXY for proxy bypass
///
/// Internal/private API server hosts are appended to NO_PROXY if not already
/// covered, preventing proxy issues in corporate environments where cluster
/// traffic should bypass the corporate proxy.
fn ensure_no_proxy_bypass(host: &str) {
    if !is_internal_host(host) {
        return;
    }

    // NO_PROXY takes precedence over the lowercase variant
    let no_proxy = std::env::var("NO_PROXY").unwrap_or_default();
    let no_proxy_lower = std::env::var("no_proxy").unwrap_or_default();
    let current_no_proxy = if !no_proxy.is_empty() {
        no_proxy
    } else {
        no_proxy_lower
    };

    if no_proxy_contains(&current_no_proxy, host) {
        return;
    }

    let updated_no_proxy = if current_no_proxy.is_empty() {
        host.to_string()
    } else {
        format!("{},{}", current_no_proxy, host)
    };

    // SAFETY: called while building clients, before any worker threads that
    // read proxy settings exist. Both variants are set for compatibility.
    unsafe {
        std::env::set_var("NO_PROXY", &updated_no_proxy);
        std::env::set_var("no_proxy", &updated_no_proxy);
    }
}

/// Check if a host looks like an internal/private domain
///
/// Detects private IP ranges, localhost, and common internal TLDs used by
/// on-premise Kubernetes clusters.
fn is_internal_host(host: &str) -> bool {
    if host.starts_with("10.")
        || host.starts_with("172.")
        || host.starts_with("192.168.")
        || host == "localhost"
        || host == "127.0.0.1"
        || host == "::1"
    {
        return true;
    }

    host.ends_with(".local")
        || host.ends_with(".internal")
        || host.ends_with(".cluster.local")
        || host.ends_with(".svc.cluster.local")
}

/// Check if NO_PROXY already contains the host (handles wildcard patterns)
fn no_proxy_contains(no_proxy: &str, host: &str) -> bool {
    if no_proxy.is_empty() {
        return false;
    }

    no_proxy
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .any(|pattern| {
            if pattern == host {
                return true;
            }
            // Wildcard pattern like .example.com matches the domain and subdomains
            if let Some(suffix) = pattern.strip_prefix('.') {
                if host == suffix || host.ends_with(&format!(".{}", suffix)) {
                    return true;
                }
            }
            host.ends_with(&format!(".{}", pattern))
        })
}
