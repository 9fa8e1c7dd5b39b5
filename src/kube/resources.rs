//! Resource descriptors for the migration control plane
//!
//! Describes the resources the engine reads and writes: the Mig* custom
//! resources on the control-plane cluster, plus the core Pod and
//! PersistentVolume resources on any involved cluster. Descriptors carry the
//! group/version/kind/plural needed to build a dynamic API handle, so the
//! client layer stays version-agnostic.

use kube::core::{ApiResource, GroupVersionKind};

/// API group of the migration custom resources
pub const MIG_GROUP: &str = "migration.openshift.io";
/// API version of the migration custom resources
pub const MIG_VERSION: &str = "v1alpha1";

/// Migration custom resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigResourceKind {
    MigPlan,
    MigMigration,
    MigCluster,
}

impl MigResourceKind {
    pub fn kind(&self) -> &'static str {
        match self {
            MigResourceKind::MigPlan => "MigPlan",
            MigResourceKind::MigMigration => "MigMigration",
            MigResourceKind::MigCluster => "MigCluster",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            MigResourceKind::MigPlan => "migplans",
            MigResourceKind::MigMigration => "migmigrations",
            MigResourceKind::MigCluster => "migclusters",
        }
    }
}

/// A resource the engine can address through a [`super::ClusterClient`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceDescriptor {
    /// Namespaced migration custom resource on the control-plane cluster
    Mig {
        kind: MigResourceKind,
        namespace: String,
    },
    /// Namespaced core Pod resource
    Pod { namespace: String },
    /// Cluster-scoped core PersistentVolume resource
    PersistentVolume,
}

impl ResourceDescriptor {
    pub fn mig(kind: MigResourceKind, namespace: impl Into<String>) -> Self {
        Self::Mig {
            kind,
            namespace: namespace.into(),
        }
    }

    pub fn pod(namespace: impl Into<String>) -> Self {
        Self::Pod {
            namespace: namespace.into(),
        }
    }

    pub fn persistent_volume() -> Self {
        Self::PersistentVolume
    }

    /// Namespace to scope API calls to, `None` for cluster-scoped resources.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ResourceDescriptor::Mig { namespace, .. } => Some(namespace),
            ResourceDescriptor::Pod { namespace } => Some(namespace),
            ResourceDescriptor::PersistentVolume => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceDescriptor::Mig { kind, .. } => kind.kind(),
            ResourceDescriptor::Pod { .. } => "Pod",
            ResourceDescriptor::PersistentVolume => "PersistentVolume",
        }
    }

    /// Dynamic API metadata for this resource.
    ///
    /// Plurals are spelled out explicitly rather than guessed from the kind.
    pub fn api_resource(&self) -> ApiResource {
        match self {
            ResourceDescriptor::Mig { kind, .. } => ApiResource::from_gvk_with_plural(
                &GroupVersionKind::gvk(MIG_GROUP, MIG_VERSION, kind.kind()),
                kind.plural(),
            ),
            ResourceDescriptor::Pod { .. } => {
                ApiResource::from_gvk_with_plural(&GroupVersionKind::gvk("", "v1", "Pod"), "pods")
            }
            ResourceDescriptor::PersistentVolume => ApiResource::from_gvk_with_plural(
                &GroupVersionKind::gvk("", "v1", "PersistentVolume"),
                "persistentvolumes",
            ),
        }
    }
}
