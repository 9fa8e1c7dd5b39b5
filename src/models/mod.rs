//! Migration resource model layer
//!
//! Rust types for the migration control-plane resources (MigPlan, MigCluster,
//! MigMigration). These are hand-written serde models covering the fields the
//! engine consumes; unknown fields on the remote resources are ignored on
//! deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Condition type set on a plan once validation has succeeded.
pub const CONDITION_READY: &str = "Ready";
/// Condition type set on a plan once it has been closed by the controller.
pub const CONDITION_CLOSED: &str = "Closed";
/// Condition type set when two plans claim the same namespaces.
pub const CONDITION_PLAN_CONFLICT: &str = "PlanConflict";
/// Condition category used for unrecoverable validation failures.
pub const CATEGORY_CRITICAL: &str = "Critical";

/// Object metadata subset used by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Reference to another namespaced resource (cluster, storage, plan)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ResourceRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}

/// A typed status entry on a migration resource.
///
/// Conditions are the terminal signals consumed by the polling machines:
/// `type` carries lifecycle markers (Ready, Closed, PlanConflict) and
/// `category` carries severity (Critical, Warn, Required).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Declarative description of a migration from a source to a target cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigPlan {
    #[serde(default = "mig_api_version")]
    pub api_version: String,
    #[serde(default = "mig_plan_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MigPlanSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MigStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigPlanSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_mig_cluster_ref: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_mig_cluster_ref: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mig_storage_ref: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    /// Discovered persistent volumes with their selected migration actions.
    /// Kept dynamic: the engine passes these through without interpreting them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persistent_volumes: Vec<Value>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
}

impl MigPlan {
    /// Create an empty plan with the given name, for construction and tests.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// All conditions currently reported on the plan, empty when status is unset.
    pub fn conditions(&self) -> &[StatusCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    pub fn has_condition(&self, condition_type: &str) -> bool {
        self.find_condition(condition_type).is_some()
    }

    pub fn find_condition(&self, condition_type: &str) -> Option<&StatusCondition> {
        self.conditions().iter().find(|c| c.type_ == condition_type)
    }

    pub fn find_condition_by_category(&self, category: &str) -> Option<&StatusCondition> {
        self.conditions().iter().find(|c| c.category == category)
    }
}

impl Default for MigPlan {
    fn default() -> Self {
        Self {
            api_version: mig_api_version(),
            kind: mig_plan_kind(),
            metadata: ObjectMeta::default(),
            spec: MigPlanSpec::default(),
            status: None,
        }
    }
}

/// A cluster registered with the migration control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigCluster {
    #[serde(default = "mig_api_version")]
    pub api_version: String,
    #[serde(default = "mig_cluster_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MigClusterSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MigStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigClusterSpec {
    /// Set on exactly one cluster resource: the one running the control plane.
    #[serde(default)]
    pub is_host_cluster: bool,
}

impl MigCluster {
    pub fn named(name: impl Into<String>, is_host_cluster: bool) -> Self {
        Self {
            api_version: mig_api_version(),
            kind: mig_cluster_kind(),
            metadata: ObjectMeta {
                name: name.into(),
                ..Default::default()
            },
            spec: MigClusterSpec { is_host_cluster },
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// An execution instance of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigMigration {
    #[serde(default = "mig_api_version")]
    pub api_version: String,
    #[serde(default = "mig_migration_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MigMigrationSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MigStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigMigrationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mig_plan_ref: Option<ResourceRef>,
    #[serde(default)]
    pub stage: bool,
    #[serde(default)]
    pub quiesce_pods: bool,
}

/// User-selected plan fields from the console wizard.
///
/// Applied to a freshly fetched plan before every put so that the
/// read-modify-write cycle never clobbers fields the user did not touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanValues {
    pub plan_name: String,
    pub source_cluster: Option<String>,
    pub target_cluster: Option<String>,
    pub selected_storage: Option<String>,
    pub namespaces: Option<Vec<String>>,
    pub persistent_volumes: Option<Vec<Value>>,
    pub plan_closed: Option<bool>,
}

impl PlanValues {
    /// Values that close a plan, clearing its PV selection.
    pub fn closing(plan_name: impl Into<String>) -> Self {
        Self {
            plan_name: plan_name.into(),
            persistent_volumes: Some(Vec::new()),
            plan_closed: Some(true),
            ..Default::default()
        }
    }
}

/// Merge wizard values into a fetched plan, returning the resource to put.
pub fn update_plan_from_values(plan: &MigPlan, values: &PlanValues) -> MigPlan {
    let mut updated = plan.clone();
    if let Some(source) = &values.source_cluster {
        updated.spec.src_mig_cluster_ref = Some(ResourceRef::named(source.clone()));
    }
    if let Some(target) = &values.target_cluster {
        updated.spec.dest_mig_cluster_ref = Some(ResourceRef::named(target.clone()));
    }
    if let Some(storage) = &values.selected_storage {
        updated.spec.mig_storage_ref = Some(ResourceRef::named(storage.clone()));
    }
    if let Some(namespaces) = &values.namespaces {
        updated.spec.namespaces = namespaces.clone();
    }
    if let Some(pvs) = &values.persistent_volumes {
        updated.spec.persistent_volumes = pvs.clone();
    }
    if let Some(closed) = values.plan_closed {
        updated.spec.closed = closed;
    }
    updated
}

fn mig_api_version() -> String {
    "migration.openshift.io/v1alpha1".to_string()
}

fn mig_plan_kind() -> String {
    "MigPlan".to_string()
}

fn mig_cluster_kind() -> String {
    "MigCluster".to_string()
}

fn mig_migration_kind() -> String {
    "MigMigration".to_string()
}
