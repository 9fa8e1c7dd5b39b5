//! The collected log tree
//!
//! Fixed-shape result of one log collection run: three cluster roles, each
//! with a slot per pod role. The shape is carried by the types themselves —
//! a role that yielded no pods is an empty sequence, never an absent key, so
//! consumers can index by enum value unconditionally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{MigMigration, MigPlan};

/// Role a cluster plays in a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterRole {
    Source,
    Target,
    Host,
}

impl ClusterRole {
    pub const ALL: [ClusterRole; 3] = [ClusterRole::Source, ClusterRole::Target, ClusterRole::Host];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterRole::Source => "source",
            ClusterRole::Target => "target",
            ClusterRole::Host => "host",
        }
    }
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of pod a log entry was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodRole {
    Velero,
    Restic,
    Controller,
}

impl PodRole {
    pub const ALL: [PodRole; 3] = [PodRole::Velero, PodRole::Restic, PodRole::Controller];

    pub fn as_str(&self) -> &'static str {
        match self {
            PodRole::Velero => "velero",
            PodRole::Restic => "restic",
            PodRole::Controller => "controller",
        }
    }
}

impl fmt::Display for PodRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pod's log text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub pod_name: String,
    pub log: String,
}

/// Logs collected from one cluster, slotted by pod role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLogs {
    pub cluster_name: String,
    #[serde(default)]
    pub velero: Vec<LogEntry>,
    #[serde(default)]
    pub restic: Vec<LogEntry>,
    #[serde(default)]
    pub controller: Vec<LogEntry>,
}

impl ClusterLogs {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            ..Default::default()
        }
    }

    pub fn entries(&self, role: PodRole) -> &[LogEntry] {
        match role {
            PodRole::Velero => &self.velero,
            PodRole::Restic => &self.restic,
            PodRole::Controller => &self.controller,
        }
    }

    pub(crate) fn entries_mut(&mut self, role: PodRole) -> &mut Vec<LogEntry> {
        match role {
            PodRole::Velero => &mut self.velero,
            PodRole::Restic => &mut self.restic,
            PodRole::Controller => &mut self.controller,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.velero.is_empty() && self.restic.is_empty() && self.controller.is_empty()
    }
}

/// Result of one log collection run, published whole once every fetch has
/// settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationLogTree {
    pub plan: MigPlan,
    pub migrations: Vec<MigMigration>,
    pub source: ClusterLogs,
    pub target: ClusterLogs,
    pub host: ClusterLogs,
    pub collected_at: DateTime<Utc>,
}

impl MigrationLogTree {
    pub fn new(
        plan: MigPlan,
        migrations: Vec<MigMigration>,
        source_cluster: impl Into<String>,
        target_cluster: impl Into<String>,
        host_cluster: impl Into<String>,
    ) -> Self {
        Self {
            plan,
            migrations,
            source: ClusterLogs::new(source_cluster),
            target: ClusterLogs::new(target_cluster),
            host: ClusterLogs::new(host_cluster),
            collected_at: Utc::now(),
        }
    }

    pub fn cluster(&self, role: ClusterRole) -> &ClusterLogs {
        match role {
            ClusterRole::Source => &self.source,
            ClusterRole::Target => &self.target,
            ClusterRole::Host => &self.host,
        }
    }

    pub(crate) fn cluster_mut(&mut self, role: ClusterRole) -> &mut ClusterLogs {
        match role {
            ClusterRole::Source => &mut self.source,
            ClusterRole::Target => &mut self.target,
            ClusterRole::Host => &mut self.host,
        }
    }

    /// Entries for one (cluster role, pod role) slot.
    pub fn entries(&self, cluster: ClusterRole, pod: PodRole) -> &[LogEntry] {
        self.cluster(cluster).entries(pod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MigPlan;

    #[test]
    fn test_every_slot_present_when_empty() {
        let tree = MigrationLogTree::new(MigPlan::named("p"), Vec::new(), "src", "dst", "host");
        for cluster in ClusterRole::ALL {
            for pod in PodRole::ALL {
                assert!(tree.entries(cluster, pod).is_empty());
            }
        }
        assert_eq!(tree.source.cluster_name, "src");
        assert_eq!(tree.target.cluster_name, "dst");
        assert_eq!(tree.host.cluster_name, "host");
    }

    #[test]
    fn test_entries_land_in_their_slot() {
        let mut tree = MigrationLogTree::new(MigPlan::named("p"), Vec::new(), "src", "dst", "host");
        tree.cluster_mut(ClusterRole::Source)
            .entries_mut(PodRole::Velero)
            .push(LogEntry {
                pod_name: "velero-1".into(),
                log: "backup done".into(),
            });

        assert_eq!(tree.entries(ClusterRole::Source, PodRole::Velero).len(), 1);
        assert!(tree.entries(ClusterRole::Source, PodRole::Restic).is_empty());
        assert!(tree.entries(ClusterRole::Target, PodRole::Velero).is_empty());
        assert!(!tree.source.is_empty());
        assert!(tree.target.is_empty());
    }
}
