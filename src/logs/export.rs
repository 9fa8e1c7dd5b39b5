//! Downloadable artifacts for a collected log tree
//!
//! Deterministic file names derived from resource and pod identity: one
//! plain-text `{role}-{podName}.log` per log entry, one pretty-printed
//! `{resourceName}.json` per plan/migration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::tree::{ClusterRole, MigrationLogTree, PodRole};

/// File name for one pod's log within a cluster role.
pub fn log_file_name(role: ClusterRole, pod_name: &str) -> String {
    format!("{}-{}.log", role, pod_name)
}

/// File name for a resource's JSON document.
pub fn resource_file_name(resource_name: &str) -> String {
    format!("{}.json", resource_name)
}

/// Write one log entry to `{role}-{podName}.log` under `dir`.
pub fn export_log(
    tree: &MigrationLogTree,
    cluster: ClusterRole,
    pod: PodRole,
    index: usize,
    dir: &Path,
) -> Result<PathBuf> {
    let entry = tree
        .entries(cluster, pod)
        .get(index)
        .with_context(|| format!("no {} log at index {} for the {} cluster", pod, index, cluster))?;
    let path = dir.join(log_file_name(cluster, &entry.pod_name));
    fs::write(&path, &entry.log)
        .with_context(|| format!("failed to write log file: {}", path.display()))?;
    Ok(path)
}

/// Write a resource to `{name}.json` under `dir`, pretty-printed.
pub fn export_resource<T: Serialize>(dir: &Path, name: &str, resource: &T) -> Result<PathBuf> {
    let path = dir.join(resource_file_name(name));
    let json = serde_json::to_string_pretty(resource)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write resource file: {}", path.display()))?;
    Ok(path)
}

/// Export the whole tree: the plan, every migration, and every log entry.
///
/// Returns the written paths in a deterministic order (resources first, then
/// logs by cluster role, pod role, entry order).
pub fn export_all(tree: &MigrationLogTree, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory: {}", dir.display()))?;

    let mut written = vec![export_resource(dir, tree.plan.name(), &tree.plan)?];
    for migration in &tree.migrations {
        written.push(export_resource(dir, &migration.metadata.name, migration)?);
    }
    for cluster in ClusterRole::ALL {
        for pod in PodRole::ALL {
            for index in 0..tree.entries(cluster, pod).len() {
                written.push(export_log(tree, cluster, pod, index, dir)?);
            }
        }
    }
    Ok(written)
}
