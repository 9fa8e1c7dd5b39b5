//! Downloadable artifact export
//!
//! One `.log` file per (cluster role, pod) pair and one `.json` per
//! plan/migration, named deterministically from resource and pod identity.

use mig9s::logs::{
    export_all, export_log, log_file_name, resource_file_name, ClusterRole, LogEntry,
    MigrationLogTree, PodRole,
};
use mig9s::models::{MigMigration, MigPlan};

fn sample_tree() -> MigrationLogTree {
    let plan = MigPlan::named("plan-a");
    let migration: MigMigration =
        serde_json::from_value(serde_json::json!({ "metadata": { "name": "migration-1" } }))
            .unwrap();
    let mut tree = MigrationLogTree::new(
        plan,
        vec![migration],
        "src-cluster",
        "dst-cluster",
        "host-cluster",
    );
    tree.source.velero.push(LogEntry {
        pod_name: "velero-abc".into(),
        log: "source velero log".into(),
    });
    tree.target.restic.push(LogEntry {
        pod_name: "restic-def".into(),
        log: "target restic log".into(),
    });
    tree.host.controller.push(LogEntry {
        pod_name: "controller-0".into(),
        log: "controller log".into(),
    });
    tree
}

#[test]
fn test_file_names_derive_from_identity() {
    assert_eq!(
        log_file_name(ClusterRole::Source, "velero-abc"),
        "source-velero-abc.log"
    );
    assert_eq!(
        log_file_name(ClusterRole::Target, "restic-def"),
        "target-restic-def.log"
    );
    assert_eq!(
        log_file_name(ClusterRole::Host, "controller-0"),
        "host-controller-0.log"
    );
    assert_eq!(resource_file_name("plan-a"), "plan-a.json");
}

#[test]
fn test_export_all_writes_one_file_per_entry_and_resource() {
    let tree = sample_tree();
    let dir = tempfile::tempdir().unwrap();

    let written = export_all(&tree, dir.path()).unwrap();

    // plan + 1 migration + 3 log entries
    assert_eq!(written.len(), 5);
    for expected in [
        "plan-a.json",
        "migration-1.json",
        "source-velero-abc.log",
        "target-restic-def.log",
        "host-controller-0.log",
    ] {
        assert!(
            dir.path().join(expected).exists(),
            "missing export file {}",
            expected
        );
    }

    let log = std::fs::read_to_string(dir.path().join("source-velero-abc.log")).unwrap();
    assert_eq!(log, "source velero log");
}

#[test]
fn test_exported_plan_json_round_trips() {
    let tree = sample_tree();
    let dir = tempfile::tempdir().unwrap();
    export_all(&tree, dir.path()).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("plan-a.json")).unwrap();
    // Pretty-printed, and parses back to the same resource.
    assert!(raw.starts_with("{\n"));
    let parsed: MigPlan = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, tree.plan);
}

#[test]
fn test_export_single_log() {
    let tree = sample_tree();
    let dir = tempfile::tempdir().unwrap();

    let path = export_log(&tree, ClusterRole::Host, PodRole::Controller, 0, dir.path()).unwrap();
    assert!(path.ends_with("host-controller-0.log"));
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "controller log"
    );

    // Out-of-range indexes are an error, not a panic.
    assert!(export_log(&tree, ClusterRole::Source, PodRole::Restic, 0, dir.path()).is_err());
}
