//! Cross-cluster log collection and export
//!
//! One-shot aggregation of controller/velero/restic pod logs across the
//! clusters involved in a plan, plus downloadable-file export of the result.

mod collector;
mod export;
mod tree;

pub use collector::{
    LogCollector, CONTROLLER_POD_LABEL, RESTIC_POD_LABEL, VELERO_POD_LABEL,
};
pub use export::{export_all, export_log, export_resource, log_file_name, resource_file_name};
pub use tree::{ClusterLogs, ClusterRole, LogEntry, MigrationLogTree, PodRole};
