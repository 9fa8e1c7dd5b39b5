//! mig9s — migration-plan monitoring engine
//!
//! Headless engine behind a migration-management console: tracks the
//! lifecycle of MigPlan resources on a control-plane cluster and collects
//! diagnostic pod logs across the clusters involved in executing a plan.
//! Results flow to the consumer over typed event channels; presentation and
//! state storage live outside this crate.

pub mod alerts;
pub mod config;
pub mod events;
pub mod kube;
pub mod logging;
pub mod logs;
pub mod models;
pub mod poller;
pub mod services;

// Re-export commonly used types for convenience
pub use alerts::{Alert, AlertEmitter, AlertEvent, AlertVariant};
pub use config::{AlertConfig, Config, MigMeta};
pub use events::{PlanEvent, PlanStatusState};
pub use kube::{ClientError, ClientFactory, ClusterClient, KubeClientFactory, ListOptions};
pub use logs::{ClusterRole, LogCollector, MigrationLogTree, PodRole};
pub use models::{MigCluster, MigMigration, MigPlan, PlanValues};
pub use poller::{PollOutcome, PollingSupervisor, Verdict};
pub use services::PlanService;
