//! Events published to downstream consumers
//!
//! The engine never touches a store or UI directly: every observable result
//! is delivered as a [`PlanEvent`] on an unbounded channel, leaving the
//! reducer/presentation wiring to the consumer.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::logs::MigrationLogTree;
use crate::models::MigPlan;

/// Lifecycle status of the plan currently tracked by the status machine.
///
/// Transitions are monotonic: a plan stays `Pending` until one of the
/// terminal states (`Ready`, `Critical`, `TimedOut`) is reached, after which
/// the machine stops publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatusState {
    Pending,
    Ready,
    Critical { message: String },
    TimedOut,
}

impl PlanStatusState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlanStatusState::Pending)
    }
}

/// Result and progress events emitted by the polling machines, the plan
/// write path, and the log collector.
#[derive(Debug, Clone)]
pub enum PlanEvent {
    /// Status machine transition, including the per-tick `Pending` beat.
    PlanStatusChanged(PlanStatusState),
    /// Latest fetched plan, published on every status tick so observers see
    /// live progress regardless of the terminal outcome.
    CurrentPlanUpdated(Box<MigPlan>),
    /// A plan update was persisted.
    PlanListUpdated(Box<MigPlan>),
    PlanClosed {
        plan_name: String,
    },
    PlanCloseFailed {
        plan_name: String,
        message: String,
    },
    /// A plan was closed and deleted.
    PlanRemoved {
        plan_name: String,
    },
    /// PV discovery exhausted its tick budget without a verdict.
    PvDiscoveryTimedOut,
    PvResourcesFetched(Vec<Value>),
    PvResourcesFetchFailed(String),
    /// A completed log collection run; the tree is only ever published whole.
    LogsCollected(Box<MigrationLogTree>),
    LogsCollectionFailed(String),
}

pub type EventSender = mpsc::UnboundedSender<PlanEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PlanEvent>;

/// Create the event channel connecting the engine to its consumer.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
