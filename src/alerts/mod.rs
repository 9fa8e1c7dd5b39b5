//! User-facing timed alerts
//!
//! Terminal failures and successes surface to the user as auto-dismissing
//! alerts: the emitter raises an alert, waits out its lifetime, then clears
//! it. The consumer only has to render whatever the channel says.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::config::AlertConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertVariant {
    Progress,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub variant: AlertVariant,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum AlertEvent {
    Raised(Alert),
    Cleared,
}

pub type AlertSender = mpsc::UnboundedSender<AlertEvent>;
pub type AlertReceiver = mpsc::UnboundedReceiver<AlertEvent>;

pub fn channel() -> (AlertSender, AlertReceiver) {
    mpsc::unbounded_channel()
}

/// Emitter for auto-dismissing alerts.
///
/// Each `*_timeout` call spawns a small task that raises the alert and clears
/// it after its lifetime; overlapping alerts each run their own timer.
#[derive(Clone)]
pub struct AlertEmitter {
    tx: AlertSender,
    timeout: Duration,
    error_timeout: Duration,
}

impl AlertEmitter {
    pub fn new(tx: AlertSender) -> Self {
        Self::with_config(tx, &AlertConfig::default())
    }

    pub fn with_config(tx: AlertSender, config: &AlertConfig) -> Self {
        Self {
            tx,
            timeout: Duration::from_millis(config.timeout_ms),
            error_timeout: Duration::from_millis(config.error_timeout_ms),
        }
    }

    pub fn progress_timeout(&self, message: impl Into<String>) {
        self.raise_timed(AlertVariant::Progress, message.into(), self.timeout);
    }

    pub fn success_timeout(&self, message: impl Into<String>) {
        self.raise_timed(AlertVariant::Success, message.into(), self.timeout);
    }

    pub fn error_timeout(&self, message: impl Into<String>) {
        self.raise_timed(AlertVariant::Error, message.into(), self.error_timeout);
    }

    fn raise_timed(&self, variant: AlertVariant, message: String, lifetime: Duration) {
        let tx = self.tx.clone();
        let alert = Alert {
            variant,
            message,
            raised_at: Utc::now(),
        };
        tokio::spawn(async move {
            if tx.send(AlertEvent::Raised(alert)).is_err() {
                return;
            }
            tokio::time::sleep(lifetime).await;
            let _ = tx.send(AlertEvent::Cleared);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_alert_raises_then_clears() {
        let (tx, mut rx) = channel();
        let emitter = AlertEmitter::new(tx);

        emitter.error_timeout("Failed to update plan");

        match rx.recv().await.unwrap() {
            AlertEvent::Raised(alert) => {
                assert_eq!(alert.variant, AlertVariant::Error);
                assert_eq!(alert.message, "Failed to update plan");
            }
            other => panic!("expected Raised, got {:?}", other),
        }
        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Cleared));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_lifetime_is_configurable() {
        let (tx, mut rx) = channel();
        let config = AlertConfig {
            timeout_ms: 5000,
            error_timeout_ms: 10_000,
        };
        let emitter = AlertEmitter::with_config(tx, &config);

        emitter.error_timeout("boom");
        let raised_at = tokio::time::Instant::now();
        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Raised(_)));
        assert!(matches!(rx.recv().await.unwrap(), AlertEvent::Cleared));
        assert_eq!(raised_at.elapsed(), Duration::from_millis(10_000));
    }
}
