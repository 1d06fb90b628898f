//! Periodic network status polling.
//!
//! A `StatusSubscription` owns a background task that queries a
//! `StatusSource` on a fixed interval and publishes the latest
//! `ValidatorState`. Dropping the subscription (or calling `cancel`) stops
//! the timer.

use crate::service::StatusSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Health of the cluster as last observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ValidatorState {
    /// No answer yet
    Checking,
    Running { slot: u64 },
    Stopped { error: String },
}

impl ValidatorState {
    pub fn is_running(&self) -> bool {
        matches!(self, ValidatorState::Running { .. })
    }
}

/// Shortest accepted polling period; shorter ones are raised to this
pub const MIN_POLL_PERIOD: Duration = Duration::from_millis(100);

pub struct StatusSubscription {
    state: watch::Receiver<ValidatorState>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StatusSubscription {
    /// Start polling immediately, then every `period`
    pub fn spawn<S>(source: Arc<S>, period: Duration) -> Self
    where
        S: StatusSource + ?Sized + 'static,
    {
        let (state_tx, state_rx) = watch::channel(ValidatorState::Checking);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        if period < MIN_POLL_PERIOD {
            warn!(requested = ?period, "Polling period too short, using {:?}", MIN_POLL_PERIOD);
        }
        let period = period.max(MIN_POLL_PERIOD);
        info!(period = ?period, "Status polling started");

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = ticker.tick() => {}
                }

                let state = match source.network_status().await {
                    Ok(status) => ValidatorState::Running {
                        slot: status.current_slot,
                    },
                    Err(err) => {
                        warn!("Status poll failed: {}", err);
                        ValidatorState::Stopped {
                            error: err.to_string(),
                        }
                    }
                };

                if state_tx.send(state).is_err() {
                    // every receiver is gone
                    break;
                }
            }

            debug!("Status polling stopped");
        });

        Self {
            state: state_rx,
            cancel: Some(cancel_tx),
            task: Some(task),
        }
    }

    /// Latest published state
    pub fn current(&self) -> ValidatorState {
        self.state.borrow().clone()
    }

    /// Wait for the next published state. Returns `None` once polling has
    /// stopped.
    pub async fn changed(&mut self) -> Option<ValidatorState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Stop the timer; the last state stays readable
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }

    /// Cancel and wait for the polling task to finish
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("Status polling task ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
