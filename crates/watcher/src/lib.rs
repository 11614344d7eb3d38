pub mod alerts;
pub mod ingest;
pub mod refresh;

pub use refresh::{Refresher, RefreshGroup, RefreshSummary};

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{AlertEvent, Result, TriggerState};
use store::Store;
use triggers::GateConfig;

/// Periodic watcher: on each tick, refreshes all sources, re-evaluates the
/// trigger state and compares it with the persisted marker. An alert is
/// emitted only on a state transition; an unchanged state is a logged no-op.
pub struct Watcher {
    refresher: Refresher,
    store: Store,
    gates: GateConfig,
    interval: Duration,
    alert_tx: mpsc::Sender<AlertEvent>,
}

impl Watcher {
    pub fn new(
        refresher: Refresher,
        store: Store,
        gates: GateConfig,
        interval: Duration,
        alert_tx: mpsc::Sender<AlertEvent>,
    ) -> Self {
        Self {
            refresher,
            store,
            gates,
            interval,
            alert_tx,
        }
    }

    /// Run the watcher loop. The first tick fires immediately; afterwards
    /// the cadence is fixed. Call from `tokio::spawn`.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "watcher started");
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self.refresher.refresh_all().await {
                // Refresh-level errors (e.g. a dead database) abort the tick;
                // per-series provider failures are already absorbed upstream.
                warn!(error = %e, "refresh failed, skipping this check");
                let _ = self
                    .alert_tx
                    .send(AlertEvent::CheckFailed { error: e.to_string() })
                    .await;
                continue;
            }

            match self.check().await {
                Ok(Some(event)) => {
                    if self.alert_tx.send(event).await.is_err() {
                        warn!("alert channel closed, watcher exiting");
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "state check failed");
                    let _ = self
                        .alert_tx
                        .send(AlertEvent::CheckFailed { error: e.to_string() })
                        .await;
                }
            }
        }
    }

    /// Evaluate the current state and compare against the saved marker.
    ///
    /// First ever check saves the state silently. Unchanged state leaves the
    /// marker alone and returns `None`. A transition saves the new state and
    /// returns exactly one alert event.
    pub async fn check(&self) -> Result<Option<AlertEvent>> {
        let report = triggers::evaluate(&self.store, &self.gates).await?;
        let current = report.overall;
        let last: Option<TriggerState> = self.store.last_overall_state().await?;

        match last {
            None => {
                self.store.save_overall_state(current).await?;
                info!(state = %current, "initial state saved");
                Ok(None)
            }
            Some(prev) if prev == current => {
                info!(state = %current, "state unchanged");
                Ok(None)
            }
            Some(prev) => {
                self.store.save_overall_state(current).await?;
                info!(from = %prev, to = %current, "state transition detected");
                Ok(Some(AlertEvent::StateTransition {
                    from: prev,
                    to: current,
                    report,
                }))
            }
        }
    }
}
