use tokio::sync::mpsc;
use tracing::{error, info, warn};

use common::{AlertEvent, TriggerReport, TriggerState};

/// Consume watcher events and surface them. Transitions into RED are logged
/// at error level so they stand out in aggregated logs; everything else is
/// informational.
pub async fn run_sink(mut rx: mpsc::Receiver<AlertEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            AlertEvent::StateTransition { from, to, report } => {
                let msg = format_transition(from, to, &report);
                match to {
                    TriggerState::Red => error!(%from, %to, "{msg}"),
                    TriggerState::Yellow => warn!(%from, %to, "{msg}"),
                    TriggerState::Green => info!(%from, %to, "{msg}"),
                }
            }
            AlertEvent::CheckFailed { error } => {
                warn!(%error, "watcher check failed");
            }
        }
    }
    info!("alert sink stopped");
}

/// One-line human-readable alert body.
pub fn format_transition(from: TriggerState, to: TriggerState, report: &TriggerReport) -> String {
    let dims: Vec<String> = report
        .dimensions
        .iter()
        .map(|d| format!("{}={}", d.dimension, d.state))
        .collect();
    format!(
        "macro state {from} -> {to} [{}] position={:.2} hedge={:.0}% | {}",
        dims.join(", "),
        report.sizing.position_size,
        report.sizing.hedge_pct * 100.0,
        report.action_note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CpiCorridor, Dimension, DimensionReading, SizingDecision};

    fn report() -> TriggerReport {
        TriggerReport {
            dimensions: vec![
                DimensionReading {
                    dimension: Dimension::FxGap,
                    state: TriggerState::Red,
                    value: 0.30,
                },
                DimensionReading {
                    dimension: Dimension::Embi,
                    state: TriggerState::Yellow,
                    value: 1500.0,
                },
            ],
            overall: TriggerState::Red,
            sizing: SizingDecision {
                sharpe: 0.42,
                position_size: 0.70,
                hedge_pct: 0.5,
            },
            cpi_corridor: CpiCorridor {
                low: 0.22,
                mid: 0.38,
                high: 0.66,
            },
            action_note: "reduce exposure".to_string(),
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn transition_message_names_states_and_sizing() {
        let msg = format_transition(TriggerState::Green, TriggerState::Red, &report());
        assert!(msg.contains("GREEN -> RED"));
        assert!(msg.contains("fx_gap=RED"));
        assert!(msg.contains("position=0.70"));
        assert!(msg.contains("hedge=50%"));
        assert!(msg.contains("reduce exposure"));
    }
}
