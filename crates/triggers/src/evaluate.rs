use chrono::Utc;
use tracing::info;

use common::{Dimension, DimensionReading, Result, TriggerReport};
use store::Store;

use crate::features;
use crate::gates::{self, GateConfig};
use crate::sharpe;

/// Run one full trigger evaluation against stored data.
///
/// Reads the latest values for every dimension, classifies each, aggregates
/// the overall state and attaches the sizing decision. Any missing input
/// surfaces as `Error::InsufficientData` naming the indicator; the caller
/// shows the error rather than a fabricated reading.
pub async fn evaluate(store: &Store, config: &GateConfig) -> Result<TriggerReport> {
    let fx = features::fx_gap(store).await?;
    let reserves = features::reserves_momentum(store).await?;
    let cpi_3m_ann = features::cpi_nowcast_3m_ann(store).await?;
    let cpi_corridor = features::cpi_corridor(config.cpi_fx_pass, None, None);
    let embi = features::embi(store).await?;

    let dimensions = vec![
        DimensionReading {
            dimension: Dimension::FxGap,
            state: config.fx_gap_state(fx.gap),
            value: fx.gap,
        },
        DimensionReading {
            dimension: Dimension::ReservesMomentum,
            state: config.reserves_state(reserves.momentum),
            value: reserves.momentum,
        },
        DimensionReading {
            dimension: Dimension::CoreCpi,
            state: config.cpi_state(cpi_3m_ann),
            value: cpi_3m_ann,
        },
        DimensionReading {
            dimension: Dimension::Embi,
            state: config.embi_state(embi.level_bps, embi.trend_30d_bps),
            value: embi.level_bps,
        },
    ];

    let overall = gates::overall_state(&dimensions);
    let sizing = sharpe::compute_allocation(
        config.exp_return,
        config.vol,
        config.risk_free_rate,
        config.sigmoid_k,
        overall,
    );
    let action_note = gates::action_note(overall, &dimensions, sizing.position_size);

    info!(
        %overall,
        fx_gap = fx.gap,
        reserves_momentum = reserves.momentum,
        cpi_3m_ann,
        cpi_corridor_mid = cpi_corridor.mid,
        embi_level = embi.level_bps,
        embi_trend = embi.trend_30d_bps,
        position_size = sizing.position_size,
        "trigger evaluation complete"
    );

    Ok(TriggerReport {
        dimensions,
        overall,
        sizing,
        cpi_corridor,
        action_note,
        evaluated_at: Utc::now(),
    })
}
