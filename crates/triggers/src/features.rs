use chrono::Duration;
use tracing::debug;

use common::{CpiCorridor, Error, Result, SeriesPoint};
use store::Store;

/// Latest FX gap reading with the inputs that produced it.
#[derive(Debug, Clone, Copy)]
pub struct FxGapReading {
    pub official: f64,
    pub parallel: f64,
    /// (parallel - official) / official, decimal.
    pub gap: f64,
}

/// 4-week reserves momentum reading.
#[derive(Debug, Clone, Copy)]
pub struct ReservesMomentumReading {
    pub current: f64,
    pub four_weeks_ago: f64,
    /// (current - past) / past, decimal.
    pub momentum: f64,
}

/// EMBI level and 30-day trend, both in basis points.
#[derive(Debug, Clone, Copy)]
pub struct EmbiReading {
    pub level_bps: f64,
    pub trend_30d_bps: f64,
}

/// FX gap from the latest stored official and parallel rates. The official
/// side falls back from the BCRA series to the Bluelytics official mirror.
pub async fn fx_gap(store: &Store) -> Result<FxGapReading> {
    let parallel = store
        .latest("USDARS_PARALLEL")
        .await?
        .ok_or_else(|| Error::insufficient("fx_gap", "no parallel rate stored"))?;

    let official = match store.latest("USDARS_OFFICIAL").await? {
        Some(p) => p,
        None => store
            .latest("USDARS_OFFICIAL_BLUELYTICS")
            .await?
            .ok_or_else(|| Error::insufficient("fx_gap", "no official rate stored"))?,
    };

    if official.value <= 0.0 {
        return Err(Error::insufficient("fx_gap", "official rate is non-positive"));
    }

    let gap = (parallel.value - official.value) / official.value;
    debug!(official = official.value, parallel = parallel.value, gap, "fx gap computed");
    Ok(FxGapReading {
        official: official.value,
        parallel: parallel.value,
        gap,
    })
}

/// 4-week rate of change of reserves: `(r_t - r_{t-28d}) / r_{t-28d}`, using
/// the closest observation at or before the 28-day mark.
pub async fn reserves_momentum(store: &Store) -> Result<ReservesMomentumReading> {
    let latest = store
        .latest("RESERVES_USD")
        .await?
        .ok_or_else(|| Error::insufficient("reserves_momentum", "no reserves stored"))?;

    let past = store
        .value_at_or_before("RESERVES_USD", latest.ts - Duration::days(28))
        .await?
        .ok_or_else(|| {
            Error::insufficient("reserves_momentum", "no observation 4 weeks back")
        })?;

    if past.value == 0.0 {
        return Err(Error::insufficient("reserves_momentum", "past reserves are zero"));
    }

    Ok(ReservesMomentumReading {
        current: latest.value,
        four_weeks_ago: past.value,
        momentum: (latest.value - past.value) / past.value,
    })
}

/// 3-month annualized core CPI nowcast from the latest two index readings.
pub async fn cpi_nowcast_3m_ann(store: &Store) -> Result<f64> {
    let series = store.load_series("CPI_CORE", 2).await?;
    let points = series.points();
    if points.len() < 2 {
        return Err(Error::insufficient(
            "cpi_nowcast",
            format!("need 2 core CPI readings, have {}", points.len()),
        ));
    }
    nowcast_from_points(points[0], points[1])
}

/// Annualize the growth between two index observations to a 3-month rate:
/// `(1 + monthly)^(3 / months_between) - 1`.
pub fn nowcast_from_points(prev: SeriesPoint, latest: SeriesPoint) -> Result<f64> {
    let days = (latest.ts - prev.ts).num_days();
    let months = days as f64 / 30.0;
    if months <= 0.0 {
        return Err(Error::insufficient("cpi_nowcast", "readings not a month apart"));
    }
    if prev.value <= 0.0 {
        return Err(Error::insufficient("cpi_nowcast", "non-positive index value"));
    }
    let monthly = latest.value / prev.value - 1.0;
    Ok((1.0 + monthly).powf(3.0 / months) - 1.0)
}

/// CPI corridor from FX pass-through plus wage and regulated-price components.
/// Missing components use the stub schedule: wages at half the pass-through,
/// regulated prices at 0.6.
pub fn cpi_corridor(fx_pass: f64, regulated: Option<f64>, wages: Option<f64>) -> CpiCorridor {
    let wages = wages.unwrap_or(fx_pass * 0.5);
    let regulated = regulated.unwrap_or(0.6);

    let low = fx_pass.min(wages).min(regulated) * 0.9;
    let mid = fx_pass * 0.4 + wages * 0.3 + regulated * 0.3;
    let high = fx_pass.max(wages).max(regulated) * 1.1;

    CpiCorridor { low, mid, high }
}

/// Latest EMBI level and its 30-day trend (latest minus the closest
/// observation at or before t-30d).
pub async fn embi(store: &Store) -> Result<EmbiReading> {
    let latest = store
        .latest("EMBI_AR")
        .await?
        .ok_or_else(|| Error::insufficient("embi", "no EMBI level stored"))?;

    let past = store
        .value_at_or_before("EMBI_AR", latest.ts - Duration::days(30))
        .await?
        .ok_or_else(|| Error::insufficient("embi", "no observation 30 days back"))?;

    Ok(EmbiReading {
        level_bps: latest.value,
        trend_30d_bps: latest.value - past.value,
    })
}
