use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observation frequency of a registered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "D"),
            Frequency::Weekly => write!(f, "W"),
            Frequency::Monthly => write!(f, "M"),
        }
    }
}

/// One observation of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub ts: DateTime<Utc>,
    pub value: f64,
}

/// A normalized time series as returned by provider adapters and the store.
///
/// Invariant: points are chronologically ordered with unique timestamps.
/// `Series::new` enforces this; adapters never hand out raw vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Build a series from unordered points. Sorts by timestamp and drops
    /// duplicate timestamps, keeping the last value seen for each.
    pub fn new(id: impl Into<String>, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.ts);
        // Duplicates are adjacent after the sort; rev + dedup keeps the last.
        points.reverse();
        points.dedup_by_key(|p| p.ts);
        points.reverse();
        Self {
            id: id.into(),
            points,
        }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation, if any.
    pub fn latest(&self) -> Option<SeriesPoint> {
        self.points.last().copied()
    }

    /// Most recent observation at or before `ts`.
    pub fn value_at_or_before(&self, ts: DateTime<Utc>) -> Option<SeriesPoint> {
        self.points.iter().rev().find(|p| p.ts <= ts).copied()
    }
}

/// GREEN/YELLOW/RED classification of a risk dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerState {
    Green,
    Yellow,
    Red,
}

impl std::fmt::Display for TriggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerState::Green => write!(f, "GREEN"),
            TriggerState::Yellow => write!(f, "YELLOW"),
            TriggerState::Red => write!(f, "RED"),
        }
    }
}

impl std::str::FromStr for TriggerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GREEN" => Ok(TriggerState::Green),
            "YELLOW" => Ok(TriggerState::Yellow),
            "RED" => Ok(TriggerState::Red),
            other => Err(format!("unknown trigger state '{other}'")),
        }
    }
}

/// The four monitored risk dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    FxGap,
    ReservesMomentum,
    CoreCpi,
    Embi,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::FxGap,
        Dimension::ReservesMomentum,
        Dimension::CoreCpi,
        Dimension::Embi,
    ];
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::FxGap => write!(f, "fx_gap"),
            Dimension::ReservesMomentum => write!(f, "reserves_momentum"),
            Dimension::CoreCpi => write!(f, "core_cpi"),
            Dimension::Embi => write!(f, "embi"),
        }
    }
}

/// Position-sizing output of the Sharpe engine. Deterministic given inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizingDecision {
    pub sharpe: f64,
    /// Smoothed position weight in [0, 1].
    pub position_size: f64,
    /// Hedge ratio: 0.0 in GREEN, 0.5 otherwise.
    pub hedge_pct: f64,
}

/// Forecast band for monthly CPI built from FX pass-through, wage and
/// regulated-price components (decimal growth rates, low <= mid <= high).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CpiCorridor {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Per-dimension classification with the raw value that produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DimensionReading {
    pub dimension: Dimension,
    pub state: TriggerState,
    pub value: f64,
}

/// Full output of one trigger evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerReport {
    pub dimensions: Vec<DimensionReading>,
    pub overall: TriggerState,
    pub sizing: SizingDecision,
    pub cpi_corridor: CpiCorridor,
    pub action_note: String,
    pub evaluated_at: DateTime<Utc>,
}

impl TriggerReport {
    pub fn dimension_state(&self, dim: Dimension) -> Option<TriggerState> {
        self.dimensions
            .iter()
            .find(|r| r.dimension == dim)
            .map(|r| r.state)
    }
}

/// Events emitted by the watcher loop for the alert sink.
#[derive(Debug, Clone)]
pub enum AlertEvent {
    /// Overall state changed between two consecutive checks.
    StateTransition {
        from: TriggerState,
        to: TriggerState,
        report: TriggerReport,
    },
    /// A watcher tick could not complete its evaluation.
    CheckFailed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn series_sorts_points_chronologically() {
        let s = Series::new(
            "X",
            vec![
                SeriesPoint { ts: ts(3), value: 3.0 },
                SeriesPoint { ts: ts(1), value: 1.0 },
                SeriesPoint { ts: ts(2), value: 2.0 },
            ],
        );
        let values: Vec<f64> = s.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn series_deduplicates_timestamps_keeping_last() {
        let s = Series::new(
            "X",
            vec![
                SeriesPoint { ts: ts(1), value: 1.0 },
                SeriesPoint { ts: ts(1), value: 9.0 },
            ],
        );
        assert_eq!(s.len(), 1);
        assert_eq!(s.latest().unwrap().value, 9.0);
    }

    #[test]
    fn value_at_or_before_picks_closest_prior_point() {
        let s = Series::new(
            "X",
            vec![
                SeriesPoint { ts: ts(1), value: 1.0 },
                SeriesPoint { ts: ts(5), value: 5.0 },
                SeriesPoint { ts: ts(9), value: 9.0 },
            ],
        );
        assert_eq!(s.value_at_or_before(ts(6)).unwrap().value, 5.0);
        assert_eq!(s.value_at_or_before(ts(5)).unwrap().value, 5.0);
        assert!(s.value_at_or_before(ts(1) - chrono::Duration::days(1)).is_none());
    }
}
