use serde::{Deserialize, Serialize};

use common::{DimensionReading, Error, Result, TriggerState};

/// Classification thresholds for the four gate dimensions plus the sizing
/// inputs. Loadable from TOML; compiled-in defaults match the documented
/// policy bands.
///
/// Boundary semantics: the lower bound of each band belongs to the worse
/// state. A gap of exactly 0.15 is YELLOW, exactly 0.25 is RED; momentum of
/// exactly 0.03 is YELLOW and exactly 0.0 is RED.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// FX gap (decimal): GREEN below, RED at/above the second bound.
    pub fx_gap_green_below: f64,
    pub fx_gap_yellow_below: f64,

    /// 4-week reserves momentum (decimal): GREEN above, RED at/below zero.
    pub reserves_green_above: f64,

    /// 3-month annualized core CPI (decimal).
    pub cpi_green_below: f64,
    pub cpi_yellow_below: f64,

    /// EMBI level (bps) and 30-day trend (bps).
    pub embi_green_level_below: f64,
    pub embi_green_trend_below: f64,
    pub embi_yellow_level_below: f64,
    pub embi_yellow_trend_below: f64,

    /// FX pass-through feeding the CPI corridor (decimal).
    pub cpi_fx_pass: f64,

    // Sizing inputs
    pub exp_return: f64,
    pub vol: f64,
    pub risk_free_rate: f64,
    pub sigmoid_k: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            fx_gap_green_below: 0.15,
            fx_gap_yellow_below: 0.25,
            reserves_green_above: 0.03,
            cpi_green_below: 0.25,
            cpi_yellow_below: 0.35,
            embi_green_level_below: 1400.0,
            embi_green_trend_below: -300.0,
            embi_yellow_level_below: 1600.0,
            embi_yellow_trend_below: -100.0,
            cpi_fx_pass: 0.5,
            exp_return: 0.12,
            vol: 0.18,
            risk_free_rate: 0.045,
            sigmoid_k: 2.0,
        }
    }
}

impl GateConfig {
    /// Load from a TOML file; a missing file yields the defaults so a fresh
    /// checkout runs without any config.
    pub fn load(path: &str) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                toml::from_str(&raw).map_err(|e| Error::Config(format!("bad gates file {path}: {e}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn fx_gap_state(&self, gap: f64) -> TriggerState {
        if gap < self.fx_gap_green_below {
            TriggerState::Green
        } else if gap < self.fx_gap_yellow_below {
            TriggerState::Yellow
        } else {
            TriggerState::Red
        }
    }

    pub fn reserves_state(&self, momentum_4w: f64) -> TriggerState {
        if momentum_4w > self.reserves_green_above {
            TriggerState::Green
        } else if momentum_4w > 0.0 {
            TriggerState::Yellow
        } else {
            TriggerState::Red
        }
    }

    pub fn cpi_state(&self, core_cpi_3m_ann: f64) -> TriggerState {
        if core_cpi_3m_ann < self.cpi_green_below {
            TriggerState::Green
        } else if core_cpi_3m_ann < self.cpi_yellow_below {
            TriggerState::Yellow
        } else {
            TriggerState::Red
        }
    }

    /// EMBI is two-input: a low level OR a strongly improving trend is GREEN;
    /// a moderately elevated level OR mildly improving trend is YELLOW.
    pub fn embi_state(&self, level_bps: f64, trend_30d_bps: f64) -> TriggerState {
        if level_bps < self.embi_green_level_below || trend_30d_bps < self.embi_green_trend_below {
            TriggerState::Green
        } else if level_bps < self.embi_yellow_level_below
            || trend_30d_bps < self.embi_yellow_trend_below
        {
            TriggerState::Yellow
        } else {
            TriggerState::Red
        }
    }
}

/// Aggregate dimension readings into the overall state.
///
/// GREEN only when every dimension is GREEN; RED only when every dimension is
/// RED; anything mixed is YELLOW.
pub fn overall_state(readings: &[DimensionReading]) -> TriggerState {
    if readings.iter().all(|r| r.state == TriggerState::Green) {
        TriggerState::Green
    } else if readings.iter().all(|r| r.state == TriggerState::Red) {
        TriggerState::Red
    } else {
        TriggerState::Yellow
    }
}

/// Human-readable recommendation accompanying a report.
pub fn action_note(
    overall: TriggerState,
    readings: &[DimensionReading],
    macro_weight: f64,
) -> String {
    let red_dims: Vec<String> = readings
        .iter()
        .filter(|r| r.state == TriggerState::Red)
        .map(|r| r.dimension.to_string())
        .collect();

    match overall {
        TriggerState::Green => {
            let base = "GREEN: Favorable conditions across key dimensions. ";
            if macro_weight > 0.7 {
                format!("{base}High conviction position recommended.")
            } else if macro_weight > 0.4 {
                format!("{base}Moderate position size recommended.")
            } else {
                format!("{base}Conservative position size despite favorable conditions.")
            }
        }
        TriggerState::Yellow => {
            if red_dims.is_empty() {
                format!(
                    "YELLOW: Mixed signals. Cautious positioning recommended (weight: {:.1}%).",
                    macro_weight * 100.0
                )
            } else {
                format!(
                    "YELLOW: Monitor closely. Risk areas: {}. Position size: {:.1}%.",
                    red_dims.join(", "),
                    macro_weight * 100.0
                )
            }
        }
        TriggerState::Red => format!(
            "RED: Elevated risks across {} dimension(s). Minimal or no position recommended. Risk areas: {}.",
            red_dims.len(),
            red_dims.join(", ")
        ),
    }
}
