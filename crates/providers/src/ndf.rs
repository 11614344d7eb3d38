//! Synthetic NDF curve construction for USD/ARS.
//!
//! Public NDF quotes for ARS are not freely available, so the curve is built
//! from stored inputs: covered interest parity when both legs' rates are
//! known, otherwise spot plus a tenor base spread scaled by the current
//! credit-stress level (CDS/EMBI). Day count is ACT/365 throughout.

/// One point of the synthetic curve.
#[derive(Debug, Clone, Copy)]
pub struct Tenor {
    pub series_id: &'static str,
    pub label: &'static str,
    pub days: u32,
    /// Fallback forward premium when no rate differential is available.
    pub base_spread_bps: f64,
}

pub const TENORS: &[Tenor] = &[
    Tenor { series_id: "NDF_1M", label: "1M", days: 30, base_spread_bps: 50.0 },
    Tenor { series_id: "NDF_3M", label: "3M", days: 90, base_spread_bps: 150.0 },
    Tenor { series_id: "NDF_6M", label: "6M", days: 180, base_spread_bps: 300.0 },
    Tenor { series_id: "NDF_12M", label: "12M", days: 365, base_spread_bps: 600.0 },
];

const DAY_COUNT_BASIS: f64 = 365.0;

/// Stress multipliers applied to base spreads, most stressed first:
/// (cds threshold bps, embi threshold bps, multiplier).
const STATE_MULTIPLIERS: &[(f64, f64, f64)] = &[
    (1200.0, 1800.0, 1.5),
    (1000.0, 1600.0, 1.25),
];

/// Spread multiplier from current CDS/EMBI levels. Either input alone can
/// trigger a bucket; missing data means base spreads.
pub fn state_multiplier(cds_bps: Option<f64>, embi_bps: Option<f64>) -> f64 {
    for &(cds_th, embi_th, mult) in STATE_MULTIPLIERS {
        let cds_hit = cds_bps.is_some_and(|v| v >= cds_th);
        let embi_hit = embi_bps.is_some_and(|v| v >= embi_th);
        if cds_hit || embi_hit {
            return mult;
        }
    }
    1.0
}

/// Synthetic forward for one tenor.
///
/// With both rates: `F = S * (1 + (r_ars - r_usd) * t)`, rates annualized
/// decimals, `t = days/365`. Without rates: `F = S * (1 + spread * t)` where
/// spread is the stress-scaled tenor base spread.
pub fn synthetic_forward(
    spot: f64,
    ars_rate: Option<f64>,
    usd_rate: Option<f64>,
    tenor: &Tenor,
    stress_multiplier: f64,
) -> f64 {
    let t = tenor.days as f64 / DAY_COUNT_BASIS;

    if let (Some(ars), Some(usd)) = (ars_rate, usd_rate) {
        return spot * (1.0 + (ars - usd) * t);
    }

    let spread = tenor.base_spread_bps * stress_multiplier / 10_000.0;
    spot * (1.0 + spread * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenor(id: &str) -> &'static Tenor {
        TENORS.iter().find(|t| t.series_id == id).unwrap()
    }

    #[test]
    fn parity_forward_uses_rate_differential() {
        // 40% ARS vs 5% USD over 1 year: F = S * 1.35
        let f = synthetic_forward(1000.0, Some(0.40), Some(0.05), tenor("NDF_12M"), 1.0);
        assert!((f - 1350.0).abs() < 1e-9);
    }

    #[test]
    fn fallback_forward_applies_scaled_spread() {
        // 3M base spread 150bps, 1.5x stress: 225bps * 90/365
        let f = synthetic_forward(1000.0, None, None, tenor("NDF_3M"), 1.5);
        let expected = 1000.0 * (1.0 + 0.0225 * (90.0 / 365.0));
        assert!((f - expected).abs() < 1e-9);
    }

    #[test]
    fn stress_buckets_ordered_most_stressed_first() {
        assert_eq!(state_multiplier(None, None), 1.0);
        assert_eq!(state_multiplier(Some(700.0), Some(1200.0)), 1.0);
        assert_eq!(state_multiplier(Some(1050.0), None), 1.25);
        assert_eq!(state_multiplier(None, Some(1900.0)), 1.5);
        // CDS alone above the top bucket wins even with calm EMBI
        assert_eq!(state_multiplier(Some(1300.0), Some(900.0)), 1.5);
    }

    #[test]
    fn longer_tenors_carry_wider_base_spreads() {
        let spreads: Vec<f64> = TENORS.iter().map(|t| t.base_spread_bps).collect();
        assert!(spreads.windows(2).all(|w| w[0] < w[1]));
    }
}
