use common::{SizingDecision, TriggerState};

/// Annualized Sharpe ratio. Returns 0 when volatility is 0.
pub fn compute_sharpe(exp_return: f64, vol: f64, rf: f64) -> f64 {
    if vol == 0.0 {
        return 0.0;
    }
    (exp_return - rf) / vol
}

/// Smooth position size from a Sharpe estimate via a sigmoid, clamped to
/// [0, 1]. Negative Sharpe maps below 0.5, positive above; `k` controls
/// steepness.
pub fn sigmoid_position_size(sharpe: f64, k: f64) -> f64 {
    let raw = 1.0 / (1.0 + (-k * sharpe).exp());
    raw.clamp(0.0, 1.0)
}

/// Hedge ratio for the overall state: unhedged in GREEN, half-hedged otherwise.
pub fn hedge_pct(state: TriggerState) -> f64 {
    match state {
        TriggerState::Green => 0.0,
        TriggerState::Yellow | TriggerState::Red => 0.5,
    }
}

/// Full sizing decision. Deterministic given identical inputs; no hidden state.
pub fn compute_allocation(
    exp_return: f64,
    vol: f64,
    rf: f64,
    k: f64,
    state: TriggerState,
) -> SizingDecision {
    let sharpe = compute_sharpe(exp_return, vol, rf);
    SizingDecision {
        sharpe,
        position_size: sigmoid_position_size(sharpe, k),
        hedge_pct: hedge_pct(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharpe_basic() {
        let s = compute_sharpe(0.15, 0.20, 0.045);
        assert!((s - (0.15 - 0.045) / 0.20).abs() < 1e-9);
    }

    #[test]
    fn sharpe_zero_volatility_is_zero() {
        assert_eq!(compute_sharpe(0.10, 0.0, 0.045), 0.0);
    }

    #[test]
    fn sharpe_negative_excess_return() {
        assert!(compute_sharpe(0.02, 0.15, 0.045) < 0.0);
    }

    #[test]
    fn sigmoid_midpoint_at_zero_sharpe() {
        assert!((sigmoid_position_size(0.0, 2.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sigmoid_orders_by_sharpe() {
        let low = sigmoid_position_size(-1.0, 2.0);
        let mid = sigmoid_position_size(1.0, 2.0);
        let high = sigmoid_position_size(2.0, 2.0);
        assert!(low < 0.5);
        assert!(mid > 0.5 && mid < high);
        assert!(high < 1.0);
    }

    #[test]
    fn sigmoid_stays_bounded_at_extremes() {
        assert!(sigmoid_position_size(100.0, 2.0) <= 1.0);
        assert!(sigmoid_position_size(-100.0, 2.0) >= 0.0);
    }

    #[test]
    fn hedge_only_lifts_in_green() {
        assert_eq!(hedge_pct(TriggerState::Green), 0.0);
        assert_eq!(hedge_pct(TriggerState::Yellow), 0.5);
        assert_eq!(hedge_pct(TriggerState::Red), 0.5);
    }
}
