//! Closed-trade statistics: pure functions over a trade list.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Aggregate statistics over closed trades. All zero when there are none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage of winners (55.0 = 55%).
    pub win_rate: f64,
    pub total_profit: f64,
    pub average_profit: f64,
    /// Largest decline of the cumulative-profit curve, in percent of its peak.
    pub max_drawdown: f64,
    pub profit_factor: f64,
}

impl BacktestStats {
    pub fn compute(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }
        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
        let total_profit: f64 = trades.iter().map(|t| t.profit).sum();

        Self {
            total_trades,
            winning_trades,
            losing_trades: total_trades - winning_trades,
            win_rate: winning_trades as f64 / total_trades as f64 * 100.0,
            total_profit,
            average_profit: total_profit / total_trades as f64,
            max_drawdown: max_drawdown(trades),
            profit_factor: profit_factor(trades),
        }
    }
}

/// Peak-to-trough decline of cumulative profit as a percentage of the peak.
///
/// The peak starts at 0; drawdowns are only measured once it is positive.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        cumulative += trade.profit;
        if cumulative > peak {
            peak = cumulative;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - cumulative) / peak * 100.0);
        }
    }
    max_dd
}

/// Gross profit / gross loss. Equals gross profit when nothing was lost.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.profit > 0.0)
        .map(|t| t.profit)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.profit < 0.0)
        .map(|t| t.profit.abs())
        .sum();

    if gross_loss == 0.0 {
        return gross_profit;
    }
    gross_profit / gross_loss
}
