//! Strategy parameters and entry rules.

use serde::{Deserialize, Serialize};

use crate::backtest::BacktestError;
use crate::indicators::sma_of_series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRule {
    /// Close crosses above its SMA: `close[i] > ma[i] && close[i-1] <= ma[i-1]`.
    MaCrossover,
    /// Close above the highest close of the previous `ma_period` bars.
    Breakout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub entry: EntryRule,
    pub ma_period: usize,
    /// Exit once unrealized profit reaches this percentage.
    pub take_profit_pct: f64,
    /// Exit once unrealized loss reaches this percentage (positive number).
    pub stop_loss_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            entry: EntryRule::MaCrossover,
            ma_period: 20,
            take_profit_pct: 2.0,
            stop_loss_pct: 1.0,
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.ma_period == 0 {
            return Err(BacktestError::InvalidParameter(
                "ma_period must be >= 1".into(),
            ));
        }
        for (name, value) in [
            ("take_profit_pct", self.take_profit_pct),
            ("stop_loss_pct", self.stop_loss_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BacktestError::InvalidParameter(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Precomputed entry condition over a close series.
pub(crate) struct EntrySignal {
    rule: EntryRule,
    period: usize,
    ma: Vec<f64>,
}

impl EntrySignal {
    pub(crate) fn new(params: &StrategyParams, closes: &[f64]) -> Self {
        let ma = match params.entry {
            EntryRule::MaCrossover => sma_of_series(closes, params.ma_period),
            EntryRule::Breakout => Vec::new(),
        };
        Self {
            rule: params.entry,
            period: params.ma_period,
            ma,
        }
    }

    /// Whether the entry fires at bar `i`. Requires `i >= period`.
    pub(crate) fn fires(&self, closes: &[f64], i: usize) -> bool {
        match self.rule {
            EntryRule::MaCrossover => {
                closes[i] > self.ma[i] && closes[i - 1] <= self.ma[i - 1]
            }
            EntryRule::Breakout => {
                let prior_high = closes[i - self.period..i]
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                closes[i] > prior_high
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossover_fires_on_cross_only() {
        let params = StrategyParams {
            ma_period: 2,
            ..StrategyParams::default()
        };
        let closes = [10.0, 10.0, 10.0, 12.0, 13.0];
        let signal = EntrySignal::new(&params, &closes);
        assert!(!signal.fires(&closes, 2));
        assert!(signal.fires(&closes, 3));
        // already above the average
        assert!(!signal.fires(&closes, 4));
    }

    #[test]
    fn breakout_needs_new_high() {
        let params = StrategyParams {
            entry: EntryRule::Breakout,
            ma_period: 3,
            ..StrategyParams::default()
        };
        let closes = [10.0, 12.0, 11.0, 12.0, 12.5];
        let signal = EntrySignal::new(&params, &closes);
        assert!(!signal.fires(&closes, 3));
        assert!(signal.fires(&closes, 4));
    }

    #[test]
    fn validate_rejects_bad_params() {
        let zero = StrategyParams {
            ma_period: 0,
            ..StrategyParams::default()
        };
        assert!(zero.validate().is_err());
        let negative = StrategyParams {
            stop_loss_pct: -1.0,
            ..StrategyParams::default()
        };
        assert!(negative.validate().is_err());
        assert!(StrategyParams::default().validate().is_ok());
    }
}
