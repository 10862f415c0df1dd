//! Entry, stop-loss and take-profit levels.
//!
//! ```text
//! long:  stop = entry - k * vol,  target_i = entry + m_i * vol
//! short: stop = entry + k * vol,  target_i = entry - m_i * vol
//! rrr    = |target - entry| / |entry - stop|
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{closes, Bar};
use crate::indicators::{price_volatility, Atr, Indicator};
use crate::risk::{Direction, RiskError, RiskParams, VolatilityBasis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profits: Vec<f64>,
    /// First (nearest) target.
    pub take_profit: f64,
    /// Reward/risk of the first target; `None` when entry == stop.
    pub risk_reward_ratio: Option<f64>,
}

/// Stop and targets from an entry price and a volatility unit.
pub fn trade_levels(
    entry: f64,
    volatility: f64,
    direction: Direction,
    params: &RiskParams,
) -> TradeLevels {
    let sign = direction.sign();
    let stop_loss = entry - sign * params.stop_multiplier * volatility;
    let take_profits: Vec<f64> = params
        .target_multipliers
        .iter()
        .map(|m| entry + sign * m * volatility)
        .collect();
    let take_profit = take_profits.first().copied().unwrap_or(entry);

    TradeLevels {
        direction,
        entry,
        stop_loss,
        risk_reward_ratio: risk_reward_ratio(entry, take_profit, stop_loss),
        take_profits,
        take_profit,
    }
}

/// |target - entry| / |entry - stop|. `None` when the risk is zero or any
/// input is non-finite.
pub fn risk_reward_ratio(entry: f64, target: f64, stop: f64) -> Option<f64> {
    let risk = (entry - stop).abs();
    let reward = (target - entry).abs();
    if !risk.is_finite() || !reward.is_finite() || risk == 0.0 {
        return None;
    }
    Some(reward / risk)
}

/// Levels at the last close, using the configured volatility basis.
pub fn levels_from_bars(
    bars: &[Bar],
    direction: Direction,
    params: &RiskParams,
) -> Result<TradeLevels, RiskError> {
    params.validate()?;
    let entry = bars
        .last()
        .map(|b| b.close)
        .ok_or(RiskError::InsufficientData { needed: 2, got: 0 })?;

    let volatility = match params.basis {
        VolatilityBasis::Atr => {
            let atr = Atr::new(params.atr_period);
            atr.latest(bars).ok_or(RiskError::InsufficientData {
                needed: atr.lookback() + 1,
                got: bars.len(),
            })?
        }
        VolatilityBasis::LogReturn => {
            let start = bars.len().saturating_sub(params.volatility_window);
            price_volatility(&closes(&bars[start..]))
                .filter(|v| v.is_finite())
                .ok_or(RiskError::InsufficientData {
                    needed: 2,
                    got: bars.len(),
                })?
        }
    };

    Ok(trade_levels(entry, volatility, direction, params))
}
