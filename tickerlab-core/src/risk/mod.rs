//! Risk Engine: stop/target levels, position sizing, and averaging down.
//!
//! All functions are pure. Degenerate arithmetic (zero risk per share,
//! entry == stop) is reported as `None` or [`PositionSize::Undefined`],
//! never as an infinite or NaN number.

pub mod dca;
pub mod levels;
pub mod sizing;

pub use dca::{plan_dca, DcaLevel, DcaPlan, Holding, PositionAverager};
pub use levels::{levels_from_bars, risk_reward_ratio, trade_levels, TradeLevels};
pub use sizing::{position_size, PositionSize, UndefinedReason};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// Volatility unit that stop and target distances are multiples of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityBasis {
    /// Wilder ATR over `atr_period`.
    Atr,
    /// Log-return stddev of the last `volatility_window` closes, times the last close.
    LogReturn,
}

#[derive(Debug, Error, PartialEq)]
pub enum RiskError {
    #[error("insufficient data: need at least {needed} bars, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid risk parameter: {0}")]
    InvalidParameter(String),
}

/// Risk parameters.
///
/// Stops sit `stop_multiplier` volatility units from entry (1x by default);
/// each target sits `target_multipliers[i]` units away on the other side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub atr_period: usize,
    pub stop_multiplier: f64,
    pub target_multipliers: Vec<f64>,
    /// Fraction of the account risked per trade (0.02 = 2%).
    pub risk_fraction: f64,
    pub basis: VolatilityBasis,
    pub volatility_window: usize,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            atr_period: 14,
            stop_multiplier: 1.0,
            target_multipliers: vec![2.0, 3.0, 4.0],
            risk_fraction: 0.02,
            basis: VolatilityBasis::Atr,
            volatility_window: 20,
        }
    }
}

impl RiskParams {
    pub fn validate(&self) -> Result<(), RiskError> {
        let invalid = |msg: String| Err(RiskError::InvalidParameter(msg));
        if self.atr_period == 0 {
            return invalid("atr_period must be >= 1".into());
        }
        if self.volatility_window < 2 {
            return invalid("volatility_window must be >= 2".into());
        }
        if !(self.stop_multiplier.is_finite() && self.stop_multiplier > 0.0) {
            return invalid(format!("stop_multiplier must be > 0, got {}", self.stop_multiplier));
        }
        if self.target_multipliers.is_empty() {
            return invalid("at least one target multiplier is required".into());
        }
        if let Some(m) = self
            .target_multipliers
            .iter()
            .find(|m| !(m.is_finite() && **m > self.stop_multiplier))
        {
            return invalid(format!(
                "target multiplier {m} must exceed stop multiplier {}",
                self.stop_multiplier
            ));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction < 1.0) {
            return invalid(format!("risk_fraction must be in (0, 1), got {}", self.risk_fraction));
        }
        Ok(())
    }
}
