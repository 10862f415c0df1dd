//! Position sizing from a fixed account risk.
//!
//! # Formula
//! ```text
//! risk_amount    = account * risk_fraction
//! risk_per_share = |entry - stop|
//! shares         = risk_amount / risk_per_share
//! ```
//!
//! # Example
//! - Account: $100,000, risk 2% ($2,000)
//! - Entry $50, stop $46 → $4 per share
//! - Shares: $2,000 / $4 = 500

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Entry equals stop.
    ZeroRiskPerShare,
    /// Account or risk fraction is not positive.
    NoRiskBudget,
    /// An input was NaN or infinite.
    NonFiniteInput,
    /// Finite inputs whose risk budget or share count overflowed.
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionSize {
    Sized {
        shares: f64,
        risk_amount: f64,
        risk_per_share: f64,
    },
    Undefined {
        reason: UndefinedReason,
    },
}

impl PositionSize {
    /// Share count rounded down to whole shares; 0 when undefined.
    pub fn whole_shares(&self) -> u64 {
        match *self {
            PositionSize::Sized { shares, .. } => shares.floor() as u64,
            PositionSize::Undefined { .. } => 0,
        }
    }
}

pub fn position_size(account: f64, risk_fraction: f64, entry: f64, stop: f64) -> PositionSize {
    if ![account, risk_fraction, entry, stop].iter().all(|v| v.is_finite()) {
        return PositionSize::Undefined {
            reason: UndefinedReason::NonFiniteInput,
        };
    }
    if account <= 0.0 || risk_fraction <= 0.0 {
        return PositionSize::Undefined {
            reason: UndefinedReason::NoRiskBudget,
        };
    }
    let risk_per_share = (entry - stop).abs();
    if risk_per_share == 0.0 {
        return PositionSize::Undefined {
            reason: UndefinedReason::ZeroRiskPerShare,
        };
    }

    let risk_amount = account * risk_fraction;
    let shares = risk_amount / risk_per_share;
    if !risk_amount.is_finite() || !shares.is_finite() {
        return PositionSize::Undefined {
            reason: UndefinedReason::Overflow,
        };
    }
    PositionSize::Sized {
        shares,
        risk_amount,
        risk_per_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_from_risk_budget() {
        let size = position_size(100_000.0, 0.02, 50.0, 46.0);
        assert_eq!(
            size,
            PositionSize::Sized {
                shares: 500.0,
                risk_amount: 2_000.0,
                risk_per_share: 4.0,
            }
        );
        assert_eq!(size.whole_shares(), 500);
    }

    #[test]
    fn short_side_uses_absolute_distance() {
        let size = position_size(10_000.0, 0.01, 20.0, 23.0);
        assert_eq!(size.whole_shares(), 33);
    }

    #[test]
    fn zero_risk_per_share_is_undefined() {
        assert_eq!(
            position_size(10_000.0, 0.02, 50.0, 50.0),
            PositionSize::Undefined {
                reason: UndefinedReason::ZeroRiskPerShare
            }
        );
        assert_eq!(position_size(10_000.0, 0.02, 50.0, 50.0).whole_shares(), 0);
    }

    #[test]
    fn bad_inputs_are_undefined() {
        assert!(matches!(
            position_size(0.0, 0.02, 50.0, 45.0),
            PositionSize::Undefined { reason: UndefinedReason::NoRiskBudget }
        ));
        assert!(matches!(
            position_size(1_000.0, 0.02, f64::NAN, 45.0),
            PositionSize::Undefined { reason: UndefinedReason::NonFiniteInput }
        ));
    }

    #[test]
    fn overflowing_share_count_is_undefined() {
        let size = position_size(1e308, 0.5, 1.0, 1.0 - 1e-15);
        assert_eq!(
            size,
            PositionSize::Undefined {
                reason: UndefinedReason::Overflow
            }
        );
        assert_eq!(size.whole_shares(), 0);
        assert!(matches!(
            position_size(f64::MAX, 2.0, 50.0, 45.0),
            PositionSize::Undefined { reason: UndefinedReason::Overflow }
        ));
    }
}
