//! Momentum: lookback return as a fraction.
//!
//! momentum[t] = (close[t] - close[t-period]) / close[t-period]
//! Same shape as ROC without the percent scaling; the swing score reads it
//! as a fraction. Zero base → 0. Lookback: period.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;
use crate::indicators::roc::relative_change;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        relative_change(bars, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn momentum_basic() {
        let bars = make_bars(&[100.0, 110.0, 105.0, 120.0]);
        let result = Momentum::new(2).compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 0.05, DEFAULT_EPSILON);
        assert_approx(result[3], 120.0 / 110.0 - 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn momentum_lookback() {
        assert_eq!(Momentum::new(14).lookback(), 14);
    }
}
