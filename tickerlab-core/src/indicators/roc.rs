//! Rate of Change (ROC).
//!
//! Percentage price change over N bars.
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Zero base price → 0. Lookback: period.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        relative_change(bars, self.period)
            .into_iter()
            .map(|v| v * 100.0)
            .collect()
    }
}

/// (close[t] - close[t-period]) / close[t-period] as a fraction; zero base → 0.
pub(crate) fn relative_change(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    for i in period..n {
        let prev = bars[i - period].close;
        let curr = bars[i].close;
        result[i] = if prev.is_nan() || curr.is_nan() {
            f64::NAN
        } else if prev == 0.0 {
            0.0
        } else {
            (curr - prev) / prev
        };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn roc_basic() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let result = Roc::new(1).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 10.0, 1e-9);
        assert_approx(result[2], 10.0, 1e-9);
    }

    #[test]
    fn roc_negative() {
        let bars = make_bars(&[200.0, 150.0]);
        assert_approx(Roc::new(1).compute(&bars)[1], -25.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_zero_base_is_zero() {
        let mut bars = make_bars(&[1.0, 5.0]);
        bars[0].close = 0.0;
        assert_eq!(Roc::new(1).compute(&bars)[1], 0.0);
    }

    #[test]
    fn roc_lookback() {
        assert_eq!(Roc::new(14).lookback(), 14);
        assert!(Roc::new(5).compute(&make_bars(&[1.0; 5])).iter().all(|v| v.is_nan()));
    }
}
