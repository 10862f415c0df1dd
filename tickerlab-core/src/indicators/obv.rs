//! On-Balance Volume (OBV).
//!
//! OBV[0] = 0; each later bar adds its volume on an up close, subtracts it on
//! a down close, and carries the total on an unchanged close.
//! Lookback: 0.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Obv {
    name: String,
}

impl Obv {
    pub fn new() -> Self {
        Self {
            name: "obv".to_string(),
        }
    }
}

impl Default for Obv {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut total = 0.0;
        for (i, bar) in bars.iter().enumerate() {
            if i > 0 {
                let prev = bars[i - 1].close;
                if bar.close.is_nan() || prev.is_nan() {
                    total = f64::NAN;
                } else if bar.close > prev {
                    total += bar.volume as f64;
                } else if bar.close < prev {
                    total -= bar.volume as f64;
                }
            }
            result.push(total);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_bars, DEFAULT_EPSILON};

    #[test]
    fn obv_accumulates_signed_volume() {
        let bars = make_ohlcv_bars(&[
            (10.0, 10.0, 10.0, 10.0, 500),
            (10.0, 11.0, 10.0, 11.0, 100), // up
            (11.0, 11.0, 9.0, 9.0, 40),    // down
            (9.0, 9.0, 9.0, 9.0, 70),      // flat
        ]);
        let result = Obv::new().compute(&bars);
        assert_approx(result[0], 0.0, DEFAULT_EPSILON);
        assert_approx(result[1], 100.0, DEFAULT_EPSILON);
        assert_approx(result[2], 60.0, DEFAULT_EPSILON);
        assert_approx(result[3], 60.0, DEFAULT_EPSILON);
    }

    #[test]
    fn obv_nan_propagates() {
        let mut bars = make_ohlcv_bars(&[(1.0, 1.0, 1.0, 1.0, 10); 4]);
        bars[1].close = f64::NAN;
        let result = Obv::new().compute(&bars);
        assert!(result[1].is_nan());
        assert!(result[3].is_nan());
    }
}
