//! Chaikin Money Flow (CMF).
//!
//! Money flow multiplier MFM = ((close - low) - (high - close)) / (high - low),
//! zero range → MFM 0. CMF = sum(MFM * volume) / sum(volume) over `period`
//! bars, zero total volume → 0. Lookback: period - 1.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Cmf {
    period: usize,
    name: String,
}

impl Cmf {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CMF period must be >= 1");
        Self {
            period,
            name: format!("cmf_{period}"),
        }
    }
}

fn money_flow_multiplier(bar: &Bar) -> f64 {
    let range = bar.high - bar.low;
    if range == 0.0 {
        0.0
    } else {
        ((bar.close - bar.low) - (bar.high - bar.close)) / range
    }
}

impl Indicator for Cmf {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[(i + 1 - self.period)..=i];
            let flow: f64 = window
                .iter()
                .map(|b| money_flow_multiplier(b) * b.volume as f64)
                .sum();
            let volume: f64 = window.iter().map(|b| b.volume as f64).sum();
            result[i] = if flow.is_nan() {
                f64::NAN
            } else if volume == 0.0 {
                0.0
            } else {
                flow / volume
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_bars, DEFAULT_EPSILON};

    #[test]
    fn cmf_close_at_high_is_one() {
        let bars = make_ohlcv_bars(&[(10.0, 12.0, 8.0, 12.0, 100), (12.0, 14.0, 10.0, 14.0, 300)]);
        assert_approx(Cmf::new(2).compute(&bars)[1], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn cmf_weighted_by_volume() {
        // MFM +1 with volume 100, MFM -1 with volume 300 → -200/400
        let bars = make_ohlcv_bars(&[(10.0, 12.0, 8.0, 12.0, 100), (12.0, 14.0, 10.0, 10.0, 300)]);
        assert_approx(Cmf::new(2).compute(&bars)[1], -0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn cmf_degenerate_cases_are_zero() {
        let flat = make_ohlcv_bars(&[(5.0, 5.0, 5.0, 5.0, 100); 3]);
        assert_eq!(Cmf::new(3).compute(&flat)[2], 0.0);
        let no_volume = make_ohlcv_bars(&[(5.0, 6.0, 4.0, 6.0, 0); 3]);
        assert_eq!(Cmf::new(3).compute(&no_volume)[2], 0.0);
    }

    #[test]
    fn cmf_lookback() {
        assert_eq!(Cmf::new(20).lookback(), 19);
    }
}
