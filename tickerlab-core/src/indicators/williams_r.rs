//! Williams %R.
//!
//! %R = -100 * (highest_high - close) / (highest_high - lowest_low), in [-100, 0].
//! Zero range → -50. Lookback: period - 1.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;
use crate::indicators::window::{rolling_max, rolling_min};

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let hh = rolling_max(&highs, self.period);
        let ll = rolling_min(&lows, self.period);

        (0..bars.len())
            .map(|i| {
                let range = hh[i] - ll[i];
                if range.is_nan() || bars[i].close.is_nan() {
                    f64::NAN
                } else if range == 0.0 {
                    -50.0
                } else {
                    -100.0 * (hh[i] - bars[i].close) / range
                }
            })
            .collect()
    }
}
