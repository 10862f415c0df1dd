//! Force Index.
//!
//! raw[t] = (close[t] - close[t-1]) * volume[t], smoothed by an EMA seeded
//! at the first raw value (bar 1). Lookback: 1.

use crate::domain::Bar;
use crate::indicators::ema::ema_of_series;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct ForceIndex {
    period: usize,
    name: String,
}

impl ForceIndex {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Force Index period must be >= 1");
        Self {
            period,
            name: format!("force_index_{period}"),
        }
    }
}

impl Indicator for ForceIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut raw = vec![f64::NAN; bars.len()];
        for i in 1..bars.len() {
            raw[i] = (bars[i].close - bars[i - 1].close) * bars[i].volume as f64;
        }
        ema_of_series(&raw, self.period)
    }
}
