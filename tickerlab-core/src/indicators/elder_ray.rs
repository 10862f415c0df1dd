//! Elder Ray: bull and bear power around an EMA of closes.
//!
//! bull = high - EMA(close, period), bear = low - EMA(close, period).
//! Lookback: 0.

use crate::domain::{closes, Bar};
use crate::indicators::ema::ema_of_series;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElderRayLine {
    Bull,
    Bear,
}

#[derive(Debug, Clone)]
pub struct ElderRay {
    period: usize,
    line: ElderRayLine,
    name: String,
}

impl ElderRay {
    pub fn bull(period: usize) -> Self {
        Self::new(period, ElderRayLine::Bull)
    }

    pub fn bear(period: usize) -> Self {
        Self::new(period, ElderRayLine::Bear)
    }

    fn new(period: usize, line: ElderRayLine) -> Self {
        assert!(period >= 1, "Elder Ray period must be >= 1");
        let label = match line {
            ElderRayLine::Bull => "bull",
            ElderRayLine::Bear => "bear",
        };
        Self {
            period,
            line,
            name: format!("elder_{label}_{period}"),
        }
    }
}

impl Indicator for ElderRay {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let ema = ema_of_series(&closes(bars), self.period);
        bars.iter()
            .zip(&ema)
            .map(|(bar, e)| match self.line {
                ElderRayLine::Bull => bar.high - e,
                ElderRayLine::Bear => bar.low - e,
            })
            .collect()
    }
}
