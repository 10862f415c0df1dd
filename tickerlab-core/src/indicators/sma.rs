//! Simple Moving Average (SMA).
//!
//! Trailing mean of close prices over `period` bars.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::domain::{closes, Bar};
use crate::indicators::indicator::Indicator;
use crate::indicators::window::sma_of_series;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_of_series(&closes(bars), self.period)
    }
}
