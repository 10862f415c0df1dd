//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (close[t] - EMA[t-1]), alpha = 2/(period+1).
//! Seed: EMA[0] = close[0], so the series is defined from the first bar.
//! Lookback: 0.

use crate::domain::{closes, Bar};
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Default for Ema {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&closes(bars), self.period)
    }
}

/// EMA of an arbitrary series, seeded with its first non-NaN value.
///
/// Leading NaN (another indicator's warm-up) is skipped; the seed lands on
/// the first finite position. A NaN after the seed taints the rest of the
/// series. Used by composed indicators (MACD signal, Keltner, Force Index).
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }
    let Some(seed_index) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[seed_index];
    result[seed_index] = prev;

    for i in (seed_index + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        prev += alpha * (values[i] - prev);
        result[i] = prev;
    }

    result
}
