//! Average True Range (ATR).
//!
//! TR[t] = max(high-low, |high-prev_close|, |low-prev_close|) for t >= 1.
//! Seed: ATR[period] = mean(TR[1..=period]); Wilder smoothing thereafter:
//! ATR[t] = (ATR[t-1] * (period-1) + TR[t]) / period.
//! Lookback: period.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(14)
    }
}

/// True Range series. `TR[0]` is NaN: the first bar has no previous close.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; bars.len()];
    for i in 1..bars.len() {
        let (h, l, pc) = (bars[i].high, bars[i].low, bars[i - 1].close);
        // NaN-aware: f64::max would hide a NaN operand
        tr[i] = if h.is_nan() || l.is_nan() || pc.is_nan() {
            f64::NAN
        } else {
            (h - l).max((h - pc).abs()).max((l - pc).abs())
        };
    }
    tr
}

/// Wilder smoothing (alpha = 1/period).
///
/// Seed is the mean of the first run of `period` consecutive non-NaN values,
/// placed at the last index of that run. A NaN after the seed taints the rest.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut run = 0;
    let mut seed_end = None;
    for (i, v) in values.iter().enumerate() {
        run = if v.is_nan() { 0 } else { run + 1 };
        if run == period {
            seed_end = Some(i);
            break;
        }
    }
    let Some(seed_end) = seed_end else {
        return result;
    };

    let p = period as f64;
    let mut prev = values[(seed_end + 1 - period)..=seed_end].iter().sum::<f64>() / p;
    result[seed_end] = prev;

    for i in (seed_end + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        prev = (prev * (p - 1.0) + values[i]) / p;
        result[i] = prev;
    }
    result
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        wilder_smooth(&true_range(bars), self.period)
    }
}
