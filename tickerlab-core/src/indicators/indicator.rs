//! Indicator trait.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! No shared state between calls, so the same indicator may be computed
//! concurrently over independent series.

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warm-up).
/// A series shorter than the lookback yields an all-NaN vector; an empty
/// series yields an empty vector. Implementations never panic on short input.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Latest finite value, if any.
    fn latest(&self, bars: &[Bar]) -> Option<f64> {
        last_finite(&self.compute(bars))
    }
}

/// Last finite value of a series. NaN warm-up and NaN propagation both map to `None`.
pub fn last_finite(values: &[f64]) -> Option<f64> {
    values.last().copied().filter(|v| v.is_finite())
}
