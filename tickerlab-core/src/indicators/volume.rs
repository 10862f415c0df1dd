//! Volume averages.
//!
//! [`VolumeSma`] is the trailing mean volume. [`volume_change`] compares the
//! most recent `period` bars' mean volume to the `period` bars before them.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;
use crate::indicators::window::sma_of_series;

#[derive(Debug, Clone)]
pub struct VolumeSma {
    period: usize,
    name: String,
}

impl VolumeSma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Volume SMA period must be >= 1");
        Self {
            period,
            name: format!("volume_sma_{period}"),
        }
    }
}

impl Indicator for VolumeSma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        sma_of_series(&volumes, self.period)
    }
}

/// recent mean / previous mean - 1 over two adjacent `period` windows.
///
/// `None` when fewer than `2 * period` bars; zero previous volume → 0.
pub fn volume_change(bars: &[Bar], period: usize) -> Option<f64> {
    let n = bars.len();
    if period == 0 || n < 2 * period {
        return None;
    }
    let mean = |slice: &[Bar]| slice.iter().map(|b| b.volume as f64).sum::<f64>() / period as f64;
    let recent = mean(&bars[(n - period)..]);
    let previous = mean(&bars[(n - 2 * period)..(n - period)]);
    if previous == 0.0 {
        Some(0.0)
    } else {
        Some(recent / previous - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_bars, DEFAULT_EPSILON};

    fn bars_with_volumes(volumes: &[u64]) -> Vec<Bar> {
        let data: Vec<_> = volumes.iter().map(|&v| (10.0, 11.0, 9.0, 10.0, v)).collect();
        make_ohlcv_bars(&data)
    }

    #[test]
    fn volume_sma_basic() {
        let bars = bars_with_volumes(&[100, 200, 300]);
        let result = VolumeSma::new(2).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[2], 250.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volume_change_doubles() {
        let bars = bars_with_volumes(&[100, 100, 200, 200]);
        assert_approx(volume_change(&bars, 2).unwrap(), 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volume_change_degenerate() {
        assert!(volume_change(&bars_with_volumes(&[1, 2, 3]), 2).is_none());
        assert_eq!(volume_change(&bars_with_volumes(&[0, 0, 5, 5]), 2), Some(0.0));
    }
}
