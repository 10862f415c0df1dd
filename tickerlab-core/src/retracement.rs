//! Fibonacci retracement levels.
//!
//! `price = low_anchor + (high_anchor - low_anchor) * ratio`. Ratio 0 always
//! maps to the low anchor and ratio 1 to the high anchor; the caller picks
//! the direction and the anchors are never swapped.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Standard retracement ratios.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

pub fn retracement(low_anchor: f64, high_anchor: f64) -> Vec<FibLevel> {
    FIB_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: low_anchor + (high_anchor - low_anchor) * ratio,
        })
        .collect()
}

/// Retracement anchored on the lowest low and highest high of the last
/// `lookback` bars (the whole series when shorter). `None` for empty input.
pub fn retracement_from_swing(bars: &[Bar], lookback: usize) -> Option<Vec<FibLevel>> {
    let start = bars.len().saturating_sub(lookback.max(1));
    let window = &bars[start..];
    if window.is_empty() {
        return None;
    }
    let low = window.iter().map(|b| b.low).fold(f64::INFINITY, nan_min);
    let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, nan_max);
    Some(retracement(low, high))
}

// `f64::min`/`max` drop a NaN operand; a bad bar must poison the anchors.
fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Level closest to `price`; the lower ratio wins an exact tie.
pub fn nearest_level(levels: &[FibLevel], price: f64) -> Option<FibLevel> {
    levels.iter().copied().reduce(|best, level| {
        if (level.price - price).abs() < (best.price - price).abs() {
            level
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    #[test]
    fn standard_levels_50_to_100() {
        let expected = [50.0, 61.8, 69.1, 75.0, 80.9, 89.3, 100.0];
        let levels = retracement(50.0, 100.0);
        assert_eq!(levels.len(), 7);
        for (level, want) in levels.iter().zip(expected) {
            assert!((level.price - want).abs() < 1e-6, "{} != {want}", level.price);
        }
    }

    #[test]
    fn reversed_anchors_are_not_swapped() {
        let levels = retracement(100.0, 50.0);
        assert_eq!(levels[0].price, 100.0);
        assert_eq!(levels[6].price, 50.0);
        assert!((levels[3].price - 75.0).abs() < 1e-12);
    }

    #[test]
    fn swing_uses_trailing_window() {
        let bars = make_ohlc_bars(&[
            (10.0, 200.0, 1.0, 10.0), // outside the window
            (10.0, 12.0, 8.0, 11.0),
            (11.0, 15.0, 9.0, 14.0),
        ]);
        let levels = retracement_from_swing(&bars, 2).unwrap();
        assert_eq!(levels[0].price, 8.0);
        assert_eq!(levels[6].price, 15.0);
        assert!(retracement_from_swing(&[], 10).is_none());
    }

    #[test]
    fn nan_bar_poisons_swing_levels() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, f64::NAN, 11.0),
            (11.0, 15.0, 9.0, 14.0),
            (14.0, 16.0, 13.0, 15.0),
        ]);
        let levels = retracement_from_swing(&bars, 3).unwrap();
        assert_eq!(levels.len(), 7);
        assert!(levels.iter().all(|l| l.price.is_nan()));

        let bars = make_ohlc_bars(&[(10.0, 12.0, 8.0, 11.0), (11.0, f64::NAN, 9.0, 14.0)]);
        let levels = retracement_from_swing(&bars, 2).unwrap();
        assert!(levels.iter().all(|l| l.price.is_nan()));
    }

    #[test]
    fn nearest_level_picks_closest() {
        let levels = retracement(50.0, 100.0);
        let nearest = nearest_level(&levels, 70.0).unwrap();
        assert_eq!(nearest.ratio, 0.382);
        assert!(nearest_level(&[], 1.0).is_none());
    }
}
