//! Stochastic oscillator.
//!
//! %K = 100 * (close - lowest_low(k)) / (highest_high(k) - lowest_low(k))
//! %D = SMA(%K, d)
//! Zero range (flat window) → %K = 50.
//! Lookback: k - 1 for %K, k + d - 2 for %D.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;
use crate::indicators::window::{rolling_max, rolling_min, sma_of_series};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn k(k_period: usize, d_period: usize) -> Self {
        Self::new(k_period, d_period, StochasticLine::K)
    }

    pub fn d(k_period: usize, d_period: usize) -> Self {
        Self::new(k_period, d_period, StochasticLine::D)
    }

    fn new(k_period: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(k_period >= 1 && d_period >= 1, "Stochastic periods must be >= 1");
        let label = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            k_period,
            d_period,
            line,
            name: format!("stoch_{label}_{k_period}_{d_period}"),
        }
    }
}

/// Raw %K series.
pub fn percent_k(bars: &[Bar], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let hh = rolling_max(&highs, period);
    let ll = rolling_min(&lows, period);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = hh[i] - ll[i];
            if range.is_nan() || bar.close.is_nan() {
                f64::NAN
            } else if range == 0.0 {
                50.0
            } else {
                100.0 * (bar.close - ll[i]) / range
            }
        })
        .collect()
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            StochasticLine::K => self.k_period - 1,
            StochasticLine::D => self.k_period + self.d_period - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let k = percent_k(bars, self.k_period);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => sma_of_series(&k, self.d_period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn stochastic_known_values() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 8.0, 11.0),
            (11.0, 14.0, 10.0, 13.0),
            (13.0, 13.0, 9.0, 10.0), // HH 14, LL 8 → 100 * 2/6
            (10.0, 11.0, 9.5, 11.0), // HH 14, LL 9 → 100 * 2/5
        ]);
        let k = Stochastic::k(3, 2).compute(&bars);
        assert!(k[1].is_nan());
        assert_approx(k[2], 100.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(k[3], 40.0, DEFAULT_EPSILON);
        let d = Stochastic::d(3, 2).compute(&bars);
        assert!(d[2].is_nan());
        assert_approx(d[3], (100.0 / 3.0 + 40.0) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochastic_flat_window_is_50() {
        let bars = make_ohlc_bars(&[(5.0, 5.0, 5.0, 5.0); 5]);
        let k = Stochastic::k(3, 3).compute(&bars);
        assert_approx(k[4], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochastic_bounded() {
        let data: Vec<_> = (0..30)
            .map(|i| {
                let c = 100.0 + ((i * 13) % 7) as f64;
                (c, c + 2.0, c - 2.0, c)
            })
            .collect();
        let k = Stochastic::k(14, 3).compute(&make_ohlc_bars(&data));
        assert!(k.iter().filter(|v| v.is_finite()).all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn stochastic_lookback() {
        assert_eq!(Stochastic::k(14, 3).lookback(), 13);
        assert_eq!(Stochastic::d(14, 3).lookback(), 15);
    }
}
