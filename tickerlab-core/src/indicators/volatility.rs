//! Volatility of log returns.
//!
//! `volatility` is the population standard deviation of close-to-close log
//! returns over a whole series; `price_volatility` scales it by the last
//! close to express it in price units (the Risk Engine's volatility basis).
//! The [`Volatility`] indicator is the rolling version over `period` returns.

use crate::domain::{closes, Bar};
use crate::indicators::indicator::Indicator;
use crate::indicators::window::{population_stddev, stddev_of_series};

/// ln(p[t] / p[t-1]) for t >= 1. Non-positive prices yield NaN.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 && w[1] > 0.0 {
                (w[1] / w[0]).ln()
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Population stddev of log returns. `None` with fewer than two prices.
pub fn volatility(prices: &[f64]) -> Option<f64> {
    if prices.len() < 2 {
        return None;
    }
    Some(population_stddev(&log_returns(prices)))
}

/// Log-return volatility times the last price.
pub fn price_volatility(prices: &[f64]) -> Option<f64> {
    let last = *prices.last()?;
    volatility(prices).map(|v| v * last)
}

#[derive(Debug, Clone)]
pub struct Volatility {
    period: usize,
    name: String,
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Volatility period must be >= 1");
        Self {
            period,
            name: format!("volatility_{period}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        if bars.is_empty() {
            return Vec::new();
        }
        // returns[t-1] belongs to bar t
        let mut result = vec![f64::NAN];
        result.extend(stddev_of_series(&log_returns(&closes(bars)), self.period));
        result
    }
}
