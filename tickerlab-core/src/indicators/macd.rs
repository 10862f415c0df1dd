//! MACD: Moving Average Convergence/Divergence.
//!
//! Three lines (separate Indicator instances):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! All EMAs are seeded at the first bar, so every line has lookback 0.

use crate::domain::{closes, Bar};
use crate::indicators::ema::ema_of_series;
use crate::indicators::indicator::Indicator;

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        let label = match line {
            MacdLine::Line => "macd",
            MacdLine::Signal => "macd_signal",
            MacdLine::Histogram => "macd_histogram",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        if self.line == MacdLine::Line {
            return line;
        }

        let signal = ema_of_series(&line, self.signal);
        match self.line {
            MacdLine::Signal => signal,
            _ => line.iter().zip(&signal).map(|(l, s)| l - s).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn macd_starts_at_zero() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        for line in [Macd::line(12, 26, 9), Macd::signal(12, 26, 9), Macd::histogram(12, 26, 9)] {
            assert_approx(line.compute(&bars)[0], 0.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn macd_known_values() {
        // fast=1 (EMA = close), slow=3 (alpha 0.5), signal=1 (signal = line)
        // slow: 10, 11, 12.5 → line: 0, 1, 1.5
        let bars = make_bars(&[10.0, 12.0, 14.0]);
        let line = Macd::line(1, 3, 1).compute(&bars);
        assert_approx(line[1], 1.0, DEFAULT_EPSILON);
        assert_approx(line[2], 1.5, DEFAULT_EPSILON);
        let hist = Macd::histogram(1, 3, 1).compute(&bars);
        assert!(hist.iter().all(|v| v.abs() < DEFAULT_EPSILON));
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bars = make_bars(&prices);
        let line = Macd::line(12, 26, 9).compute(&bars);
        let signal = Macd::signal(12, 26, 9).compute(&bars);
        let hist = Macd::histogram(12, 26, 9).compute(&bars);
        for i in 0..40 {
            assert_approx(hist[i], line[i] - signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn macd_rising_series_positive() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let line = Macd::line(12, 26, 9).compute(&make_bars(&prices));
        assert!(line[29] > 0.0);
    }

    #[test]
    fn macd_names() {
        assert_eq!(Macd::line(12, 26, 9).name(), "macd_12_26_9");
        assert_eq!(Macd::signal(12, 26, 9).name(), "macd_signal_12_26_9");
    }
}
