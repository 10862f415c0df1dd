//! Ichimoku cloud lines, undisplaced.
//!
//! - Conversion (tenkan): midpoint of highest high / lowest low over 9 bars
//! - Base (kijun): same over 26 bars
//! - Span A: (conversion + base) / 2
//! - Span B: midpoint over 52 bars
//!
//! Values are aligned to the bar they are computed on; charting code that
//! wants the traditional forward shift applies it itself.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;
use crate::indicators::window::{rolling_max, rolling_min};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuLine {
    Conversion,
    Base,
    SpanA,
    SpanB,
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    conversion_period: usize,
    base_period: usize,
    span_b_period: usize,
    line: IchimokuLine,
    name: String,
}

impl Ichimoku {
    pub fn new(
        conversion_period: usize,
        base_period: usize,
        span_b_period: usize,
        line: IchimokuLine,
    ) -> Self {
        assert!(
            conversion_period >= 1 && base_period >= 1 && span_b_period >= 1,
            "Ichimoku periods must be >= 1"
        );
        let label = match line {
            IchimokuLine::Conversion => "conversion",
            IchimokuLine::Base => "base",
            IchimokuLine::SpanA => "span_a",
            IchimokuLine::SpanB => "span_b",
        };
        Self {
            conversion_period,
            base_period,
            span_b_period,
            line,
            name: format!("ichimoku_{label}_{conversion_period}_{base_period}_{span_b_period}"),
        }
    }
}

fn midpoint(bars: &[Bar], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    rolling_max(&highs, period)
        .iter()
        .zip(rolling_min(&lows, period))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            IchimokuLine::Conversion => self.conversion_period - 1,
            IchimokuLine::Base => self.base_period - 1,
            IchimokuLine::SpanA => self.conversion_period.max(self.base_period) - 1,
            IchimokuLine::SpanB => self.span_b_period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        match self.line {
            IchimokuLine::Conversion => midpoint(bars, self.conversion_period),
            IchimokuLine::Base => midpoint(bars, self.base_period),
            IchimokuLine::SpanB => midpoint(bars, self.span_b_period),
            IchimokuLine::SpanA => midpoint(bars, self.conversion_period)
                .iter()
                .zip(midpoint(bars, self.base_period))
                .map(|(c, b)| (c + b) / 2.0)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let c = i as f64;
                (c, c + 1.0, c - 1.0, c)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn ichimoku_lines_on_ramp() {
        let bars = ramp(60);
        let conv = Ichimoku::new(9, 26, 52, IchimokuLine::Conversion).compute(&bars);
        let base = Ichimoku::new(9, 26, 52, IchimokuLine::Base).compute(&bars);
        let span_a = Ichimoku::new(9, 26, 52, IchimokuLine::SpanA).compute(&bars);
        let span_b = Ichimoku::new(9, 26, 52, IchimokuLine::SpanB).compute(&bars);

        // at bar 59: conv window 51..=59 → (60 + 50)/2 = 55
        assert_approx(conv[59], 55.0, DEFAULT_EPSILON);
        // base window 34..=59 → (60 + 33)/2 = 46.5
        assert_approx(base[59], 46.5, DEFAULT_EPSILON);
        assert_approx(span_a[59], (55.0 + 46.5) / 2.0, DEFAULT_EPSILON);
        // span B window 8..=59 → (60 + 7)/2 = 33.5
        assert_approx(span_b[59], 33.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ichimoku_warmup() {
        let bars = ramp(30);
        let span_b = Ichimoku::new(9, 26, 52, IchimokuLine::SpanB).compute(&bars);
        assert!(span_b.iter().all(|v| v.is_nan()));
        let base = Ichimoku::new(9, 26, 52, IchimokuLine::Base);
        assert_eq!(base.lookback(), 25);
        assert!(base.compute(&bars)[24].is_nan());
        assert!(base.compute(&bars)[25].is_finite());
    }
}
