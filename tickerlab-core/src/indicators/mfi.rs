//! Money Flow Index (MFI).
//!
//! Raw money flow = typical price * volume. A bar's flow is positive when its
//! typical price rose from the previous bar, negative when it fell, and
//! ignored when unchanged. Over the trailing `period` flows:
//! MFI = 100 - 100 / (1 + positive / negative).
//! Negative flow 0 → 100; both flows 0 → 50. Lookback: period.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
    name: String,
}

impl Mfi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "MFI period must be >= 1");
        Self {
            period,
            name: format!("mfi_{period}"),
        }
    }
}

impl Indicator for Mfi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n <= self.period {
            return result;
        }

        // (positive, negative) flow per bar; index 0 unused
        let mut flows = vec![(0.0, 0.0); n];
        for i in 1..n {
            let tp = bars[i].typical_price();
            let prev_tp = bars[i - 1].typical_price();
            let raw = tp * bars[i].volume as f64;
            flows[i] = if tp.is_nan() || prev_tp.is_nan() {
                (f64::NAN, f64::NAN)
            } else if tp > prev_tp {
                (raw, 0.0)
            } else if tp < prev_tp {
                (0.0, raw)
            } else {
                (0.0, 0.0)
            };
        }

        for i in self.period..n {
            let window = &flows[(i + 1 - self.period)..=i];
            let positive: f64 = window.iter().map(|f| f.0).sum();
            let negative: f64 = window.iter().map(|f| f.1).sum();
            result[i] = if positive.is_nan() || negative.is_nan() {
                f64::NAN
            } else if negative == 0.0 && positive == 0.0 {
                50.0
            } else if negative == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + positive / negative)
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv_bars, DEFAULT_EPSILON};

    #[test]
    fn mfi_known_value() {
        // typical prices 10, 12, 11 with volumes -, 100, 100
        // positive = 1200, negative = 1100
        let bars = make_ohlcv_bars(&[
            (10.0, 10.0, 10.0, 10.0, 100),
            (12.0, 12.0, 12.0, 12.0, 100),
            (11.0, 11.0, 11.0, 11.0, 100),
        ]);
        let result = Mfi::new(2).compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0 - 100.0 / (1.0 + 1200.0 / 1100.0), DEFAULT_EPSILON);
    }

    #[test]
    fn mfi_only_inflow_is_100() {
        let data: Vec<_> = (0..6)
            .map(|i| {
                let p = 10.0 + i as f64;
                (p, p, p, p, 1000)
            })
            .collect();
        let result = Mfi::new(3).compute(&make_ohlcv_bars(&data));
        assert_approx(result[5], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mfi_flat_is_50() {
        let bars = make_ohlcv_bars(&[(5.0, 5.0, 5.0, 5.0, 1000); 6]);
        assert_approx(Mfi::new(3).compute(&bars)[5], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mfi_lookback() {
        assert_eq!(Mfi::new(14).lookback(), 14);
    }
}
