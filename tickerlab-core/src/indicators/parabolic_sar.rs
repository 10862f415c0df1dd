//! Parabolic SAR: Wilder's stop-and-reverse.
//!
//! Sequential state: trend direction, extreme point (EP), acceleration
//! factor (AF). Initial direction comes from the first two closes. The SAR
//! may not penetrate the two previous bars' lows (uptrend) or highs
//! (downtrend); a bar crossing the SAR flips the trend and the SAR jumps to
//! the prior EP.
//!
//! Parameters: af_start 0.02, af_step 0.02, af_max 0.20.
//! Lookback: 1.

use crate::domain::Bar;
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    af_start: f64,
    af_step: f64,
    af_max: f64,
    name: String,
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        assert!(af_start > 0.0, "AF start must be > 0");
        assert!(af_step > 0.0, "AF step must be > 0");
        assert!(af_max >= af_start, "AF max must be >= AF start");
        Self {
            af_start,
            af_step,
            af_max,
            name: format!("psar_{af_start}_{af_step}_{af_max}"),
        }
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new(0.02, 0.02, 0.20)
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < 2 || bars[..2].iter().any(Bar::is_void) {
            return result;
        }

        let mut rising = bars[1].close >= bars[0].close;
        let mut af = self.af_start;
        let (mut sar, mut ep) = if rising {
            (bars[0].low, bars[1].high)
        } else {
            (bars[0].high, bars[1].low)
        };
        result[1] = sar;

        for i in 2..n {
            let bar = &bars[i];
            if bar.is_void() {
                // state is not advanced; the hole stays a hole
                continue;
            }

            let mut next = sar + af * (ep - sar);
            if rising {
                next = next.min(bars[i - 1].low).min(bars[i - 2].low);
                if bar.low < next {
                    rising = false;
                    next = ep;
                    ep = bar.low;
                    af = self.af_start;
                } else if bar.high > ep {
                    ep = bar.high;
                    af = (af + self.af_step).min(self.af_max);
                }
            } else {
                next = next.max(bars[i - 1].high).max(bars[i - 2].high);
                if bar.high > next {
                    rising = true;
                    next = ep;
                    ep = bar.high;
                    af = self.af_start;
                } else if bar.low < ep {
                    ep = bar.low;
                    af = (af + self.af_step).min(self.af_max);
                }
            }

            sar = next;
            result[i] = sar;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn psar_uptrend_below_price() {
        let data: Vec<_> = (0..10)
            .map(|i| {
                let base = 100.0 + i as f64 * 3.0;
                (base, base + 2.0, base - 1.0, base + 1.5)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let result = ParabolicSar::default().compute(&bars);
        for i in 2..10 {
            assert!(result[i] < bars[i].low, "PSAR above low at bar {i}");
        }
    }

    #[test]
    fn psar_first_values() {
        let bars = make_ohlc_bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 104.0, 100.0, 103.0),
            (103.0, 106.0, 102.0, 105.0),
        ]);
        let result = ParabolicSar::default().compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 99.0, DEFAULT_EPSILON);
        // 99 + 0.02 * (104 - 99) = 99.1, clamped to bar 0's low
        assert_approx(result[2], 99.0, DEFAULT_EPSILON);
    }

    #[test]
    fn psar_reversal_occurs() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 98.0, 103.0),
            (103.0, 108.0, 101.0, 107.0),
            (107.0, 112.0, 105.0, 111.0),
            (111.0, 115.0, 109.0, 114.0),
            (114.0, 114.5, 100.0, 101.0),
            (101.0, 102.0, 95.0, 96.0),
            (96.0, 97.0, 90.0, 91.0),
        ]);
        let result = ParabolicSar::default().compute(&bars);
        assert!(result[3] < bars[3].low);
        assert!(result[4] < bars[4].low);
        // bar 5 breaks the SAR, which flips to the prior extreme point
        assert_approx(result[5], 115.0, DEFAULT_EPSILON);
        assert!(result[6] > bars[6].high);
    }

    #[test]
    fn psar_too_few_bars() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        assert!(ParabolicSar::default().compute(&bars).iter().all(|v| v.is_nan()));
        assert_eq!(ParabolicSar::default().lookback(), 1);
    }
}
