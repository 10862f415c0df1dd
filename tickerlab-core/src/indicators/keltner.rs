//! Keltner Channel: EMA +/- ATR multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: EMA(close, ema_period)
//! - Upper: middle + mult * ATR(atr_period)
//! - Lower: middle - mult * ATR(atr_period)
//!
//! Lookback: 0 for the middle band (EMA is seeded at bar 0), atr_period for
//! the outer bands.

use crate::domain::{closes, Bar};
use crate::indicators::atr::{true_range, wilder_smooth};
use crate::indicators::ema::ema_of_series;
use crate::indicators::indicator::Indicator;

/// Which band of the Keltner Channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeltnerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Keltner {
    ema_period: usize,
    atr_period: usize,
    multiplier: f64,
    band: KeltnerBand,
    name: String,
}

impl Keltner {
    pub fn new(ema_period: usize, atr_period: usize, multiplier: f64, band: KeltnerBand) -> Self {
        assert!(ema_period >= 1 && atr_period >= 1, "Keltner periods must be >= 1");
        let label = match band {
            KeltnerBand::Upper => "upper",
            KeltnerBand::Middle => "middle",
            KeltnerBand::Lower => "lower",
        };
        Self {
            ema_period,
            atr_period,
            multiplier,
            band,
            name: format!("keltner_{label}_{ema_period}_{atr_period}_{multiplier}"),
        }
    }

    pub fn upper(ema_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self::new(ema_period, atr_period, multiplier, KeltnerBand::Upper)
    }

    pub fn middle(ema_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self::new(ema_period, atr_period, multiplier, KeltnerBand::Middle)
    }

    pub fn lower(ema_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self::new(ema_period, atr_period, multiplier, KeltnerBand::Lower)
    }
}

impl Indicator for Keltner {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.band {
            KeltnerBand::Middle => 0,
            _ => self.atr_period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let middle = ema_of_series(&closes(bars), self.ema_period);
        let sign = match self.band {
            KeltnerBand::Middle => return middle,
            KeltnerBand::Upper => 1.0,
            KeltnerBand::Lower => -1.0,
        };

        let atr = wilder_smooth(&true_range(bars), self.atr_period);
        middle
            .iter()
            .zip(&atr)
            .map(|(m, a)| m + sign * self.multiplier * a)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    fn sample_bars() -> Vec<Bar> {
        make_ohlc_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 13.0, 10.0, 12.0),
            (12.0, 14.0, 11.0, 13.0),
            (13.0, 15.0, 12.0, 14.0),
            (14.0, 16.0, 13.0, 15.0),
        ])
    }

    #[test]
    fn keltner_middle_is_ema() {
        // alpha 0.5 from close[0] = 11: 11, 11.5, 12.25
        let result = Keltner::middle(3, 3, 2.0).compute(&sample_bars());
        assert_approx(result[0], 11.0, DEFAULT_EPSILON);
        assert_approx(result[2], 12.25, DEFAULT_EPSILON);
    }

    #[test]
    fn keltner_bands_symmetric_and_ordered() {
        let bars = sample_bars();
        let u = Keltner::upper(3, 3, 2.0).compute(&bars);
        let m = Keltner::middle(3, 3, 2.0).compute(&bars);
        let l = Keltner::lower(3, 3, 2.0).compute(&bars);

        assert!(u[2].is_nan());
        for i in 3..5 {
            assert!(u[i] > m[i] && m[i] > l[i], "bands not ordered at {i}");
            assert_approx(u[i] - m[i], m[i] - l[i], DEFAULT_EPSILON);
        }
        // TR is 3 on every bar, so ATR = 3 and the half-width is 6
        assert_approx(u[3] - m[3], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn keltner_lookback() {
        assert_eq!(Keltner::upper(20, 10, 2.0).lookback(), 10);
        assert_eq!(Keltner::middle(20, 10, 2.0).lookback(), 0);
    }
}
