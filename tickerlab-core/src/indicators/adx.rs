//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Zero smoothed TR or a zero DI sum gives DX = 0.
//! Lookback: 2 * period - 1 (DI valid from `period`, ADX seed needs `period` DX values).

use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};
use crate::indicators::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(14)
    }
}

/// +DM and -DM series; index 0 is NaN.
fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }
    (plus_dm, minus_dm)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let (plus_dm, minus_dm) = directional_movement(bars);
        let smooth_tr = wilder_smooth(&true_range(bars), self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let dx: Vec<f64> = (0..bars.len())
            .map(|i| {
                let (tr, p, m) = (smooth_tr[i], smooth_plus[i], smooth_minus[i]);
                if tr.is_nan() || p.is_nan() || m.is_nan() {
                    return f64::NAN;
                }
                if tr == 0.0 {
                    return 0.0;
                }
                let plus_di = 100.0 * p / tr;
                let minus_di = 100.0 * m / tr;
                let sum = plus_di + minus_di;
                if sum == 0.0 {
                    0.0
                } else {
                    100.0 * (plus_di - minus_di).abs() / sum
                }
            })
            .collect();

        wilder_smooth(&dx, self.period)
    }
}
