//! Relative Volatility Index (RVI).
//!
//! Like RSI, but feeds the rolling stddev of closes instead of the size of
//! the change: on an up close the bar contributes stddev(close, std_period)
//! to the up series, on a down close to the down series, and 0 to the other.
//! Both are Wilder-smoothed over `smooth_period`.
//! RVI = 100 * U / (U + D); U + D == 0 → 50.
//! Lookback: max(std_period - 1, 1) + smooth_period - 1.

use crate::domain::{closes, Bar};
use crate::indicators::atr::wilder_smooth;
use crate::indicators::indicator::Indicator;
use crate::indicators::window::stddev_of_series;

#[derive(Debug, Clone)]
pub struct Rvi {
    std_period: usize,
    smooth_period: usize,
    name: String,
}

impl Rvi {
    pub fn new(std_period: usize, smooth_period: usize) -> Self {
        assert!(std_period >= 1 && smooth_period >= 1, "RVI periods must be >= 1");
        Self {
            std_period,
            smooth_period,
            name: format!("rvi_{std_period}_{smooth_period}"),
        }
    }
}

impl Default for Rvi {
    fn default() -> Self {
        Self::new(10, 14)
    }
}

impl Indicator for Rvi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (self.std_period - 1).max(1) + self.smooth_period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let n = closes.len();
        let sd = stddev_of_series(&closes, self.std_period);

        let mut up = vec![f64::NAN; n];
        let mut down = vec![f64::NAN; n];
        for i in 1..n {
            let change = closes[i] - closes[i - 1];
            if sd[i].is_nan() || change.is_nan() {
                continue;
            }
            up[i] = if change > 0.0 { sd[i] } else { 0.0 };
            down[i] = if change < 0.0 { sd[i] } else { 0.0 };
        }

        let up = wilder_smooth(&up, self.smooth_period);
        let down = wilder_smooth(&down, self.smooth_period);
        up.iter()
            .zip(&down)
            .map(|(&u, &d)| {
                if u.is_nan() || d.is_nan() {
                    f64::NAN
                } else if u + d == 0.0 {
                    50.0
                } else {
                    100.0 * u / (u + d)
                }
            })
            .collect()
    }
}
