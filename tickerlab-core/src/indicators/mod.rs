//! Indicator library.
//!
//! Every indicator implements [`Indicator`]: a pure function from a bar series
//! to a numeric series of the same length, NaN during warm-up. Multi-series
//! indicators (Bollinger, Keltner, MACD, Stochastic, Ichimoku, Elder Ray) are
//! exposed as separate named instances per line, keeping the single-series
//! trait unchanged.
//!
//! [`IndicatorSpec`] is the serializable factory over the whole library, and
//! [`IndicatorResult`] is the labelled output it produces.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cmf;
pub mod elder_ray;
pub mod ema;
pub mod force_index;
pub mod ichimoku;
pub mod indicator;
pub mod keltner;
pub mod macd;
pub mod mfi;
pub mod momentum;
pub mod obv;
pub mod parabolic_sar;
pub mod result;
pub mod roc;
pub mod rsi;
pub mod rvi;
pub mod sma;
pub mod spec;
pub mod stochastic;
pub mod volatility;
pub mod volume;
pub mod williams_r;
pub mod window;

pub use adx::Adx;
pub use atr::{true_range, wilder_smooth, Atr};
pub use bollinger::{Bollinger, BollingerBand};
pub use cmf::Cmf;
pub use elder_ray::{ElderRay, ElderRayLine};
pub use ema::{ema_of_series, Ema};
pub use force_index::ForceIndex;
pub use ichimoku::{Ichimoku, IchimokuLine};
pub use indicator::{last_finite, Indicator};
pub use keltner::{Keltner, KeltnerBand};
pub use macd::{Macd, MacdLine};
pub use mfi::Mfi;
pub use momentum::Momentum;
pub use obv::Obv;
pub use parabolic_sar::ParabolicSar;
pub use result::{IndicatorOutput, IndicatorResult};
pub use roc::Roc;
pub use rsi::Rsi;
pub use rvi::Rvi;
pub use sma::Sma;
pub use spec::{IndicatorSpec, SpecError};
pub use stochastic::{Stochastic, StochasticLine};
pub use volatility::{log_returns, price_volatility, volatility, Volatility};
pub use volume::{volume_change, VolumeSma};
pub use williams_r::WilliamsR;
pub use window::{rolling_max, rolling_min, sma_of_series, stddev_of_series};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// Timestamps are daily from 2024-01-02 UTC.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            crate::domain::Bar::new(test_timestamp(i), open, high, low, close, 1000)
        })
        .collect()
}

/// Bars from explicit (open, high, low, close) tuples, volume 1000.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            crate::domain::Bar::new(test_timestamp(i), open, high, low, close, 1000)
        })
        .collect()
}

/// Bars from explicit (open, high, low, close, volume) tuples.
#[cfg(test)]
pub fn make_ohlcv_bars(data: &[(f64, f64, f64, f64, u64)]) -> Vec<crate::domain::Bar> {
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| {
            crate::domain::Bar::new(test_timestamp(i), open, high, low, close, volume)
        })
        .collect()
}

#[cfg(test)]
fn test_timestamp(i: usize) -> i64 {
    1_704_153_600 + i as i64 * 86_400
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
