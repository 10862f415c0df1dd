//! Look-ahead contamination tests for the indicator battery.
//!
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Bars 0..100 must be identical between both runs.

use tickerlab_core::data::synthetic_series;
use tickerlab_core::domain::Bar;
use tickerlab_core::indicators::*;

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let truncated_result = indicator.compute(&full_bars[..truncated_len]);
    let full_result = indicator.compute(full_bars);

    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full_result.len(), full_bars.len(), "{}", indicator.name());

    for (i, (&t, &f)) in truncated_result.iter().zip(&full_result).enumerate() {
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at bar {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

fn battery() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Sma::new(20)),
        Box::new(Ema::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::line(12, 26, 9)),
        Box::new(Macd::signal(12, 26, 9)),
        Box::new(Macd::histogram(12, 26, 9)),
        Box::new(Bollinger::upper(20, 2.0)),
        Box::new(Bollinger::lower(20, 2.0)),
        Box::new(Atr::new(14)),
        Box::new(Stochastic::k(14, 3)),
        Box::new(Stochastic::d(14, 3)),
        Box::new(Adx::new(14)),
        Box::new(WilliamsR::new(14)),
        Box::new(Mfi::new(14)),
        Box::new(Obv::new()),
        Box::new(Roc::new(10)),
        Box::new(Momentum::new(10)),
        Box::new(Cmf::new(20)),
        Box::new(ParabolicSar::default()),
        Box::new(Keltner::upper(20, 10, 2.0)),
        Box::new(Keltner::lower(20, 10, 2.0)),
        Box::new(Rvi::default()),
        Box::new(ForceIndex::new(13)),
        Box::new(ElderRay::bull(13)),
        Box::new(ElderRay::bear(13)),
        Box::new(Ichimoku::new(9, 26, 52, IchimokuLine::SpanA)),
        Box::new(Ichimoku::new(9, 26, 52, IchimokuLine::SpanB)),
        Box::new(VolumeSma::new(5)),
        Box::new(Volatility::new(20)),
    ]
}

#[test]
fn no_indicator_reads_future_bars() {
    let bars = synthetic_series(11, 200, 100.0);
    for indicator in battery() {
        assert_no_lookahead(indicator.as_ref(), &bars, 100);
    }
}

#[test]
fn warmup_matches_lookback() {
    let bars = synthetic_series(3, 200, 50.0);
    for indicator in battery() {
        let values = indicator.compute(&bars);
        let lookback = indicator.lookback();
        assert!(
            values[..lookback].iter().all(|v| v.is_nan()),
            "{}: value inside warm-up",
            indicator.name()
        );
        assert!(
            values[lookback].is_finite(),
            "{}: no value at index {lookback}",
            indicator.name()
        );
    }
}

#[test]
fn default_battery_lengths_match_input() {
    let bars = synthetic_series(5, 150, 20.0);
    for spec in IndicatorSpec::default_battery() {
        for result in spec.compute(&bars).unwrap() {
            if let Some(values) = result.values() {
                assert_eq!(values.len(), bars.len(), "{}", result.name);
            }
        }
    }
}
