//! End-to-end checks across components on a synthetic series.

use tickerlab_core::backtest::{run_backtest, EntryRule, StrategyParams};
use tickerlab_core::data::{read_bars, synthetic_series, write_bars};
use tickerlab_core::domain::Bar;
use tickerlab_core::fingerprint::dataset_hash;
use tickerlab_core::levels::{detect_levels, support_levels_for_dca, LevelConfig};
use tickerlab_core::retracement::{nearest_level, retracement};
use tickerlab_core::risk::{levels_from_bars, plan_dca, Direction, RiskParams};
use tickerlab_core::snapshot::{classify_swing, swing_confidence, MetricsSnapshot};

#[test]
fn levels_feed_retracement() {
    let bars = synthetic_series(21, 250, 100.0);
    let levels = detect_levels(&bars, &LevelConfig::default());
    let prices: Vec<f64> = levels
        .support
        .iter()
        .chain(&levels.resistance)
        .map(|l| l.price)
        .collect();
    assert!(prices.len() >= 2, "a 250-bar walk has several turning points");
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let fib = retracement(low, high);
    assert_eq!(fib[0].price, low);
    assert!((fib[6].price - high).abs() < 1e-9);
    assert!(fib.iter().all(|f| f.price >= low && f.price <= high + 1e-9));

    let midpoint = (low + high) / 2.0;
    let nearest = nearest_level(&fib, midpoint).unwrap();
    assert_eq!(nearest.ratio, 0.5);
}

#[test]
fn backtest_is_idempotent() {
    let bars = synthetic_series(99, 500, 40.0);
    for entry in [EntryRule::MaCrossover, EntryRule::Breakout] {
        let params = StrategyParams {
            entry,
            ..StrategyParams::default()
        };
        let first = run_backtest(&bars, &params).unwrap();
        let second = run_backtest(&bars, &params).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(first.stats.total_trades, first.trades.len());
        assert!((0.0..=100.0).contains(&first.stats.win_rate));
    }
}

#[test]
fn trade_fills_follow_their_trigger_bar() {
    let bars = synthetic_series(5, 400, 60.0);
    let result = run_backtest(&bars, &StrategyParams::default()).unwrap();
    for trade in &result.trades {
        assert!(trade.entry_index > StrategyParams::default().ma_period);
        assert!(trade.exit_index > trade.entry_index);
        assert_eq!(trade.entry_price, bars[trade.entry_index].close);
        assert_eq!(trade.exit_price, bars[trade.exit_index].close);
    }
}

#[test]
fn risk_and_dca_on_real_shaped_data() {
    let bars = synthetic_series(8, 120, 30.0);
    let levels = levels_from_bars(&bars, Direction::Long, &RiskParams::default()).unwrap();
    assert!(levels.stop_loss < levels.entry);
    assert!(levels.take_profits.iter().all(|tp| *tp > levels.entry));
    let rrr = levels.risk_reward_ratio.unwrap();
    assert!((rrr - 2.0).abs() < 1e-9);

    let current = bars.last().map(|b| b.close).unwrap();
    let supports = support_levels_for_dca(&bars);
    let plan = plan_dca(None, &supports, current, 10_000.0, 3);
    assert_eq!(plan.levels.len(), 3);
    assert!(plan.levels.iter().all(|l| l.price < current));
    assert!(plan.total_cost <= 10_000.0);
}

#[test]
fn snapshot_confidence_is_a_unit_score() {
    let bars = synthetic_series(13, 300, 75.0);
    let snapshot = MetricsSnapshot::from_bars(&bars);
    let confidence = swing_confidence(&snapshot);
    assert!((0.0..=1.0).contains(&confidence));
    // classification is a pure function of its inputs
    assert_eq!(
        classify_swing(&snapshot, confidence),
        classify_swing(&snapshot, confidence)
    );
}

#[test]
fn csv_export_preserves_dataset_hash() {
    let bars = synthetic_series(2, 60, 12.0);
    let mut buf = Vec::new();
    write_bars(&mut buf, &bars).unwrap();
    let back: Vec<Bar> = read_bars(buf.as_slice()).unwrap();
    assert_eq!(dataset_hash(&back), dataset_hash(&bars));
}
