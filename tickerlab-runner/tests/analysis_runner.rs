//! Integration tests for the runner: config → load → analyze → screen → export.
//!
//! The fixture is a 130-bar daily series with a `Date` column, read through
//! the CSV source the same way `--csv` does.

use std::path::PathBuf;

use proptest::prelude::*;
use tickerlab_core::data::{DataSource, YahooProvider};
use tickerlab_core::fingerprint::dataset_hash;
use tickerlab_runner::export::{export_screen_csv, load_artifacts, save_artifacts};
use tickerlab_runner::screen::rank_rows;
use tickerlab_runner::{
    analyze_symbol, screen, AnalysisConfig, DataLoader, DataSection, ScreenRow, SeriesSource,
};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/daily_130.csv")
}

fn offline_loader() -> DataLoader<YahooProvider> {
    DataLoader::offline(DataSection::default())
}

#[test]
fn csv_fixture_analyzes_end_to_end() {
    let config = AnalysisConfig::default();
    let loader = offline_loader();
    let source = SeriesSource::Csv(fixture());

    let report = analyze_symbol("aapl", &source, &loader, &config).unwrap();
    assert_eq!(report.symbol, "AAPL");
    assert_eq!(report.source, DataSource::CsvImport);
    assert_eq!(report.fingerprint.bar_count, 130);
    assert_eq!(
        report.first_date.map(|d| d.to_string()).as_deref(),
        Some("2024-01-02")
    );

    // Realistic prices survive the import untouched.
    let close = report.last_close.unwrap();
    assert!(close > 100.0 && close < 300.0, "close {close}");

    let risk = report.risk.as_ref().expect("130 bars cover the ATR window");
    let rrr = risk.levels.risk_reward_ratio.unwrap();
    assert!((rrr - 2.0).abs() < 1e-9);
    assert!(risk.whole_shares > 0);
}

#[test]
fn config_changes_the_fingerprint_but_not_the_dataset_hash() {
    let loader = offline_loader();
    let source = SeriesSource::Csv(fixture());

    let base = AnalysisConfig::default();
    let tuned = AnalysisConfig::from_toml("[backtest]\nma_period = 10\n").unwrap();

    let a = analyze_symbol("AAPL", &source, &loader, &base).unwrap();
    let b = analyze_symbol("AAPL", &source, &loader, &tuned).unwrap();
    assert_eq!(a.fingerprint.dataset, b.fingerprint.dataset);
    assert_ne!(a.fingerprint.config, b.fingerprint.config);
}

#[test]
fn screen_then_export() {
    let config = AnalysisConfig::default();
    let loader = offline_loader();
    let symbols: Vec<String> = ["SPY", "QQQ", "IWM"].iter().map(|s| s.to_string()).collect();

    let outcome = screen(&symbols, &SeriesSource::Synthetic, &loader, &config);
    assert_eq!(outcome.rows.len(), 3);

    let csv = export_screen_csv(&outcome.rows).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().skip(1).all(|l| l.contains(",synthetic,")));
}

#[test]
fn artifacts_record_the_analyzed_data() {
    let config = AnalysisConfig::default();
    let loader = offline_loader();
    let loaded = loader
        .load("MSFT", &SeriesSource::Csv(fixture()))
        .unwrap();
    let report =
        tickerlab_runner::analyze(&loaded.symbol, &loaded.bars, loaded.source, &config).unwrap();

    let out = tempfile::tempdir().unwrap();
    let dir = save_artifacts(&report, &loaded.bars, out.path()).unwrap();
    assert!(dir.file_name().unwrap().to_string_lossy().starts_with("MSFT_"));

    let back = load_artifacts(&dir).unwrap();
    assert_eq!(back.fingerprint.dataset, dataset_hash(&loaded.bars));
    assert_eq!(back.swing, report.swing);
}

fn row(symbol: String, confidence: f64) -> ScreenRow {
    ScreenRow {
        symbol,
        source: DataSource::Synthetic,
        last_close: None,
        confidence,
        swing: tickerlab_core::snapshot::SwingCall::Neutral,
        rsi: None,
        volatility: None,
        risk_reward: None,
        trades: 0,
        win_rate: 0.0,
        total_profit: 0.0,
    }
}

proptest! {
    #[test]
    fn ranking_is_sorted_and_complete(
        entries in prop::collection::vec(("[A-Z]{1,4}", 0.0..=1.0_f64), 0..30)
    ) {
        let mut rows: Vec<ScreenRow> =
            entries.iter().cloned().map(|(s, c)| row(s, c)).collect();
        rank_rows(&mut rows);
        prop_assert_eq!(rows.len(), entries.len());
        for pair in rows.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
            if pair[0].confidence == pair[1].confidence {
                prop_assert!(pair[0].symbol <= pair[1].symbol);
            }
        }
    }
}
