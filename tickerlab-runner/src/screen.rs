//! Multi-symbol screening.
//!
//! Each symbol is loaded and analyzed independently on the rayon pool. A
//! symbol that fails to load or analyze is reported as a failure and never
//! aborts the rest of the screen.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tickerlab_core::data::{DataSource, SeriesProvider};
use tickerlab_core::snapshot::SwingCall;
use tracing::warn;

use crate::analysis::{analyze_symbol, AnalysisReport};
use crate::config::AnalysisConfig;
use crate::data_loader::{DataLoader, SeriesSource};

/// One line of a screen: the headline numbers of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRow {
    pub symbol: String,
    pub source: DataSource,
    pub last_close: Option<f64>,
    pub confidence: f64,
    pub swing: SwingCall,
    pub rsi: Option<f64>,
    pub volatility: Option<f64>,
    pub risk_reward: Option<f64>,
    pub trades: usize,
    pub win_rate: f64,
    pub total_profit: f64,
}

impl ScreenRow {
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            symbol: report.symbol.clone(),
            source: report.source,
            last_close: report.last_close,
            confidence: report.confidence,
            swing: report.swing,
            rsi: report.snapshot.rsi,
            volatility: report.snapshot.volatility,
            risk_reward: report
                .risk
                .as_ref()
                .and_then(|r| r.levels.risk_reward_ratio),
            trades: report.backtest.stats.total_trades,
            win_rate: report.backtest.stats.win_rate,
            total_profit: report.backtest.stats.total_profit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenOutcome {
    /// Ranked by confidence, highest first.
    pub rows: Vec<ScreenRow>,
    pub failures: Vec<ScreenFailure>,
}

impl ScreenOutcome {
    pub fn by_call(&self, call: SwingCall) -> impl Iterator<Item = &ScreenRow> {
        self.rows.iter().filter(move |r| r.swing == call)
    }
}

/// Confidence descending, symbol ascending on ties.
pub fn rank_rows(rows: &mut [ScreenRow]) {
    rows.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

/// Analyze every symbol in parallel and rank the results.
///
/// `source` applies to every symbol; a CSV source only makes sense for a
/// single symbol and is rejected by the caller.
pub fn screen<P: SeriesProvider>(
    symbols: &[String],
    source: &SeriesSource,
    loader: &DataLoader<P>,
    config: &AnalysisConfig,
) -> ScreenOutcome {
    let results: Vec<(String, Result<AnalysisReport, String>)> = symbols
        .par_iter()
        .map(|symbol| {
            let result = analyze_symbol(symbol, source, loader, config).map_err(|e| e.to_string());
            (symbol.clone(), result)
        })
        .collect();

    let mut outcome = ScreenOutcome::default();
    for (symbol, result) in results {
        match result {
            Ok(report) => outcome.rows.push(ScreenRow::from_report(&report)),
            Err(error) => {
                warn!(%symbol, %error, "screen: symbol skipped");
                outcome.failures.push(ScreenFailure { symbol, error });
            }
        }
    }
    rank_rows(&mut outcome.rows);
    outcome
}
