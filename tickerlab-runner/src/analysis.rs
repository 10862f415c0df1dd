//! Single-symbol analysis pass.
//!
//! Runs the configured indicator battery, level detection, retracement,
//! risk levels with sizing, an averaging-down plan, the backtest and the
//! metrics snapshot over one series, and collects everything into an
//! [`AnalysisReport`] tagged with the data source and a fingerprint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickerlab_core::backtest::{run_backtest, BacktestError, BacktestResult};
use tickerlab_core::data::{DataSource, SeriesProvider};
use tickerlab_core::domain::Bar;
use tickerlab_core::fingerprint::Fingerprint;
use tickerlab_core::indicators::{IndicatorResult, IndicatorSpec, SpecError};
use tickerlab_core::levels::{detect_levels, support_levels_for_dca, LevelSet};
use tickerlab_core::retracement::{nearest_level, retracement, retracement_from_swing, FibLevel};
use tickerlab_core::risk::{
    levels_from_bars, plan_dca, position_size, DcaPlan, PositionSize, TradeLevels,
};
use tickerlab_core::snapshot::{classify_swing, swing_confidence, MetricsSnapshot, SwingCall};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::data_loader::{DataLoader, LoadError, SeriesSource};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no bars to analyze for '{symbol}'")]
    NoBars { symbol: String },

    #[error("indicator error: {0}")]
    Indicator(#[from] SpecError),

    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),

    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Load-then-analyze failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Fibonacci levels and the anchors they were drawn between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetracementReport {
    pub low_anchor: f64,
    pub high_anchor: f64,
    /// True when anchored on detected levels, false for the swing low/high.
    pub from_levels: bool,
    pub levels: Vec<FibLevel>,
    pub nearest: Option<FibLevel>,
}

/// Risk levels at the last close and the position they size to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub levels: TradeLevels,
    pub position: PositionSize,
    pub whole_shares: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub source: DataSource,
    pub fingerprint: Fingerprint,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub last_close: Option<f64>,
    pub indicators: Vec<IndicatorResult>,
    pub levels: LevelSet,
    pub retracement: Option<RetracementReport>,
    /// `None` when the series is too short for the volatility window.
    pub risk: Option<RiskReport>,
    pub dca: DcaPlan,
    pub backtest: BacktestResult,
    pub snapshot: MetricsSnapshot,
    pub confidence: f64,
    pub swing: SwingCall,
}

impl AnalysisReport {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }

    /// Latest value of a named indicator output, e.g. `"RSI(14)"`.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators
            .iter()
            .find(|r| r.name == name)
            .and_then(IndicatorResult::latest)
    }
}

/// Compute every output of every spec, in order.
pub fn compute_indicators(
    bars: &[Bar],
    specs: &[IndicatorSpec],
) -> Result<Vec<IndicatorResult>, SpecError> {
    let mut results = Vec::new();
    for spec in specs {
        results.extend(spec.compute(bars)?);
    }
    Ok(results)
}

/// Retracement between the strongest support and resistance, or the
/// series' swing low and high when either side is missing.
pub fn retracement_report(bars: &[Bar], levels: &LevelSet) -> Option<RetracementReport> {
    let (low_anchor, high_anchor, from_levels, fib) = match levels.strongest_pair() {
        Some((support, resistance)) => (
            support.price,
            resistance.price,
            true,
            retracement(support.price, resistance.price),
        ),
        None => {
            let fib = retracement_from_swing(bars, bars.len())?;
            (fib.first()?.price, fib.last()?.price, false, fib)
        }
    };
    let nearest = bars.last().and_then(|b| nearest_level(&fib, b.close));
    Some(RetracementReport {
        low_anchor,
        high_anchor,
        from_levels,
        levels: fib,
        nearest,
    })
}

/// Analyze one already-loaded series.
pub fn analyze(
    symbol: &str,
    bars: &[Bar],
    source: DataSource,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let last = bars.last().ok_or_else(|| AnalysisError::NoBars {
        symbol: symbol.to_string(),
    })?;

    let fingerprint = Fingerprint::new(bars, config)?;
    let indicators = compute_indicators(bars, &config.indicators.battery)?;
    let levels = detect_levels(bars, &config.levels);
    let retracement = retracement_report(bars, &levels);

    let portfolio = &config.portfolio;
    let risk = match levels_from_bars(bars, portfolio.direction, &config.risk) {
        Ok(trade) => {
            let position = position_size(
                portfolio.account,
                config.risk.risk_fraction,
                trade.entry,
                trade.stop_loss,
            );
            Some(RiskReport {
                whole_shares: position.whole_shares(),
                levels: trade,
                position,
            })
        }
        Err(e) => {
            debug!(%symbol, error = %e, "risk levels skipped");
            None
        }
    };

    let dca = plan_dca(
        None,
        &support_levels_for_dca(bars),
        last.close,
        portfolio.dca_funds,
        portfolio.dca_levels,
    );
    let backtest = run_backtest(bars, &config.backtest)?;
    let snapshot = MetricsSnapshot::from_bars(bars);
    let confidence = swing_confidence(&snapshot);
    let swing = classify_swing(&snapshot, confidence);

    info!(
        %symbol,
        bars = bars.len(),
        source = %source,
        trades = backtest.stats.total_trades,
        confidence,
        "analysis complete"
    );

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        source,
        fingerprint,
        first_date: bars.first().and_then(Bar::date),
        last_date: last.date(),
        last_close: Some(last.close).filter(|c| c.is_finite()),
        indicators,
        levels,
        retracement,
        risk,
        dca,
        backtest,
        snapshot,
        confidence,
        swing,
    })
}

/// Load `symbol` through `loader`, then analyze it.
pub fn analyze_symbol<P: SeriesProvider>(
    symbol: &str,
    source: &SeriesSource,
    loader: &DataLoader<P>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, RunError> {
    let loaded = loader.load(symbol, source)?;
    Ok(analyze(&loaded.symbol, &loaded.bars, loaded.source, config)?)
}
