//! Backtest Engine: replays a single-position, long-only rule over a series.
//!
//! Two states per run, Flat and InPosition:
//!
//! 1. Flat: the entry rule is checked at bar `i`; a hit fills at `close[i+1]`
//! 2. InPosition: the move from entry to `close[i+1]` is checked against the
//!    take-profit and stop-loss percentages; a hit closes the trade there
//!
//! A position still open at the end of the series is reported separately and
//! never counted in [`BacktestStats`]. Runs are deterministic: identical
//! inputs give identical [`BacktestResult`]s.

pub mod engine;
pub mod stats;
pub mod strategy;

pub use engine::{run_backtest, BacktestResult, OpenPosition};
pub use stats::{max_drawdown, profit_factor, BacktestStats};
pub use strategy::{EntryRule, StrategyParams};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BacktestError {
    #[error("invalid strategy parameter: {0}")]
    InvalidParameter(String),
}
