//! Trade: a closed round trip produced by the backtest engine.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// A completed long round trip: entry fill → exit fill.
///
/// Fills happen at the close of the bar after the one that triggered them,
/// so `entry_index`/`exit_index` are the fill bars, not the trigger bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_index: usize,
    pub entry_timestamp: i64,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_timestamp: i64,
    pub exit_price: f64,

    // ── PnL (per share) ──
    pub profit: f64,
    /// Profit as a percentage of the entry price (2.5 = +2.5%).
    pub profit_pct: f64,
}

impl Trade {
    pub fn new(
        entry_index: usize,
        entry_timestamp: i64,
        entry_price: f64,
        exit_index: usize,
        exit_timestamp: i64,
        exit_price: f64,
    ) -> Self {
        let profit = exit_price - entry_price;
        let profit_pct = if entry_price == 0.0 {
            0.0
        } else {
            profit / entry_price * 100.0
        };
        Self {
            entry_index,
            entry_timestamp,
            entry_price,
            exit_index,
            exit_timestamp,
            exit_price,
            profit,
            profit_pct,
        }
    }

    pub fn entry_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.entry_timestamp, 0).map(|dt| dt.date_naive())
    }

    pub fn exit_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.exit_timestamp, 0).map(|dt| dt.date_naive())
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }

    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }
}
