//! Bar loop and position state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backtest::strategy::EntrySignal;
use crate::backtest::{BacktestError, BacktestStats, StrategyParams};
use crate::domain::{closes, Bar, Trade};

/// A position still held when the series ended. Not part of the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_timestamp: i64,
    pub entry_price: f64,
    pub last_price: f64,
    pub unrealized_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub params: StrategyParams,
    pub trades: Vec<Trade>,
    pub open_position: Option<OpenPosition>,
    pub stats: BacktestStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PositionState {
    Flat,
    InPosition {
        entry_index: usize,
        entry_price: f64,
    },
}

fn change_pct(entry: f64, price: f64) -> f64 {
    if entry == 0.0 {
        0.0
    } else {
        (price - entry) / entry * 100.0
    }
}

/// Replay `params` over `bars`.
///
/// Bars `ma_period..n-1` are evaluated; every decision taken at bar `i` fills
/// at `close[i + 1]`. A series too short for a single decision returns an
/// empty result.
pub fn run_backtest(bars: &[Bar], params: &StrategyParams) -> Result<BacktestResult, BacktestError> {
    params.validate()?;

    let closes = closes(bars);
    let n = closes.len();
    let signal = EntrySignal::new(params, &closes);
    let mut state = PositionState::Flat;
    let mut trades = Vec::new();

    for i in params.ma_period..n.saturating_sub(1) {
        let next = closes[i + 1];
        state = match state {
            PositionState::Flat => {
                if signal.fires(&closes, i) {
                    debug!(bar = i, price = next, "entry");
                    PositionState::InPosition {
                        entry_index: i + 1,
                        entry_price: next,
                    }
                } else {
                    PositionState::Flat
                }
            }
            PositionState::InPosition {
                entry_index,
                entry_price,
            } => {
                let pct = change_pct(entry_price, next);
                if pct >= params.take_profit_pct || pct <= -params.stop_loss_pct {
                    let trade = Trade::new(
                        entry_index,
                        bars[entry_index].timestamp,
                        entry_price,
                        i + 1,
                        bars[i + 1].timestamp,
                        next,
                    );
                    debug!(bar = i, price = next, profit_pct = trade.profit_pct, "exit");
                    trades.push(trade);
                    PositionState::Flat
                } else {
                    state
                }
            }
        };
    }

    let open_position = match state {
        PositionState::Flat => None,
        PositionState::InPosition {
            entry_index,
            entry_price,
        } => {
            let last_price = closes[n - 1];
            Some(OpenPosition {
                entry_index,
                entry_timestamp: bars[entry_index].timestamp,
                entry_price,
                last_price,
                unrealized_pct: change_pct(entry_price, last_price),
            })
        }
    };

    let stats = BacktestStats::compute(&trades);
    debug!(
        trades = stats.total_trades,
        open = open_position.is_some(),
        "backtest complete"
    );

    Ok(BacktestResult {
        params: params.clone(),
        trades,
        open_position,
        stats,
    })
}
