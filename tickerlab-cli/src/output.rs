//! Human-readable terminal output.

use serde::Serialize;
use tickerlab_core::backtest::BacktestResult;
use tickerlab_core::indicators::IndicatorResult;
use tickerlab_core::levels::{LevelSet, PriceLevel};
use tickerlab_core::risk::{DcaPlan, PositionSize, TradeLevels};
use tickerlab_core::snapshot::{Fundamentals, InvestmentCall};
use tickerlab_runner::analysis::RetracementReport;
use tickerlab_runner::export::swing_label;
use tickerlab_runner::{AnalysisReport, LoadedSeries, ScreenOutcome};

fn value(v: Option<f64>, precision: usize) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

fn header(title: &str, loaded: &LoadedSeries) {
    println!();
    println!("=== {title}: {} ===", loaded.symbol);
    println!(
        "Source: {}  Bars: {}  Last: {}",
        loaded.source,
        loaded.bars.len(),
        value(loaded.bars.last().map(|b| b.close), 2)
    );
    println!();
}

pub fn print_indicators(loaded: &LoadedSeries, results: &[IndicatorResult]) {
    header("Indicators", loaded);
    let width = results.iter().map(|r| r.name.len()).max().unwrap_or(0).max(10);
    for r in results {
        println!("{:<width$}  {:>14}", r.name, value(r.latest(), 4));
    }
    println!();
}

fn print_level_rows(title: &str, levels: &[PriceLevel]) {
    println!("{title}:");
    if levels.is_empty() {
        println!("  (none)");
    }
    for level in levels {
        println!("  {:>10.2}  strength {:.2}", level.price, level.strength);
    }
}

pub fn print_levels(loaded: &LoadedSeries, levels: &LevelSet) {
    header("Levels", loaded);
    print_level_rows("Resistance", &levels.resistance);
    print_level_rows("Support", &levels.support);
    println!();
}

pub fn print_retracement(fib: &RetracementReport) {
    println!();
    println!(
        "=== Fibonacci Retracement {:.2} → {:.2} ===",
        fib.low_anchor, fib.high_anchor
    );
    if fib.from_levels {
        println!("Anchored on strongest support and resistance");
    }
    for level in &fib.levels {
        let marker = if fib.nearest == Some(*level) { "  ◀ nearest" } else { "" };
        println!("  {:>5.1}%  {:>10.2}{marker}", level.ratio * 100.0, level.price);
    }
    println!();
}

/// Risk output: levels plus the position they size to.
#[derive(Serialize)]
pub struct RiskView<'a> {
    pub symbol: &'a str,
    pub account: f64,
    pub levels: &'a TradeLevels,
    pub position: PositionSize,
}

pub fn print_risk(view: &RiskView<'_>) {
    let l = view.levels;
    println!();
    println!("=== Risk: {} ({:?}) ===", view.symbol, l.direction);
    println!("Entry:          {:.2}", l.entry);
    println!("Stop Loss:      {:.2}", l.stop_loss);
    for (i, target) in l.take_profits.iter().enumerate() {
        println!("Target {}:       {:.2}", i + 1, target);
    }
    println!("Risk/Reward:    {}", value(l.risk_reward_ratio, 2));
    match view.position {
        PositionSize::Sized {
            shares,
            risk_amount,
            risk_per_share,
        } => {
            println!("Account:        {:.2}", view.account);
            println!("Risk Amount:    {risk_amount:.2}");
            println!("Risk/Share:     {risk_per_share:.4}");
            println!(
                "Shares:         {} ({shares:.2} exact)",
                view.position.whole_shares()
            );
        }
        PositionSize::Undefined { reason } => {
            println!("Shares:         undefined ({reason:?})");
        }
    }
    println!();
}

/// Investment output: the call plus the inputs it was scored on.
#[derive(Serialize)]
pub struct InvestmentView<'a> {
    pub symbol: &'a str,
    pub call: InvestmentCall,
    pub confidence: f64,
    pub fundamentals: &'a Fundamentals,
}

pub fn print_investment(view: &InvestmentView<'_>) {
    let call = match view.call {
        InvestmentCall::StrongBuy => "Strong Buy",
        InvestmentCall::Buy => "Buy",
        InvestmentCall::Hold => "Hold",
        InvestmentCall::Sell => "Sell",
    };
    let f = view.fundamentals;
    println!();
    println!("=== Investment: {} ===", view.symbol);
    println!("Call:           {call} (confidence {:.2})", view.confidence);
    println!("P/E:            {}", value(f.pe_ratio, 2));
    println!("Dividend Yield: {}%", value(f.dividend_yield, 2));
    println!("Market Cap:     {}", value(f.market_cap, 0));
    println!("Beta:           {}", value(f.beta, 2));
    println!("Profit Margin:  {}", value(f.profit_margin, 3));
    println!("Debt/Equity:    {}", value(f.debt_to_equity, 2));
    println!("Current Ratio:  {}", value(f.current_ratio, 2));
    println!("EPS:            {}", value(f.eps, 2));
    println!("Revenue Growth: {}", value(f.revenue_growth, 3));
    println!("Free Cash Flow: {}", value(f.free_cash_flow, 0));
    println!();
}

pub fn print_dca(loaded: &LoadedSeries, plan: &DcaPlan) {
    header("Averaging Down", loaded);
    if plan.levels.is_empty() {
        println!("No plan (check funds, level count and last close).");
        println!();
        return;
    }
    println!("{:>10}  {:>8}  {:>12}  {:>12}", "Price", "Qty", "Cost", "Avg After");
    println!("{}", "-".repeat(48));
    for level in &plan.levels {
        println!(
            "{:>10.2}  {:>8}  {:>12.2}  {:>12}",
            level.price,
            level.quantity,
            level.cost,
            value(level.average_price, 2)
        );
    }
    println!("{}", "-".repeat(48));
    println!(
        "Total: {} shares for {:.2}, final average {}",
        plan.total_quantity,
        plan.total_cost,
        value(plan.final_average, 2)
    );
    println!();
}

pub fn print_backtest(loaded: &LoadedSeries, result: &BacktestResult) {
    header("Backtest", loaded);
    let p = &result.params;
    println!(
        "Rule: {:?}, MA {}  TP {:.2}%  SL {:.2}%",
        p.entry, p.ma_period, p.take_profit_pct, p.stop_loss_pct
    );
    let s = &result.stats;
    println!("Trades:         {}", s.total_trades);
    println!("Win/Loss:       {}/{}", s.winning_trades, s.losing_trades);
    println!("Win Rate:       {:.1}%", s.win_rate);
    println!("Total Profit:   {:.2}", s.total_profit);
    println!("Avg Profit:     {:.2}", s.average_profit);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown);
    println!("Profit Factor:  {:.2}", s.profit_factor);
    if let Some(open) = &result.open_position {
        println!(
            "Open:           since bar {} at {:.2} ({:+.2}%)",
            open.entry_index, open.entry_price, open.unrealized_pct
        );
    }
    println!();
}

pub fn print_report(report: &AnalysisReport) {
    println!();
    println!("=== Analysis: {} ===", report.symbol);
    println!(
        "Source: {}  Bars: {}  Last: {}",
        report.source,
        report.fingerprint.bar_count,
        value(report.last_close, 2)
    );
    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        println!("Period: {first} to {last}");
    }
    println!();
    println!(
        "Swing: {} (confidence {:.2})",
        swing_label(report.swing),
        report.confidence
    );
    let s = &report.snapshot;
    println!(
        "RSI {}  MACD {}  ATR {}  ADX {}  Volatility {}",
        value(s.rsi, 1),
        value(s.macd, 3),
        value(s.atr, 2),
        value(s.adx, 1),
        value(s.volatility, 4)
    );
    println!();
    print_level_rows("Resistance", &report.levels.resistance);
    print_level_rows("Support", &report.levels.support);
    if let Some(fib) = &report.retracement {
        if let Some(nearest) = fib.nearest {
            println!(
                "Nearest Fibonacci level: {:.1}% at {:.2}",
                nearest.ratio * 100.0,
                nearest.price
            );
        }
    }
    match &report.risk {
        Some(risk) => println!(
            "Risk: stop {:.2}, target {:.2}, R/R {}, {} shares",
            risk.levels.stop_loss,
            risk.levels.take_profit,
            value(risk.levels.risk_reward_ratio, 2),
            risk.whole_shares
        ),
        None => println!("Risk: not enough bars"),
    }
    let stats = &report.backtest.stats;
    println!(
        "Backtest: {} trades, {:.1}% wins, profit {:.2}, PF {:.2}",
        stats.total_trades, stats.win_rate, stats.total_profit, stats.profit_factor
    );
    if report.is_synthetic() {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

pub fn print_screen(outcome: &ScreenOutcome) {
    println!();
    println!(
        "{:<8} {:>10} {:>6} {:<11} {:>6} {:>6} {:>7} {:>9}",
        "Symbol", "Last", "Conf", "Call", "RSI", "R/R", "Trades", "Win%"
    );
    println!("{}", "-".repeat(72));
    for r in &outcome.rows {
        println!(
            "{:<8} {:>10} {:>6.2} {:<11} {:>6} {:>6} {:>7} {:>8.1}%",
            r.symbol,
            value(r.last_close, 2),
            r.confidence,
            swing_label(r.swing),
            value(r.rsi, 1),
            value(r.risk_reward, 2),
            r.trades,
            r.win_rate
        );
    }
    for failure in &outcome.failures {
        eprintln!("Error for {}: {}", failure.symbol, failure.error);
    }
    println!();
}
