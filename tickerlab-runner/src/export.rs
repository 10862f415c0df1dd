//! Reporting and export: JSON, CSV and Markdown artifacts.
//!
//! - **JSON**: the full [`AnalysisReport`], round-trippable
//! - **CSV**: backtest trade tape, screen table, and the analyzed bars
//! - **Markdown**: a human-readable single-report summary

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tickerlab_core::data::{write_bars_file, DataError};
use tickerlab_core::domain::{Bar, Trade};
use tickerlab_core::risk::PositionSize;
use tickerlab_core::snapshot::SwingCall;

use crate::analysis::AnalysisReport;
use crate::screen::ScreenRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("csv output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(data)?)
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.precision$}"))
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &AnalysisReport) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn import_json(json: &str) -> Result<AnalysisReport, ExportError> {
    Ok(serde_json::from_str(json)?)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: entry_index, entry_date, entry_price, exit_index, exit_date,
/// exit_price, bars_held, profit, profit_pct
pub fn export_trades_csv(trades: &[Trade]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_index",
        "entry_date",
        "entry_price",
        "exit_index",
        "exit_date",
        "exit_price",
        "bars_held",
        "profit",
        "profit_pct",
    ])?;
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    for t in trades {
        wtr.write_record([
            t.entry_index.to_string(),
            date(t.entry_date()),
            format!("{:.4}", t.entry_price),
            t.exit_index.to_string(),
            date(t.exit_date()),
            format!("{:.4}", t.exit_price),
            t.bars_held().to_string(),
            format!("{:.4}", t.profit),
            format!("{:.2}", t.profit_pct),
        ])?;
    }
    finish_csv(wtr)
}

/// Columns: symbol, source, last_close, confidence, swing, rsi, volatility,
/// risk_reward, trades, win_rate, total_profit
pub fn export_screen_csv(rows: &[ScreenRow]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "source",
        "last_close",
        "confidence",
        "swing",
        "rsi",
        "volatility",
        "risk_reward",
        "trades",
        "win_rate",
        "total_profit",
    ])?;
    for r in rows {
        wtr.write_record([
            r.symbol.clone(),
            r.source.to_string(),
            opt(r.last_close, 2),
            format!("{:.3}", r.confidence),
            swing_label(r.swing).to_string(),
            opt(r.rsi, 2),
            opt(r.volatility, 4),
            opt(r.risk_reward, 2),
            r.trades.to_string(),
            format!("{:.1}", r.win_rate),
            format!("{:.2}", r.total_profit),
        ])?;
    }
    finish_csv(wtr)
}

pub fn swing_label(call: SwingCall) -> &'static str {
    match call {
        SwingCall::SwingBuy => "swing buy",
        SwingCall::SwingSell => "swing sell",
        SwingCall::Avoid => "avoid",
        SwingCall::Neutral => "neutral",
    }
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Markdown summary of a single report.
pub fn generate_report(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(2048);
    // Writing into a String cannot fail.
    let _ = write_report(&mut md, report);
    md
}

fn write_report(md: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    writeln!(md, "# {} Analysis\n", report.symbol)?;

    writeln!(md, "## Metadata\n")?;
    writeln!(md, "| Field | Value |")?;
    writeln!(md, "| --- | --- |")?;
    writeln!(md, "| Source | {} |", report.source)?;
    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        writeln!(md, "| Period | {first} to {last} |")?;
    }
    writeln!(md, "| Bars | {} |", report.fingerprint.bar_count)?;
    writeln!(md, "| Last Close | {} |", opt(report.last_close, 2))?;
    writeln!(md, "| Dataset Hash | {} |", report.fingerprint.dataset)?;
    writeln!(md, "| Config Hash | {} |", report.fingerprint.config)?;
    if report.is_synthetic() {
        writeln!(md, "| Data | **SYNTHETIC** |")?;
    }
    writeln!(md)?;

    writeln!(md, "## Swing Score\n")?;
    writeln!(
        md,
        "Confidence **{:.2}**, call: **{}**\n",
        report.confidence,
        swing_label(report.swing)
    )?;

    writeln!(md, "## Levels\n")?;
    if report.levels.is_empty() {
        writeln!(md, "No support or resistance detected.\n")?;
    } else {
        writeln!(md, "| Kind | Price | Strength |")?;
        writeln!(md, "| --- | ---: | ---: |")?;
        for level in report.levels.support.iter().chain(&report.levels.resistance) {
            writeln!(
                md,
                "| {:?} | {:.2} | {:.2} |",
                level.kind, level.price, level.strength
            )?;
        }
        writeln!(md)?;
    }

    if let Some(fib) = &report.retracement {
        writeln!(
            md,
            "## Fibonacci Retracement ({:.2} to {:.2})\n",
            fib.low_anchor, fib.high_anchor
        )?;
        writeln!(md, "| Ratio | Price |")?;
        writeln!(md, "| ---: | ---: |")?;
        for level in &fib.levels {
            let marker = if fib.nearest == Some(*level) { " ◀" } else { "" };
            writeln!(md, "| {:.1}% | {:.2}{marker} |", level.ratio * 100.0, level.price)?;
        }
        writeln!(md)?;
    }

    writeln!(md, "## Risk\n")?;
    match &report.risk {
        Some(risk) => {
            let l = &risk.levels;
            writeln!(md, "| Field | Value |")?;
            writeln!(md, "| --- | --- |")?;
            writeln!(md, "| Direction | {:?} |", l.direction)?;
            writeln!(md, "| Entry | {:.2} |", l.entry)?;
            writeln!(md, "| Stop Loss | {:.2} |", l.stop_loss)?;
            let targets: Vec<String> = l.take_profits.iter().map(|t| format!("{t:.2}")).collect();
            writeln!(md, "| Targets | {} |", targets.join(", "))?;
            writeln!(md, "| Risk/Reward | {} |", opt(l.risk_reward_ratio, 2))?;
            match risk.position {
                PositionSize::Sized { risk_amount, .. } => writeln!(
                    md,
                    "| Position | {} shares (risking {:.2}) |",
                    risk.whole_shares, risk_amount
                )?,
                PositionSize::Undefined { reason } => {
                    writeln!(md, "| Position | undefined ({reason:?}) |")?
                }
            }
            writeln!(md)?;
        }
        None => writeln!(md, "Not enough bars for risk levels.\n")?,
    }

    if !report.dca.levels.is_empty() {
        writeln!(md, "## Averaging Down\n")?;
        writeln!(md, "| Price | Quantity | Cost | Average After |")?;
        writeln!(md, "| ---: | ---: | ---: | ---: |")?;
        for level in &report.dca.levels {
            writeln!(
                md,
                "| {:.2} | {} | {:.2} | {} |",
                level.price,
                level.quantity,
                level.cost,
                opt(level.average_price, 2)
            )?;
        }
        writeln!(md)?;
    }

    let stats = &report.backtest.stats;
    writeln!(md, "## Backtest\n")?;
    writeln!(md, "| Metric | Value |")?;
    writeln!(md, "| --- | ---: |")?;
    writeln!(md, "| Trades | {} |", stats.total_trades)?;
    writeln!(md, "| Win Rate | {:.1}% |", stats.win_rate)?;
    writeln!(md, "| Total Profit | {:.2} |", stats.total_profit)?;
    writeln!(md, "| Average Profit | {:.2} |", stats.average_profit)?;
    writeln!(md, "| Max Drawdown | {:.2}% |", stats.max_drawdown)?;
    writeln!(md, "| Profit Factor | {:.2} |", stats.profit_factor)?;
    if let Some(open) = &report.backtest.open_position {
        writeln!(
            md,
            "\nOpen position from bar {} at {:.2} ({:+.2}% unrealized).",
            open.entry_index, open.entry_price, open.unrealized_pct
        )?;
    }
    Ok(())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the full artifact set for one report.
///
/// Creates `{symbol}_{dataset-hash-prefix}/` under `output_dir` containing
/// `report.json`, `trades.csv`, `bars.csv` and `summary.md`, and returns
/// its path. Re-exporting the same data overwrites the same directory.
pub fn save_artifacts(
    report: &AnalysisReport,
    bars: &[Bar],
    output_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let hash = &report.fingerprint.dataset.0;
    let dirname = format!("{}_{}", report.symbol, &hash[..hash.len().min(12)]);
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir).map_err(io_at(&run_dir))?;

    let write = |name: &str, content: String| {
        let path = run_dir.join(name);
        std::fs::write(&path, content).map_err(io_at(&path))
    };
    write("report.json", export_json(report)?)?;
    write("trades.csv", export_trades_csv(&report.backtest.trades)?)?;
    write("summary.md", generate_report(report))?;
    write_bars_file(&run_dir.join("bars.csv"), bars)?;

    Ok(run_dir)
}

/// Load a report from an artifact directory's `report.json`.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport, ExportError> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path).map_err(io_at(&path))?;
    import_json(&json)
}
