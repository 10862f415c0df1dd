//! TickerLab CLI: technical analysis of a single series or a watchlist.
//!
//! Commands:
//! - `analyze`: every component at once, optionally saved as artifacts
//! - `indicators`, `levels`, `fib`, `risk`, `dca`, `backtest`: one component each
//! - `alert`: check price thresholds against the last close
//! - `invest`: score company fundamentals for a long-term position
//! - `screen`: rank many symbols by swing confidence, in parallel
//!
//! Series come from `--csv <file>`, `--synthetic`, or Yahoo Finance with
//! `--interval`/`--range`. `--json` switches every command to JSON output.

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tickerlab_core::alerts::{evaluate_alerts, AlertCondition, PriceAlert};
use tickerlab_core::backtest::{run_backtest, EntryRule};
use tickerlab_core::data::{DataSource, Interval, Range};
use tickerlab_core::levels::{detect_levels, support_levels_for_dca};
use tickerlab_core::retracement::retracement;
use tickerlab_core::risk::{
    levels_from_bars, plan_dca, position_size, trade_levels, Direction, Holding,
};
use tickerlab_core::snapshot::{classify_investment, investment_confidence, Fundamentals};
use tickerlab_runner::analysis::{compute_indicators, retracement_report, RetracementReport};
use tickerlab_runner::export::{export_screen_csv, export_trades_csv, save_artifacts};
use tickerlab_runner::{
    analyze, screen, AnalysisConfig, DataLoader, DataSection, LoadedSeries, SeriesSource,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "tickerlab",
    about = "TickerLab CLI: indicators, levels, risk and backtests for stock series"
)]
struct Cli {
    /// Analysis config (TOML). Defaults apply to anything it omits.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the series for a symbol comes from.
#[derive(Args, Clone)]
struct SeriesArgs {
    /// Read bars from a CSV file instead of downloading.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use a seeded synthetic series.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Fall back to synthetic data when the download fails.
    #[arg(long, default_value_t = false)]
    fallback: bool,

    /// Bar interval (1m, 5m, 15m, 30m, 1h, 1d, 1wk, 1mo, 3mo).
    #[arg(long)]
    interval: Option<Interval>,

    /// History range (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, max).
    #[arg(long)]
    range: Option<Range>,
}

impl SeriesArgs {
    fn source(&self) -> SeriesSource {
        match (&self.csv, self.synthetic) {
            (Some(path), _) => SeriesSource::Csv(path.clone()),
            (None, true) => SeriesSource::Synthetic,
            (None, false) => SeriesSource::Remote,
        }
    }

    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(interval) = self.interval {
            config.data.interval = interval;
        }
        if let Some(range) = self.range {
            config.data.range = range;
        }
        config.data.synthetic_fallback |= self.fallback;
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Long,
    Short,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Long => Direction::Long,
            DirectionArg::Short => Direction::Short,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EntryRuleArg {
    MaCrossover,
    Breakout,
}

impl From<EntryRuleArg> for EntryRule {
    fn from(arg: EntryRuleArg) -> Self {
        match arg {
            EntryRuleArg::MaCrossover => EntryRule::MaCrossover,
            EntryRuleArg::Breakout => EntryRule::Breakout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run every analysis component on one symbol.
    Analyze {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
        /// Save report.json, trades.csv, bars.csv and summary.md here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Latest value of every indicator in the configured battery.
    Indicators {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Support and resistance levels.
    Levels {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Fibonacci retracement, from explicit anchors or detected levels.
    Fib {
        /// Symbol to anchor on (not needed with --low and --high).
        symbol: Option<String>,
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long, requires = "high")]
        low: Option<f64>,
        #[arg(long, requires = "low")]
        high: Option<f64>,
    },
    /// Stop, targets and position size.
    Risk {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        /// Account size; defaults to the config's portfolio.account.
        #[arg(long)]
        account: Option<f64>,
        /// Explicit stop; sizes against the last close instead of volatility levels.
        #[arg(long)]
        stop: Option<f64>,
    },
    /// Averaging-down plan below the last close.
    Dca {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long)]
        funds: Option<f64>,
        #[arg(long)]
        levels: Option<usize>,
        /// Average price of an existing position.
        #[arg(long, requires = "quantity")]
        avg_price: Option<f64>,
        /// Share count of an existing position.
        #[arg(long, requires = "avg_price")]
        quantity: Option<u64>,
    },
    /// Replay the entry/exit rule over the series.
    Backtest {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long, value_enum)]
        entry: Option<EntryRuleArg>,
        #[arg(long)]
        ma_period: Option<usize>,
        #[arg(long)]
        take_profit: Option<f64>,
        #[arg(long)]
        stop_loss: Option<f64>,
        /// Write the trade tape as CSV.
        #[arg(long)]
        trades_csv: Option<PathBuf>,
    },
    /// Check price thresholds against the last close.
    Alert {
        symbol: String,
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long)]
        above: Vec<f64>,
        #[arg(long)]
        below: Vec<f64>,
    },
    /// Score fundamentals for a long-term investment.
    Invest {
        symbol: String,
        #[command(flatten)]
        fundamentals: FundamentalsArgs,
    },
    /// Rank symbols by swing confidence. Uses the config watchlist when empty.
    Screen {
        symbols: Vec<String>,
        #[command(flatten)]
        series: SeriesArgs,
        /// Write the ranked table as CSV.
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
}

/// Fundamentals as flags; omitted ones score 0.
#[derive(Args, Clone)]
struct FundamentalsArgs {
    #[arg(long)]
    pe: Option<f64>,
    /// Dividend yield in percent.
    #[arg(long)]
    dividend_yield: Option<f64>,
    #[arg(long)]
    market_cap: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    beta: Option<f64>,
    /// Profit margin as a fraction.
    #[arg(long, allow_hyphen_values = true)]
    profit_margin: Option<f64>,
    #[arg(long)]
    debt_to_equity: Option<f64>,
    #[arg(long)]
    current_ratio: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    eps: Option<f64>,
    /// Year-over-year revenue growth as a fraction.
    #[arg(long, allow_hyphen_values = true)]
    revenue_growth: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    free_cash_flow: Option<f64>,
}

impl From<FundamentalsArgs> for Fundamentals {
    fn from(a: FundamentalsArgs) -> Self {
        Fundamentals {
            pe_ratio: a.pe,
            dividend_yield: a.dividend_yield,
            market_cap: a.market_cap,
            beta: a.beta,
            profit_margin: a.profit_margin,
            debt_to_equity: a.debt_to_equity,
            current_ratio: a.current_ratio,
            eps: a.eps,
            revenue_growth: a.revenue_growth,
            free_cash_flow: a.free_cash_flow,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "tickerlab=debug,tickerlab_core=debug,tickerlab_runner=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    tracing::debug!(path = ?cli.config, "configuration loaded");
    let json = cli.json;

    match cli.command {
        Commands::Analyze {
            symbol,
            series,
            output_dir,
        } => {
            series.apply(&mut config);
            let loaded = load(&symbol, &series, &config)?;
            let report = analyze(&loaded.symbol, &loaded.bars, loaded.source, &config)?;
            emit(json, &report, || output::print_report(&report))?;
            if let Some(dir) = output_dir {
                let run_dir = save_artifacts(&report, &loaded.bars, &dir)?;
                eprintln!("Artifacts saved to: {}", run_dir.display());
            }
        }
        Commands::Indicators { symbol, series } => {
            series.apply(&mut config);
            let loaded = load(&symbol, &series, &config)?;
            let results = compute_indicators(&loaded.bars, &config.indicators.battery)?;
            emit(json, &results, || output::print_indicators(&loaded, &results))?;
        }
        Commands::Levels { symbol, series } => {
            series.apply(&mut config);
            let loaded = load(&symbol, &series, &config)?;
            let levels = detect_levels(&loaded.bars, &config.levels);
            emit(json, &levels, || output::print_levels(&loaded, &levels))?;
        }
        Commands::Fib {
            symbol,
            series,
            low,
            high,
        } => {
            let report = match (low, high, symbol) {
                (Some(low), Some(high), _) => RetracementReport {
                    low_anchor: low,
                    high_anchor: high,
                    from_levels: false,
                    nearest: None,
                    levels: retracement(low, high),
                },
                (_, _, Some(symbol)) => {
                    series.apply(&mut config);
                    let loaded = load(&symbol, &series, &config)?;
                    let levels = detect_levels(&loaded.bars, &config.levels);
                    retracement_report(&loaded.bars, &levels)
                        .with_context(|| format!("no retracement for {}", loaded.symbol))?
                }
                _ => bail!("give a symbol, or both --low and --high"),
            };
            emit(json, &report, || output::print_retracement(&report))?;
        }
        Commands::Risk {
            symbol,
            series,
            direction,
            account,
            stop,
        } => {
            series.apply(&mut config);
            let loaded = load(&symbol, &series, &config)?;
            let direction = direction.map_or(config.portfolio.direction, Direction::from);
            let account = account.unwrap_or(config.portfolio.account);
            let levels = match stop {
                Some(stop) => {
                    let entry = last_close(&loaded)?;
                    let distance = (entry - stop).abs() / config.risk.stop_multiplier;
                    trade_levels(entry, distance, direction, &config.risk)
                }
                None => levels_from_bars(&loaded.bars, direction, &config.risk)?,
            };
            let size = position_size(
                account,
                config.risk.risk_fraction,
                levels.entry,
                levels.stop_loss,
            );
            let risk = output::RiskView {
                symbol: &loaded.symbol,
                account,
                levels: &levels,
                position: size,
            };
            emit(json, &risk, || output::print_risk(&risk))?;
        }
        Commands::Dca {
            symbol,
            series,
            funds,
            levels,
            avg_price,
            quantity,
        } => {
            series.apply(&mut config);
            let loaded = load(&symbol, &series, &config)?;
            let holding = avg_price
                .zip(quantity)
                .map(|(price, quantity)| Holding { price, quantity });
            let plan = plan_dca(
                holding,
                &support_levels_for_dca(&loaded.bars),
                last_close(&loaded)?,
                funds.unwrap_or(config.portfolio.dca_funds),
                levels.unwrap_or(config.portfolio.dca_levels),
            );
            emit(json, &plan, || output::print_dca(&loaded, &plan))?;
        }
        Commands::Backtest {
            symbol,
            series,
            entry,
            ma_period,
            take_profit,
            stop_loss,
            trades_csv,
        } => {
            series.apply(&mut config);
            let params = &mut config.backtest;
            if let Some(entry) = entry {
                params.entry = entry.into();
            }
            if let Some(period) = ma_period {
                params.ma_period = period;
            }
            if let Some(pct) = take_profit {
                params.take_profit_pct = pct;
            }
            if let Some(pct) = stop_loss {
                params.stop_loss_pct = pct;
            }
            let loaded = load(&symbol, &series, &config)?;
            let result = run_backtest(&loaded.bars, &config.backtest)?;
            emit(json, &result, || output::print_backtest(&loaded, &result))?;
            if let Some(path) = trades_csv {
                std::fs::write(&path, export_trades_csv(&result.trades)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
        Commands::Alert {
            symbol,
            series,
            above,
            below,
        } => {
            if above.is_empty() && below.is_empty() {
                bail!("give at least one --above or --below threshold");
            }
            series.apply(&mut config);
            let loaded = load(&symbol, &series, &config)?;
            let mut alerts: Vec<PriceAlert> = above
                .iter()
                .map(|&t| PriceAlert::new(&loaded.symbol, AlertCondition::Above, t))
                .chain(
                    below
                        .iter()
                        .map(|&t| PriceAlert::new(&loaded.symbol, AlertCondition::Below, t)),
                )
                .collect();
            let events = evaluate_alerts(&mut alerts, last_close(&loaded)?);
            emit(json, &events, || {
                if events.is_empty() {
                    println!("No alerts triggered for {}.", loaded.symbol);
                }
                for event in &events {
                    println!("{event}");
                }
            })?;
        }
        Commands::Invest {
            symbol,
            fundamentals,
        } => {
            let fundamentals = Fundamentals::from(fundamentals);
            let confidence = investment_confidence(&fundamentals);
            let view = output::InvestmentView {
                symbol: &symbol,
                call: classify_investment(&fundamentals, confidence),
                confidence,
                fundamentals: &fundamentals,
            };
            emit(json, &view, || output::print_investment(&view))?;
        }
        Commands::Screen {
            symbols,
            series,
            csv_out,
        } => {
            let source = series.source();
            if matches!(source, SeriesSource::Csv(_)) {
                bail!("--csv reads a single series; use `analyze` instead of `screen`");
            }
            series.apply(&mut config);
            let symbols = if symbols.is_empty() {
                config.watchlist.clone()
            } else {
                symbols
            };
            if symbols.is_empty() {
                bail!("no symbols given and the config watchlist is empty");
            }
            let loader = loader_for(&source, &config.data)?;
            let outcome = screen(&symbols, &source, &loader, &config);
            emit(json, &outcome, || output::print_screen(&outcome))?;
            if let Some(path) = csv_out {
                std::fs::write(&path, export_screen_csv(&outcome.rows)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            if outcome.rows.is_empty() {
                bail!("every symbol failed");
            }
        }
    }

    Ok(())
}

/// Only remote sources need an HTTP client.
fn loader_for(source: &SeriesSource, data: &DataSection) -> Result<DataLoader> {
    Ok(match source {
        SeriesSource::Remote => DataLoader::yahoo(data.clone())?,
        _ => DataLoader::offline(data.clone()),
    })
}

fn load(symbol: &str, series: &SeriesArgs, config: &AnalysisConfig) -> Result<LoadedSeries> {
    let source = series.source();
    let loaded = loader_for(&source, &config.data)?.load(symbol, &source)?;
    if loaded.source == DataSource::Synthetic {
        eprintln!("WARNING: {} uses SYNTHETIC data", loaded.symbol);
    }
    Ok(loaded)
}

fn last_close(loaded: &LoadedSeries) -> Result<f64> {
    match loaded.bars.last().map(|b| b.close) {
        Some(close) if close.is_finite() => Ok(close),
        _ => bail!("{} has no usable last close", loaded.symbol),
    }
}

/// JSON to stdout, or the text renderer.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}
