//! TickerLab Core: technical-analysis computation over OHLCV series.
//!
//! This crate contains the analysis layer:
//! - Domain types (bars, closed trades)
//! - Indicator library (moving averages, oscillators, volatility, volume)
//! - Support/resistance level detection and Fibonacci retracement
//! - Risk engine (stops, targets, position sizing, averaging down)
//! - Single-position backtest engine
//! - Metrics snapshot with swing scoring, fundamentals scoring, and price alerts
//! - Series providers (Yahoo Finance, CSV, synthetic) with a TTL cache
//!
//! Everything except the providers is a pure function of its inputs.

pub mod alerts;
pub mod backtest;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod levels;
pub mod retracement;
pub mod risk;
pub mod snapshot;
