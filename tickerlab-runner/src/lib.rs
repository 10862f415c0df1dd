//! TickerLab Runner: analysis orchestration on top of `tickerlab-core`.
//!
//! This crate provides:
//! - TOML analysis configuration with per-section defaults
//! - Series loading with cache/download/synthetic fallback
//! - A single-symbol analysis pass producing an [`AnalysisReport`]
//! - Parallel multi-symbol screening
//! - JSON, CSV and Markdown export

pub mod analysis;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod screen;

pub use analysis::{
    analyze, analyze_symbol, compute_indicators, AnalysisError, AnalysisReport, RetracementReport,
    RiskReport, RunError,
};
pub use config::{AnalysisConfig, ConfigError, DataSection, IndicatorSection, PortfolioSection};
pub use data_loader::{DataLoader, LoadError, LoadedSeries, SeriesSource};
pub use export::ExportError;
pub use screen::{screen, ScreenFailure, ScreenOutcome, ScreenRow};

#[cfg(test)]
mod send_sync_checks {
    use super::*;
    use tickerlab_core::data::YahooProvider;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
    }

    #[test]
    fn loader_is_shareable_across_the_pool() {
        assert_send::<DataLoader<YahooProvider>>();
        assert_sync::<DataLoader<YahooProvider>>();
        assert_send::<LoadedSeries>();
        assert_sync::<LoadedSeries>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<AnalysisReport>();
        assert_sync::<AnalysisReport>();
        assert_send::<ScreenOutcome>();
        assert_sync::<ScreenOutcome>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<ExportError>();
        assert_sync::<ExportError>();
    }
}
