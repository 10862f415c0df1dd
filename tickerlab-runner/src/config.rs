//! Analysis configuration loaded from TOML.
//!
//! Every section is optional; a missing section or key takes its default, so
//! an empty file is a valid config. Example:
//!
//! ```toml
//! [data]
//! interval = "1d"
//! range = "6mo"
//! cache_ttl_secs = 120
//!
//! [risk]
//! stop_multiplier = 1.5
//! target_multipliers = [2.0, 3.0]
//!
//! [backtest]
//! entry = "breakout"
//! ma_period = 50
//!
//! [[indicators.battery]]
//! type = "rsi"
//! period = 9
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickerlab_core::backtest::StrategyParams;
use tickerlab_core::data::{Interval, Range};
use tickerlab_core::indicators::IndicatorSpec;
use tickerlab_core::levels::LevelConfig;
use tickerlab_core::risk::{Direction, RiskParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: [{section}] {message}")]
    Invalid {
        section: &'static str,
        message: String,
    },
}

impl ConfigError {
    fn invalid(section: &'static str, message: impl ToString) -> Self {
        ConfigError::Invalid {
            section,
            message: message.to_string(),
        }
    }
}

/// Full configuration of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub indicators: IndicatorSection,
    pub levels: LevelConfig,
    pub risk: RiskParams,
    pub backtest: StrategyParams,
    pub data: DataSection,
    pub portfolio: PortfolioSection,
    /// Symbols screened when none are given explicitly.
    pub watchlist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSection {
    pub battery: Vec<IndicatorSpec>,
}

impl Default for IndicatorSection {
    fn default() -> Self {
        Self {
            battery: IndicatorSpec::default_battery(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub interval: Interval,
    pub range: Range,
    pub cache_ttl_secs: u64,
    /// Length of generated series when synthetic data is used.
    pub synthetic_bars: usize,
    /// Fall back to synthetic data when the provider fails.
    pub synthetic_fallback: bool,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            interval: Interval::OneDay,
            range: Range::OneYear,
            cache_ttl_secs: 300,
            synthetic_bars: 252,
            synthetic_fallback: false,
        }
    }
}

impl DataSection {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Account inputs for sizing and averaging-down plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSection {
    pub account: f64,
    pub direction: Direction,
    pub dca_funds: f64,
    pub dca_levels: usize,
}

impl Default for PortfolioSection {
    fn default() -> Self {
        Self {
            account: 10_000.0,
            direction: Direction::Long,
            dca_funds: 5_000.0,
            dca_levels: 3,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for spec in &self.indicators.battery {
            spec.validate()
                .map_err(|e| ConfigError::invalid("indicators", e))?;
        }

        let levels = &self.levels;
        if !(levels.cluster_pct.is_finite() && levels.cluster_pct >= 0.0) {
            return Err(ConfigError::invalid(
                "levels",
                format!("cluster_pct must be >= 0, got {}", levels.cluster_pct),
            ));
        }
        if levels.top_n == 0 {
            return Err(ConfigError::invalid("levels", "top_n must be >= 1"));
        }

        self.risk
            .validate()
            .map_err(|e| ConfigError::invalid("risk", e))?;
        self.backtest
            .validate()
            .map_err(|e| ConfigError::invalid("backtest", e))?;

        if self.data.synthetic_bars == 0 {
            return Err(ConfigError::invalid("data", "synthetic_bars must be >= 1"));
        }

        let p = &self.portfolio;
        if !(p.account.is_finite() && p.account > 0.0) {
            return Err(ConfigError::invalid(
                "portfolio",
                format!("account must be > 0, got {}", p.account),
            ));
        }
        if !(p.dca_funds.is_finite() && p.dca_funds >= 0.0) {
            return Err(ConfigError::invalid(
                "portfolio",
                format!("dca_funds must be >= 0, got {}", p.dca_funds),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlab_core::backtest::EntryRule;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.indicators.battery, IndicatorSpec::default_battery());
        assert_eq!(config.data.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            watchlist = ["AAPL", "MSFT"]

            [data]
            range = "6mo"

            [risk]
            stop_multiplier = 1.5

            [backtest]
            entry = "breakout"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.range, Range::SixMonths);
        assert_eq!(config.data.interval, Interval::OneDay);
        assert_eq!(config.risk.stop_multiplier, 1.5);
        assert_eq!(config.risk.atr_period, 14);
        assert_eq!(config.backtest.entry, EntryRule::Breakout);
        assert_eq!(config.backtest.ma_period, 20);
        assert_eq!(config.watchlist, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn custom_battery_replaces_default() {
        let config = AnalysisConfig::from_toml(
            r#"
            [[indicators.battery]]
            type = "rsi"
            period = 9

            [[indicators.battery]]
            type = "obv"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.indicators.battery,
            vec![IndicatorSpec::Rsi { period: 9 }, IndicatorSpec::Obv]
        );
    }

    #[test]
    fn invalid_values_name_their_section() {
        let err = AnalysisConfig::from_toml("[backtest]\nma_period = 0").unwrap_err();
        assert!(err.to_string().contains("[backtest]"), "{err}");

        let err = AnalysisConfig::from_toml("[portfolio]\naccount = -5.0").unwrap_err();
        assert!(err.to_string().contains("[portfolio]"), "{err}");

        let err = AnalysisConfig::from_toml("[[indicators.battery]]\ntype = \"sma\"\nperiod = 0")
            .unwrap_err();
        assert!(err.to_string().contains("[indicators]"), "{err}");
    }

    #[test]
    fn unknown_vocabulary_is_a_parse_error() {
        let err = AnalysisConfig::from_toml("[data]\ninterval = \"2h\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_reads_and_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        std::fs::write(&path, "[levels]\ntop_n = 5\n").unwrap();
        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(config.levels.top_n, 5);

        let missing = dir.path().join("missing.toml");
        let err = AnalysisConfig::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
