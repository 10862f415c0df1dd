//! IndicatorSpec: serializable description of an indicator and its parameters.
//!
//! Specs come from TOML/JSON config (`type = "rsi"`, `period = 14`); any
//! missing parameter takes the indicator's documented default. `compute`
//! produces one [`IndicatorResult`] per output line, each carrying its
//! parameters so a caller can label and re-run it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;
use crate::indicators::result::IndicatorResult;
use crate::indicators::{self as ind, Indicator};

#[derive(Debug, Error, PartialEq)]
pub enum SpecError {
    #[error("{indicator}: parameter '{param}' must be {requirement}, got {value}")]
    InvalidParameter {
        indicator: &'static str,
        param: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorSpec {
    Sma {
        #[serde(default = "d20")]
        period: usize,
    },
    Ema {
        #[serde(default = "d20")]
        period: usize,
    },
    Rsi {
        #[serde(default = "d14")]
        period: usize,
    },
    Macd {
        #[serde(default = "d12")]
        fast: usize,
        #[serde(default = "d26")]
        slow: usize,
        #[serde(default = "d9")]
        signal: usize,
    },
    Bollinger {
        #[serde(default = "d20")]
        period: usize,
        #[serde(default = "two")]
        std_dev: f64,
    },
    Atr {
        #[serde(default = "d14")]
        period: usize,
    },
    Stochastic {
        #[serde(default = "d14")]
        k_period: usize,
        #[serde(default = "d3")]
        d_period: usize,
    },
    Adx {
        #[serde(default = "d14")]
        period: usize,
    },
    WilliamsR {
        #[serde(default = "d14")]
        period: usize,
    },
    Mfi {
        #[serde(default = "d14")]
        period: usize,
    },
    Obv,
    Roc {
        #[serde(default = "d14")]
        period: usize,
    },
    Cmf {
        #[serde(default = "d20")]
        period: usize,
    },
    ParabolicSar {
        #[serde(default = "af")]
        af_start: f64,
        #[serde(default = "af")]
        af_step: f64,
        #[serde(default = "af_max")]
        af_max: f64,
    },
    Keltner {
        #[serde(default = "d20")]
        ema_period: usize,
        #[serde(default = "d10")]
        atr_period: usize,
        #[serde(default = "two")]
        multiplier: f64,
    },
    Rvi {
        #[serde(default = "d10")]
        std_period: usize,
        #[serde(default = "d14")]
        smooth_period: usize,
    },
    ForceIndex {
        #[serde(default = "d13")]
        period: usize,
    },
    ElderRay {
        #[serde(default = "d13")]
        period: usize,
    },
    Ichimoku {
        #[serde(default = "d9")]
        conversion: usize,
        #[serde(default = "d26")]
        base: usize,
        #[serde(default = "d52")]
        span_b: usize,
    },
    Momentum {
        #[serde(default = "d14")]
        period: usize,
    },
    VolumeSma {
        #[serde(default = "d5")]
        period: usize,
    },
    VolumeChange {
        #[serde(default = "d5")]
        period: usize,
    },
    Volatility {
        #[serde(default = "d20")]
        period: usize,
    },
}

fn d3() -> usize {
    3
}
fn d5() -> usize {
    5
}
fn d9() -> usize {
    9
}
fn d10() -> usize {
    10
}
fn d12() -> usize {
    12
}
fn d13() -> usize {
    13
}
fn d14() -> usize {
    14
}
fn d20() -> usize {
    20
}
fn d26() -> usize {
    26
}
fn d52() -> usize {
    52
}
fn two() -> f64 {
    2.0
}
fn af() -> f64 {
    0.02
}
fn af_max() -> f64 {
    0.20
}

impl IndicatorSpec {
    /// The dashboard's full indicator set with default parameters.
    pub fn default_battery() -> Vec<IndicatorSpec> {
        use IndicatorSpec::*;
        vec![
            Sma { period: 20 },
            Sma { period: 50 },
            Ema { period: 20 },
            Rsi { period: 14 },
            Macd { fast: 12, slow: 26, signal: 9 },
            Bollinger { period: 20, std_dev: 2.0 },
            Atr { period: 14 },
            Stochastic { k_period: 14, d_period: 3 },
            Adx { period: 14 },
            WilliamsR { period: 14 },
            Mfi { period: 14 },
            Obv,
            Roc { period: 14 },
            Cmf { period: 20 },
            ParabolicSar { af_start: 0.02, af_step: 0.02, af_max: 0.20 },
            Keltner { ema_period: 20, atr_period: 10, multiplier: 2.0 },
            Rvi { std_period: 10, smooth_period: 14 },
            ForceIndex { period: 13 },
            ElderRay { period: 13 },
            Ichimoku { conversion: 9, base: 26, span_b: 52 },
            Momentum { period: 14 },
            VolumeSma { period: 5 },
            VolumeChange { period: 5 },
            Volatility { period: 20 },
        ]
    }

    /// Indicator kind, as used in the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        use IndicatorSpec::*;
        match self {
            Sma { .. } => "sma",
            Ema { .. } => "ema",
            Rsi { .. } => "rsi",
            Macd { .. } => "macd",
            Bollinger { .. } => "bollinger",
            Atr { .. } => "atr",
            Stochastic { .. } => "stochastic",
            Adx { .. } => "adx",
            WilliamsR { .. } => "williams_r",
            Mfi { .. } => "mfi",
            Obv => "obv",
            Roc { .. } => "roc",
            Cmf { .. } => "cmf",
            ParabolicSar { .. } => "parabolic_sar",
            Keltner { .. } => "keltner",
            Rvi { .. } => "rvi",
            ForceIndex { .. } => "force_index",
            ElderRay { .. } => "elder_ray",
            Ichimoku { .. } => "ichimoku",
            Momentum { .. } => "momentum",
            VolumeSma { .. } => "volume_sma",
            VolumeChange { .. } => "volume_change",
            Volatility { .. } => "volatility",
        }
    }

    /// Parameter map, in stable key order.
    pub fn params(&self) -> BTreeMap<String, f64> {
        self.param_list()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn param_list(&self) -> Vec<(&'static str, f64)> {
        use IndicatorSpec::*;
        match *self {
            Sma { period }
            | Ema { period }
            | Rsi { period }
            | Atr { period }
            | Adx { period }
            | WilliamsR { period }
            | Mfi { period }
            | Roc { period }
            | Cmf { period }
            | ForceIndex { period }
            | ElderRay { period }
            | Momentum { period }
            | VolumeSma { period }
            | VolumeChange { period }
            | Volatility { period } => vec![("period", period as f64)],
            Macd { fast, slow, signal } => vec![
                ("fast", fast as f64),
                ("slow", slow as f64),
                ("signal", signal as f64),
            ],
            Bollinger { period, std_dev } => vec![("period", period as f64), ("std_dev", std_dev)],
            Stochastic { k_period, d_period } => {
                vec![("k_period", k_period as f64), ("d_period", d_period as f64)]
            }
            Obv => vec![],
            ParabolicSar { af_start, af_step, af_max } => vec![
                ("af_start", af_start),
                ("af_step", af_step),
                ("af_max", af_max),
            ],
            Keltner { ema_period, atr_period, multiplier } => vec![
                ("ema_period", ema_period as f64),
                ("atr_period", atr_period as f64),
                ("multiplier", multiplier),
            ],
            Rvi { std_period, smooth_period } => vec![
                ("std_period", std_period as f64),
                ("smooth_period", smooth_period as f64),
            ],
            Ichimoku { conversion, base, span_b } => vec![
                ("conversion", conversion as f64),
                ("base", base as f64),
                ("span_b", span_b as f64),
            ],
        }
    }

    /// Check every parameter is usable before anything is constructed.
    pub fn validate(&self) -> Result<(), SpecError> {
        let kind = self.kind();
        for (param, value) in self.param_list() {
            let is_factor = matches!(
                param,
                "std_dev" | "multiplier" | "af_start" | "af_step" | "af_max"
            );
            if is_factor {
                if !(value.is_finite() && value > 0.0) {
                    return Err(SpecError::InvalidParameter {
                        indicator: kind,
                        param,
                        requirement: "a positive finite number",
                        value,
                    });
                }
            } else if value < 1.0 {
                return Err(SpecError::InvalidParameter {
                    indicator: kind,
                    param,
                    requirement: ">= 1",
                    value,
                });
            }
        }
        if let IndicatorSpec::ParabolicSar { af_start, af_max, .. } = *self {
            if af_max < af_start {
                return Err(SpecError::InvalidParameter {
                    indicator: kind,
                    param: "af_max",
                    requirement: ">= af_start",
                    value: af_max,
                });
            }
        }
        Ok(())
    }

    /// Compute every output line of this indicator.
    pub fn compute(&self, bars: &[Bar]) -> Result<Vec<IndicatorResult>, SpecError> {
        self.validate()?;
        let params = self.params();
        let run = |indicator: &dyn Indicator| {
            IndicatorResult::series(
                indicator.name(),
                params.clone(),
                indicator.lookback(),
                indicator.compute(bars),
            )
        };

        use IndicatorSpec::*;
        let results = match *self {
            Sma { period } => vec![run(&ind::Sma::new(period))],
            Ema { period } => vec![run(&ind::Ema::new(period))],
            Rsi { period } => vec![run(&ind::Rsi::new(period))],
            Macd { fast, slow, signal } => vec![
                run(&ind::Macd::line(fast, slow, signal)),
                run(&ind::Macd::signal(fast, slow, signal)),
                run(&ind::Macd::histogram(fast, slow, signal)),
            ],
            Bollinger { period, std_dev } => vec![
                run(&ind::Bollinger::upper(period, std_dev)),
                run(&ind::Bollinger::middle(period, std_dev)),
                run(&ind::Bollinger::lower(period, std_dev)),
            ],
            Atr { period } => vec![run(&ind::Atr::new(period))],
            Stochastic { k_period, d_period } => vec![
                run(&ind::Stochastic::k(k_period, d_period)),
                run(&ind::Stochastic::d(k_period, d_period)),
            ],
            Adx { period } => vec![run(&ind::Adx::new(period))],
            WilliamsR { period } => vec![run(&ind::WilliamsR::new(period))],
            Mfi { period } => vec![run(&ind::Mfi::new(period))],
            Obv => vec![run(&ind::Obv::new())],
            Roc { period } => vec![run(&ind::Roc::new(period))],
            Cmf { period } => vec![run(&ind::Cmf::new(period))],
            ParabolicSar { af_start, af_step, af_max } => {
                vec![run(&ind::ParabolicSar::new(af_start, af_step, af_max))]
            }
            Keltner { ema_period, atr_period, multiplier } => vec![
                run(&ind::Keltner::upper(ema_period, atr_period, multiplier)),
                run(&ind::Keltner::middle(ema_period, atr_period, multiplier)),
                run(&ind::Keltner::lower(ema_period, atr_period, multiplier)),
            ],
            Rvi { std_period, smooth_period } => vec![run(&ind::Rvi::new(std_period, smooth_period))],
            ForceIndex { period } => vec![run(&ind::ForceIndex::new(period))],
            ElderRay { period } => vec![
                run(&ind::ElderRay::bull(period)),
                run(&ind::ElderRay::bear(period)),
            ],
            Ichimoku { conversion, base, span_b } => [
                ind::IchimokuLine::Conversion,
                ind::IchimokuLine::Base,
                ind::IchimokuLine::SpanA,
                ind::IchimokuLine::SpanB,
            ]
            .into_iter()
            .map(|line| run(&ind::Ichimoku::new(conversion, base, span_b, line)))
            .collect(),
            Momentum { period } => vec![run(&ind::Momentum::new(period))],
            VolumeSma { period } => vec![run(&ind::VolumeSma::new(period))],
            VolumeChange { period } => vec![IndicatorResult::scalar(
                format!("volume_change_{period}"),
                params.clone(),
                ind::volume_change(bars, period).unwrap_or(f64::NAN),
            )],
            Volatility { period } => vec![run(&ind::Volatility::new(period))],
        };
        Ok(results)
    }
}
