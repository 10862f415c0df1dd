//! Metrics snapshot and swing-trade scoring.
//!
//! A [`MetricsSnapshot`] holds the latest value of each indicator in the
//! standard battery. [`swing_confidence`] folds a snapshot into a single
//! score in `[0, 1]`; [`classify_swing`] turns score plus snapshot into a call.
//!
//! Long-term investments are scored from [`Fundamentals`] instead, with
//! [`investment_confidence`] and [`classify_investment`].

use serde::{Deserialize, Serialize};

use crate::domain::{closes, Bar};
use crate::indicators::{
    self as ind, volatility, volume_change, BollingerBand, IchimokuLine, Indicator, KeltnerBand,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub price: Option<f64>,
    /// Log-return volatility of the whole series (fraction, not annualized).
    pub volatility: Option<f64>,
    /// 14-bar price change as a fraction.
    pub momentum: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub volume_change: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub atr: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub ichimoku_span_a: Option<f64>,
    pub ichimoku_span_b: Option<f64>,
    pub obv: Option<f64>,
    pub roc: Option<f64>,
    pub williams_r: Option<f64>,
    pub mfi: Option<f64>,
    pub adx: Option<f64>,
    pub parabolic_sar: Option<f64>,
    pub keltner_upper: Option<f64>,
    pub keltner_middle: Option<f64>,
    pub keltner_lower: Option<f64>,
    pub cmf: Option<f64>,
    pub rvi: Option<f64>,
    pub force_index: Option<f64>,
    pub bull_power: Option<f64>,
    pub bear_power: Option<f64>,
}

impl MetricsSnapshot {
    /// Latest values with the battery's standard parameters.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let prices = closes(bars);
        Self {
            price: prices.last().copied().filter(|p| p.is_finite()),
            volatility: volatility(&prices).filter(|v| v.is_finite()),
            momentum: ind::Momentum::new(14).latest(bars),
            rsi: ind::Rsi::new(14).latest(bars),
            macd: ind::Macd::line(12, 26, 9).latest(bars),
            volume_change: volume_change(bars, 5),
            bollinger_upper: ind::Bollinger::new(20, 2.0, BollingerBand::Upper).latest(bars),
            bollinger_middle: ind::Bollinger::new(20, 2.0, BollingerBand::Middle).latest(bars),
            bollinger_lower: ind::Bollinger::new(20, 2.0, BollingerBand::Lower).latest(bars),
            atr: ind::Atr::new(14).latest(bars),
            stoch_k: ind::Stochastic::k(14, 3).latest(bars),
            stoch_d: ind::Stochastic::d(14, 3).latest(bars),
            ichimoku_span_a: ind::Ichimoku::new(9, 26, 52, IchimokuLine::SpanA).latest(bars),
            ichimoku_span_b: ind::Ichimoku::new(9, 26, 52, IchimokuLine::SpanB).latest(bars),
            obv: ind::Obv::new().latest(bars),
            roc: ind::Roc::new(14).latest(bars),
            williams_r: ind::WilliamsR::new(14).latest(bars),
            mfi: ind::Mfi::new(14).latest(bars),
            adx: ind::Adx::new(14).latest(bars),
            parabolic_sar: ind::ParabolicSar::default().latest(bars),
            keltner_upper: ind::Keltner::new(20, 10, 2.0, KeltnerBand::Upper).latest(bars),
            keltner_middle: ind::Keltner::new(20, 10, 2.0, KeltnerBand::Middle).latest(bars),
            keltner_lower: ind::Keltner::new(20, 10, 2.0, KeltnerBand::Lower).latest(bars),
            cmf: ind::Cmf::new(20).latest(bars),
            rvi: ind::Rvi::default().latest(bars),
            force_index: ind::ForceIndex::new(13).latest(bars),
            bull_power: ind::ElderRay::bull(13).latest(bars),
            bear_power: ind::ElderRay::bear(13).latest(bars),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingCall {
    SwingBuy,
    SwingSell,
    Avoid,
    Neutral,
}

/// Score above which a fully aligned snapshot becomes a buy or sell call.
pub const STRONG_CONFIDENCE: f64 = 0.7;
/// Score below which a symbol is avoided.
pub const WEAK_CONFIDENCE: f64 = 0.3;
/// Volatility above which a symbol is avoided regardless of score.
pub const MAX_VOLATILITY: f64 = 0.5;

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

fn score(value: Option<f64>, f: impl Fn(f64) -> f64) -> f64 {
    value.map_or(0.0, |v| clamp01(f(v)))
}

/// Weighted component scores. Missing metrics score 0.
fn components(s: &MetricsSnapshot) -> [(f64, f64); 14] {
    let price = s.price.unwrap_or(f64::NAN);

    let bollinger = match (s.bollinger_upper, s.bollinger_lower) {
        (Some(u), Some(l)) if u > l => clamp01(1.0 - (price - (u + l) / 2.0).abs() / (u - l)),
        _ => 0.0,
    };
    let stochastic = match (s.stoch_k, s.stoch_d) {
        (Some(k), Some(_)) => clamp01(1.0 - (k - 50.0).abs() / 50.0),
        _ => 0.0,
    };
    let ichimoku = match (s.ichimoku_span_a, s.ichimoku_span_b) {
        (Some(a), Some(b)) if price > a && price > b => 1.0,
        _ => 0.0,
    };

    [
        (0.10, score(s.volatility, |v| 1.0 - v)),
        (0.10, score(s.momentum, |m| (m + 0.2) / 0.4)),
        (0.10, score(s.rsi, |r| 1.0 - (r - 50.0).abs() / 50.0)),
        (0.10, score(s.macd, |m| (m + 2.0) / 4.0)),
        (0.05, score(s.volume_change, |v| v + 0.5)),
        (0.10, bollinger),
        (0.10, score(s.atr, |a| 1.0 - a / (price * 0.1))),
        (0.10, stochastic),
        (0.10, ichimoku),
        (0.10, score(s.obv, |o| o.abs() / 1_000_000.0)),
        (0.05, score(s.roc, |r| (r + 10.0) / 20.0)),
        (0.05, score(s.williams_r, |w| 1.0 - (w + 50.0).abs() / 50.0)),
        (0.05, score(s.mfi, |m| (m + 10.0) / 20.0)),
        (0.05, score(s.adx, |a| (a + 20.0) / 40.0)),
    ]
}

/// Weighted swing score, normalized by the total weight into `[0, 1]`.
pub fn swing_confidence(snapshot: &MetricsSnapshot) -> f64 {
    let parts = components(snapshot);
    let total_weight: f64 = parts.iter().map(|(w, _)| w).sum();
    let weighted: f64 = parts.iter().map(|(w, s)| w * s).sum();
    clamp01(weighted / total_weight)
}

fn above(v: Option<f64>, threshold: f64) -> bool {
    v.is_some_and(|v| v > threshold)
}

fn below(v: Option<f64>, threshold: f64) -> bool {
    v.is_some_and(|v| v < threshold)
}

/// Buy/sell calls need a strong score and every indicator agreeing; any
/// missing metric blocks them.
pub fn classify_swing(s: &MetricsSnapshot, confidence: f64) -> SwingCall {
    let Some(price) = s.price else {
        return SwingCall::Neutral;
    };
    let spans = s.ichimoku_span_a.zip(s.ichimoku_span_b);

    let buy = confidence > STRONG_CONFIDENCE
        && above(s.momentum, 0.0)
        && above(s.rsi, 50.0)
        && above(s.bollinger_upper, price)
        && below(s.bollinger_lower, price)
        && above(s.stoch_k, 50.0)
        && spans.is_some_and(|(a, b)| a > b)
        && above(s.williams_r, -80.0)
        && above(s.mfi, 50.0)
        && above(s.adx, 25.0)
        && below(s.parabolic_sar, price)
        && above(s.keltner_upper, price)
        && above(s.cmf, 0.0)
        && above(s.rvi, 50.0)
        && above(s.force_index, 0.0)
        && above(s.bull_power, 0.0);
    if buy {
        return SwingCall::SwingBuy;
    }

    let sell = confidence > STRONG_CONFIDENCE
        && below(s.momentum, 0.0)
        && below(s.rsi, 50.0)
        && below(s.bollinger_upper, price)
        && below(s.stoch_k, 50.0)
        && spans.is_some_and(|(a, b)| a < b)
        && below(s.williams_r, -20.0)
        && below(s.mfi, 50.0)
        && above(s.adx, 25.0)
        && above(s.parabolic_sar, price)
        && below(s.keltner_lower, price)
        && below(s.cmf, 0.0)
        && below(s.rvi, 50.0)
        && below(s.force_index, 0.0)
        && below(s.bear_power, 0.0);
    if sell {
        return SwingCall::SwingSell;
    }

    if confidence < WEAK_CONFIDENCE || above(s.volatility, MAX_VOLATILITY) {
        return SwingCall::Avoid;
    }
    SwingCall::Neutral
}

/// Company fundamentals for investment scoring. Missing fields score 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    /// Percent, e.g. `2.5` for 2.5%.
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    /// Fraction, e.g. `0.2` for 20%.
    pub profit_margin: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub eps: Option<f64>,
    /// Year-over-year fraction.
    pub revenue_growth: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentCall {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

/// Score above which fundamentals with positive growth are a buy.
pub const BUY_CONFIDENCE: f64 = 0.6;

fn investment_components(f: &Fundamentals) -> [(f64, f64); 10] {
    [
        (0.15, score(f.pe_ratio, |pe| 1.0 - (pe - 20.0).abs() / 40.0)),
        (0.10, score(f.dividend_yield, |y| y / 4.0)),
        (0.10, score(f.market_cap, |c| c.log10() / 12.0)),
        (0.05, score(f.beta, |b| 1.0 - (b - 1.0).abs() / 2.0)),
        (0.15, score(f.profit_margin, |m| m / 0.2)),
        (0.05, score(f.debt_to_equity, |d| 1.0 - d / 2.0)),
        (0.10, score(f.current_ratio, |r| r / 2.0)),
        (0.10, score(f.eps, |e| e / 5.0)),
        (0.10, score(f.revenue_growth, |g| g / 0.2)),
        (0.10, score(f.free_cash_flow, |c| c / 1e9)),
    ]
}

/// Weighted fundamentals score, normalized by the total weight into `[0, 1]`.
pub fn investment_confidence(fundamentals: &Fundamentals) -> f64 {
    let parts = investment_components(fundamentals);
    let total_weight: f64 = parts.iter().map(|(w, _)| w).sum();
    let weighted: f64 = parts.iter().map(|(w, s)| w * s).sum();
    clamp01(weighted / total_weight)
}

/// Missing profit margin or revenue growth count as zero.
pub fn classify_investment(f: &Fundamentals, confidence: f64) -> InvestmentCall {
    let margin = f.profit_margin.unwrap_or(0.0);
    let growth = f.revenue_growth.unwrap_or(0.0);

    if confidence > STRONG_CONFIDENCE && margin > 0.1 && growth > 0.0 {
        InvestmentCall::StrongBuy
    } else if confidence > BUY_CONFIDENCE && margin > 0.0 && growth > -0.1 {
        InvestmentCall::Buy
    } else if confidence < WEAK_CONFIDENCE || margin < 0.0 || growth < -0.2 {
        InvestmentCall::Sell
    } else {
        InvestmentCall::Hold
    }
}
