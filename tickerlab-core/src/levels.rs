//! Support/resistance level detection.
//!
//! 1. Local extrema: bar `i` (for `w <= i < n - w`) is a minimum candidate
//!    when its value is the minimum of `[i-w, i+w]`, a maximum candidate when
//!    it is the maximum. NaN values never qualify and are ignored inside
//!    windows.
//! 2. Each candidate kind is clustered on its own: values sorted ascending,
//!    greedily grouped while within `cluster_pct * (max - min)` of the
//!    group's first member.
//! 3. A cluster collapses to its mean price; strength is the member count,
//!    optionally scaled by `1 + mean relative volume` of its members.
//! 4. All clusters are split by the current close: below → support, above →
//!    resistance. Each side is ranked by strength descending, ties by
//!    ascending price, and truncated to `top_n`.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Half-width of the extremum window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSize {
    Fixed(usize),
    /// Fraction of the series length, floored, at least 1.
    Fraction(f64),
}

impl WindowSize {
    pub fn resolve(&self, len: usize) -> usize {
        match *self {
            WindowSize::Fixed(w) => w.max(1),
            WindowSize::Fraction(f) => ((len as f64 * f).floor() as usize).max(1),
        }
    }
}

/// Which bar fields feed the extremum search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Closes for both minima and maxima.
    Close,
    /// Lows for minima, highs for maxima.
    HighLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub strength: f64,
    pub kind: LevelKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub window: WindowSize,
    pub price_source: PriceSource,
    pub cluster_pct: f64,
    pub top_n: usize,
    pub volume_weighted: bool,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            window: WindowSize::Fraction(0.1),
            price_source: PriceSource::Close,
            cluster_pct: 0.02,
            top_n: 3,
            volume_weighted: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<PriceLevel>,
    pub resistance: Vec<PriceLevel>,
}

impl LevelSet {
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }

    /// Strongest support and strongest resistance, when both exist.
    pub fn strongest_pair(&self) -> Option<(&PriceLevel, &PriceLevel)> {
        Some((self.support.first()?, self.resistance.first()?))
    }
}

/// A candidate extremum: its price and the bar it came from.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    price: f64,
    index: usize,
}

/// Detect support and resistance levels.
pub fn detect_levels(bars: &[Bar], config: &LevelConfig) -> LevelSet {
    let Some(current) = bars.last().map(|b| b.close) else {
        return LevelSet::default();
    };
    let (lows, highs) = source_series(bars, config.price_source);
    let w = config.window.resolve(bars.len());
    let threshold = config.cluster_pct * price_range(&lows, &highs);

    let volume_scale = config.volume_weighted.then(|| relative_volumes(bars));
    let mut clusters = Vec::new();
    for (values, want_min) in [(&lows, true), (&highs, false)] {
        let candidates = local_extrema(values, w, want_min);
        clusters.extend(cluster(candidates, threshold, volume_scale.as_deref()));
    }

    let mut set = LevelSet::default();
    for (price, strength) in clusters {
        if price < current {
            set.support.push(PriceLevel { price, strength, kind: LevelKind::Support });
        } else if price > current {
            set.resistance.push(PriceLevel { price, strength, kind: LevelKind::Resistance });
        }
    }
    rank(&mut set.support, config.top_n);
    rank(&mut set.resistance, config.top_n);
    set
}

/// Cluster prices of local close minima, ascending.
///
/// Uses a window of 10% of the series and the default clustering threshold;
/// the DCA planner reads these as candidate buy prices.
pub fn support_levels_for_dca(bars: &[Bar]) -> Vec<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let config = LevelConfig::default();
    let w = config.window.resolve(bars.len());
    let threshold = config.cluster_pct * price_range(&closes, &closes);
    cluster(local_extrema(&closes, w, true), threshold, None)
        .into_iter()
        .map(|(price, _)| price)
        .collect()
}

fn source_series(bars: &[Bar], source: PriceSource) -> (Vec<f64>, Vec<f64>) {
    match source {
        PriceSource::Close => {
            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            (closes.clone(), closes)
        }
        PriceSource::HighLow => (
            bars.iter().map(|b| b.low).collect(),
            bars.iter().map(|b| b.high).collect(),
        ),
    }
}

fn price_range(lows: &[f64], highs: &[f64]) -> f64 {
    let min = lows.iter().copied().filter(|v| !v.is_nan()).fold(f64::INFINITY, f64::min);
    let max = highs.iter().copied().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max);
    if max >= min {
        max - min
    } else {
        0.0
    }
}

fn local_extrema(values: &[f64], w: usize, want_min: bool) -> Vec<Candidate> {
    let n = values.len();
    if n < 2 * w + 1 {
        return Vec::new();
    }
    (w..n - w)
        .filter(|&i| {
            let v = values[i];
            !v.is_nan()
                && values[i - w..=i + w]
                    .iter()
                    .filter(|x| !x.is_nan())
                    .all(|&x| if want_min { v <= x } else { v >= x })
        })
        .map(|i| Candidate { price: values[i], index: i })
        .collect()
}

/// Volume of each bar relative to the series mean; all zero when the mean is 0.
fn relative_volumes(bars: &[Bar]) -> Vec<f64> {
    let mean = bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64;
    bars.iter()
        .map(|b| if mean > 0.0 { b.volume as f64 / mean } else { 0.0 })
        .collect()
}

/// Greedy clustering against each group's first member. Returns (mean price, strength).
fn cluster(
    mut candidates: Vec<Candidate>,
    threshold: f64,
    relative_volume: Option<&[f64]>,
) -> Vec<(f64, f64)> {
    candidates.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut groups: Vec<Vec<Candidate>> = Vec::new();
    for candidate in candidates {
        match groups.last_mut() {
            Some(group) if (candidate.price - group[0].price).abs() <= threshold => {
                group.push(candidate)
            }
            _ => groups.push(vec![candidate]),
        }
    }

    groups
        .iter()
        .map(|group| {
            let count = group.len() as f64;
            let mean = group.iter().map(|c| c.price).sum::<f64>() / count;
            let strength = match relative_volume {
                Some(rv) => {
                    let mean_rv = group.iter().map(|c| rv[c.index]).sum::<f64>() / count;
                    count * (1.0 + mean_rv)
                }
                None => count,
            };
            (mean, strength)
        })
        .collect()
}

fn rank(levels: &mut Vec<PriceLevel>, top_n: usize) {
    levels.sort_by(|a, b| a.price.total_cmp(&b.price));
    // stable: equal strengths keep ascending price order
    levels.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    levels.truncate(top_n);
}
