//! Fingerprints: stable identification of the data and parameters behind a report.
//!
//! - `DatasetHash`: BLAKE3 over every bar field in order.
//! - `ConfigHash`: BLAKE3 over the canonical JSON of any serializable config.
//!
//! Hashes are hex strings, stable across builds and platforms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// All NaN payloads hash alike.
fn canonical_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

pub fn dataset_hash(bars: &[Bar]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(bars.len() as u64).to_le_bytes());
    for b in bars {
        hasher.update(&b.timestamp.to_le_bytes());
        for v in [b.open, b.high, b.low, b.close] {
            hasher.update(&canonical_bits(v).to_le_bytes());
        }
        hasher.update(&b.volume.to_le_bytes());
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

/// Hash of the config's JSON form. Structs serialize fields in declaration
/// order and maps should be `BTreeMap`s, so equal configs hash equal.
pub fn config_hash<T: Serialize>(config: &T) -> Result<ConfigHash, serde_json::Error> {
    let json = serde_json::to_string(config)?;
    Ok(ConfigHash(blake3::hash(json.as_bytes()).to_hex().to_string()))
}

/// Both hashes, attached to reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub dataset: DatasetHash,
    pub config: ConfigHash,
    pub bar_count: usize,
}

impl Fingerprint {
    pub fn new<T: Serialize>(bars: &[Bar], config: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            dataset: dataset_hash(bars),
            config: config_hash(config)?,
            bar_count: bars.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::StrategyParams;
    use crate::indicators::make_bars;

    #[test]
    fn dataset_hash_is_stable_and_sensitive() {
        let a = make_bars(&[1.0, 2.0, 3.0]);
        let b = make_bars(&[1.0, 2.0, 3.5]);
        assert_eq!(dataset_hash(&a), dataset_hash(&a.clone()));
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
        assert_eq!(dataset_hash(&a).0.len(), 64);
    }

    #[test]
    fn empty_dataset_differs_from_single_bar() {
        assert_ne!(dataset_hash(&[]), dataset_hash(&make_bars(&[1.0])));
    }

    #[test]
    fn config_hash_tracks_parameters() {
        let base = StrategyParams::default();
        let other = StrategyParams {
            ma_period: 50,
            ..StrategyParams::default()
        };
        assert_eq!(config_hash(&base).unwrap(), config_hash(&base.clone()).unwrap());
        assert_ne!(config_hash(&base).unwrap(), config_hash(&other).unwrap());
    }

    #[test]
    fn fingerprint_records_bar_count() {
        let bars = make_bars(&[1.0, 2.0]);
        let fp = Fingerprint::new(&bars, &StrategyParams::default()).unwrap();
        assert_eq!(fp.bar_count, 2);
        assert_eq!(fp.dataset, dataset_hash(&bars));
    }
}
