//! Series resolution for the runner.
//!
//! Given a symbol and a [`SeriesSource`], returns bars and where they came
//! from. Fallback policy for the remote source:
//! 1. Cached and fresh → use it (tagged `Cache`)
//! 2. Provider available → fetch, cache, use it
//! 3. Fetch failed or provider unavailable, and synthetic fallback enabled →
//!    generate a synthetic series (tagged `Synthetic`, logged as a warning)
//! 4. Otherwise → fail with a clear error
//!
//! Synthetic series are seeded from the symbol name, so the same symbol
//! always yields the same bars.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tickerlab_core::data::{
    read_bars_file, synthetic_series, CachedProvider, CircuitBreaker, DataError, DataSource,
    SeriesCache, SeriesProvider, SeriesRequest, YahooProvider,
};
use tickerlab_core::domain::Bar;
use tracing::warn;

use crate::config::DataSection;

/// Opening price of generated series.
const SYNTHETIC_START_PRICE: f64 = 100.0;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data for '{symbol}': provider unavailable (use --synthetic for synthetic data)")]
    ProviderUnavailable { symbol: String },

    #[error("download failed for '{symbol}': {source}")]
    DownloadFailed {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("series for '{symbol}' is empty")]
    EmptySeries { symbol: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where bars are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSource {
    Csv(PathBuf),
    Synthetic,
    Remote,
}

#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub symbol: String,
    pub bars: Arc<Vec<Bar>>,
    pub source: DataSource,
}

/// Resolves symbols to bar series.
pub struct DataLoader<P = YahooProvider> {
    remote: Option<CachedProvider<P>>,
    data: DataSection,
}

impl DataLoader<YahooProvider> {
    /// Loader backed by Yahoo Finance with a TTL cache.
    pub fn yahoo(data: DataSection) -> Result<Self, LoadError> {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        let provider = YahooProvider::new(breaker)?;
        Ok(Self::with_provider(provider, data))
    }
}

impl<P: SeriesProvider> DataLoader<P> {
    pub fn with_provider(provider: P, data: DataSection) -> Self {
        let cache = SeriesCache::new(data.cache_ttl());
        Self {
            remote: Some(CachedProvider::new(provider, cache)),
            data,
        }
    }

    /// Loader without network access: CSV and synthetic sources only.
    pub fn offline(data: DataSection) -> Self {
        Self { remote: None, data }
    }

    pub fn data_config(&self) -> &DataSection {
        &self.data
    }

    pub fn request(&self, symbol: &str) -> SeriesRequest {
        SeriesRequest::new(symbol, self.data.interval, self.data.range)
    }

    pub fn load(&self, symbol: &str, source: &SeriesSource) -> Result<LoadedSeries, LoadError> {
        let request = self.request(symbol);
        request.validate()?;
        let symbol = request.symbol.clone();

        let (bars, source) = match source {
            SeriesSource::Csv(path) => (Arc::new(read_bars_file(path)?), DataSource::CsvImport),
            SeriesSource::Synthetic => (Arc::new(self.synthetic(&symbol)), DataSource::Synthetic),
            SeriesSource::Remote => self.load_remote(&request)?,
        };

        if bars.is_empty() {
            return Err(LoadError::EmptySeries { symbol });
        }
        Ok(LoadedSeries {
            symbol,
            bars,
            source,
        })
    }

    /// Drop any cached series for `symbol`.
    pub fn invalidate(&self, symbol: &str) -> usize {
        self.remote
            .as_ref()
            .map_or(0, |remote| remote.cache().invalidate_symbol(symbol))
    }

    fn load_remote(&self, request: &SeriesRequest) -> Result<(Arc<Vec<Bar>>, DataSource), LoadError> {
        let symbol = &request.symbol;
        let Some(remote) = self.remote.as_ref().filter(|r| r.is_available()) else {
            if self.data.synthetic_fallback {
                warn!(%symbol, "provider unavailable, using synthetic data");
                return Ok((Arc::new(self.synthetic(symbol)), DataSource::Synthetic));
            }
            return Err(LoadError::ProviderUnavailable {
                symbol: symbol.clone(),
            });
        };

        if let Some(bars) = remote.cache().get(request) {
            return Ok((bars, DataSource::Cache));
        }

        match remote.force_refresh(request) {
            Ok(bars) => Ok((bars, DataSource::YahooFinance)),
            Err(e) if self.data.synthetic_fallback => {
                warn!(%symbol, error = %e, "download failed, using synthetic data");
                Ok((Arc::new(self.synthetic(symbol)), DataSource::Synthetic))
            }
            Err(source) => Err(LoadError::DownloadFailed {
                symbol: symbol.clone(),
                source,
            }),
        }
    }

    fn synthetic(&self, symbol: &str) -> Vec<Bar> {
        synthetic_series(symbol_seed(symbol), self.data.synthetic_bars, SYNTHETIC_START_PRICE)
    }
}

/// Deterministic seed from a symbol name.
pub fn symbol_seed(symbol: &str) -> u64 {
    let hash = blake3::hash(symbol.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tickerlab_core::data::write_bars_file;

    struct StubProvider {
        bars: Option<Vec<Bar>>,
        available: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn serving(bars: Vec<Bar>) -> Self {
            Self {
                bars: Some(bars),
                available: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                bars: None,
                available: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SeriesProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bars
                .clone()
                .ok_or_else(|| DataError::NetworkUnreachable(request.symbol.clone()))
        }

        fn is_available(&self) -> bool {
            self.available
        }
    }

    fn data(fallback: bool) -> DataSection {
        DataSection {
            synthetic_bars: 50,
            synthetic_fallback: fallback,
            ..DataSection::default()
        }
    }

    #[test]
    fn remote_fetch_then_cache_hit() {
        let loader = DataLoader::with_provider(
            StubProvider::serving(synthetic_series(1, 30, 10.0)),
            data(false),
        );

        let first = loader.load("spy", &SeriesSource::Remote).unwrap();
        assert_eq!(first.symbol, "SPY");
        assert_eq!(first.source, DataSource::YahooFinance);
        assert_eq!(first.bars.len(), 30);

        let second = loader.load("SPY", &SeriesSource::Remote).unwrap();
        assert_eq!(second.source, DataSource::Cache);
        assert!(Arc::ptr_eq(&first.bars, &second.bars));

        let calls = || loader.remote.as_ref().unwrap().inner().calls.load(Ordering::SeqCst);
        assert_eq!(calls(), 1);

        assert_eq!(loader.invalidate("SPY"), 1);
        loader.load("SPY", &SeriesSource::Remote).unwrap();
        assert_eq!(calls(), 2);
    }

    #[test]
    fn failed_download_is_an_error_without_fallback() {
        let loader = DataLoader::with_provider(StubProvider::failing(), data(false));
        let err = loader.load("QQQ", &SeriesSource::Remote).unwrap_err();
        assert!(matches!(err, LoadError::DownloadFailed { .. }));
        assert!(err.to_string().contains("QQQ"));
    }

    #[test]
    fn failed_download_falls_back_to_synthetic() {
        let loader = DataLoader::with_provider(StubProvider::failing(), data(true));
        let loaded = loader.load("QQQ", &SeriesSource::Remote).unwrap();
        assert_eq!(loaded.source, DataSource::Synthetic);
        assert_eq!(loaded.bars.len(), 50);
    }

    #[test]
    fn offline_loader_needs_fallback_for_remote() {
        let loader: DataLoader<StubProvider> = DataLoader::offline(data(false));
        let err = loader.load("IWM", &SeriesSource::Remote).unwrap_err();
        assert!(err.to_string().contains("--synthetic"));

        let loader: DataLoader<StubProvider> = DataLoader::offline(data(true));
        let loaded = loader.load("IWM", &SeriesSource::Remote).unwrap();
        assert_eq!(loaded.source, DataSource::Synthetic);
    }

    #[test]
    fn synthetic_is_deterministic_per_symbol() {
        let loader: DataLoader<StubProvider> = DataLoader::offline(data(false));
        let a = loader.load("AAPL", &SeriesSource::Synthetic).unwrap();
        let b = loader.load("AAPL", &SeriesSource::Synthetic).unwrap();
        let c = loader.load("MSFT", &SeriesSource::Synthetic).unwrap();
        assert_eq!(a.bars, b.bars);
        assert_ne!(a.bars, c.bars);
        assert_ne!(symbol_seed("AAPL"), symbol_seed("MSFT"));
    }

    #[test]
    fn csv_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        let bars = synthetic_series(4, 25, 42.0);
        write_bars_file(&path, &bars).unwrap();

        let loader: DataLoader<StubProvider> = DataLoader::offline(data(false));
        let loaded = loader.load("x", &SeriesSource::Csv(path)).unwrap();
        assert_eq!(loaded.source, DataSource::CsvImport);
        assert_eq!(loaded.bars.len(), 25);
    }

    #[test]
    fn empty_csv_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_bars_file(&path, &[]).unwrap();

        let loader: DataLoader<StubProvider> = DataLoader::offline(data(false));
        let err = loader.load("x", &SeriesSource::Csv(path)).unwrap_err();
        assert!(matches!(err, LoadError::EmptySeries { .. }));
    }

    #[test]
    fn blank_symbol_is_rejected() {
        let loader: DataLoader<StubProvider> = DataLoader::offline(data(true));
        let err = loader.load("  ", &SeriesSource::Synthetic).unwrap_err();
        assert!(matches!(err, LoadError::Data(DataError::InvalidRequest(_))));
    }
}
