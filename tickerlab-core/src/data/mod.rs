//! Series Provider: fetching, caching and importing bar series.

pub mod cache;
pub mod circuit_breaker;
pub mod csv_io;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use cache::{CachedProvider, Clock, SeriesCache, SystemClock, DEFAULT_TTL};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_io::{read_bars, read_bars_file, write_bars, write_bars_file};
pub use provider::{DataError, DataSource, Interval, Range, SeriesProvider, SeriesRequest};
pub use synthetic::synthetic_series;
pub use yahoo::YahooProvider;
