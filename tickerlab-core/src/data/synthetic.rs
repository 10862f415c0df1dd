//! Seeded random-walk series for demos, benches and offline runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Bar;

/// 2024-01-02 00:00:00 UTC.
pub const SYNTHETIC_START: i64 = 1_704_153_600;
const DAY: i64 = 86_400;

/// `n` daily bars starting at `start_price`. Same seed, same series.
///
/// Closes follow a multiplicative walk with roughly 1.5% daily moves;
/// highs and lows bracket open and close so every bar is sane.
pub fn synthetic_series(seed: u64, n: usize, start_price: f64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut close = start_price.max(0.01);

    for i in 0..n {
        let open = close;
        let change: f64 = rng.gen_range(-0.03..0.03) + 0.0003;
        close = (open * (1.0 + change)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000);
        bars.push(Bar::new(SYNTHETIC_START + i as i64 * DAY, open, high, low, close, volume));
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_series() {
        assert_eq!(synthetic_series(7, 50, 100.0), synthetic_series(7, 50, 100.0));
        assert_ne!(synthetic_series(7, 50, 100.0), synthetic_series(8, 50, 100.0));
    }

    #[test]
    fn bars_are_sane_and_daily() {
        let bars = synthetic_series(42, 250, 50.0);
        assert_eq!(bars.len(), 250);
        assert_eq!(bars[0].open, 50.0);
        assert!(bars.iter().all(|b| b.is_sane()));
        assert!(bars.windows(2).all(|w| w[1].timestamp - w[0].timestamp == DAY));
    }

    #[test]
    fn empty_series() {
        assert!(synthetic_series(1, 0, 10.0).is_empty());
    }
}
