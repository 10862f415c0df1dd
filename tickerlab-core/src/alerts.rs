//! Price alerts. Each alert fires at most once, then stays latched.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    Above,
    Below,
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    #[serde(default)]
    pub triggered: bool,
}

impl PriceAlert {
    pub fn new(symbol: &str, condition: AlertCondition, threshold: f64) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            condition,
            threshold,
            triggered: false,
        }
    }

    /// Strict comparison; NaN never matches.
    pub fn matches(&self, price: f64) -> bool {
        match self.condition {
            AlertCondition::Above => price > self.threshold,
            AlertCondition::Below => price < self.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub price: f64,
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is now {} {} (last {})",
            self.symbol, self.condition, self.threshold, self.price
        )
    }
}

/// Check untriggered alerts against `price`, latch the ones that fire and
/// return an event for each.
pub fn evaluate_alerts(alerts: &mut [PriceAlert], price: f64) -> Vec<AlertEvent> {
    alerts
        .iter_mut()
        .filter(|a| !a.triggered && a.matches(price))
        .map(|a| {
            a.triggered = true;
            AlertEvent {
                symbol: a.symbol.clone(),
                condition: a.condition,
                threshold: a.threshold,
                price,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_and_latches() {
        let mut alerts = vec![
            PriceAlert::new("aapl", AlertCondition::Above, 150.0),
            PriceAlert::new("aapl", AlertCondition::Below, 140.0),
        ];
        let events = evaluate_alerts(&mut alerts, 151.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].symbol, "AAPL");
        assert_eq!(events[0].condition, AlertCondition::Above);
        assert!(alerts[0].triggered);
        assert!(!alerts[1].triggered);

        assert!(evaluate_alerts(&mut alerts, 155.0).is_empty());
        assert_eq!(evaluate_alerts(&mut alerts, 139.0).len(), 1);
    }

    #[test]
    fn comparison_is_strict() {
        let mut alerts = vec![PriceAlert::new("X", AlertCondition::Above, 100.0)];
        assert!(evaluate_alerts(&mut alerts, 100.0).is_empty());
        assert!(evaluate_alerts(&mut alerts, f64::NAN).is_empty());
        assert!(!alerts[0].triggered);
    }

    #[test]
    fn event_message() {
        let mut alerts = vec![PriceAlert::new("msft", AlertCondition::Below, 300.0)];
        let events = evaluate_alerts(&mut alerts, 299.5);
        assert_eq!(events[0].to_string(), "MSFT is now below 300 (last 299.5)");
    }
}
