//! IndicatorResult: a labelled, parameterized indicator output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::indicators::indicator::last_finite;

/// Scalar or bar-aligned series output.
///
/// NaN warm-up positions serialize as `null` so JSON stays valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorOutput {
    Scalar(#[serde(with = "nan_as_null")] f64),
    Series(#[serde(with = "nan_as_null::series")] Vec<f64>),
}

/// One named output with the parameters that produced it.
///
/// `params` uses a BTreeMap so serialization order is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub name: String,
    pub params: BTreeMap<String, f64>,
    pub lookback: usize,
    pub output: IndicatorOutput,
}

impl IndicatorResult {
    pub fn series(
        name: impl Into<String>,
        params: BTreeMap<String, f64>,
        lookback: usize,
        values: Vec<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            lookback,
            output: IndicatorOutput::Series(values),
        }
    }

    pub fn scalar(name: impl Into<String>, params: BTreeMap<String, f64>, value: f64) -> Self {
        Self {
            name: name.into(),
            params,
            lookback: 0,
            output: IndicatorOutput::Scalar(value),
        }
    }

    /// Latest finite value. Warm-up and NaN map to `None`.
    pub fn latest(&self) -> Option<f64> {
        match &self.output {
            IndicatorOutput::Scalar(v) => Some(*v).filter(|v| v.is_finite()),
            IndicatorOutput::Series(values) => last_finite(values),
        }
    }

    /// The series, if this is a series output.
    pub fn values(&self) -> Option<&[f64]> {
        match &self.output {
            IndicatorOutput::Series(values) => Some(values),
            IndicatorOutput::Scalar(_) => None,
        }
    }
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }

    pub mod series {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<f64>, D::Error> {
            let values = Vec::<Option<f64>>::deserialize(deserializer)?;
            Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(period: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([("period".to_string(), period)])
    }

    #[test]
    fn latest_skips_warmup_only_at_end() {
        let result = IndicatorResult::series("sma_3", params(3.0), 2, vec![f64::NAN, f64::NAN, 5.0]);
        assert_eq!(result.latest(), Some(5.0));

        let warming = IndicatorResult::series("sma_3", params(3.0), 2, vec![f64::NAN; 2]);
        assert_eq!(warming.latest(), None);
    }

    #[test]
    fn scalar_latest() {
        assert_eq!(IndicatorResult::scalar("x", params(5.0), 0.25).latest(), Some(0.25));
        assert_eq!(IndicatorResult::scalar("x", params(5.0), f64::NAN).latest(), None);
    }

    #[test]
    fn nan_serializes_as_null() {
        let result = IndicatorResult::series("sma_2", params(2.0), 1, vec![f64::NAN, 1.5]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("[null,1.5]"), "{json}");

        let back: IndicatorResult = serde_json::from_str(&json).unwrap();
        let values = back.values().unwrap();
        assert!(values[0].is_nan());
        assert_eq!(values[1], 1.5);
        assert_eq!(back.params, result.params);
    }
}
