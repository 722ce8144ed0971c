//! Rate tables and the source abstraction that produces them

use crate::core::error::FxError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Currency every rate in a [`RateTable`] is expressed against.
pub const BASE_CURRENCY: &str = "USD";

/// Snapshot of currency rates relative to [`BASE_CURRENCY`].
///
/// Codes are stored upper-case and every rate is positive and finite. The base
/// currency always resolves to `1.0` even when the snapshot omits it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let rates = rates
            .into_iter()
            .filter_map(|(code, rate)| {
                let code = normalize_code(code.as_ref());
                if rate.is_finite() && rate > 0.0 && !code.is_empty() {
                    Some((code, rate))
                } else {
                    debug!("Dropping invalid rate {} for {}", rate, code);
                    None
                }
            })
            .collect();
        Self { rates }
    }

    /// Rate of `code` relative to the base currency.
    pub fn rate(&self, code: &str) -> Option<f64> {
        let code = normalize_code(code);
        match self.rates.get(&code) {
            Some(rate) => Some(*rate),
            None if code == BASE_CURRENCY => Some(1.0),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, f64>> for RateTable {
    fn from(rates: BTreeMap<String, f64>) -> Self {
        RateTable::new(rates)
    }
}

impl From<RateTable> for BTreeMap<String, f64> {
    fn from(table: RateTable) -> Self {
        table.rates
    }
}

/// Trims and upper-cases a currency code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<RateTable, FxError>;
    async fn fetch_historical(&self, date: NaiveDate) -> Result<RateTable, FxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_lookup_is_case_insensitive() {
        let table = RateTable::new([("eur", 0.9), ("GBP", 0.8)]);
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(table.rate(" gbp "), Some(0.8));
        assert_eq!(table.rate("JPY"), None);
    }

    #[test]
    fn test_base_currency_is_implicit() {
        let table = RateTable::new([("EUR", 0.9)]);
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_rates_are_dropped() {
        let table = RateTable::new([
            ("EUR", 0.9),
            ("BAD", 0.0),
            ("NEG", -1.0),
            ("NAN", f64::NAN),
            ("INF", f64::INFINITY),
        ]);
        assert_eq!(table.currencies().collect::<Vec<_>>(), vec!["EUR"]);
    }

    #[test]
    fn test_serializes_as_plain_mapping() {
        let table = RateTable::new([("GBP", 0.8), ("EUR", 0.9)]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"EUR":0.9,"GBP":0.8}"#);

        let parsed: RateTable = serde_json::from_str(r#"{"eur":0.9,"XXX":-2.0}"#).unwrap();
        assert_eq!(parsed, RateTable::new([("EUR", 0.9)]));
    }
}
