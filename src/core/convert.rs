//! Currency conversion over a rate table

use crate::core::error::FxError;
use crate::core::rates::{BASE_CURRENCY, RateTable, normalize_code};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of converting an amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub converted_amount: f64,
    /// Units of the target currency per one unit of the source currency.
    pub rate: f64,
}

/// One persisted conversion. `id` is assigned by the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub id: Option<i64>,
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub converted_amount: f64,
    pub exchange_rate: f64,
    pub date: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(amount: f64, from: &str, to: &str, conversion: Conversion) -> Self {
        Self {
            id: None,
            amount,
            from_currency: normalize_code(from),
            to_currency: normalize_code(to),
            converted_amount: conversion.converted_amount,
            exchange_rate: conversion.rate,
            date: Utc::now(),
        }
    }
}

fn lookup(table: &RateTable, code: &str) -> Result<f64, FxError> {
    table
        .rate(code)
        .ok_or_else(|| FxError::UnknownCurrency(normalize_code(code)))
}

/// Converts `amount` of `from` into `to`, normalizing through the base currency.
pub fn convert(
    table: &RateTable,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<Conversion, FxError> {
    let from_rate = lookup(table, from)?;
    let to_rate = lookup(table, to)?;
    let from = normalize_code(from);

    if from == normalize_code(to) {
        return Ok(Conversion {
            converted_amount: amount,
            rate: 1.0,
        });
    }

    if from == BASE_CURRENCY {
        return Ok(Conversion {
            converted_amount: amount * to_rate,
            rate: to_rate,
        });
    }

    let amount_in_base = amount / from_rate;
    Ok(Conversion {
        converted_amount: amount_in_base * to_rate,
        rate: to_rate / from_rate,
    })
}

/// Units of `to` per one unit of `from`.
pub fn cross_rate(table: &RateTable, from: &str, to: &str) -> Result<f64, FxError> {
    convert(table, 1.0, from, to).map(|c| c.rate)
}
