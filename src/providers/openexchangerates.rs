use crate::core::{BASE_CURRENCY, FxError, RateSource, RateTable};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Rate source for the openexchangerates.org API.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: String,
    client: reqwest::Client,
}

impl OpenExchangeRatesProvider {
    pub fn new(base_url: &str, app_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fxconv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(OpenExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            client,
        })
    }

    async fn fetch_table(&self, endpoint: &str) -> Result<RateTable, FxError> {
        // app_id stays out of the logs
        debug!("Requesting rates from {}/{}", self.base_url, endpoint);
        let url = reqwest::Url::parse_with_params(
            &format!("{}/{}", self.base_url, endpoint),
            [("app_id", self.app_id.as_str())],
        )
        .map_err(|e| FxError::Network(format!("Invalid URL for {endpoint}: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                FxError::Network(format!("Request error for {endpoint}: {}", e.without_url()))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                FxError::Network(format!(
                    "Failed to read response for {endpoint}: {}",
                    e.without_url()
                ))
            })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiError>(&text)
                .ok()
                .and_then(|e| e.description.or(e.message))
                .map(|d| format!(": {d}"))
                .unwrap_or_default();
            return Err(FxError::Network(format!(
                "HTTP error {status} for {endpoint}{detail}"
            )));
        }

        let data: RatesResponse = serde_json::from_str(&text).map_err(|e| {
            FxError::MalformedResponse(format!("Failed to parse response for {endpoint}: {e}"))
        })?;

        let rates = data.rates.ok_or_else(|| {
            FxError::MalformedResponse(format!("Response for {endpoint} has no rates"))
        })?;

        let table = match data.base.as_deref() {
            Some(base) if !base.eq_ignore_ascii_case(BASE_CURRENCY) => {
                rebase(base, rates, endpoint)?
            }
            _ => RateTable::new(rates),
        };
        debug!("Received {} rates for {}", table.len(), endpoint);
        Ok(table)
    }
}

/// Re-expresses `rates` quoted against `base` relative to the base currency.
fn rebase(base: &str, rates: BTreeMap<String, f64>, endpoint: &str) -> Result<RateTable, FxError> {
    let usd = rates
        .get(BASE_CURRENCY)
        .copied()
        .filter(|r| r.is_finite() && *r > 0.0)
        .ok_or_else(|| {
            FxError::MalformedResponse(format!(
                "Response for {endpoint} is based on {base} without a {BASE_CURRENCY} rate"
            ))
        })?;
    debug!("Rebasing rates from {} to {}", base, BASE_CURRENCY);
    Ok(RateTable::new(
        rates.into_iter().map(|(code, rate)| (code, rate / usd)),
    ))
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    base: Option<String>,
    rates: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    description: Option<String>,
}

#[async_trait]
impl RateSource for OpenExchangeRatesProvider {
    #[instrument(name = "LatestRatesFetch", skip(self))]
    async fn fetch_latest(&self) -> Result<RateTable, FxError> {
        self.fetch_table("latest.json").await
    }

    #[instrument(name = "HistoricalRatesFetch", skip(self))]
    async fn fetch_historical(&self, date: NaiveDate) -> Result<RateTable, FxError> {
        let endpoint = format!("historical/{}.json", date.format("%Y-%m-%d"));
        self.fetch_table(&endpoint).await
    }
}
