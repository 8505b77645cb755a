//! Alpha Vantage quote and exchange-rate lookups.
//!
//! Six-letter pairs carrying the forex prefix (`XAUUSD`) are priced through
//! `CURRENCY_EXCHANGE_RATE` against the reporting currency; every other
//! symbol goes through `GLOBAL_QUOTE`. The free tier allows 5 calls a minute,
//! which callers enforce through the shared rate limiter.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::core::price::{PriceError, PriceFetcher, is_forex_symbol};

pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
    reporting_currency: String,
    forex_prefix: char,
}

impl AlphaVantageProvider {
    pub fn new(base_url: &str, api_key: &str, reporting_currency: &str, forex_prefix: char) -> Self {
        AlphaVantageProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            reporting_currency: reporting_currency.to_string(),
            forex_prefix,
        }
    }
}

/// Fields every Alpha Vantage body may carry instead of data.
#[derive(Debug, Deserialize, Default)]
struct Notices {
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(flatten)]
    notices: Notices,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    exchange_rate: Option<ExchangeRate>,
    #[serde(flatten)]
    notices: Notices,
}

#[derive(Debug, Deserialize)]
struct ExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    rate: Option<String>,
}

fn parse_number(symbol: &str, raw: Option<&str>) -> Result<f64, PriceError> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .ok_or_else(|| PriceError::DataUnavailable {
            symbol: symbol.to_string(),
        })
}

impl Notices {
    fn check(&self, symbol: &str) -> Result<(), PriceError> {
        if let Some(message) = self.note.as_ref().or(self.information.as_ref()) {
            return Err(PriceError::RateLimited {
                symbol: symbol.to_string(),
                message: message.clone(),
            });
        }
        if let Some(message) = &self.error_message {
            debug!(symbol, error = %message, "Provider rejected symbol");
            return Err(PriceError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        Ok(())
    }
}

impl AlphaVantageProvider {
    async fn request<T: DeserializeOwned>(
        &self,
        symbol: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PriceError> {
        let request_error = |message: String| PriceError::Request {
            symbol: symbol.to_string(),
            message,
        };

        let mut all_params = params.to_vec();
        all_params.push(("apikey", self.api_key.as_str()));
        let url = reqwest::Url::parse_with_params(&format!("{}/query", self.base_url), &all_params)
            .map_err(|e| request_error(format!("Failed to build URL: {e}")))?;

        debug!(
            "Requesting market data from {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let client = reqwest::Client::builder()
            .user_agent("procplan/1.0")
            .build()
            .map_err(|e| request_error(e.to_string()))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| PriceError::Parse {
            symbol: symbol.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&text).map_err(|e| PriceError::Parse {
            symbol: symbol.to_string(),
            message: e.to_string(),
        })
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<f64, PriceError> {
        let data: GlobalQuoteResponse = self
            .request(symbol, &[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        data.notices.check(symbol)?;

        let price = data.global_quote.and_then(|quote| quote.price);
        parse_number(symbol, price.as_deref())
    }

    async fn fetch_exchange_rate(&self, symbol: &str) -> Result<f64, PriceError> {
        let base: String = symbol.chars().take(3).collect();
        let data: ExchangeRateResponse = self
            .request(
                symbol,
                &[
                    ("function", "CURRENCY_EXCHANGE_RATE"),
                    ("from_currency", base.as_str()),
                    ("to_currency", self.reporting_currency.as_str()),
                ],
            )
            .await?;
        data.notices.check(symbol)?;

        let rate = data.exchange_rate.and_then(|rate| rate.rate);
        parse_number(symbol, rate.as_deref())
    }
}

#[async_trait]
impl PriceFetcher for AlphaVantageProvider {
    #[instrument(name = "AlphaVantageFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch(&self, symbol: &str) -> Result<f64, PriceError> {
        let price = if is_forex_symbol(symbol, self.forex_prefix) {
            self.fetch_exchange_rate(symbol).await?
        } else {
            self.fetch_quote(symbol).await?
        };
        debug!(price, "Fetched price");
        Ok(price)
    }
}
