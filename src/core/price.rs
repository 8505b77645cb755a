//! Pricing abstractions and core types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Returns true when `symbol` denotes a currency pair rather than a quote.
///
/// A pair is six uppercase letters starting with the prefix, like the ISO 4217
/// metal codes quoted against a currency (`XAUUSD`, `XAGUSD`). Equity tickers
/// that happen to start with the prefix (`XOM`, `XYL`) are at most five letters.
pub fn is_forex_symbol(symbol: &str, forex_prefix: char) -> bool {
    symbol.len() == 6
        && symbol.starts_with(forex_prefix)
        && symbol.chars().all(|c| c.is_ascii_uppercase())
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriceError {
    #[error("Request error: {message} for symbol: {symbol}")]
    Request { symbol: String, message: String },

    #[error("HTTP error: {status} for symbol: {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("Rate limited by provider for symbol: {symbol}: {message}")]
    RateLimited { symbol: String, message: String },

    #[error("No price data available for symbol: {symbol}")]
    DataUnavailable { symbol: String },

    #[error("Failed to parse response for {symbol}: {message}")]
    Parse { symbol: String, message: String },
}

impl PriceError {
    /// Whether the request reached the provider and counts against its quota.
    pub fn was_dispatched(&self) -> bool {
        !matches!(self, PriceError::Request { .. })
    }
}

/// Fetches the latest price for a resolved symbol. No caching of its own.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<f64, PriceError>;
}

/// A price observed from the market and held in the price cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub price: f64,
    pub symbol: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// No stage produced a symbol; nothing was fetched.
    Unresolved,
    /// A symbol was found but the provider call failed.
    FetchFailed,
}

impl Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DefaultReason::Unresolved => "unresolved",
                DefaultReason::FetchFailed => "fetch failed",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceSource {
    Cache { symbol: String },
    Market { symbol: String },
    Default { reason: DefaultReason },
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::Cache { symbol } => write!(f, "cache ({symbol})"),
            PriceSource::Market { symbol } => write!(f, "market ({symbol})"),
            PriceSource::Default { reason } => write!(f, "default ({reason})"),
        }
    }
}

/// The outcome of pricing one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedMaterial {
    pub material: String,
    pub price: f64,
    pub source: PriceSource,
}

impl PricedMaterial {
    pub fn is_default(&self) -> bool {
        matches!(self.source, PriceSource::Default { .. })
    }
}
