//! LLM-assisted strategies that map a free-form material name to something
//! the market data service can price.

pub mod caching;
pub mod commodity;
pub mod manufacturer;
pub mod similarity;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use caching::CachingResolver;
pub use commodity::CommodityResolver;
pub use manufacturer::ManufacturerResolver;
pub use similarity::SimilarityResolver;

/// Reply the models are told to give when nothing fits.
pub const NO_MATCH: &str = "NONE";

/// A priceable symbol and the name it was matched under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
}

impl SymbolMatch {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Maps a material to a candidate.
///
/// `Ok(None)` is an ordinary no-match. `Err` means the lookup itself failed;
/// callers decide how to degrade.
#[async_trait]
pub trait MaterialResolver<T>: Send + Sync {
    async fn resolve(&self, material: &str) -> Result<Option<T>>;
}

/// Strips whitespace, wrapping quotes and a trailing period from a one-line reply.
pub(crate) fn clean_reply(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_end_matches('.')
        .trim()
}
