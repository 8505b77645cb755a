//! Resolves material names to market prices.
//!
//! Each material walks the chain: price cache, commodity mapping,
//! manufacturer lookup, symbol table, similarity match. The first stage to
//! produce a symbol wins and that symbol is fetched under the shared rate
//! limit. Whatever fails, the material still gets a price: the configured
//! default, tagged as such in [`PriceSource::Default`].

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::core::cache::Cache;
use crate::core::catalog::{CommodityCatalog, CompanyDirectory, SymbolTable};
use crate::core::config::PricingConfig;
use crate::core::llm::LanguageModel;
use crate::core::price::{DefaultReason, PriceEntry, PriceFetcher, PriceSource, PricedMaterial};
use crate::core::rate_limit::RateLimiter;
use crate::resolvers::{
    CachingResolver, CommodityResolver, ManufacturerResolver, MaterialResolver, SimilarityResolver,
    SymbolMatch,
};
use crate::store::memory::MemoryCache;

/// The mutable state of a pricing run: the four caches and the limiter.
///
/// One context is shared by every request in the process; tests build their own.
pub struct PricingContext {
    pub prices: Arc<dyn Cache<String, PriceEntry>>,
    pub similarity: Arc<dyn Cache<String, String>>,
    pub commodities: Arc<dyn Cache<String, SymbolMatch>>,
    pub manufacturers: Arc<dyn Cache<String, SymbolMatch>>,
    pub limiter: RateLimiter,
}

impl PricingContext {
    pub fn new(min_call_interval: Duration) -> Self {
        Self {
            prices: Arc::new(MemoryCache::new()),
            similarity: Arc::new(MemoryCache::new()),
            commodities: Arc::new(MemoryCache::new()),
            manufacturers: Arc::new(MemoryCache::new()),
            limiter: RateLimiter::new(min_call_interval),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingSettings {
    pub cache_expiry: Duration,
    pub default_price: f64,
}

impl From<&PricingConfig> for PricingSettings {
    fn from(config: &PricingConfig) -> Self {
        PricingSettings {
            cache_expiry: config.cache_expiry(),
            default_price: config.default_price,
        }
    }
}

/// The strategies tried, in order, when the price cache misses.
pub struct Resolvers {
    pub commodity: Box<dyn MaterialResolver<SymbolMatch>>,
    pub manufacturer: Box<dyn MaterialResolver<SymbolMatch>>,
    pub similarity: Box<dyn MaterialResolver<String>>,
}

/// Static tables the LLM-backed resolvers choose from.
pub struct Catalogs {
    pub symbols: Arc<SymbolTable>,
    pub commodities: Arc<CommodityCatalog>,
    pub companies: Arc<CompanyDirectory>,
}

impl Default for Catalogs {
    fn default() -> Self {
        Catalogs {
            symbols: Arc::new(SymbolTable::default()),
            commodities: Arc::new(CommodityCatalog::default()),
            companies: Arc::new(CompanyDirectory::builtin()),
        }
    }
}

impl Resolvers {
    /// LLM-backed resolvers memoized in the context's resolution caches.
    pub fn with_llm(
        llm: Arc<dyn LanguageModel>,
        catalogs: &Catalogs,
        context: &PricingContext,
        manufacturers: usize,
    ) -> Self {
        Resolvers {
            commodity: Box::new(CachingResolver::new(
                CommodityResolver::new(Arc::clone(&llm), Arc::clone(&catalogs.commodities)),
                Arc::clone(&context.commodities),
            )),
            manufacturer: Box::new(CachingResolver::new(
                ManufacturerResolver::new(
                    Arc::clone(&llm),
                    Arc::clone(&catalogs.companies),
                    manufacturers,
                ),
                Arc::clone(&context.manufacturers),
            )),
            similarity: Box::new(CachingResolver::new(
                SimilarityResolver::new(llm, Arc::clone(&catalogs.symbols)),
                Arc::clone(&context.similarity),
            )),
        }
    }
}

pub struct MarketAgent {
    context: Arc<PricingContext>,
    symbols: Arc<SymbolTable>,
    resolvers: Resolvers,
    fetcher: Arc<dyn PriceFetcher>,
    settings: PricingSettings,
}

impl MarketAgent {
    pub fn new(
        context: Arc<PricingContext>,
        symbols: Arc<SymbolTable>,
        resolvers: Resolvers,
        fetcher: Arc<dyn PriceFetcher>,
        settings: PricingSettings,
    ) -> Self {
        Self {
            context,
            symbols,
            resolvers,
            fetcher,
            settings,
        }
    }

    /// Prices every material, one entry per distinct name.
    pub async fn resolve_all(&self, materials: &[String]) -> HashMap<String, f64> {
        self.resolve_all_with_progress(materials, &|| {})
            .await
            .into_iter()
            .map(|priced| (priced.material, priced.price))
            .collect()
    }

    /// Prices materials strictly in input order, calling `update_callback`
    /// after each one.
    pub async fn resolve_all_with_progress(
        &self,
        materials: &[String],
        update_callback: &(dyn Fn() + Send + Sync),
    ) -> Vec<PricedMaterial> {
        let mut priced = Vec::with_capacity(materials.len());
        for material in materials {
            priced.push(self.price_material(material).await);
            update_callback();
        }

        let defaults = priced.iter().filter(|p| p.is_default()).count();
        info!(
            total = priced.len(),
            defaults, "Resolved market prices"
        );
        priced
    }

    #[instrument(name = "PriceMaterial", skip(self))]
    async fn price_material(&self, material: &str) -> PricedMaterial {
        if let Some(entry) = self.context.prices.get(&material.to_string()).await {
            debug!(price = entry.price, "Using cached price");
            return PricedMaterial {
                material: material.to_string(),
                price: entry.price,
                source: PriceSource::Cache {
                    symbol: entry.symbol,
                },
            };
        }

        match self.find_symbol(material).await {
            Some(symbol) => self.fetch_and_cache(material, symbol).await,
            None => {
                warn!("No symbol found for {}, using default price", material);
                self.default_price(material, DefaultReason::Unresolved)
            }
        }
    }

    async fn find_symbol(&self, material: &str) -> Option<String> {
        if let Some(found) = matched(
            "commodity",
            material,
            self.resolvers.commodity.resolve(material).await,
        ) {
            info!(symbol = %found.symbol, commodity = %found.name, "Resolved via commodity");
            return Some(found.symbol);
        }

        if let Some(found) = matched(
            "manufacturer",
            material,
            self.resolvers.manufacturer.resolve(material).await,
        ) {
            info!(symbol = %found.symbol, company = %found.name, "Resolved via manufacturer");
            return Some(found.symbol);
        }

        if let Some(symbol) = self.symbols.get(material) {
            info!(symbol, "Resolved via symbol table");
            return Some(symbol.to_string());
        }

        let similar = matched(
            "similarity",
            material,
            self.resolvers.similarity.resolve(material).await,
        )?;
        let symbol = self.symbols.get(&similar)?;
        info!(symbol, similar = %similar, "Resolved via similar material");
        Some(symbol.to_string())
    }

    async fn fetch_and_cache(&self, material: &str, symbol: String) -> PricedMaterial {
        let limiter = &self.context.limiter;
        limiter.until_ready().await;

        match self.fetcher.fetch(&symbol).await {
            Ok(price) => {
                limiter.record_call().await;
                let entry = PriceEntry {
                    price,
                    symbol: symbol.clone(),
                    observed_at: Utc::now(),
                };
                self.context
                    .prices
                    .put(material.to_string(), entry, Some(self.settings.cache_expiry))
                    .await;
                PricedMaterial {
                    material: material.to_string(),
                    price,
                    source: PriceSource::Market { symbol },
                }
            }
            Err(e) => {
                if e.was_dispatched() {
                    limiter.record_call().await;
                }
                warn!(error = %e, "Price fetch failed for {}, using default price", material);
                self.default_price(material, DefaultReason::FetchFailed)
            }
        }
    }

    fn default_price(&self, material: &str, reason: DefaultReason) -> PricedMaterial {
        PricedMaterial {
            material: material.to_string(),
            price: self.settings.default_price,
            source: PriceSource::Default { reason },
        }
    }
}

/// A resolver failure counts as no match; it is logged and never propagated.
fn matched<T>(stage: &str, material: &str, result: anyhow::Result<Option<T>>) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(e) => {
            warn!(stage, "Resolver failed for {}: {:#}", material, e);
            None
        }
    }
}
