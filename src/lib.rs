pub mod cli;
pub mod composition;
pub mod core;
pub mod market;
pub mod providers;
pub mod resolvers;
pub mod store;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::composition::CompositionAgent;
use crate::core::config::AppConfig;
use crate::core::schema::{CompositionRequest, MarketPriceRequest};
use crate::market::{Catalogs, MarketAgent, PricingContext, PricingSettings, Resolvers};
use crate::providers::alpha_vantage::AlphaVantageProvider;
use crate::providers::listings;
use crate::providers::ollama::OllamaClient;

pub enum AppCommand {
    Composition { item: String },
    Prices { materials: Vec<String> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>, json: bool) -> Result<()> {
    info!("procplan starting...");

    let config = AppConfig::resolve(config_path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Composition { item } => {
            let agent = CompositionAgent::new(Arc::new(ollama_client(&config)));
            cli::composition::run(&agent, &CompositionRequest { item }, json).await
        }
        AppCommand::Prices { materials } => {
            let request = MarketPriceRequest { materials };
            let agent = build_market_agent(&config);
            cli::prices::run(&agent, &request, json).await
        }
    }
}

fn ollama_client(config: &AppConfig) -> OllamaClient {
    OllamaClient::new(&config.llm.base_url, &config.llm.model)
}

/// Wires the pricing chain from configuration, with a fresh context.
pub fn build_market_agent(config: &AppConfig) -> MarketAgent {
    let pricing = &config.pricing;
    let llm = Arc::new(ollama_client(config));
    let fetcher = Arc::new(AlphaVantageProvider::new(
        &config.market_data.base_url,
        &config.api_key(),
        &pricing.reporting_currency,
        pricing.forex_prefix,
    ));

    let catalogs = Catalogs {
        companies: Arc::new(listings::load_directory(&config.listings)),
        ..Catalogs::default()
    };
    let context = Arc::new(PricingContext::new(pricing.min_call_interval()));
    let resolvers = Resolvers::with_llm(llm, &catalogs, &context, pricing.manufacturers);

    MarketAgent::new(
        context,
        Arc::clone(&catalogs.symbols),
        resolvers,
        fetcher,
        PricingSettings::from(pricing),
    )
}
