use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{MaterialResolver, NO_MATCH, SymbolMatch, clean_reply};
use crate::core::catalog::CommodityCatalog;
use crate::core::llm::{LanguageModel, Prompt};

/// Asks the model which catalog commodity best matches a material.
pub struct CommodityResolver {
    llm: Arc<dyn LanguageModel>,
    catalog: Arc<CommodityCatalog>,
}

impl CommodityResolver {
    pub fn new(llm: Arc<dyn LanguageModel>, catalog: Arc<CommodityCatalog>) -> Self {
        Self { llm, catalog }
    }

    fn prompt(&self, material: &str) -> Prompt {
        let commodities = self
            .catalog
            .entries()
            .map(|(symbol, name)| format!("{symbol}: {name}"))
            .collect::<Vec<_>>()
            .join("\n");

        Prompt::new()
            .system(format!(
                "You map raw materials to traded commodities. Reply with exactly one \
                 commodity name copied verbatim from the list below, or {NO_MATCH} if none \
                 is a reasonable proxy. Do not add explanations, symbols or punctuation."
            ))
            .system(format!("Available commodities:\n{commodities}"))
            .user(format!("Material: {material}"))
    }

    /// Accepts only a reply naming a catalog entry; anything else is no match.
    fn parse(&self, reply: &str) -> Option<SymbolMatch> {
        let name = clean_reply(reply);
        self.catalog
            .find_by_name(name)
            .map(|(symbol, name)| SymbolMatch::new(symbol, name))
    }
}

#[async_trait]
impl MaterialResolver<SymbolMatch> for CommodityResolver {
    async fn resolve(&self, material: &str) -> Result<Option<SymbolMatch>> {
        let reply = self.llm.complete(&self.prompt(material)).await?;
        info!(material, reply = %reply.trim(), "Commodity mapping reply");

        let matched = self.parse(&reply);
        match &matched {
            Some(m) => debug!(material, symbol = %m.symbol, "Mapped to commodity"),
            None => debug!(material, "No commodity match"),
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    fn resolver(model: Arc<ScriptedModel>) -> CommodityResolver {
        CommodityResolver::new(model, Arc::new(CommodityCatalog::default()))
    }

    #[tokio::test]
    async fn test_matches_catalog_name_ignoring_case() {
        let model = Arc::new(ScriptedModel::replying("  aluminum\n"));
        let matched = resolver(model.clone()).resolve("Bauxite").await.unwrap();

        assert_eq!(matched, Some(SymbolMatch::new("ALUMINUM", "Aluminum")));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_lists_every_commodity() {
        let model = Arc::new(ScriptedModel::replying("Gold"));
        resolver(model.clone()).resolve("Bullion").await.unwrap();

        let text = model.last_prompt_text();
        assert!(text.contains("XAUUSD: Gold"));
        assert!(text.contains("NATURAL_GAS: Natural Gas"));
        assert!(text.contains("COFFEE: Coffee"));
        assert!(text.ends_with("Material: Bullion"));
    }

    #[tokio::test]
    async fn test_sentinel_is_no_match() {
        let model = Arc::new(ScriptedModel::replying("NONE"));
        let matched = resolver(model).resolve("Unobtainium").await.unwrap();
        assert_eq!(matched, None);
    }

    #[tokio::test]
    async fn test_chatty_reply_is_no_match() {
        let model = Arc::new(ScriptedModel::replying(
            "The closest commodity would be Copper, since wire is mostly copper.",
        ));
        let matched = resolver(model).resolve("Wire").await.unwrap();
        assert_eq!(matched, None);
    }

    #[tokio::test]
    async fn test_model_failure_is_an_error() {
        let model = Arc::new(ScriptedModel::failing("connection refused"));
        assert!(resolver(model).resolve("Copper").await.is_err());
    }
}
