use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{MaterialResolver, NO_MATCH, clean_reply};
use crate::core::catalog::SymbolTable;
use crate::core::llm::{LanguageModel, Prompt};

/// Asks the model which known material a name is closest to.
///
/// Any returned value is a key of the symbol table.
pub struct SimilarityResolver {
    llm: Arc<dyn LanguageModel>,
    symbols: Arc<SymbolTable>,
}

impl SimilarityResolver {
    pub fn new(llm: Arc<dyn LanguageModel>, symbols: Arc<SymbolTable>) -> Self {
        Self { llm, symbols }
    }

    fn prompt(&self, material: &str) -> Prompt {
        let known = self.symbols.materials().collect::<Vec<_>>().join("\n");

        Prompt::new()
            .system(format!(
                "You find the closest known material to the one given. Reply with exactly \
                 one material copied verbatim from the list below, or {NO_MATCH} if none is \
                 similar. Do not add explanations or punctuation."
            ))
            .system(format!("Known materials:\n{known}"))
            .user(format!("Material: {material}"))
    }
}

#[async_trait]
impl MaterialResolver<String> for SimilarityResolver {
    async fn resolve(&self, material: &str) -> Result<Option<String>> {
        if self.symbols.is_empty() {
            return Ok(None);
        }

        let reply = self.llm.complete(&self.prompt(material)).await?;
        info!(material, reply = %reply.trim(), "Similarity reply");

        let candidate = clean_reply(&reply);
        if self.symbols.contains(candidate) {
            debug!(material, similar = candidate, "Found similar material");
            Ok(Some(candidate.to_string()))
        } else {
            debug!(material, "No similar material");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    fn symbols() -> Arc<SymbolTable> {
        Arc::new(
            [("Steel", "NUE"), ("Stainless Steel", "STLD"), ("Glass", "GLW")]
                .into_iter()
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_returns_symbol_table_key() {
        let model = Arc::new(ScriptedModel::replying("Stainless Steel"));
        let resolver = SimilarityResolver::new(model.clone(), symbols());

        let similar = resolver.resolve("Inox").await.unwrap();
        assert_eq!(similar.as_deref(), Some("Stainless Steel"));
        assert!(model.last_prompt_text().contains("Glass\nStainless Steel\nSteel"));
    }

    #[tokio::test]
    async fn test_match_must_be_exact() {
        let model = Arc::new(ScriptedModel::replying("steel"));
        let resolver = SimilarityResolver::new(model, symbols());
        assert_eq!(resolver.resolve("Iron Sheet").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sentinel_is_no_match() {
        let model = Arc::new(ScriptedModel::replying("NONE"));
        let resolver = SimilarityResolver::new(model, symbols());
        assert_eq!(resolver.resolve("Unobtainium").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_table_skips_model() {
        let model = Arc::new(ScriptedModel::replying("Steel"));
        let resolver = SimilarityResolver::new(model.clone(), Arc::new(SymbolTable::empty()));

        assert_eq!(resolver.resolve("Iron").await.unwrap(), None);
        assert_eq!(model.calls(), 0);
    }
}
