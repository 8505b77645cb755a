//! Fakes shared by unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

use crate::core::llm::{LanguageModel, Prompt};
use crate::core::price::{PriceError, PriceFetcher};
use crate::resolvers::MaterialResolver;

/// Replies with the same text to every prompt and records what it was asked.
pub struct ScriptedModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt_text(&self) -> String {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .map(|p| {
                p.messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

/// Resolver returning a fixed answer for selected materials.
pub struct StaticResolver<T> {
    answers: HashMap<String, T>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl<T> StaticResolver<T> {
    pub fn none() -> Self {
        Self {
            answers: HashMap::new(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::none()
        }
    }

    pub fn with(mut self, material: &str, answer: T) -> Self {
        self.answers.insert(material.to_string(), answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> MaterialResolver<T> for StaticResolver<T> {
    async fn resolve(&self, material: &str) -> Result<Option<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("resolver unavailable"));
        }
        Ok(self.answers.get(material).cloned())
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> MaterialResolver<T> for std::sync::Arc<StaticResolver<T>> {
    async fn resolve(&self, material: &str) -> Result<Option<T>> {
        self.as_ref().resolve(material).await
    }
}

/// Price fetcher that records every call with the tokio time it was made.
pub struct RecordingFetcher {
    prices: HashMap<String, f64>,
    errors: HashMap<String, PriceError>,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl RecordingFetcher {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(symbol, price)| (symbol.to_string(), *price))
                .collect(),
            errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes fetches of `symbol` fail with `error`.
    pub fn with_error(mut self, symbol: &str, error: PriceError) -> Self {
        self.errors.insert(symbol.to_string(), error);
        self
    }

    pub fn symbols(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PriceFetcher for RecordingFetcher {
    async fn fetch(&self, symbol: &str) -> Result<f64, PriceError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), Instant::now()));
        if let Some(error) = self.errors.get(symbol) {
            return Err(error.clone());
        }
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceError::DataUnavailable {
                symbol: symbol.to_string(),
            })
    }
}
