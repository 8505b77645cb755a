//! Core business logic abstractions

pub mod cache;
pub mod catalog;
pub mod config;
pub mod llm;
pub mod log;
pub mod price;
pub mod rate_limit;
pub mod schema;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use catalog::{CommodityCatalog, CompanyDirectory, SymbolTable};
pub use llm::{LanguageModel, Prompt};
pub use price::{PriceError, PriceFetcher, PriceSource, PricedMaterial};
pub use rate_limit::RateLimiter;
