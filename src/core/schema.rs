//! Request and response shapes for the composition and pricing commands.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of materials a pricing request must carry.
pub const MATERIALS_PER_REQUEST: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialComponent {
    pub material: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResponse {
    pub item: String,
    pub components: Vec<MaterialComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPriceRequest {
    pub materials: Vec<String>,
}

impl MarketPriceRequest {
    pub fn validate(&self) -> Result<()> {
        if self.materials.len() != MATERIALS_PER_REQUEST {
            bail!(
                "Exactly {} materials must be provided, got {}",
                MATERIALS_PER_REQUEST,
                self.materials.len()
            );
        }
        if let Some(position) = self.materials.iter().position(|m| m.trim().is_empty()) {
            bail!("Material {} is empty", position + 1);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPriceResponse {
    pub prices: HashMap<String, f64>,
}
