use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

use super::ui;
use crate::core::price::PricedMaterial;
use crate::core::schema::{MarketPriceRequest, MarketPriceResponse};
use crate::market::MarketAgent;

pub async fn run(agent: &MarketAgent, request: &MarketPriceRequest, json: bool) -> Result<()> {
    request.validate()?;

    let pb = ui::new_progress_bar(request.materials.len() as u64, true)?;
    pb.set_message("Pricing materials");
    let priced = agent
        .resolve_all_with_progress(&request.materials, &|| pb.inc(1))
        .await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&to_response(&priced))?);
    } else {
        display_prices(&priced);
    }
    Ok(())
}

fn to_response(priced: &[PricedMaterial]) -> MarketPriceResponse {
    let prices: HashMap<String, f64> = priced
        .iter()
        .map(|p| (p.material.clone(), p.price))
        .collect();
    MarketPriceResponse { prices }
}

fn display_prices(priced: &[PricedMaterial]) {
    println!("\n{}", ui::style_text("Market Prices", ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Material"),
        ui::header_cell("Price"),
        ui::header_cell("Source"),
    ]);
    for p in priced {
        table.add_row(vec![
            Cell::new(&p.material),
            ui::price_cell(p),
            ui::source_cell(&p.source),
        ]);
    }
    println!("{table}");

    let defaults = priced.iter().filter(|p| p.is_default()).count();
    if defaults > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("{defaults} of {} prices are defaults", priced.len()),
                ui::StyleType::Subtle
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PriceSource;

    #[test]
    fn test_response_keeps_one_entry_per_material() {
        let priced = vec![
            PricedMaterial {
                material: "Steel".to_string(),
                price: 31.5,
                source: PriceSource::Market {
                    symbol: "NUE".to_string(),
                },
            },
            PricedMaterial {
                material: "Steel".to_string(),
                price: 31.5,
                source: PriceSource::Cache {
                    symbol: "NUE".to_string(),
                },
            },
        ];

        let response = to_response(&priced);
        assert_eq!(response.prices.len(), 1);
        assert_eq!(response.prices["Steel"], 31.5);
    }
}
