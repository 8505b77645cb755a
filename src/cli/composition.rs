use anyhow::Result;
use comfy_table::Cell;

use super::ui;
use crate::composition::CompositionAgent;
use crate::core::schema::{CompositionRequest, CompositionResponse};

pub async fn run(agent: &CompositionAgent, request: &CompositionRequest, json: bool) -> Result<()> {
    let item = request.item.trim();
    if item.is_empty() {
        anyhow::bail!("Item must not be empty");
    }

    let response = CompositionResponse {
        item: item.to_string(),
        components: agent.generate(item).await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        display_composition(&response);
    }
    Ok(())
}

fn display_composition(response: &CompositionResponse) {
    println!(
        "\nComposition: {}",
        ui::style_text(&response.item, ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Material"), ui::header_cell("Share")]);
    for component in &response.components {
        table.add_row(vec![
            Cell::new(&component.material),
            ui::percentage_cell(component.percentage),
        ]);
    }
    println!("{table}");

    let total: f64 = response.components.iter().map(|c| c.percentage).sum();
    println!(
        "{} {}",
        ui::style_text("Total:", ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total:.1}%"), ui::StyleType::TotalValue)
    );
}
