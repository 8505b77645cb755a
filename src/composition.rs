//! Breaks an item down into its main materials.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::llm::{LanguageModel, Prompt};
use crate::core::schema::MaterialComponent;

const MAX_COMPONENTS: usize = 5;
const PREAMBLE_MARKERS: [&str; 3] = ["here are", "following", "composition of"];

pub struct CompositionAgent {
    llm: Arc<dyn LanguageModel>,
}

impl CompositionAgent {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    fn prompt(item: &str) -> Prompt {
        Prompt::new()
            .system(format!(
                "You are a manufacturing analyst. List the top {MAX_COMPONENTS} raw materials \
                 of the given item by weight. Reply with one material per line in the format \
                 \"Material, percentage\" using plain numbers, most significant first. \
                 No explanations or introductory text."
            ))
            .user(format!("Item: {item}"))
    }

    /// Best-effort breakdown; falls back to a generic one if the model fails
    /// or nothing in its reply parses.
    pub async fn generate(&self, item: &str) -> Vec<MaterialComponent> {
        let components = match self.llm.complete(&Self::prompt(item)).await {
            Ok(reply) => {
                info!(item, reply = %reply.trim(), "Composition reply");
                parse_components(&reply)
            }
            Err(e) => {
                warn!("Composition request failed for {}: {:#}", item, e);
                Vec::new()
            }
        };

        if components.is_empty() {
            warn!("No usable composition for {}, using fallback", item);
            return fallback_components();
        }
        debug!(item, count = components.len(), "Parsed composition");
        components
    }
}

/// Reads `Material, 40`, `Material: 40%` or `Material - 40%` lines.
pub fn parse_components(reply: &str) -> Vec<MaterialComponent> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            !line.is_empty() && !PREAMBLE_MARKERS.iter().any(|m| lower.contains(m))
        })
        .filter_map(parse_component_line)
        .take(MAX_COMPONENTS)
        .collect()
}

fn parse_component_line(line: &str) -> Option<MaterialComponent> {
    let line = line
        .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')'))
        .trim_start_matches(['-', '*', ' ']);
    // A dash only separates when spaced, so `-5` stays a negative number
    let (material, percentage) = line
        .rsplit_once([',', ':'])
        .or_else(|| line.rsplit_once(" - "))?;

    let material = material
        .trim()
        .trim_end_matches([',', ':', '-'])
        .trim_matches('*')
        .trim();
    let percentage: f64 = percentage
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse()
        .ok()?;

    if material.is_empty() || percentage <= 0.0 {
        return None;
    }
    Some(MaterialComponent {
        material: material.to_string(),
        percentage,
    })
}

pub fn fallback_components() -> Vec<MaterialComponent> {
    [
        ("Steel", 40.0),
        ("Plastic", 25.0),
        ("Copper", 15.0),
        ("Glass", 10.0),
        ("Rubber", 10.0),
    ]
    .into_iter()
    .map(|(material, percentage)| MaterialComponent {
        material: material.to_string(),
        percentage,
    })
    .collect()
}
