use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{MaterialResolver, NO_MATCH, SymbolMatch};
use crate::core::catalog::CompanyDirectory;
use crate::core::llm::{LanguageModel, Prompt};

const PREAMBLE_MARKERS: [&str; 4] = ["here are", "following", "manufacturers of", "companies that"];
const FORBIDDEN_CHARS: [char; 5] = ['(', ')', '-', ':', ';'];

/// Asks the model for listed companies that produce a material, and prices
/// the material through the first one found in the directory.
pub struct ManufacturerResolver {
    llm: Arc<dyn LanguageModel>,
    directory: Arc<CompanyDirectory>,
    count: usize,
}

impl ManufacturerResolver {
    pub fn new(llm: Arc<dyn LanguageModel>, directory: Arc<CompanyDirectory>, count: usize) -> Self {
        Self {
            llm,
            directory,
            count: count.max(1),
        }
    }

    fn prompt(&self, material: &str) -> Prompt {
        let companies = self
            .directory
            .companies()
            .map(|(name, symbol)| format!("{name} ({symbol})"))
            .collect::<Vec<_>>()
            .join("\n");
        let count = self.count;

        Prompt::new()
            .system(
                "You are a strict data formatter. Return only company names and their stock \
                 symbols. Do not explain, number, describe or introduce the results.",
            )
            .system(format!(
                "Return exactly {count} companies from the list below, one per line, each in \
                 the format \"Company Name, SYMBOL\". Use only listed companies. If none \
                 manufacture the material, reply with exactly {NO_MATCH}.\n\n\
                 Example:\nDow Inc., DOW\nBASF, BASFY\n\n\
                 Available companies:\n{companies}"
            ))
            .user(format!("Return {count} manufacturers for: {material}"))
    }

    /// Every matched manufacturer, in reply order.
    pub async fn find_manufacturers(&self, material: &str) -> Result<Vec<SymbolMatch>> {
        if self.directory.is_empty() {
            warn!("No company data available");
            return Ok(Vec::new());
        }

        let reply = self.llm.complete(&self.prompt(material)).await?;
        info!(material, reply = %reply.trim(), "Manufacturer mapping reply");

        let lines = parse_company_lines(&reply);
        debug!(material, candidates = ?lines, "Candidate manufacturer lines");

        let matches: Vec<SymbolMatch> = lines
            .iter()
            .filter_map(|line| {
                let found = match_company(&self.directory, line);
                if found.is_none() {
                    if line.contains(FORBIDDEN_CHARS) {
                        warn!("Skipping invalid format line: {}", line);
                    } else {
                        warn!("No match found for company: {}", line);
                    }
                }
                found
            })
            .take(self.count)
            .collect();

        if matches.is_empty() {
            warn!("No suitable manufacturers found for {}", material);
        }
        Ok(matches)
    }
}

#[async_trait]
impl MaterialResolver<SymbolMatch> for ManufacturerResolver {
    async fn resolve(&self, material: &str) -> Result<Option<SymbolMatch>> {
        Ok(self.find_manufacturers(material).await?.into_iter().next())
    }
}

/// Lines shaped like `Company Name, SYMBOL`, with list markers stripped.
///
/// Lines carrying descriptions are kept here; they only count when the
/// company part still matches the directory.
fn parse_company_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != NO_MATCH)
        .filter(|line| {
            let lower = line.to_lowercase();
            !PREAMBLE_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .map(strip_list_marker)
        .filter(|line| line.contains(','))
        .map(str::to_string)
        .collect()
}

/// Drops `1.`, `2)`, `-` or `*` in front of a line, leaving names like `3M` intact.
fn strip_list_marker(line: &str) -> &str {
    let unnumbered = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let line = match unnumbered.strip_prefix(['.', ')']) {
        Some(rest) => rest,
        None => line,
    };
    line.trim_start_matches(['-', '*', ' '])
}

/// Company name exact match, then partial name match, then the stated symbol.
fn match_company(directory: &CompanyDirectory, line: &str) -> Option<SymbolMatch> {
    let (company, symbol) = line.rsplit_once(',').unwrap_or((line, ""));
    let company = company.trim();
    let symbol = symbol.trim();

    directory
        .find_exact(company)
        .or_else(|| directory.find_partial(company))
        .or_else(|| directory.find_symbol(symbol))
        .map(|(name, symbol)| SymbolMatch::new(symbol, name))
}
