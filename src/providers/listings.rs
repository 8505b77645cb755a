//! Loads exchange listing files into the manufacturer directory.
//!
//! Listings are the pipe-delimited symbol directories published by NASDAQ
//! (`nasdaqlisted.txt`, `otherlisted.txt`): a header row, then one company per
//! line with the symbol in the first column and the name in the second.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::catalog::CompanyDirectory;

/// Reads one listing file as `(name, symbol)` pairs.
pub fn load_listing(path: &Path) -> Result<Vec<(String, String)>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read listing file: {}", path.display()))?;

    let companies = content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split('|');
            let symbol = columns.next()?.trim();
            let name = columns.next()?.trim();
            if symbol.is_empty() || name.is_empty() || symbol.starts_with("File Creation Time") {
                return None;
            }
            Some((name.to_string(), symbol.to_string()))
        })
        .collect();
    Ok(companies)
}

/// Builds the directory from every readable listing, or the built-in
/// manufacturer table when none yields a company.
pub fn load_directory(paths: &[PathBuf]) -> CompanyDirectory {
    let mut companies = Vec::new();
    for path in paths {
        match load_listing(path) {
            Ok(mut listed) => {
                info!(count = listed.len(), path = %path.display(), "Loaded listing");
                companies.append(&mut listed);
            }
            Err(e) => warn!("Skipping listing: {:#}", e),
        }
    }

    if companies.is_empty() {
        info!("No listed companies loaded, using built-in manufacturers");
        return CompanyDirectory::builtin();
    }
    CompanyDirectory::new(companies)
}
