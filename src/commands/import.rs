//! Import commands.

use super::{Output, json, money, plural};
use crate::config::{ConfigOverrides, resolve_config};
use crate::import::{self, ImportCandidate};
use crate::models::{CATEGORIES, Product, is_known_category};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// Where an HTML page comes from.
#[derive(Debug, Clone)]
pub enum HtmlSource {
    File(PathBuf),
    Stdin,
    Url(String),
}

impl HtmlSource {
    /// `-` is stdin, `http(s)://` is fetched, anything else is a file path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => Ok(std::fs::read_to_string(path)?),
            Self::Stdin => {
                let mut html = String::new();
                std::io::stdin().read_to_string(&mut html)?;
                Ok(html)
            }
            Self::Url(url) => import::fetch_html(url),
        }
    }
}

/// How candidates are picked and stored.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Category for imported products; the configured default when unset
    pub category: Option<String>,
    /// Temp ids or 1-based positions to keep; all when empty
    pub only: Vec<String>,
    /// List the candidates without storing anything
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub candidates: Vec<ImportCandidate>,
    pub imported: Vec<Product>,
    pub category: String,
    pub dry_run: bool,
}

impl Output for ImportResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Found {}:", plural(self.candidates.len(), "product"))];
        for (i, c) in self.candidates.iter().enumerate() {
            lines.push(format!(
                "  {} {:>2}. {} - {} [{}]",
                if c.selected { "[x]" } else { "[ ]" },
                i + 1,
                c.product.name,
                money(c.product.price),
                c.temp_id
            ));
        }
        if self.dry_run {
            lines.push("Dry run: nothing imported.".to_string());
        } else {
            lines.push(format!(
                "Imported {} into {}.",
                plural(self.imported.len(), "product"),
                self.category
            ));
        }
        lines.join("\n")
    }
}

/// Import products found in an HTML page.
pub fn import_html(
    storage: &mut Storage,
    source: &HtmlSource,
    options: ImportOptions,
    overrides: &ConfigOverrides,
) -> Result<ImportResult> {
    let html = source.read()?;
    let products = import::extract_products(&html);
    if products.is_empty() {
        return Err(Error::NotFound("No products found".to_string()));
    }
    finish(storage, import::candidates_from(products), options, overrides)
}

/// Import placeholder products for a marketplace profile or listing URL.
pub fn import_url(
    storage: &mut Storage,
    url: &str,
    options: ImportOptions,
    overrides: &ConfigOverrides,
) -> Result<ImportResult> {
    let products = import::import_from_url(url)?;
    finish(storage, import::candidates_from(products), options, overrides)
}

fn finish(
    storage: &mut Storage,
    mut candidates: Vec<ImportCandidate>,
    options: ImportOptions,
    overrides: &ConfigOverrides,
) -> Result<ImportResult> {
    let category = match options.category {
        Some(c) => c,
        None => resolve_config(storage, overrides)?.default_category().to_string(),
    };
    if !is_known_category(&category) {
        let known: Vec<&str> = CATEGORIES.iter().map(|(value, _)| *value).collect();
        return Err(Error::InvalidInput(format!(
            "Unknown category: {} (expected one of {})",
            category,
            known.join(", ")
        )));
    }

    import::select_only(&mut candidates, &options.only);

    let imported = if options.dry_run {
        Vec::new()
    } else {
        storage.import_products(&candidates, &category)?
    };

    Ok(ImportResult {
        candidates,
        imported,
        category,
        dry_run: options.dry_run,
    })
}
