//! Product import.
//!
//! Two sources feed the importer:
//! - `extract` mines product cards out of an HTML page (read from disk,
//!   stdin, or fetched over HTTP)
//! - `marketplace` turns a marketplace profile or listing URL into
//!   placeholder products
//!
//! Either way the result is a list of [`ImportCandidate`]s, all selected by
//! default. Only the selected ones are stored.

pub mod dom;
pub mod extract;
pub mod marketplace;

pub use extract::extract_products;
pub use marketplace::import_from_url;

use crate::models::{Product, ProductDraft};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;

const USER_AGENT: &str = concat!("shopkeep/", env!("CARGO_PKG_VERSION"));

/// A product pulled from an external page, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    /// Page the product came from; empty when the markup had no product link
    pub source_url: String,
}

/// An extracted product awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCandidate {
    /// Short-lived id (`temp-xxxxxxxxx`) used to pick candidates
    pub temp_id: String,
    #[serde(flatten)]
    pub product: ExtractedProduct,
    pub selected: bool,
}

impl ImportCandidate {
    pub fn new(product: ExtractedProduct) -> Self {
        Self {
            temp_id: temp_id(),
            product,
            selected: true,
        }
    }
}

/// Wrap extracted products as selected candidates.
pub fn candidates_from(products: Vec<ExtractedProduct>) -> Vec<ImportCandidate> {
    products.into_iter().map(ImportCandidate::new).collect()
}

/// Keep only the candidates whose temp id or 1-based position is listed.
///
/// An empty list leaves the selection untouched.
pub fn select_only(candidates: &mut [ImportCandidate], picks: &[String]) {
    if picks.is_empty() {
        return;
    }
    for (i, candidate) in candidates.iter_mut().enumerate() {
        let position = (i + 1).to_string();
        candidate.selected = picks
            .iter()
            .any(|p| *p == candidate.temp_id || *p == position);
    }
}

fn temp_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("temp-{}", &simple[..9])
}

/// Fetch a page for HTML import.
pub fn fetch_html(url: &str) -> Result<String> {
    tracing::debug!(url, "fetching page");
    let response = ureq::get(url).set("User-Agent", USER_AGENT).call();

    match response {
        Ok(resp) => resp
            .into_string()
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e))),
        Err(ureq::Error::Status(code, resp)) => {
            let reason = resp.status_text().to_string();
            Err(Error::Http(format!("HTTP {}: {}", code, reason)))
        }
        Err(e) => Err(Error::Http(e.to_string())),
    }
}

impl Storage {
    // === Import ===

    /// Store every selected candidate as a new product in `category`.
    pub fn import_products(
        &mut self,
        candidates: &[ImportCandidate],
        category: &str,
    ) -> Result<Vec<Product>> {
        let selected: Vec<&ImportCandidate> = candidates.iter().filter(|c| c.selected).collect();
        if selected.is_empty() {
            return Err(Error::InvalidInput("No products selected".to_string()));
        }

        let mut imported = Vec::with_capacity(selected.len());
        for candidate in selected {
            let p = &candidate.product;
            imported.push(self.add_product(ProductDraft {
                name: p.name.clone(),
                price: p.price,
                image: p.image.clone(),
                description: p.description.clone(),
                source_url: p.source_url.clone(),
                category: category.to_string(),
            })?);
        }
        tracing::info!(count = imported.len(), category, "imported products");
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(name: &str) -> ExtractedProduct {
        ExtractedProduct {
            name: name.to_string(),
            price: 12.5,
            description: format!("Description for {}", name),
            image: "/placeholder.svg?height=600&width=600".to_string(),
            source_url: String::new(),
        }
    }

    #[test]
    fn test_candidates_are_selected_with_temp_ids() {
        let candidates = candidates_from(vec![extracted("A"), extracted("B")]);
        assert_eq!(candidates.len(), 2);
        for c in &candidates {
            assert!(c.selected);
            assert!(c.temp_id.starts_with("temp-"));
            assert_eq!(c.temp_id.len(), "temp-".len() + 9);
        }
        assert_ne!(candidates[0].temp_id, candidates[1].temp_id);
    }

    #[test]
    fn test_candidate_json_is_flat() {
        let c = ImportCandidate::new(extracted("Lens Cap"));
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["name"], "Lens Cap");
        assert_eq!(value["selected"], true);
        assert!(value["tempId"].as_str().unwrap().starts_with("temp-"));
    }

    #[test]
    fn test_select_only_by_position_or_id() {
        let mut candidates = candidates_from(vec![extracted("A"), extracted("B"), extracted("C")]);
        let third = candidates[2].temp_id.clone();
        select_only(&mut candidates, &["1".to_string(), third]);
        let selected: Vec<bool> = candidates.iter().map(|c| c.selected).collect();
        assert_eq!(selected, vec![true, false, true]);

        select_only(&mut candidates, &[]);
        assert!(!candidates[1].selected);
    }

    #[test]
    fn test_import_selected_only() {
        let mut storage = Storage::in_memory();
        let before = storage.products().unwrap().len();

        let mut candidates = candidates_from(vec![extracted("Kept"), extracted("Skipped")]);
        candidates[1].selected = false;

        let imported = storage.import_products(&candidates, "accessories").unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].name, "Kept");
        assert_eq!(imported[0].category, "accessories");

        let products = storage.products().unwrap();
        assert_eq!(products.len(), before + 1);
        assert!(products.iter().any(|p| p.id == imported[0].id));
    }

    #[test]
    fn test_import_nothing_selected() {
        let mut storage = Storage::in_memory();
        let mut candidates = candidates_from(vec![extracted("A")]);
        candidates[0].selected = false;
        let err = storage.import_products(&candidates, "bags").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m == "No products selected"));
        assert!(storage.import_products(&[], "bags").is_err());
    }
}
