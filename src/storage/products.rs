//! Product collection accessors.

use super::{Storage, generate_id, keys};
use crate::models::{Product, ProductDraft, round_cents, seed};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;

/// How a bulk price change combines with the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOp {
    Set,
    Increase,
    Decrease,
}

impl FromStr for PriceOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "set" => Ok(Self::Set),
            "increase" | "inc" | "+" => Ok(Self::Increase),
            "decrease" | "dec" | "-" => Ok(Self::Decrease),
            _ => Err(Error::InvalidInput(format!("Invalid price operation: {}", s))),
        }
    }
}

/// A bulk price change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAdjustment {
    pub op: PriceOp,
    pub amount: f64,
    /// Treat `amount` as a percentage of the current price
    pub percent: bool,
}

impl PriceAdjustment {
    /// New price for `current`, never negative, rounded to cents.
    pub fn apply(&self, current: f64) -> f64 {
        let next = match (self.op, self.percent) {
            (PriceOp::Set, _) => self.amount,
            (PriceOp::Increase, true) => current * (1.0 + self.amount / 100.0),
            (PriceOp::Increase, false) => current + self.amount,
            (PriceOp::Decrease, true) => current * (1.0 - self.amount / 100.0),
            (PriceOp::Decrease, false) => current - self.amount,
        };
        round_cents(next.max(0.0))
    }
}

/// Result of a bulk edit: which ids changed and which were not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub updated: Vec<String>,
    pub missing: Vec<String>,
}

impl Storage {
    // === Product Operations ===

    /// All products, seeding the demo catalog on first use.
    pub fn products(&mut self) -> Result<Vec<Product>> {
        self.load_or_seed(keys::PRODUCTS, seed::products)
    }

    /// Get a product by ID.
    pub fn product(&mut self, id: &str) -> Result<Option<Product>> {
        Ok(self.products()?.into_iter().find(|p| p.id == id))
    }

    /// Add a new product with a freshly generated id.
    pub fn add_product(&mut self, draft: ProductDraft) -> Result<Product> {
        let mut products = self.products()?;
        let id = generate_id("", |candidate| products.iter().any(|p| p.id == candidate));
        let product = draft.with_id(id);

        products.push(product.clone());
        self.write_json(keys::PRODUCTS, &products)?;
        tracing::info!(id = %product.id, name = %product.name, "added product");

        Ok(product)
    }

    /// Replace every field of an existing product. `None` when it does not exist.
    pub fn update_product(&mut self, id: &str, draft: ProductDraft) -> Result<Option<Product>> {
        let mut products = self.products()?;
        let Some(index) = products.iter().position(|p| p.id == id) else {
            tracing::warn!(id, "product not found for update");
            return Ok(None);
        };

        let product = draft.with_id(id.to_string());
        products[index] = product.clone();
        self.write_json(keys::PRODUCTS, &products)?;
        tracing::info!(id, category = %product.category, "updated product");

        Ok(Some(product))
    }

    /// Delete a product. Returns false when nothing was removed.
    pub fn delete_product(&mut self, id: &str) -> Result<bool> {
        let products = self.products()?;
        let before = products.len();
        let remaining: Vec<Product> = products.into_iter().filter(|p| p.id != id).collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.write_json(keys::PRODUCTS, &remaining)?;
        tracing::info!(id, "deleted product");
        Ok(true)
    }

    /// Products whose category equals `category`.
    pub fn products_in_category(&mut self, category: &str) -> Result<Vec<Product>> {
        Ok(self
            .products()?
            .into_iter()
            .filter(|p| p.category == category)
            .collect())
    }

    /// Case-insensitive substring search over name, description and category.
    pub fn search_products(&mut self, query: &str) -> Result<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        let products = self.products()?;
        if needle.is_empty() {
            return Ok(products);
        }
        Ok(products
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect())
    }

    // === Bulk Product Operations ===

    /// Apply a price change to each listed product.
    pub fn adjust_prices(&mut self, ids: &[String], adjustment: PriceAdjustment) -> Result<BulkOutcome> {
        self.bulk_edit(ids, |p| p.price = adjustment.apply(p.price))
    }

    /// Move each listed product into `category`.
    pub fn set_category(&mut self, ids: &[String], category: &str) -> Result<BulkOutcome> {
        self.bulk_edit(ids, |p| p.category = category.to_string())
    }

    /// Delete each listed product in one write.
    pub fn delete_products(&mut self, ids: &[String]) -> Result<BulkOutcome> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let products = self.products()?;

        let mut outcome = BulkOutcome::default();
        let mut remaining = Vec::with_capacity(products.len());
        for product in products {
            if wanted.contains(product.id.as_str()) {
                outcome.updated.push(product.id);
            } else {
                remaining.push(product);
            }
        }
        outcome.missing = missing_ids(ids, &outcome.updated);

        if !outcome.updated.is_empty() {
            self.write_json(keys::PRODUCTS, &remaining)?;
            tracing::info!(count = outcome.updated.len(), "bulk deleted products");
        }
        Ok(outcome)
    }

    fn bulk_edit(&mut self, ids: &[String], mut edit: impl FnMut(&mut Product)) -> Result<BulkOutcome> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut products = self.products()?;

        let mut outcome = BulkOutcome::default();
        for product in products.iter_mut().filter(|p| wanted.contains(p.id.as_str())) {
            edit(product);
            outcome.updated.push(product.id.clone());
        }
        outcome.missing = missing_ids(ids, &outcome.updated);

        if !outcome.updated.is_empty() {
            self.write_json(keys::PRODUCTS, &products)?;
            tracing::info!(count = outcome.updated.len(), "bulk edited products");
        }
        Ok(outcome)
    }
}

/// Requested ids with no product, each once, in request order.
fn missing_ids(requested: &[String], found: &[String]) -> Vec<String> {
    let found: HashSet<&str> = found.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| !found.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect()
}
