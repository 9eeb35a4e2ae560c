//! Product commands: CRUD, search and bulk edits.

use super::{Output, json, money, plural};
use crate::config::{ConfigOverrides, resolve_config};
use crate::models::{Product, ProductDraft, is_known_category};
use crate::storage::Storage;
use crate::storage::products::{BulkOutcome, PriceAdjustment, PriceOp};
use crate::{Error, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub count: usize,
}

impl ProductList {
    fn new(products: Vec<Product>) -> Self {
        Self {
            count: products.len(),
            products,
        }
    }
}

impl Output for ProductList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.products.is_empty() {
            return "No products found.".to_string();
        }
        let mut lines = vec![format!("{}:", plural(self.count, "product"))];
        for p in &self.products {
            lines.push(format!(
                "  [{}] {} - {} ({})",
                p.id,
                p.name,
                money(p.price),
                if p.category.is_empty() { "-" } else { &p.category }
            ));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct ProductShow(pub Product);

impl Output for ProductShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let p = &self.0;
        let mut lines = vec![
            format!("{} [{}]", p.name, p.id),
            format!("  Price:    {}", money(p.price)),
            format!("  Category: {}", p.category),
            format!("  Image:    {}", p.image),
        ];
        if !p.source_url.is_empty() {
            lines.push(format!("  Source:   {}", p.source_url));
        }
        if !p.description.is_empty() {
            lines.push(String::new());
            lines.push(format!("  {}", p.description));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

impl Output for Deleted {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Deleted {}", self.id)
    }
}

/// Fields for a new product. Unset optional fields are left empty; an unset
/// category falls back to the configured default.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub category: Option<String>,
}

/// Fields to change on an existing product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub category: Option<String>,
}

impl ProductUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn check_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Price must be a non-negative number, got {}",
            price
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Product name must not be empty".to_string()));
    }
    Ok(())
}

fn note_category(category: &str) {
    if !category.is_empty() && !is_known_category(category) {
        tracing::warn!(category, "category is not one of the storefront categories");
    }
}

fn lookup(storage: &mut Storage, id: &str) -> Result<Product> {
    storage
        .product(id)?
        .ok_or_else(|| Error::NotFound(format!("Product {}", id)))
}

/// All products, optionally limited to one category.
pub fn product_list(storage: &mut Storage, category: Option<&str>) -> Result<ProductList> {
    let products = match category {
        Some(c) => storage.products_in_category(c)?,
        None => storage.products()?,
    };
    Ok(ProductList::new(products))
}

pub fn product_show(storage: &mut Storage, id: &str) -> Result<ProductShow> {
    Ok(ProductShow(lookup(storage, id)?))
}

pub fn product_search(storage: &mut Storage, query: &str) -> Result<ProductList> {
    Ok(ProductList::new(storage.search_products(query)?))
}

pub fn product_add(
    storage: &mut Storage,
    input: ProductInput,
    overrides: &ConfigOverrides,
) -> Result<ProductShow> {
    check_name(&input.name)?;
    check_price(input.price)?;

    let category = match input.category {
        Some(c) => c,
        None => resolve_config(storage, overrides)?.default_category().to_string(),
    };
    note_category(&category);

    let product = storage.add_product(ProductDraft {
        name: input.name,
        price: input.price,
        image: input.image.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        source_url: input.source_url.unwrap_or_default(),
        category,
    })?;
    Ok(ProductShow(product))
}

/// Change the given fields and store the product as a full replacement.
pub fn product_update(storage: &mut Storage, id: &str, update: ProductUpdate) -> Result<ProductShow> {
    if update.is_empty() {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }
    if let Some(name) = &update.name {
        check_name(name)?;
    }
    if let Some(price) = update.price {
        check_price(price)?;
    }

    let mut draft = ProductDraft::from(lookup(storage, id)?);
    if let Some(v) = update.name {
        draft.name = v;
    }
    if let Some(v) = update.price {
        draft.price = v;
    }
    if let Some(v) = update.image {
        draft.image = v;
    }
    if let Some(v) = update.description {
        draft.description = v;
    }
    if let Some(v) = update.source_url {
        draft.source_url = v;
    }
    if let Some(v) = update.category {
        note_category(&v);
        draft.category = v;
    }

    storage
        .update_product(id, draft)?
        .map(ProductShow)
        .ok_or_else(|| Error::NotFound(format!("Product {}", id)))
}

pub fn product_delete(storage: &mut Storage, id: &str) -> Result<Deleted> {
    if !storage.delete_product(id)? {
        return Err(Error::NotFound(format!("Product {}", id)));
    }
    Ok(Deleted {
        id: id.to_string(),
        deleted: true,
    })
}

// === Bulk edits ===

#[derive(Serialize)]
pub struct BulkResult {
    pub action: String,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

impl Output for BulkResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "{}: {}",
            self.action,
            plural(self.outcome.updated.len(), "product")
        );
        if !self.outcome.missing.is_empty() {
            out.push_str(&format!("\n  Not found: {}", self.outcome.missing.join(", ")));
        }
        out
    }
}

fn require_ids(ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(Error::InvalidInput("No products selected".to_string()));
    }
    Ok(())
}

/// Apply `op` (`set`, `increase`, `decrease`) by `amount` or `amount` percent.
pub fn product_bulk_price(
    storage: &mut Storage,
    ids: &[String],
    op: &str,
    amount: f64,
    percent: bool,
) -> Result<BulkResult> {
    require_ids(ids)?;
    check_price(amount)?;
    let op: PriceOp = op.parse()?;
    let outcome = storage.adjust_prices(ids, PriceAdjustment { op, amount, percent })?;
    Ok(BulkResult {
        action: "Updated prices".to_string(),
        outcome,
    })
}

pub fn product_bulk_category(storage: &mut Storage, ids: &[String], category: &str) -> Result<BulkResult> {
    require_ids(ids)?;
    note_category(category);
    let outcome = storage.set_category(ids, category)?;
    Ok(BulkResult {
        action: format!("Moved to {}", category),
        outcome,
    })
}

pub fn product_bulk_delete(storage: &mut Storage, ids: &[String]) -> Result<BulkResult> {
    require_ids(ids)?;
    let outcome = storage.delete_products(ids)?;
    Ok(BulkResult {
        action: "Deleted".to_string(),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, price: f64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price,
            category: Some("accessories".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_show_update_delete() {
        let mut storage = Storage::in_memory();
        let added = product_add(&mut storage, input("Lens Hood", 19.0), &ConfigOverrides::default())
            .unwrap()
            .0;
        assert_eq!(product_show(&mut storage, &added.id).unwrap().0, added);

        let updated = product_update(
            &mut storage,
            &added.id,
            ProductUpdate {
                price: Some(21.5),
                ..Default::default()
            },
        )
        .unwrap()
        .0;
        assert_eq!(updated.price, 21.5);
        assert_eq!(updated.name, "Lens Hood");
        assert_eq!(updated.category, "accessories");

        product_delete(&mut storage, &added.id).unwrap();
        assert!(matches!(
            product_show(&mut storage, &added.id),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            product_delete(&mut storage, &added.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_uses_override_category() {
        let mut storage = Storage::in_memory();
        let mut no_category = input("Strap", 9.0);
        no_category.category = None;
        let overrides = ConfigOverrides::new().with_default_category("bags");
        let added = product_add(&mut storage, no_category, &overrides).unwrap().0;
        assert_eq!(added.category, "bags");
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut storage = Storage::in_memory();
        let overrides = ConfigOverrides::default();
        assert!(product_add(&mut storage, input(" ", 1.0), &overrides).is_err());
        assert!(product_add(&mut storage, input("X", -1.0), &overrides).is_err());
        assert!(product_add(&mut storage, input("X", f64::NAN), &overrides).is_err());
    }

    #[test]
    fn test_update_needs_fields() {
        let mut storage = Storage::in_memory();
        let id = storage.products().unwrap()[0].id.clone();
        assert!(matches!(
            product_update(&mut storage, &id, ProductUpdate::default()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            product_update(
                &mut storage,
                "nope",
                ProductUpdate {
                    name: Some("x".to_string()),
                    ..Default::default()
                }
            ),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_filters_by_category() {
        let mut storage = Storage::in_memory();
        let bags = product_list(&mut storage, Some("bags")).unwrap();
        assert!(bags.products.iter().all(|p| p.category == "bags"));
        assert_eq!(bags.count, bags.products.len());
        let all = product_list(&mut storage, None).unwrap();
        assert!(all.count >= bags.count);
    }

    #[test]
    fn test_bulk_price_reports_missing() {
        let mut storage = Storage::in_memory();
        let first = storage.products().unwrap()[0].clone();
        let ids = vec![first.id.clone(), "missing".to_string()];

        let result = product_bulk_price(&mut storage, &ids, "set", 10.0, false).unwrap();
        assert_eq!(result.outcome.updated, vec![first.id.clone()]);
        assert_eq!(result.outcome.missing, vec!["missing".to_string()]);
        assert_eq!(storage.product(&first.id).unwrap().unwrap().price, 10.0);
        assert!(result.to_human().contains("Not found: missing"));

        assert!(product_bulk_price(&mut storage, &ids, "double", 1.0, false).is_err());
        assert!(product_bulk_price(&mut storage, &[], "set", 1.0, false).is_err());
    }

    #[test]
    fn test_bulk_category_and_delete() {
        let mut storage = Storage::in_memory();
        let ids: Vec<String> = storage.products().unwrap().iter().take(2).map(|p| p.id.clone()).collect();

        product_bulk_category(&mut storage, &ids, "new").unwrap();
        for id in &ids {
            assert_eq!(storage.product(id).unwrap().unwrap().category, "new");
        }

        let deleted = product_bulk_delete(&mut storage, &ids).unwrap();
        assert_eq!(deleted.outcome.updated.len(), 2);
        assert!(storage.product(&ids[0]).unwrap().is_none());
    }
}
