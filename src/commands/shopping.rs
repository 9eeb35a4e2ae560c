//! Cart and checkout commands.

use super::orders::format_order;
use super::{Output, json, money, plural};
use crate::checkout::CheckoutReceipt;
use crate::config::{ConfigOverrides, resolve_config};
use crate::models::{CartItem, Order, SavedCheckout, ShippingDetails, ShippingDraft, items_subtotal};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;

// === Cart ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: f64,
}

impl CartView {
    fn new(items: Vec<CartItem>) -> Self {
        Self {
            item_count: items.iter().map(|i| i.quantity).sum(),
            subtotal: items_subtotal(&items),
            items,
        }
    }
}

impl Output for CartView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.items.is_empty() {
            return "Cart is empty.".to_string();
        }
        let mut lines = Vec::with_capacity(self.items.len() + 1);
        for item in &self.items {
            lines.push(format!(
                "  [{}] {} x {} @ {} = {}",
                item.product.id,
                item.quantity,
                item.product.name,
                money(item.product.price),
                money(item.line_total())
            ));
        }
        lines.push(format!(
            "{}, subtotal {}",
            plural(self.item_count as usize, "item"),
            money(self.subtotal)
        ));
        lines.join("\n")
    }
}

pub fn cart_show(storage: &Storage) -> Result<CartView> {
    Ok(CartView::new(storage.cart()?))
}

/// Add a catalog product to the cart.
pub fn cart_add(storage: &mut Storage, product_id: &str, quantity: u32) -> Result<CartView> {
    if quantity == 0 {
        return Err(Error::InvalidInput("Quantity must be at least 1".to_string()));
    }
    let product = storage
        .product(product_id)?
        .ok_or_else(|| Error::NotFound(format!("Product {}", product_id)))?;
    Ok(CartView::new(storage.add_to_cart(product, quantity)?))
}

/// Set a line's quantity; 0 removes it.
pub fn cart_set(storage: &mut Storage, product_id: &str, quantity: u32) -> Result<CartView> {
    if !storage.set_cart_quantity(product_id, quantity)? {
        return Err(Error::NotFound(format!("Product {} in cart", product_id)));
    }
    cart_show(storage)
}

pub fn cart_remove(storage: &mut Storage, product_id: &str) -> Result<CartView> {
    if !storage.remove_from_cart(product_id)? {
        return Err(Error::NotFound(format!("Product {} in cart", product_id)));
    }
    cart_show(storage)
}

pub fn cart_clear(storage: &mut Storage) -> Result<CartView> {
    storage.clear_cart()?;
    Ok(CartView::new(Vec::new()))
}

// === Checkout ===

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CheckoutResult(pub CheckoutReceipt);

impl Output for CheckoutResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "{}\n\nComplete payment at:\n  {}",
            format_order(&self.0.order),
            self.0.payment_url
        )
    }
}

/// Place an order for the current cart.
///
/// With `resume`, the saved checkout state fills in any shipping field not
/// given on the command line, and restores its cart when the cart is empty.
pub fn checkout_place(
    storage: &mut Storage,
    shipping: ShippingDraft,
    resume: bool,
    overrides: &ConfigOverrides,
) -> Result<CheckoutResult> {
    let mut base = ShippingDetails::default();
    if resume {
        let saved = storage
            .saved_checkout_state()?
            .ok_or_else(|| Error::NotFound("Saved checkout".to_string()))?;
        if storage.cart()?.is_empty() {
            for item in saved.cart_items {
                storage.add_to_cart(item.product, item.quantity)?;
            }
        }
        base = saved.shipping_details.fill(base);
    }
    let details = shipping.fill(base);

    let payment = resolve_config(storage, overrides)?.payment();
    Ok(CheckoutResult(storage.checkout(details, &payment)?))
}

#[derive(Serialize)]
pub struct SaveResult {
    pub saved: bool,
    pub items: usize,
}

impl Output for SaveResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.saved {
            format!("Saved checkout with {} in the cart", plural(self.items, "line"))
        } else {
            "Nothing saved: no shipping details given".to_string()
        }
    }
}

/// Remember the cart and a partly filled shipping form for later.
pub fn checkout_save(storage: &mut Storage, shipping: ShippingDraft) -> Result<SaveResult> {
    let items = storage.cart()?;
    let count = items.len();
    let saved = storage.save_checkout_state(items, shipping)?;
    Ok(SaveResult {
        saved,
        items: if saved { count } else { 0 },
    })
}

#[derive(Serialize)]
pub struct SavedView {
    pub saved: Option<SavedCheckout>,
}

impl Output for SavedView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let Some(saved) = &self.saved else {
            return "No saved checkout.".to_string();
        };
        let mut lines = vec![format!(
            "Saved {}",
            saved.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )];
        if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(&saved.shipping_details) {
            for (k, v) in fields {
                lines.push(format!("  {:<11} {}", k, v.as_str().unwrap_or_default()));
            }
        }
        lines.push(format!("  {} in cart", plural(saved.cart_items.len(), "line")));
        lines.join("\n")
    }
}

pub fn checkout_saved(storage: &Storage) -> Result<SavedView> {
    Ok(SavedView {
        saved: storage.saved_checkout_state()?,
    })
}

pub fn checkout_discard(storage: &mut Storage) -> Result<SavedView> {
    storage.clear_saved_checkout_state()?;
    Ok(SavedView { saved: None })
}

#[derive(Serialize)]
pub struct ConfirmResult {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

impl Output for ConfirmResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.order {
            Some(order) => format!("Payment confirmed.\n{}", format_order(order)),
            None => "No order awaiting confirmation.".to_string(),
        }
    }
}

/// Mark the order from the last checkout as paid.
pub fn checkout_confirm(storage: &mut Storage) -> Result<ConfirmResult> {
    let order = storage.confirm_last_order()?;
    Ok(ConfirmResult {
        confirmed: order.is_some(),
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, PaymentStatus};

    fn shipping() -> ShippingDraft {
        ShippingDraft {
            full_name: Some("Grace Hopper".to_string()),
            address: Some("1 Navy Yard".to_string()),
            city: Some("Arlington".to_string()),
            postal_code: Some("22202".to_string()),
            country: Some("us".to_string()),
            phone: Some("+1 555-010-0101".to_string()),
            email: Some("grace@example.com".to_string()),
        }
    }

    #[test]
    fn test_cart_flow() {
        let mut storage = Storage::in_memory();
        cart_add(&mut storage, "1", 1).unwrap();
        let view = cart_add(&mut storage, "1", 2).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, 389.97);

        let view = cart_set(&mut storage, "1", 1).unwrap();
        assert_eq!(view.item_count, 1);
        assert!(matches!(cart_set(&mut storage, "9", 1), Err(Error::NotFound(_))));
        assert!(matches!(cart_add(&mut storage, "nope", 1), Err(Error::NotFound(_))));
        assert!(cart_add(&mut storage, "1", 0).is_err());

        let view = cart_remove(&mut storage, "1").unwrap();
        assert!(view.items.is_empty());
        assert!(cart_remove(&mut storage, "1").is_err());
    }

    #[test]
    fn test_place_and_confirm() {
        let mut storage = Storage::in_memory();
        cart_add(&mut storage, "6", 2).unwrap();

        let overrides = ConfigOverrides::new().with_storefront_url("https://shop.example");
        let receipt = checkout_place(&mut storage, shipping(), false, &overrides).unwrap().0;
        assert_eq!(receipt.order.total_amount, 99.98);
        assert!(receipt.payment_url.contains("currency_amount=99.98"));
        assert!(receipt.payment_url.contains(
            "redirect_url=https%3A%2F%2Fshop.example%2Forder-confirmation"
        ));
        assert!(storage.cart().unwrap().is_empty());

        let confirmed = checkout_confirm(&mut storage).unwrap();
        assert!(confirmed.confirmed);
        let order = confirmed.order.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_status, PaymentStatus::Paid);

        assert!(!checkout_confirm(&mut storage).unwrap().confirmed);
    }

    #[test]
    fn test_place_reports_missing_fields() {
        let mut storage = Storage::in_memory();
        cart_add(&mut storage, "6", 1).unwrap();
        let mut partial = shipping();
        partial.phone = None;
        let err = checkout_place(&mut storage, partial, false, &ConfigOverrides::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Missing required field: phone");
        assert_eq!(storage.cart().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_resume() {
        let mut storage = Storage::in_memory();
        cart_add(&mut storage, "2", 1).unwrap();

        let blank = checkout_save(&mut storage, ShippingDraft::default()).unwrap();
        assert!(!blank.saved);

        let mut partial = shipping();
        partial.email = None;
        assert!(checkout_save(&mut storage, partial).unwrap().saved);
        assert!(checkout_saved(&storage).unwrap().saved.is_some());

        storage.clear_cart().unwrap();
        let only_email = ShippingDraft {
            email: Some("grace@example.com".to_string()),
            ..Default::default()
        };
        let receipt = checkout_place(&mut storage, only_email, true, &ConfigOverrides::default())
            .unwrap()
            .0;
        assert_eq!(receipt.order.items.len(), 1);
        assert_eq!(receipt.order.shipping_details.city, "Arlington");
        assert!(checkout_saved(&storage).unwrap().saved.is_none());
    }

    #[test]
    fn test_resume_without_saved_state() {
        let mut storage = Storage::in_memory();
        assert!(matches!(
            checkout_place(&mut storage, shipping(), true, &ConfigOverrides::default()),
            Err(Error::NotFound(_))
        ));
    }
}
