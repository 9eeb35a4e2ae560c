//! Checkout: shipping validation, order creation and the payment hand-off.
//!
//! A checkout turns the cart into a `pending` order, remembers the order id
//! under `lastOrderId`, and builds the payment widget URL for the cart
//! subtotal. `confirm_last_order` is the other half, run when the shopper
//! returns from the widget.

use crate::models::{
    CartItem, CustomerDraft, Order, OrderDraft, OrderPatch, OrderStatus, PaymentStatus,
    SavedCheckout, ShippingDetails, ShippingDraft, items_subtotal,
};
use crate::storage::{Storage, keys};
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;

/// Payment widget endpoint used when none is configured.
pub const DEFAULT_WIDGET_URL: &str = "https://widget.wert.io/01HCKZD4AEX5VG0ETTAXRB31H3/widget/login";

/// Receiving wallet used when none is configured.
pub const DEFAULT_PAYMENT_ADDRESS: &str = "0xdf1d206b5027947610c7d92058d79df07c7218fd";

/// Path on the storefront the widget redirects back to.
pub const CONFIRMATION_PATH: &str = "/order-confirmation";

/// Parameters for the hosted payment widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfig {
    pub widget_url: String,
    pub address: String,
    pub currency: String,
    pub commodity: String,
    pub network: String,
    pub commodity_id: String,
    /// Origin of the storefront, without a trailing slash
    pub storefront_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            widget_url: DEFAULT_WIDGET_URL.to_string(),
            address: DEFAULT_PAYMENT_ADDRESS.to_string(),
            currency: "USD".to_string(),
            commodity: "USDCc".to_string(),
            network: "polygon".to_string(),
            commodity_id: "usdcc.erc-20.polygon".to_string(),
            storefront_url: crate::config::resolver::DEFAULT_STOREFRONT_URL.to_string(),
        }
    }
}

/// Build the payment widget URL for `amount`.
///
/// Fixed parameters come first in a stable order, then `currency_amount`
/// with two decimals. Values are form-encoded.
pub fn payment_url(amount: f64, config: &PaymentConfig) -> String {
    let commodities = format!(
        r#"[{{"commodity":"{}","network":"{}"}}]"#,
        config.commodity, config.network
    );
    let redirect_url = format!(
        "{}{}",
        config.storefront_url.trim_end_matches('/'),
        CONFIRMATION_PATH
    );
    let amount = format!("{:.2}", amount);

    let params: [(&str, &str); 8] = [
        ("commodity", &config.commodity),
        ("network", &config.network),
        ("commodities", &commodities),
        ("currency", &config.currency),
        ("address", &config.address),
        ("commodity_id", &config.commodity_id),
        ("redirect_url", &redirect_url),
        ("currency_amount", &amount),
    ];

    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
        .collect();

    format!("{}?{}", config.widget_url, query.join("&"))
}

/// `application/x-www-form-urlencoded` encoding of one component.
pub fn form_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

impl ShippingDetails {
    /// Every field must hold something other than whitespace.
    pub fn validate(&self) -> Result<()> {
        match self.missing_fields().as_slice() {
            [] => Ok(()),
            [one] => Err(Error::InvalidInput(format!("Missing required field: {}", one))),
            many => Err(Error::InvalidInput(format!(
                "Missing required fields: {}",
                many.join(", ")
            ))),
        }
    }
}

/// Result of a completed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order: Order,
    pub payment_url: String,
}

impl Storage {
    // === Checkout ===

    /// Find the customer by email (or create one from the shipping details)
    /// and place a pending, unpaid order for them.
    pub fn create_order_from_checkout(
        &mut self,
        items: Vec<CartItem>,
        shipping: ShippingDetails,
        total_amount: f64,
    ) -> Result<Order> {
        let customer = match self.customer_by_email(&shipping.email)? {
            Some(customer) => customer,
            None => self.add_customer(CustomerDraft::from(&shipping))?,
        };

        self.add_order(OrderDraft {
            customer_id: customer.id,
            items,
            shipping_details: shipping,
            total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
        })
    }

    /// Check out the current cart.
    ///
    /// The order is placed for the cart subtotal; `lastOrderId` then holds its
    /// id, and both the saved checkout state and the cart are cleared.
    pub fn checkout(
        &mut self,
        shipping: ShippingDetails,
        payment: &PaymentConfig,
    ) -> Result<CheckoutReceipt> {
        let items = self.cart()?;
        if items.is_empty() {
            return Err(Error::InvalidInput("Cart is empty".to_string()));
        }
        shipping.validate()?;

        let subtotal = items_subtotal(&items);
        let order = self.create_order_from_checkout(items, shipping, subtotal)?;

        self.set_item(keys::LAST_ORDER_ID, &order.id)?;
        let payment_url = payment_url(subtotal, payment);
        self.clear_saved_checkout_state()?;
        self.clear_cart()?;

        tracing::info!(order = %order.id, amount = subtotal, "checkout complete");
        Ok(CheckoutReceipt { order, payment_url })
    }

    /// Id of the order awaiting payment confirmation, if any.
    pub fn last_order_id(&self) -> Result<Option<String>> {
        self.get_item(keys::LAST_ORDER_ID)
    }

    /// Mark the order from the last checkout as processing and paid.
    ///
    /// `None` when no checkout is pending or its order no longer exists; in
    /// the latter case `lastOrderId` is kept.
    pub fn confirm_last_order(&mut self) -> Result<Option<Order>> {
        let Some(order_id) = self.last_order_id()? else {
            return Ok(None);
        };
        if self.order(&order_id)?.is_none() {
            tracing::warn!(order = %order_id, "pending order no longer exists");
            return Ok(None);
        }

        let confirmed = self.update_order(
            &order_id,
            OrderPatch {
                status: Some(OrderStatus::Processing),
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
        )?;
        self.remove_item(keys::LAST_ORDER_ID)?;
        Ok(confirmed)
    }

    // === Saved checkout state ===

    /// Remember the cart and a partly filled shipping form.
    ///
    /// Nothing is written when every shipping field is blank; returns whether
    /// the state was saved.
    pub fn save_checkout_state(
        &mut self,
        cart_items: Vec<CartItem>,
        shipping: ShippingDraft,
    ) -> Result<bool> {
        if shipping.is_blank() {
            return Ok(false);
        }
        let saved = SavedCheckout {
            cart_items,
            shipping_details: shipping,
            timestamp: Utc::now(),
        };
        self.write_json(keys::SAVED_CHECKOUT, &saved)?;
        Ok(true)
    }

    /// The saved checkout state; `None` when absent or unreadable.
    pub fn saved_checkout_state(&self) -> Result<Option<SavedCheckout>> {
        match self.read_json::<SavedCheckout>(keys::SAVED_CHECKOUT) {
            Ok(saved) => Ok(saved),
            Err(Error::Json(e)) => {
                tracing::warn!(error = %e, "saved checkout state is not valid JSON");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn clear_saved_checkout_state(&mut self) -> Result<()> {
        self.remove_item(keys::SAVED_CHECKOUT)
    }
}
