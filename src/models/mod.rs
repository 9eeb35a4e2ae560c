//! Data models for Shopkeep records.
//!
//! This module defines the core data structures:
//! - `Product` - Catalog entries with price, image and category
//! - `CartItem` - A product plus a quantity, held in the cart
//! - `Customer` - Contact/address record with order back-references
//! - `Order` - Items, shipping snapshot, totals and status
//!
//! Every record serializes with camelCase field names so stored blobs keep
//! the layout the storefront has always written.

pub mod seed;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed category list shown in the storefront navigation: (value, label).
pub const CATEGORIES: [(&str, &str); 4] = [
    ("cameras", "Cameras"),
    ("bags", "Bags"),
    ("accessories", "Accessories"),
    ("new", "New Arrivals"),
];

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "cameras";

/// Check whether a category value is one of the storefront categories.
pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.iter().any(|(value, _)| *value == category)
}

/// Round a money amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    /// Page the product was taken from, if any
    #[serde(default)]
    pub source_url: String,
    /// Free-text category, matched against [`CATEGORIES`]
    #[serde(default)]
    pub category: String,
}

/// Product fields without an id, used for creation and full replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub image: String,
    pub description: String,
    pub source_url: String,
    pub category: String,
}

impl ProductDraft {
    /// Attach an id to produce a stored product.
    pub fn with_id(self, id: String) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            image: self.image,
            description: self.description,
            source_url: self.source_url,
            category: self.category,
        }
    }
}

impl From<Product> for ProductDraft {
    fn from(p: Product) -> Self {
        Self {
            name: p.name,
            price: p.price,
            image: p.image,
            description: p.description,
            source_url: p.source_url,
            category: p.category,
        }
    }
}

/// A product in the cart or on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Price times quantity, unrounded.
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Sum of line totals rounded to cents.
pub fn items_subtotal(items: &[CartItem]) -> f64 {
    round_cents(items.iter().map(CartItem::line_total).sum())
}

/// Shipping form submitted at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingDetails {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

impl ShippingDetails {
    /// Field names (as stored) paired with their values, in form order.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("fullName", &self.full_name),
            ("address", &self.address),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
            ("email", &self.email),
        ]
    }

    /// Names of the fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k)
            .collect()
    }
}

/// A partially filled shipping form, as kept between checkout visits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ShippingDraft {
    /// True when no field holds anything but whitespace.
    pub fn is_blank(&self) -> bool {
        [
            &self.full_name,
            &self.address,
            &self.city,
            &self.postal_code,
            &self.country,
            &self.phone,
            &self.email,
        ]
        .iter()
        .all(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
    }

    /// Overlay the draft onto complete details; draft values win.
    pub fn fill(&self, base: ShippingDetails) -> ShippingDetails {
        let pick = |draft: &Option<String>, current: String| draft.clone().unwrap_or(current);
        ShippingDetails {
            full_name: pick(&self.full_name, base.full_name),
            address: pick(&self.address, base.address),
            city: pick(&self.city, base.city),
            postal_code: pick(&self.postal_code, base.postal_code),
            country: pick(&self.country, base.country),
            phone: pick(&self.phone, base.phone),
            email: pick(&self.email, base.email),
        }
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(Error::InvalidInput(format!("Invalid order status: {}", s))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(Error::InvalidInput(format!("Invalid payment status: {}", s))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier (e.g., "order-1718000000000")
    pub id: String,

    /// Owning customer; not enforced beyond the customer's `orders` list
    #[serde(default)]
    pub customer_id: String,

    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Shipping form as submitted
    #[serde(default)]
    pub shipping_details: ShippingDetails,

    #[serde(default)]
    pub total_amount: f64,

    #[serde(default)]
    pub status: OrderStatus,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    /// Records written without timestamps read as the Unix epoch
    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Order fields supplied by the caller; id and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: String,
    pub items: Vec<CartItem>,
    pub shipping_details: ShippingDetails,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Partial order update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub customer_id: Option<String>,
    pub items: Option<Vec<CartItem>>,
    pub shipping_details: Option<ShippingDetails>,
    pub total_amount: Option<f64>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch into an order (id and timestamps are left alone).
    pub fn apply(self, order: &mut Order) {
        if let Some(v) = self.customer_id {
            order.customer_id = v;
        }
        if let Some(v) = self.items {
            order.items = v;
        }
        if let Some(v) = self.shipping_details {
            order.shipping_details = v;
        }
        if let Some(v) = self.total_amount {
            order.total_amount = v;
        }
        if let Some(v) = self.status {
            order.status = v;
        }
        if let Some(v) = self.payment_status {
            order.payment_status = v;
        }
    }
}

/// A customer record, de-duplicated by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique identifier (e.g., "customer-1718000000000")
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,

    /// Ids of this customer's orders, in placement order
    #[serde(default)]
    pub orders: Vec<String>,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// Customer contact fields; id, order list and creation time are assigned on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&ShippingDetails> for CustomerDraft {
    fn from(s: &ShippingDetails) -> Self {
        Self {
            full_name: s.full_name.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            address: s.address.clone(),
            city: s.city.clone(),
            postal_code: s.postal_code.clone(),
            country: s.country.clone(),
        }
    }
}

/// Partial customer update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub orders: Option<Vec<String>>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, customer: &mut Customer) {
        let set = |slot: &mut String, v: Option<String>| {
            if let Some(v) = v {
                *slot = v;
            }
        };
        set(&mut customer.full_name, self.full_name);
        set(&mut customer.email, self.email);
        set(&mut customer.phone, self.phone);
        set(&mut customer.address, self.address);
        set(&mut customer.city, self.city);
        set(&mut customer.postal_code, self.postal_code);
        set(&mut customer.country, self.country);
        if let Some(orders) = self.orders {
            customer.orders = orders;
        }
    }
}

/// Back-office login, compared as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

/// Checkout form state kept so a shopper can come back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCheckout {
    pub cart_items: Vec<CartItem>,
    pub shipping_details: ShippingDraft,
    pub timestamp: DateTime<Utc>,
}
