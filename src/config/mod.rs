//! Configuration for Shopkeep.
//!
//! ## config.kdl - Shop preferences
//!
//! Located at:
//! - System: `~/.config/shopkeep/config.kdl` (or `$SHOP_CONFIG_DIR/config.kdl`)
//! - Shop: `~/.local/share/shopkeep/<shop-hash>/config.kdl`
//!
//! Contains:
//! - `backend` - Storage backend, recorded once at `shop init`
//! - `output-format` - "json" or "human"
//! - `default-category` - Category for imported products
//! - `storefront-url` - Origin the payment widget redirects back to
//! - `action-log` - Whether commands are appended to action.log
//! - `payment-*` - Payment widget parameters
//!
//! The shop file's presence is what marks a shop as initialized.
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve, resolve_config,
    resolve_without_shop, system_config_path,
};
pub use schema::{CONFIG_KEYS, OutputFormat, ShopConfig};
