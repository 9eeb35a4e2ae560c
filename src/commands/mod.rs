//! Command implementations for the `shop` CLI.
//!
//! This module contains the business logic for each CLI command. Commands
//! work on an already opened [`Storage`] and return a result type that
//! implements [`Output`]. They are organized by what they act on:
//! - `catalog` - Product CRUD, search and bulk edits
//! - `orders` - Order listing, status changes and deletion
//! - `customers` - Customer records and spend summaries
//! - `shopping` - Cart and checkout
//! - `import` - HTML and marketplace product import
//! - `admin` - Login, credentials and site settings
//!
//! Shop-level commands (init, stats, config, action log, raw keys) live here.

pub mod admin;
pub mod catalog;
pub mod customers;
pub mod import;
pub mod orders;
pub mod shopping;

use crate::action_log::{self, ActionLog};
use crate::config::{ConfigOverrides, ResolvedConfig, ShopConfig, resolve_config, system_config_path};
use crate::models::{Customer, Order, Product};
use crate::storage::{BackendType, ShopStats, Storage, backend::validate_key, keys};
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize a result for JSON output.
pub(crate) fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Format a price for human output.
pub(crate) fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// `n thing` / `n things`.
pub(crate) fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// === Init ===

#[derive(Serialize)]
pub struct InitResult {
    pub initialized: bool,
    pub backend: String,
    pub storage_path: String,
    pub config_path: String,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.initialized {
            format!(
                "Initialized shop ({} backend)\n  Data:   {}\n  Config: {}",
                self.backend, self.storage_path, self.config_path
            )
        } else {
            format!(
                "Shop already initialized ({} backend)\n  Data: {}",
                self.backend, self.storage_path
            )
        }
    }
}

/// Initialize storage for the shop at `shop_path`.
///
/// A fresh shop gets the demo catalog, orders, customers and admin login
/// written up front. Re-running is a no-op that keeps the recorded backend.
pub fn init(shop_path: &Path, backend: Option<&str>) -> Result<InitResult> {
    let backend = match backend {
        Some(name) => BackendType::from_str(name)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown backend: {}", name)))?,
        None => BackendType::default(),
    };

    let (mut storage, created) = Storage::init(shop_path, backend)?;
    if created {
        storage.products()?;
        storage.orders()?;
        storage.customers()?;
        storage.admin_credentials()?;
    }

    Ok(InitResult {
        initialized: created,
        backend: storage.backend_type().to_string(),
        storage_path: storage.location(),
        config_path: storage.config_path().display().to_string(),
    })
}

// === Stats ===

#[derive(Serialize)]
#[serde(transparent)]
pub struct StatsResult(pub ShopStats);

impl Output for StatsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.0;
        let mut lines = vec![
            format!("Products:  {}", s.product_count),
            format!("Orders:    {}", s.order_count),
            format!("Customers: {}", s.customer_count),
            format!("Revenue:   {}", money(s.revenue)),
            "Orders by status:".to_string(),
        ];
        for (status, count) in &s.orders_by_status {
            lines.push(format!("  {:<11} {}", status, count));
        }
        lines.join("\n")
    }
}

/// Dashboard numbers. Requires admin login.
pub fn stats(storage: &mut Storage) -> Result<StatsResult> {
    storage.require_admin()?;
    Ok(StatsResult(storage.stats()?))
}

// === Action log ===

#[derive(Serialize)]
pub struct LogResult {
    pub entries: Vec<ActionLog>,
    pub count: usize,
}

impl Output for LogResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No actions logged.".to_string();
        }
        self.entries
            .iter()
            .map(|e| {
                let status = if e.success { "ok" } else { "FAILED" };
                let mut line = format!(
                    "{} {:<6} {} ({}ms, {})",
                    e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    status,
                    e.command,
                    e.duration_ms,
                    e.user
                );
                if let Some(err) = &e.error {
                    line.push_str(&format!("\n    {}", err));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The most recent `limit` action log entries, oldest first.
pub fn log(storage: &Storage, limit: usize) -> Result<LogResult> {
    let entries = if storage.root().as_os_str().is_empty() {
        Vec::new()
    } else {
        action_log::read_actions(storage.root(), limit)?
    };
    Ok(LogResult {
        count: entries.len(),
        entries,
    })
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigShow {
    pub config: ResolvedConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_config_path: Option<String>,
    pub system_config_path: String,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(&self.config) {
            for (key, resolved) in map {
                let value = match &resolved["value"] {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let source = resolved["source"].as_str().unwrap_or("default");
                lines.push(format!("{:<22} {} ({})", key, value, source));
            }
        }
        if let Some(path) = &self.shop_config_path {
            lines.push(format!("\nShop config:   {}", path));
        }
        lines.push(format!("System config: {}", self.system_config_path));
        lines.join("\n")
    }
}

/// Every resolved setting with the layer it came from.
pub fn config_show(storage: &Storage, overrides: &ConfigOverrides) -> Result<ConfigShow> {
    let config = resolve_config(storage, overrides)?;
    let shop_config_path = shop_config_file(storage)
        .ok()
        .map(|p| p.display().to_string());
    Ok(ConfigShow {
        config,
        shop_config_path,
        system_config_path: system_config_path()?.display().to_string(),
    })
}

#[derive(Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
}

impl Output for ConfigValue {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.value {
            Some(v) => format!("{} = {}", self.key, v),
            None => format!("{} is not set", self.key),
        }
    }
}

fn shop_config_file(storage: &Storage) -> Result<std::path::PathBuf> {
    if storage.root().as_os_str().is_empty() {
        return Err(Error::InvalidInput(
            "An ephemeral shop has no config file".to_string(),
        ));
    }
    Ok(storage.config_path())
}

/// Read one key from the shop's config.kdl.
pub fn config_get(storage: &Storage, key: &str) -> Result<ConfigValue> {
    let config = ShopConfig::load(&shop_config_file(storage)?)?;
    Ok(ConfigValue {
        key: key.to_string(),
        value: config.get(key)?,
    })
}

/// Write one key to the shop's config.kdl.
pub fn config_set(storage: &Storage, key: &str, value: &str) -> Result<ConfigValue> {
    let path = shop_config_file(storage)?;
    let mut config = ShopConfig::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;
    Ok(ConfigValue {
        key: key.to_string(),
        value: config.get(key)?,
    })
}

// === Raw keys ===

#[derive(Serialize)]
pub struct KvList {
    pub keys: Vec<String>,
    pub location: String,
}

impl Output for KvList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} in {}", plural(self.keys.len(), "key"), self.location)];
        lines.extend(self.keys.iter().map(|k| format!("  {}", k)));
        lines.join("\n")
    }
}

#[derive(Serialize)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
}

impl Output for KvEntry {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        // Stored values are JSON; pretty-print when they parse
        match serde_json::from_str::<serde_json::Value>(&self.value) {
            Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| self.value.clone()),
            Err(_) => self.value.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct KvRemoved {
    pub key: String,
    pub removed: bool,
}

impl Output for KvRemoved {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.removed {
            format!("Removed {}", self.key)
        } else {
            format!("{} was not set", self.key)
        }
    }
}

pub fn kv_list(storage: &Storage) -> Result<KvList> {
    Ok(KvList {
        keys: storage.keys()?,
        location: storage.location(),
    })
}

pub fn kv_get(storage: &Storage, key: &str) -> Result<KvEntry> {
    validate_key(key)?;
    let value = storage
        .get_item(key)?
        .ok_or_else(|| Error::NotFound(format!("Key {}", key)))?;
    Ok(KvEntry {
        key: key.to_string(),
        value,
    })
}

/// Store a raw value. The value must be valid JSON so typed readers can load it.
///
/// Collection keys must also decode as their record type. A collection that
/// fails to decode reads as seed data, and the next write would replace it.
pub fn kv_set(storage: &mut Storage, key: &str, value: &str) -> Result<KvEntry> {
    validate_key(key)?;
    serde_json::from_str::<serde_json::Value>(value)?;
    let shape = match key {
        keys::PRODUCTS => serde_json::from_str::<Vec<Product>>(value).map(drop),
        keys::ORDERS => serde_json::from_str::<Vec<Order>>(value).map(drop),
        keys::CUSTOMERS => serde_json::from_str::<Vec<Customer>>(value).map(drop),
        _ => Ok(()),
    };
    shape.map_err(|e| {
        Error::InvalidInput(format!("Value for {} is not a valid collection: {}", key, e))
    })?;
    storage.set_item(key, value)?;
    Ok(KvEntry {
        key: key.to_string(),
        value: value.to_string(),
    })
}

pub fn kv_rm(storage: &mut Storage, key: &str) -> Result<KvRemoved> {
    validate_key(key)?;
    let removed = storage.get_item(key)?.is_some();
    storage.remove_item(key)?;
    Ok(KvRemoved {
        key: key.to_string(),
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_stats_requires_login() {
        let mut storage = Storage::in_memory();
        assert!(matches!(stats(&mut storage), Err(Error::Unauthorized)));

        storage.login("admin", "password").unwrap();
        let result = stats(&mut storage).unwrap();
        assert_eq!(result.0.product_count, storage.products().unwrap().len());
        assert!(result.to_human().contains("Revenue:"));
    }

    #[test]
    fn test_kv_round_trip() {
        let mut storage = Storage::in_memory();
        kv_set(&mut storage, "lastOrderId", "\"order-1\"").unwrap();
        assert_eq!(kv_get(&storage, "lastOrderId").unwrap().value, "\"order-1\"");
        assert_eq!(kv_list(&storage).unwrap().keys, vec!["lastOrderId".to_string()]);

        assert!(kv_rm(&mut storage, "lastOrderId").unwrap().removed);
        assert!(!kv_rm(&mut storage, "lastOrderId").unwrap().removed);
        assert!(matches!(kv_get(&storage, "lastOrderId"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_kv_set_rejects_bad_input() {
        let mut storage = Storage::in_memory();
        assert!(matches!(kv_set(&mut storage, "a/b", "1"), Err(Error::InvalidInput(_))));
        assert!(matches!(kv_set(&mut storage, "cart", "{oops"), Err(Error::Json(_))));
        assert!(matches!(
            kv_set(&mut storage, "customers", r#"[{"fullName":"No Id"}]"#),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(kv_set(&mut storage, "products", "{}"), Err(Error::InvalidInput(_))));
        kv_set(&mut storage, "orders", r#"[{"id":"o-1"}]"#).unwrap();
    }

    #[test]
    fn test_config_get_set_on_disk() {
        let env = TestEnv::new();
        let storage = env.init_storage(BackendType::File);

        assert_eq!(config_get(&storage, "default-category").unwrap().value, None);
        let set = config_set(&storage, "default-category", "bags").unwrap();
        assert_eq!(set.value.as_deref(), Some("bags"));
        assert_eq!(
            config_get(&storage, "default-category").unwrap().value.as_deref(),
            Some("bags")
        );
        assert!(config_set(&storage, "no-such-key", "x").is_err());
    }

    #[test]
    fn test_config_needs_a_shop_file() {
        let storage = Storage::in_memory();
        assert!(matches!(
            config_get(&storage, "backend"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_log_empty_for_memory_storage() {
        let storage = Storage::in_memory();
        let result = log(&storage, 10).unwrap();
        assert_eq!(result.count, 0);
        assert_eq!(result.to_human(), "No actions logged.");
    }
}
