//! Storage layer for Shopkeep data.
//!
//! This module handles persistence of products, orders, customers and the
//! smaller session blobs (cart, saved checkout, admin login).
//!
//! ## Storage Backends
//!
//! - **File backend** (default): `<data>/<shop-hash>/kv/<key>.json`
//! - **SQLite backend**: `<data>/<shop-hash>/store.db`, one `kv` table
//! - **Memory backend**: nothing on disk, used by tests
//!
//! Every backend stores opaque strings under named keys. The record
//! collections are JSON arrays written whole on every change; there is no
//! partial update, transaction or schema version.
//!
//! ## Seeding
//!
//! Reading a collection whose key is absent writes the demo seed records
//! under that key and returns them. A blob that no longer parses is logged
//! and the seed is returned in its place, leaving the stored text alone.

pub mod backend;
pub mod customers;
pub mod file;
pub mod memory;
pub mod orders;
pub mod products;
pub mod sqlite;

pub use backend::{BackendType, KeyValueStore};
pub use customers::CustomerSummary;
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use orders::OrderFilter;
pub use products::{BulkOutcome, PriceAdjustment, PriceOp};
pub use sqlite::SqliteBackend;

use crate::config::ShopConfig;
use crate::models::{OrderStatus, PaymentStatus, round_cents};
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "SHOP_DATA_DIR";

/// Per-shop configuration file name.
pub const CONFIG_FILE: &str = "config.kdl";

/// Names of the keys shopkeep reads and writes.
pub mod keys {
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const CUSTOMERS: &str = "customers";
    pub const ADMIN_CREDENTIALS: &str = "adminCredentials";
    pub const ADMIN_AUTHENTICATED: &str = "adminAuthenticated";
    pub const SAVED_CHECKOUT: &str = "savedCheckout";
    pub const SITE_SETTINGS: &str = "siteSettings";
    pub const CART: &str = "cart";
    pub const LAST_ORDER_ID: &str = "lastOrderId";
}

/// Storage manager for a single shop.
pub struct Storage {
    /// Root directory for this shop's data (empty for in-memory storage)
    pub root: PathBuf,
    backend: Box<dyn KeyValueStore>,
}

impl Storage {
    /// Open storage for the given shop directory.
    pub fn open(shop_path: &Path) -> Result<Self> {
        let root = get_storage_dir(shop_path)?;
        Self::open_root(root)
    }

    /// Open storage using an explicit data root instead of `SHOP_DATA_DIR`.
    pub fn open_with_data_dir(shop_path: &Path, data_dir: &Path) -> Result<Self> {
        let root = get_storage_dir_with_data_dir(shop_path, data_dir)?;
        Self::open_root(root)
    }

    fn open_root(root: PathBuf) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(Error::NotInitialized);
        }

        let config = ShopConfig::load(&config_path)?;
        let backend_type = config.backend.unwrap_or_default();
        let backend = open_backend(&root, backend_type)?;
        tracing::debug!(root = %root.display(), backend = %backend_type, "opened storage");

        Ok(Self { root, backend })
    }

    /// Initialize storage for a new shop.
    ///
    /// Returns the storage and whether anything was created. Initializing an
    /// existing shop keeps its recorded backend.
    pub fn init(shop_path: &Path, backend: BackendType) -> Result<(Self, bool)> {
        let root = get_storage_dir(shop_path)?;
        Self::init_root(root, backend)
    }

    /// Initialize storage using an explicit data root.
    pub fn init_with_data_dir(
        shop_path: &Path,
        data_dir: &Path,
        backend: BackendType,
    ) -> Result<Self> {
        let root = get_storage_dir_with_data_dir(shop_path, data_dir)?;
        Self::init_root(root, backend).map(|(storage, _)| storage)
    }

    fn init_root(root: PathBuf, backend: BackendType) -> Result<(Self, bool)> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            return Ok((Self::open_root(root)?, false));
        }

        if backend == BackendType::Memory {
            return Err(Error::InvalidInput(
                "The memory backend cannot be initialized on disk".to_string(),
            ));
        }

        fs::create_dir_all(&root)?;
        let config = ShopConfig {
            backend: Some(backend),
            ..ShopConfig::default()
        };
        config.save(&config_path)?;
        tracing::info!(root = %root.display(), backend = %backend, "initialized storage");

        Ok((Self::open_root(root)?, true))
    }

    /// Check if storage exists for the given shop.
    pub fn exists(shop_path: &Path) -> Result<bool> {
        let root = get_storage_dir(shop_path)?;
        Ok(root.join(CONFIG_FILE).exists())
    }

    /// Check if storage exists under an explicit data root.
    pub fn exists_with_data_dir(shop_path: &Path, data_dir: &Path) -> Result<bool> {
        let root = get_storage_dir_with_data_dir(shop_path, data_dir)?;
        Ok(root.join(CONFIG_FILE).exists())
    }

    /// Storage that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::with_backend(PathBuf::new(), Box::new(MemoryBackend::new()))
    }

    /// Wrap an already opened backend.
    pub fn with_backend(root: PathBuf, backend: Box<dyn KeyValueStore>) -> Self {
        Self { root, backend }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of this shop's config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    // === Raw key access ===

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.backend.get_item(key)
    }

    pub fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.backend.set_item(key, value)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<()> {
        tracing::debug!(key, "removing key");
        self.backend.remove_item(key)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys()
    }

    // === JSON helpers ===

    /// Read and parse the blob under `key`. `Ok(None)` when the key is absent.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        tracing::debug!(key, bytes = json.len(), "writing key");
        self.backend.set_item(key, &json)
    }

    /// Load the blob under `key`, seeding it on first use.
    ///
    /// - absent: `seed()` is written under `key` and returned
    /// - unparsable: a warning is logged and `seed()` is returned; the stored
    ///   text is left untouched
    pub fn load_or_seed<T, F>(&mut self, key: &str, seed: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.backend.get_item(key)? {
            None => {
                let value = seed();
                self.write_json(key, &value)?;
                tracing::info!(key, "seeded empty key with demo data");
                Ok(value)
            }
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!(key, error = %e, "stored data is not valid JSON; using seed data");
                    Ok(seed())
                }
            },
        }
    }

    /// Counts and revenue across the three collections.
    pub fn stats(&mut self) -> Result<ShopStats> {
        let products = self.products()?;
        let orders = self.orders()?;
        let customers = self.customers()?;

        let mut orders_by_status: BTreeMap<String, usize> = OrderStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for order in &orders {
            *orders_by_status
                .entry(order.status.as_str().to_string())
                .or_default() += 1;
        }

        let revenue = round_cents(
            orders
                .iter()
                .filter(|o| o.payment_status == PaymentStatus::Paid)
                .map(|o| o.total_amount)
                .sum(),
        );

        Ok(ShopStats {
            product_count: products.len(),
            order_count: orders.len(),
            customer_count: customers.len(),
            revenue,
            orders_by_status,
        })
    }
}

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopStats {
    pub product_count: usize,
    pub order_count: usize,
    pub customer_count: usize,
    /// Sum of paid order totals
    pub revenue: f64,
    pub orders_by_status: BTreeMap<String, usize>,
}

fn open_backend(root: &Path, backend: BackendType) -> Result<Box<dyn KeyValueStore>> {
    Ok(match backend {
        BackendType::File => Box::new(FileBackend::open(root)?),
        BackendType::Sqlite => Box::new(SqliteBackend::open(root)?),
        BackendType::Memory => Box::new(MemoryBackend::new()),
    })
}

/// The directory all shops' data lives under.
///
/// `SHOP_DATA_DIR` when set, otherwise `<XDG data dir>/shopkeep`.
pub fn data_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("shopkeep"))
}

/// Get the storage directory for a shop.
///
/// Uses a hash of the shop path to create a unique directory under the
/// data root.
pub fn get_storage_dir(shop_path: &Path) -> Result<PathBuf> {
    get_storage_dir_with_data_dir(shop_path, &data_root()?)
}

/// Get the storage directory for a shop under an explicit data root.
pub fn get_storage_dir_with_data_dir(shop_path: &Path, data_dir: &Path) -> Result<PathBuf> {
    let shop_canonical = shop_path
        .canonicalize()
        .map_err(|e| Error::Other(format!("Could not canonicalize shop path: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(shop_canonical.to_string_lossy().as_bytes());
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    let short_hash = &hash_hex[..12];

    Ok(data_dir.join(short_hash))
}

/// Generate a record id from the current time in milliseconds.
///
/// Format: `<prefix>-<millis>`, or bare `<millis>` with an empty prefix.
/// When the id is already taken (two records in the same millisecond) the
/// timestamp is bumped until it is free.
pub fn generate_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = chrono::Utc::now().timestamp_millis();
    loop {
        let id = if prefix.is_empty() {
            millis.to_string()
        } else {
            format!("{}-{}", prefix, millis)
        };
        if !taken(&id) {
            return id;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("order", |_| false);
        assert!(id.starts_with("order-"));
        assert!(id["order-".len()..].chars().all(|c| c.is_ascii_digit()));

        let bare = generate_id("", |_| false);
        assert!(bare.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_id_skips_taken() {
        let first = generate_id("customer", |_| false);
        let second = generate_id("customer", |id| id == first);
        assert_ne!(first, second);
    }

    #[test]
    fn test_storage_dir_is_stable_per_shop() {
        let env = TestEnv::new();
        let a = get_storage_dir_with_data_dir(env.path(), env.data_path()).unwrap();
        let b = get_storage_dir_with_data_dir(env.path(), env.data_path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.file_name().unwrap().len(), 12);
    }

    #[test]
    fn test_open_uninitialized() {
        let env = TestEnv::new();
        let result = Storage::open_with_data_dir(env.path(), env.data_path());
        assert!(matches!(result, Err(Error::NotInitialized)));
        assert!(!Storage::exists_with_data_dir(env.path(), env.data_path()).unwrap());
    }

    #[test]
    fn test_init_records_backend() {
        let env = TestEnv::new();
        let storage = env.init_storage(BackendType::Sqlite);
        assert_eq!(storage.backend_type(), BackendType::Sqlite);
        assert!(storage.root.join(CONFIG_FILE).exists());
        assert!(storage.root.join(sqlite::DB_FILE).exists());

        // Re-initializing with another backend keeps the recorded one
        let again = Storage::init_with_data_dir(env.path(), env.data_path(), BackendType::File)
            .unwrap();
        assert_eq!(again.backend_type(), BackendType::Sqlite);
        assert!(Storage::exists_with_data_dir(env.path(), env.data_path()).unwrap());
    }

    #[test]
    fn test_init_rejects_memory_backend() {
        let env = TestEnv::new();
        let result =
            Storage::init_with_data_dir(env.path(), env.data_path(), BackendType::Memory);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_load_or_seed_writes_seed_when_absent() {
        let mut storage = Storage::in_memory();
        let value: Vec<u32> = storage.load_or_seed("numbers", || vec![1, 2, 3]).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert_eq!(storage.get_item("numbers").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_load_or_seed_falls_back_without_overwriting() {
        let mut storage = Storage::in_memory();
        storage.set_item("numbers", "not json").unwrap();
        let value: Vec<u32> = storage.load_or_seed("numbers", || vec![7]).unwrap();
        assert_eq!(value, vec![7]);
        assert_eq!(storage.get_item("numbers").unwrap().as_deref(), Some("not json"));
    }

    #[test]
    fn test_data_survives_reopen() {
        let env = TestEnv::new();
        {
            let mut storage = env.init_storage(BackendType::File);
            let products: Vec<Product> = storage.products().unwrap();
            assert_eq!(products.len(), 6);
            storage.delete_product("1").unwrap();
        }
        let mut storage = env.open_storage();
        assert_eq!(storage.products().unwrap().len(), 5);
    }

    #[test]
    fn test_stats_on_seed_data() {
        let mut storage = Storage::in_memory();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.product_count, 6);
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.customer_count, 3);
        assert_eq!(stats.revenue, 2019.94);
        assert_eq!(stats.orders_by_status["delivered"], 1);
        assert_eq!(stats.orders_by_status["cancelled"], 0);
    }
}
