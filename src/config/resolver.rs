//! Precedence resolution for shop preferences.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`SHOP_STOREFRONT_URL`, `SHOP_DEFAULT_CATEGORY`)
//! 3. Shop config.kdl (`<data>/<shop-hash>/config.kdl`)
//! 4. System config.kdl (`~/.config/shopkeep/config.kdl`)
//! 5. Built-in defaults

use crate::checkout::PaymentConfig;
use crate::config::{OutputFormat, ShopConfig};
use crate::models::DEFAULT_CATEGORY;
use crate::storage::{CONFIG_FILE, Storage};
use crate::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "SHOP_CONFIG_DIR";

/// Environment variable overriding the storefront origin.
pub const STOREFRONT_URL_ENV: &str = "SHOP_STOREFRONT_URL";

/// Environment variable overriding the import category.
pub const DEFAULT_CATEGORY_ENV: &str = "SHOP_DEFAULT_CATEGORY";

/// Storefront origin used when nothing else is configured.
pub const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from the shop's own config.kdl
    Shop,
    /// Value from the system config.kdl
    System,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Shop => write!(f, "shop"),
            ValueSource::System => write!(f, "system"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `-H` forces human output
    pub output_format: Option<OutputFormat>,
    pub storefront_url: Option<String>,
    pub default_category: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format override.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set storefront origin override.
    pub fn with_storefront_url(mut self, url: impl Into<String>) -> Self {
        self.storefront_url = Some(url.into());
        self
    }

    /// Set import category override.
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = Some(category.into());
        self
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub default_category: Resolved<String>,
    pub storefront_url: Resolved<String>,
    pub action_log: Resolved<bool>,
    pub payment_widget_url: Resolved<String>,
    pub payment_address: Resolved<String>,
    pub payment_currency: Resolved<String>,
    pub payment_commodity: Resolved<String>,
    pub payment_network: Resolved<String>,
    pub payment_commodity_id: Resolved<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let payment = PaymentConfig::default();
        let d = |v: String| Resolved::new(v, ValueSource::Default);
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            default_category: d(DEFAULT_CATEGORY.to_string()),
            storefront_url: d(DEFAULT_STOREFRONT_URL.to_string()),
            action_log: Resolved::new(true, ValueSource::Default),
            payment_widget_url: d(payment.widget_url),
            payment_address: d(payment.address),
            payment_currency: d(payment.currency),
            payment_commodity: d(payment.commodity),
            payment_network: d(payment.network),
            payment_commodity_id: d(payment.commodity_id),
        }
    }
}

impl ResolvedConfig {
    /// Get the output format value.
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn default_category(&self) -> &str {
        &self.default_category.value
    }

    pub fn storefront_url(&self) -> &str {
        &self.storefront_url.value
    }

    pub fn action_log_enabled(&self) -> bool {
        self.action_log.value
    }

    /// Payment widget settings, with the redirect pointing at the storefront.
    pub fn payment(&self) -> PaymentConfig {
        PaymentConfig {
            widget_url: self.payment_widget_url.value.clone(),
            address: self.payment_address.value.clone(),
            currency: self.payment_currency.value.clone(),
            commodity: self.payment_commodity.value.clone(),
            network: self.payment_network.value.clone(),
            commodity_id: self.payment_commodity_id.value.clone(),
            storefront_url: self.storefront_url.value.clone(),
        }
    }
}

/// Directory holding the system-wide config.kdl.
///
/// `SHOP_CONFIG_DIR` when set, otherwise `<XDG config dir>/shopkeep`.
pub fn system_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|d| d.join("shopkeep"))
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))
}

/// Path of the system-wide config.kdl.
pub fn system_config_path() -> Result<PathBuf> {
    Ok(system_config_dir()?.join(CONFIG_FILE))
}

/// Read the system-wide config. Missing file is empty config.
pub fn read_system_config() -> Result<ShopConfig> {
    ShopConfig::load(&system_config_path()?)
}

fn env_value(name: &str) -> Option<Resolved<String>> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(|v| Resolved::new(v, ValueSource::EnvVar(name.to_string())))
}

fn pick<T: Clone>(
    cli: Option<&T>,
    shop: Option<&T>,
    system: Option<&T>,
    fallback: Resolved<T>,
) -> Resolved<T> {
    if let Some(v) = cli {
        Resolved::new(v.clone(), ValueSource::CliFlag)
    } else if let Some(v) = shop {
        Resolved::new(v.clone(), ValueSource::Shop)
    } else if let Some(v) = system {
        Resolved::new(v.clone(), ValueSource::System)
    } else {
        fallback
    }
}

/// Resolve configuration with full precedence chain from already-loaded files.
pub fn resolve(
    shop: &ShopConfig,
    system: &ShopConfig,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let storefront_url = match overrides.storefront_url.as_ref() {
        Some(url) => Resolved::new(url.clone(), ValueSource::CliFlag),
        None => env_value(STOREFRONT_URL_ENV).unwrap_or_else(|| {
            pick(
                None,
                shop.storefront_url.as_ref(),
                system.storefront_url.as_ref(),
                defaults.storefront_url,
            )
        }),
    };

    let default_category = match overrides.default_category.as_ref() {
        Some(category) => Resolved::new(category.clone(), ValueSource::CliFlag),
        None => env_value(DEFAULT_CATEGORY_ENV).unwrap_or_else(|| {
            pick(
                None,
                shop.default_category.as_ref(),
                system.default_category.as_ref(),
                defaults.default_category,
            )
        }),
    };

    ResolvedConfig {
        output_format: pick(
            overrides.output_format.as_ref(),
            shop.output_format.as_ref(),
            system.output_format.as_ref(),
            defaults.output_format,
        ),
        default_category,
        storefront_url: Resolved::new(
            storefront_url.value.trim_end_matches('/').to_string(),
            storefront_url.source,
        ),
        action_log: pick(
            None,
            shop.action_log.as_ref(),
            system.action_log.as_ref(),
            defaults.action_log,
        ),
        payment_widget_url: pick(
            None,
            shop.payment_widget_url.as_ref(),
            system.payment_widget_url.as_ref(),
            defaults.payment_widget_url,
        ),
        payment_address: pick(
            None,
            shop.payment_address.as_ref(),
            system.payment_address.as_ref(),
            defaults.payment_address,
        ),
        payment_currency: pick(
            None,
            shop.payment_currency.as_ref(),
            system.payment_currency.as_ref(),
            defaults.payment_currency,
        ),
        payment_commodity: pick(
            None,
            shop.payment_commodity.as_ref(),
            system.payment_commodity.as_ref(),
            defaults.payment_commodity,
        ),
        payment_network: pick(
            None,
            shop.payment_network.as_ref(),
            system.payment_network.as_ref(),
            defaults.payment_network,
        ),
        payment_commodity_id: pick(
            None,
            shop.payment_commodity_id.as_ref(),
            system.payment_commodity_id.as_ref(),
            defaults.payment_commodity_id,
        ),
    }
}

/// Resolve configuration for an opened shop.
///
/// In-memory storage has no shop file; only the system config applies.
pub fn resolve_config(storage: &Storage, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = read_system_config()?;
    let shop = if storage.root().as_os_str().is_empty() {
        ShopConfig::default()
    } else {
        ShopConfig::load(&storage.config_path())?
    };
    Ok(resolve(&shop, &system, overrides))
}

/// Resolve configuration when no shop has been initialized yet.
pub fn resolve_without_shop(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = read_system_config()?;
    Ok(resolve(&ShopConfig::default(), &system, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendType;
    use crate::test_utils::TestEnv;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_value_source_display() {
        assert_eq!(
            format!("{}", ValueSource::EnvVar("FOO".to_string())),
            "env:FOO"
        );
        assert_eq!(format!("{}", ValueSource::Shop), "shop");
        assert_eq!(format!("{}", ValueSource::System), "system");
        assert_eq!(format!("{}", ValueSource::CliFlag), "cli");
        assert_eq!(format!("{}", ValueSource::Default), "default");
    }

    #[test]
    #[serial]
    fn test_resolve_defaults() {
        let config = resolve(
            &ShopConfig::default(),
            &ShopConfig::default(),
            &ConfigOverrides::default(),
        );

        assert_eq!(*config.output_format(), OutputFormat::Json);
        assert_eq!(config.output_format.source, ValueSource::Default);
        assert_eq!(config.default_category(), "cameras");
        assert_eq!(config.storefront_url(), "http://localhost:3000");
        assert!(config.action_log_enabled());
        assert_eq!(config.payment().network, "polygon");
    }

    #[test]
    #[serial]
    fn test_shop_overrides_system() {
        let system = ShopConfig {
            default_category: Some("bags".to_string()),
            output_format: Some(OutputFormat::Human),
            payment_address: Some("0xsystem".to_string()),
            ..Default::default()
        };
        let shop = ShopConfig {
            default_category: Some("accessories".to_string()),
            action_log: Some(false),
            ..Default::default()
        };

        let config = resolve(&shop, &system, &ConfigOverrides::default());

        assert_eq!(config.default_category(), "accessories");
        assert_eq!(config.default_category.source, ValueSource::Shop);
        assert_eq!(*config.output_format(), OutputFormat::Human);
        assert_eq!(config.output_format.source, ValueSource::System);
        assert!(!config.action_log_enabled());
        assert_eq!(config.payment().address, "0xsystem");
    }

    #[test]
    #[serial]
    fn test_cli_and_env_precedence() {
        let shop = ShopConfig {
            storefront_url: Some("https://shop.example.com".to_string()),
            default_category: Some("bags".to_string()),
            ..Default::default()
        };

        // SAFETY: serial test, no other thread reads the environment
        unsafe { std::env::set_var(STOREFRONT_URL_ENV, "https://env.example.com/") };
        let config = resolve(&shop, &ShopConfig::default(), &ConfigOverrides::new());
        assert_eq!(config.storefront_url(), "https://env.example.com");
        assert_eq!(
            config.storefront_url.source,
            ValueSource::EnvVar(STOREFRONT_URL_ENV.to_string())
        );

        let overrides = ConfigOverrides::new()
            .with_storefront_url("https://cli.example.com")
            .with_default_category("cameras")
            .with_output_format(OutputFormat::Human);
        let config = resolve(&shop, &ShopConfig::default(), &overrides);
        assert_eq!(config.storefront_url(), "https://cli.example.com");
        assert_eq!(config.storefront_url.source, ValueSource::CliFlag);
        assert_eq!(config.default_category(), "cameras");
        assert_eq!(*config.output_format(), OutputFormat::Human);

        unsafe { std::env::remove_var(STOREFRONT_URL_ENV) };
    }

    #[test]
    #[serial]
    fn test_resolve_config_reads_files() {
        let env = TestEnv::new();
        let system_dir = TempDir::new().unwrap();
        // SAFETY: serial test, no other thread reads the environment
        unsafe { std::env::set_var(CONFIG_DIR_ENV, system_dir.path()) };

        let system = ShopConfig {
            payment_currency: Some("EUR".to_string()),
            ..Default::default()
        };
        system.save(&system_config_path().unwrap()).unwrap();

        let storage = env.init_storage(BackendType::File);
        let mut shop = ShopConfig::load(&storage.config_path()).unwrap();
        shop.set("payment-network", "ethereum").unwrap();
        shop.save(&storage.config_path()).unwrap();

        let config = resolve_config(&storage, &ConfigOverrides::default()).unwrap();
        let payment = config.payment();
        assert_eq!(payment.currency, "EUR");
        assert_eq!(config.payment_currency.source, ValueSource::System);
        assert_eq!(payment.network, "ethereum");
        assert_eq!(config.payment_network.source, ValueSource::Shop);

        unsafe { std::env::remove_var(CONFIG_DIR_ENV) };
    }
}
