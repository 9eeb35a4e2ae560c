//! KDL schema for config.kdl.
//!
//! This module provides:
//! - A Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation
//! - Single-key get/set used by `shop config get|set`

use crate::storage::BackendType;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in config.kdl, in the order they are written.
pub const CONFIG_KEYS: [&str; 11] = [
    "backend",
    "output-format",
    "default-category",
    "storefront-url",
    "action-log",
    "payment-widget-url",
    "payment-address",
    "payment-currency",
    "payment-commodity",
    "payment-network",
    "payment-commodity-id",
];

/// Shop preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// backend "sqlite"             // or "file"
/// output-format "human"        // or "json"
/// default-category "cameras"
/// storefront-url "https://shop.example.com"
/// action-log #true
/// payment-address "0x..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Storage backend (recorded at `shop init`)
    pub backend: Option<BackendType>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Category given to imported products when none is passed
    pub default_category: Option<String>,

    /// Public origin of the storefront, used for payment redirect URLs
    pub storefront_url: Option<String>,

    /// Whether CLI invocations are appended to action.log
    pub action_log: Option<bool>,

    pub payment_widget_url: Option<String>,
    pub payment_address: Option<String>,
    pub payment_currency: Option<String>,
    pub payment_commodity: Option<String>,
    pub payment_network: Option<String>,
    pub payment_commodity_id: Option<String>,
}

impl Serialize for BackendType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BackendType {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        BackendType::from_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown backend: {}", s)))
    }
}

fn string_arg(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
        .map(|s| s.to_string())
}

fn bool_arg(doc: &KdlDocument, name: &str) -> Option<bool> {
    let entry = doc.get(name)?.entries().first()?;
    entry
        .value()
        .as_bool()
        .or_else(|| entry.value().as_string().and_then(parse_bool))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn push_string(doc: &mut KdlDocument, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        let mut node = KdlNode::new(name);
        node.push(KdlEntry::new(KdlValue::String(value.clone())));
        doc.nodes_mut().push(node);
    }
}

impl ShopConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref url) = self.storefront_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("storefront-url must start with http:// or https://, got {}", url));
            }
        }
        if let Some(ref url) = self.payment_widget_url {
            if !url.starts_with("https://") {
                return Err(format!("payment-widget-url must start with https://, got {}", url));
            }
        }
        if let Some(BackendType::Memory) = self.backend {
            return Err("backend \"memory\" cannot be recorded in config.kdl".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            backend: string_arg(doc, "backend").and_then(|s| BackendType::from_str(&s)),
            output_format: string_arg(doc, "output-format").and_then(|s| OutputFormat::parse(&s)),
            default_category: string_arg(doc, "default-category"),
            storefront_url: string_arg(doc, "storefront-url"),
            action_log: bool_arg(doc, "action-log"),
            payment_widget_url: string_arg(doc, "payment-widget-url"),
            payment_address: string_arg(doc, "payment-address"),
            payment_currency: string_arg(doc, "payment-currency"),
            payment_commodity: string_arg(doc, "payment-commodity"),
            payment_network: string_arg(doc, "payment-network"),
            payment_commodity_id: string_arg(doc, "payment-commodity-id"),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        push_string(&mut doc, "backend", &self.backend.map(|b| b.as_str().to_string()));
        push_string(
            &mut doc,
            "output-format",
            &self.output_format.as_ref().map(|f| f.as_str().to_string()),
        );
        push_string(&mut doc, "default-category", &self.default_category);
        push_string(&mut doc, "storefront-url", &self.storefront_url);

        if let Some(enabled) = self.action_log {
            let mut node = KdlNode::new("action-log");
            node.push(KdlEntry::new(KdlValue::Bool(enabled)));
            doc.nodes_mut().push(node);
        }

        push_string(&mut doc, "payment-widget-url", &self.payment_widget_url);
        push_string(&mut doc, "payment-address", &self.payment_address);
        push_string(&mut doc, "payment-currency", &self.payment_currency);
        push_string(&mut doc, "payment-commodity", &self.payment_commodity);
        push_string(&mut doc, "payment-network", &self.payment_network);
        push_string(&mut doc, "payment-commodity-id", &self.payment_commodity_id);

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &ShopConfig) {
        fn take<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
            if other.is_some() {
                *slot = other.clone();
            }
        }
        take(&mut self.backend, &other.backend);
        take(&mut self.output_format, &other.output_format);
        take(&mut self.default_category, &other.default_category);
        take(&mut self.storefront_url, &other.storefront_url);
        take(&mut self.action_log, &other.action_log);
        take(&mut self.payment_widget_url, &other.payment_widget_url);
        take(&mut self.payment_address, &other.payment_address);
        take(&mut self.payment_currency, &other.payment_currency);
        take(&mut self.payment_commodity, &other.payment_commodity);
        take(&mut self.payment_network, &other.payment_network);
        take(&mut self.payment_commodity_id, &other.payment_commodity_id);
    }

    /// Read config.kdl. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let doc: KdlDocument = content.parse().map_err(|e| {
            Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e))
        })?;
        Ok(Self::from_kdl(&doc))
    }

    /// Write config.kdl, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate().map_err(Error::Config)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_kdl().to_string())?;
        Ok(())
    }

    /// Get a single value by its KDL key, rendered as a string.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match key {
            "backend" => self.backend.map(|b| b.as_str().to_string()),
            "output-format" => self.output_format.as_ref().map(|f| f.as_str().to_string()),
            "default-category" => self.default_category.clone(),
            "storefront-url" => self.storefront_url.clone(),
            "action-log" => self.action_log.map(|b| b.to_string()),
            "payment-widget-url" => self.payment_widget_url.clone(),
            "payment-address" => self.payment_address.clone(),
            "payment-currency" => self.payment_currency.clone(),
            "payment-commodity" => self.payment_commodity.clone(),
            "payment-network" => self.payment_network.clone(),
            "payment-commodity-id" => self.payment_commodity_id.clone(),
            _ => return Err(unknown_key(key)),
        })
    }

    /// Set a single value by its KDL key, parsing it for typed keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let text = Some(value.to_string());
        match key {
            "backend" => {
                return Err(Error::InvalidInput(
                    "backend is chosen at `shop init` and cannot be changed".to_string(),
                ));
            }
            "output-format" => {
                self.output_format = Some(OutputFormat::parse(value).ok_or_else(|| {
                    Error::InvalidInput(format!("output-format must be json or human, got {}", value))
                })?);
            }
            "default-category" => self.default_category = text,
            "storefront-url" => self.storefront_url = Some(value.trim_end_matches('/').to_string()),
            "action-log" => {
                self.action_log = Some(parse_bool(value).ok_or_else(|| {
                    Error::InvalidInput(format!("action-log must be true or false, got {}", value))
                })?);
            }
            "payment-widget-url" => self.payment_widget_url = text,
            "payment-address" => self.payment_address = text,
            "payment-currency" => self.payment_currency = text,
            "payment-commodity" => self.payment_commodity = text,
            "payment-network" => self.payment_network = text,
            "payment-commodity-id" => self.payment_commodity_id = text,
            _ => return Err(unknown_key(key)),
        }
        self.validate().map_err(Error::InvalidInput)
    }
}

fn unknown_key(key: &str) -> Error {
    Error::InvalidInput(format!(
        "Unknown config key: {} (expected one of: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}
