//! Shopkeep - storefront catalog, checkout and back-office over a JSON key-value store.
//!
//! This library provides the core functionality for the `shop` CLI tool:
//! product, order and customer records persisted as JSON blobs under named
//! keys, the checkout procedure that ties them together, and a best-effort
//! product importer for HTML pages and marketplace URLs.

pub mod action_log;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod cli;
pub mod commands;
pub mod config;
pub mod import;
pub mod logging;
pub mod models;
pub mod settings;
pub mod storage;


/// Library-level error type for Shopkeep operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not initialized: run `shop init` first")]
    NotInitialized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Admin login required: run `shop admin login` first")]
    Unauthorized,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Shopkeep operations.
pub type Result<T> = std::result::Result<T, Error>;
