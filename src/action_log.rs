//! Action logging for shop commands.
//!
//! Every CLI invocation against an initialized shop is appended to
//! `<data>/<shop-hash>/action.log` as one JSON object per line.

use crate::config::{ConfigOverrides, ShopConfig, resolve};
use crate::storage::{CONFIG_FILE, get_storage_dir};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Log file name inside the shop's data directory.
pub const ACTION_LOG_FILE: &str = "action.log";

/// Represents a single action log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Shop directory the command ran against
    pub shop_path: String,

    /// Command name (e.g., "product add", "checkout", "stats")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Log an action for the shop at `shop_path`.
///
/// Nothing is written when the shop is not initialized or `action-log` is
/// off. Write failures are reported as warnings and never fail the command.
pub fn log_action(
    shop_path: &Path,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    let root = match get_storage_dir(shop_path) {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!(error = %e, "no storage directory, skipping action log");
            return;
        }
    };

    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return;
    }
    if !is_enabled(&config_path) {
        return;
    }

    let entry = ActionLog {
        timestamp: Utc::now(),
        shop_path: shop_path.to_string_lossy().to_string(),
        command: command.to_string(),
        args: sanitize_args(&args),
        success,
        error,
        duration_ms,
        user: get_current_user(),
    };

    if let Err(e) = write_log_entry(&root.join(ACTION_LOG_FILE), &entry) {
        tracing::warn!(error = %e, "failed to write action log");
    }
}

/// Whether `action-log` resolves to on. Unreadable config counts as on.
fn is_enabled(config_path: &Path) -> bool {
    let shop = ShopConfig::load(config_path).unwrap_or_default();
    let system = crate::config::resolver::read_system_config().unwrap_or_default();
    resolve(&shop, &system, &ConfigOverrides::default()).action_log_enabled()
}

/// Path of the action log for a shop's data directory.
pub fn log_path(root: &Path) -> PathBuf {
    root.join(ACTION_LOG_FILE)
}

/// Read the most recent `limit` entries, oldest first.
///
/// Lines that do not parse are skipped.
pub fn read_actions(root: &Path, limit: usize) -> Result<Vec<ActionLog>> {
    let path = log_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(&path)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ActionLog>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::debug!(error = %e, "skipping malformed action log line"),
        }
    }

    let skip = entries.len().saturating_sub(limit);
    Ok(entries.into_iter().skip(skip).collect())
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &ActionLog) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Error::Io)?;

    writeln!(file, "{}", json)?;

    Ok(())
}

/// Sanitize arguments to remove sensitive data.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    match args {
        serde_json::Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, value) in map {
                let key_lower = key.to_lowercase();
                if key_lower.contains("password")
                    || key_lower.contains("token")
                    || key_lower.contains("secret")
                {
                    sanitized.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    sanitized.insert(key.clone(), sanitize_args(value));
                }
            }
            serde_json::Value::Object(sanitized)
        }
        serde_json::Value::Array(arr) => {
            if arr.len() > 10 {
                serde_json::Value::String(format!("[Array with {} items]", arr.len()))
            } else {
                serde_json::Value::Array(arr.iter().map(sanitize_args).collect())
            }
        }
        serde_json::Value::String(s) => {
            // Local paths shrink to their basename
            let sanitized = if is_local_path(s) {
                s.rsplit(['/', '\\']).next().unwrap_or(s).to_string()
            } else {
                s.clone()
            };

            if sanitized.chars().count() > 100 {
                let head: String = sanitized.chars().take(97).collect();
                serde_json::Value::String(format!(
                    "{}... ({} chars)",
                    head,
                    sanitized.chars().count()
                ))
            } else {
                serde_json::Value::String(sanitized)
            }
        }
        _ => args.clone(),
    }
}

/// Whether an argument names a file on this machine, as opposed to free text
/// such as an address ("1/2 Main St") or a URL.
fn is_local_path(s: &str) -> bool {
    if s.contains("://") || !(s.contains('/') || s.contains('\\')) {
        return false;
    }
    let bytes = s.as_bytes();
    let drive_prefix = bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/');
    drive_prefix || Path::new(s).is_absolute() || Path::new(s).exists()
}

/// Get the current user's username.
fn get_current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
