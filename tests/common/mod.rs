//! Common test utilities for shopkeep integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/shopkeep/` or `~/.config/shopkeep/` directories.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates three temporary directories:
/// - `shop_dir`: Acts as the shop directory the CLI runs in
/// - `data_dir`: Holds shop data (via `SHOP_DATA_DIR` env var)
/// - `config_dir`: Holds the system config (via `SHOP_CONFIG_DIR` env var)
///
/// The `shop()` method returns a `Command` that sets both per-invocation,
/// making tests parallel-safe.
pub struct TestEnv {
    pub shop_dir: TempDir,
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            shop_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and initialize the shop.
    pub fn init() -> Self {
        let env = Self::new();
        env.shop().arg("init").assert().success();
        env
    }

    /// Initialized shop with the admin already logged in.
    pub fn init_admin() -> Self {
        let env = Self::init();
        env.shop()
            .args(["admin", "login", "-u", "admin", "-p", "password"])
            .assert()
            .success();
        env
    }

    /// Get a Command for the shop binary with isolated directories.
    pub fn shop(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shop"));
        cmd.current_dir(self.shop_dir.path());
        cmd.env("SHOP_DATA_DIR", self.data_dir.path());
        cmd.env("SHOP_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("SHOP_DIR");
        cmd.env_remove("SHOP_STOREFRONT_URL");
        cmd.env_remove("SHOP_DEFAULT_CATEGORY");
        cmd.env_remove("SHOP_LOG");
        cmd
    }

    /// Run a command and parse its stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.shop().args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    }

    /// Get the path to the shop directory.
    pub fn path(&self) -> &std::path::Path {
        self.shop_dir.path()
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Get the path to the system config directory.
    pub fn config_path(&self) -> &std::path::Path {
        self.config_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
