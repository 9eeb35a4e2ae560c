//! Back-office login.
//!
//! Credentials are a plain username/password pair stored under
//! `adminCredentials` and compared as-is. Being logged in is nothing more
//! than `adminAuthenticated` holding `"true"`.

use crate::models::AdminCredentials;
use crate::storage::{Storage, keys};
use crate::{Error, Result};

const AUTHENTICATED: &str = "true";

impl Storage {
    // === Admin credentials ===

    /// Stored credentials, seeding `admin` / `password` on first use.
    pub fn admin_credentials(&mut self) -> Result<AdminCredentials> {
        self.load_or_seed(keys::ADMIN_CREDENTIALS, AdminCredentials::default)
    }

    /// Replace the stored credentials.
    ///
    /// A blank password keeps the current one. The username may not be blank.
    pub fn update_admin_credentials(&mut self, username: &str, password: &str) -> Result<AdminCredentials> {
        if username.trim().is_empty() {
            return Err(Error::InvalidInput("Username must not be empty".to_string()));
        }
        let password = if password.is_empty() {
            self.admin_credentials()?.password
        } else {
            password.to_string()
        };

        let creds = AdminCredentials {
            username: username.to_string(),
            password,
        };
        self.write_json(keys::ADMIN_CREDENTIALS, &creds)?;
        tracing::info!(username = %creds.username, "updated admin credentials");
        Ok(creds)
    }

    pub fn verify_admin_credentials(&mut self, username: &str, password: &str) -> Result<bool> {
        let creds = self.admin_credentials()?;
        Ok(creds.username == username && creds.password == password)
    }

    // === Session flag ===

    /// Verify the credentials and set the logged-in flag.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if !self.verify_admin_credentials(username, password)? {
            tracing::warn!(username, "rejected admin login");
            return Err(Error::InvalidInput("Invalid username or password".to_string()));
        }
        self.set_item(keys::ADMIN_AUTHENTICATED, AUTHENTICATED)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.remove_item(keys::ADMIN_AUTHENTICATED)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.get_item(keys::ADMIN_AUTHENTICATED)?.as_deref() == Some(AUTHENTICATED))
    }

    /// `Error::Unauthorized` unless the logged-in flag is set.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_authenticated()? {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }
}
