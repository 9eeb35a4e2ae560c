//! Admin commands: login state, credentials and site settings.
//!
//! Changing credentials and anything under `settings` require a prior
//! `shop admin login`.

use super::{Output, json};
use crate::settings::SiteSettings;
use crate::storage::Storage;
use crate::Result;
use serde::Serialize;

#[derive(Serialize)]
pub struct AdminStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Output for AdminStatus {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match (&self.username, self.authenticated) {
            (Some(user), true) => format!("Logged in as {}", user),
            (_, true) => "Logged in".to_string(),
            _ => "Not logged in".to_string(),
        }
    }
}

pub fn admin_login(storage: &mut Storage, username: &str, password: &str) -> Result<AdminStatus> {
    storage.login(username, password)?;
    Ok(AdminStatus {
        authenticated: true,
        username: Some(username.to_string()),
    })
}

pub fn admin_logout(storage: &mut Storage) -> Result<AdminStatus> {
    storage.logout()?;
    Ok(AdminStatus {
        authenticated: false,
        username: None,
    })
}

pub fn admin_status(storage: &mut Storage) -> Result<AdminStatus> {
    let authenticated = storage.is_authenticated()?;
    let username = if authenticated {
        Some(storage.admin_credentials()?.username)
    } else {
        None
    };
    Ok(AdminStatus {
        authenticated,
        username,
    })
}

#[derive(Serialize)]
pub struct CredentialsUpdated {
    pub username: String,
    pub password_changed: bool,
}

impl Output for CredentialsUpdated {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.password_changed {
            format!("Updated admin login: {} (new password)", self.username)
        } else {
            format!("Updated admin login: {}", self.username)
        }
    }
}

/// Replace the admin username and, unless blank, the password.
pub fn admin_set_credentials(
    storage: &mut Storage,
    username: &str,
    password: Option<&str>,
) -> Result<CredentialsUpdated> {
    storage.require_admin()?;
    let password = password.unwrap_or_default();
    let creds = storage.update_admin_credentials(username, password)?;
    Ok(CredentialsUpdated {
        username: creds.username,
        password_changed: !password.is_empty(),
    })
}

// === Site settings ===

#[derive(Serialize)]
#[serde(transparent)]
pub struct SettingsView(pub SiteSettings);

impl Output for SettingsView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.0.entries() {
            Ok(entries) => entries
                .into_iter()
                .map(|(path, value)| format!("{:<28} {}", path, value.replace('\n', ", ")))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("Error: {}", e),
        }
    }
}

pub fn settings_show(storage: &Storage) -> Result<SettingsView> {
    storage.require_admin()?;
    Ok(SettingsView(storage.site_settings()?))
}

pub fn settings_set(storage: &mut Storage, path: &str, value: &str) -> Result<SettingsView> {
    storage.require_admin()?;
    Ok(SettingsView(storage.set_site_setting(path, value)?))
}

pub fn settings_reset(storage: &mut Storage) -> Result<SettingsView> {
    storage.require_admin()?;
    Ok(SettingsView(storage.reset_site_settings()?))
}
