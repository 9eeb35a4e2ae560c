//! Storefront site settings stored under `siteSettings`.

use crate::storage::{Storage, keys};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    pub facebook: String,
    pub instagram: String,
    pub twitter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoSettings {
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: String,
    pub google_analytics_id: String,
}

/// Optional storefront features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub enable_reviews: bool,
    pub enable_wishlist: bool,
    pub enable_comparisons: bool,
    pub enable_newsletter: bool,
}

/// Everything on the admin settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub social_links: SocialLinks,
    pub seo: SeoSettings,
    pub features: FeatureFlags,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Offers Shop".to_string(),
            site_description: "Premium cameras, bags, and accessories for tech enthusiasts."
                .to_string(),
            contact_email: "contact@offerpay.shop".to_string(),
            contact_phone: "+1 (917) 208-4154".to_string(),
            contact_address: "123 Tech Avenue\nNew York, NY 10001\nUnited States".to_string(),
            social_links: SocialLinks {
                facebook: "https://facebook.com/offersshop".to_string(),
                instagram: "https://instagram.com/offersshop".to_string(),
                twitter: "https://twitter.com/offersshop".to_string(),
            },
            seo: SeoSettings {
                meta_title: "Offers Shop | Premium Cameras, Bags & Accessories".to_string(),
                meta_description:
                    "Shop the latest cameras, bags, and accessories for tech enthusiasts."
                        .to_string(),
                keywords: "cameras, bags, accessories, tech, photography, offers, shop"
                    .to_string(),
                google_analytics_id: String::new(),
            },
            features: FeatureFlags {
                enable_reviews: true,
                enable_wishlist: false,
                enable_comparisons: false,
                enable_newsletter: true,
            },
        }
    }
}

impl SiteSettings {
    /// Set one field by its JSON path, e.g. `siteName`, `seo.metaTitle`
    /// or `features.enableReviews`.
    ///
    /// Boolean fields accept `true`/`false` (also `yes`/`no`, `on`/`off`).
    pub fn set(&mut self, path: &str, value: &str) -> Result<()> {
        let mut tree = serde_json::to_value(&*self)?;

        let mut slot = &mut tree;
        for segment in path.split('.') {
            slot = slot
                .get_mut(segment)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown setting: {}", path)))?;
        }

        *slot = match slot {
            Value::Bool(_) => Value::Bool(parse_flag(value).ok_or_else(|| {
                Error::InvalidInput(format!("{} expects true or false, got {}", path, value))
            })?),
            Value::String(_) => Value::String(value.to_string()),
            _ => {
                return Err(Error::InvalidInput(format!(
                    "{} is a group; set one of its fields instead",
                    path
                )));
            }
        };

        *self = serde_json::from_value(tree)?;
        Ok(())
    }

    /// Every leaf setting as `(path, value)`, sorted by path.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        fn walk(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
            match value {
                Value::Object(map) => {
                    for (k, v) in map {
                        let path = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{}.{}", prefix, k)
                        };
                        walk(&path, v, out);
                    }
                }
                Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }
        let mut out = Vec::new();
        walk("", &serde_json::to_value(self)?, &mut out);
        Ok(out)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Storage {
    // === Site settings ===

    /// Stored settings; defaults when absent or unreadable. Nothing is written.
    pub fn site_settings(&self) -> Result<SiteSettings> {
        match self.read_json::<SiteSettings>(keys::SITE_SETTINGS) {
            Ok(settings) => Ok(settings.unwrap_or_default()),
            Err(Error::Json(e)) => {
                tracing::warn!(error = %e, "stored site settings are not valid JSON; using defaults");
                Ok(SiteSettings::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save_site_settings(&mut self, settings: &SiteSettings) -> Result<()> {
        self.write_json(keys::SITE_SETTINGS, settings)?;
        tracing::info!("saved site settings");
        Ok(())
    }

    /// Set one setting by path and persist the result.
    pub fn set_site_setting(&mut self, path: &str, value: &str) -> Result<SiteSettings> {
        let mut settings = self.site_settings()?;
        settings.set(path, value)?;
        self.save_site_settings(&settings)?;
        Ok(settings)
    }

    /// Drop stored settings so the defaults apply again.
    pub fn reset_site_settings(&mut self) -> Result<SiteSettings> {
        self.remove_item(keys::SITE_SETTINGS)?;
        Ok(SiteSettings::default())
    }
}
