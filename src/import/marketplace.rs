//! Marketplace URL import.
//!
//! Listings are not fetched. Product and profile URLs are turned into
//! deterministic placeholder products derived from the URL itself, so the
//! same URL always yields the same candidates.

use super::ExtractedProduct;
use crate::models::round_cents;
use crate::{Error, Result};

/// Host a URL must mention to be accepted.
pub const MARKETPLACE_HOST: &str = "depop.com";

const PRODUCT_TYPES: [&str; 8] = ["Shirt", "Jacket", "Pants", "Dress", "Shoes", "Bag", "Hat", "Scarf"];
const ADJECTIVES: [&str; 6] = ["Vintage", "Modern", "Classic", "Designer", "Stylish", "Trendy"];

/// Number of products generated for a profile URL.
pub const PROFILE_PRODUCT_COUNT: usize = 6;

/// Fallback name when a product URL has no words after the seller handle.
pub const FALLBACK_NAME: &str = "Vintage Fashion Item";

/// What a marketplace URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceUrl {
    /// A seller's profile page; carries the seller handle
    Profile(String),
    /// A single listing
    Product,
}

/// Classify a marketplace URL.
///
/// A profile URL is `<host>/<handle>` with at most a trailing slash; every
/// other marketplace URL is treated as a listing.
pub fn classify(url: &str) -> Result<MarketplaceUrl> {
    if !url.contains(MARKETPLACE_HOST) {
        return Err(Error::InvalidInput(
            "Invalid URL. Please provide a valid Depop product URL.".to_string(),
        ));
    }

    // Any mention of the host may be the one followed by a bare handle
    let is_profile = url.match_indices(MARKETPLACE_HOST).any(|(pos, _)| {
        let after = &url[pos + MARKETPLACE_HOST.len()..];
        after.strip_prefix('/').is_some_and(|path| {
            let handle = path.strip_suffix('/').unwrap_or(path);
            !handle.is_empty() && !handle.contains('/')
        })
    });
    if !is_profile {
        return Ok(MarketplaceUrl::Product);
    }

    let segments: Vec<&str> = url.split('/').collect();
    let n = segments.len();
    let handle = [segments[n - 1], segments.get(n.wrapping_sub(2)).copied().unwrap_or("")]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("seller");
    Ok(MarketplaceUrl::Profile(handle.to_string()))
}

/// Products for a marketplace URL: one for a listing, six for a profile.
pub fn import_from_url(url: &str) -> Result<Vec<ExtractedProduct>> {
    match classify(url)? {
        MarketplaceUrl::Profile(handle) => Ok(profile_products(url, &handle)),
        MarketplaceUrl::Product => Ok(vec![listing_product(url)?]),
    }
}

/// Placeholder products for a seller profile.
pub fn profile_products(profile_url: &str, handle: &str) -> Vec<ExtractedProduct> {
    let handle_len = utf16_len(handle);
    (0..PROFILE_PRODUCT_COUNT)
        .map(|i| {
            let name = format!(
                "{} {}",
                ADJECTIVES[i % ADJECTIVES.len()],
                PRODUCT_TYPES[i % PRODUCT_TYPES.len()]
            );
            let price = (25 + i * 5 + handle_len % 10) as f64;
            ExtractedProduct {
                image: placeholder_image(&name, i as u32),
                description: seller_description(&name, handle),
                source_url: format!("{}/product-{}", profile_url, i),
                name,
                price,
            }
        })
        .collect()
}

/// Placeholder product for a single listing URL
/// (`.../products/<handle>-<slug words>`).
pub fn listing_product(url: &str) -> Result<ExtractedProduct> {
    let segments: Vec<&str> = url.split('/').collect();
    let identifier = segments
        .iter()
        .position(|s| *s == "products")
        .and_then(|i| segments.get(i + 1))
        .ok_or_else(|| Error::InvalidInput("Invalid Depop product URL format".to_string()))?;

    let mut words = identifier.split('-');
    let handle = words.next().unwrap_or("");
    let slug: Vec<&str> = words.collect();
    let name = title_case(&slug.join(" "));

    let base = (utf16_len(&name) * 3 + utf16_len(handle) * 2) as f64;
    let price = round_cents(base.clamp(19.99, 199.99));
    let seed = (i64::from(hash_code(identifier)).abs() % 10 + 1) as u32;

    Ok(ExtractedProduct {
        image: placeholder_image(&name, seed),
        description: seller_description(&name, handle),
        source_url: url.to_string(),
        name: if name.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            name
        },
        price,
    })
}

/// 32-bit string hash: `h = h * 31 + unit` over UTF-16 code units,
/// wrapping on overflow.
pub fn hash_code(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Upper-case the first character and any character after whitespace.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if at_start && is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        at_start = c.is_whitespace();
    }
    out
}

fn placeholder_image(name: &str, seed: u32) -> String {
    format!(
        "/placeholder.svg?height=600&width=600&text={}&seed={}",
        encode_uri_component(name),
        seed
    )
}

fn seller_description(name: &str, handle: &str) -> String {
    format!(
        "This {} is a unique fashion item from Depop seller @{}. Perfect for any fashion \
         enthusiast looking for distinctive pieces that stand out.",
        name.to_lowercase(),
        handle
    )
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_other_hosts() {
        assert!(matches!(
            import_from_url("https://www.etsy.com/listing/1"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("https://www.depop.com/retroshop").unwrap(),
            MarketplaceUrl::Profile("retroshop".to_string())
        );
        assert_eq!(
            classify("https://www.depop.com/retroshop/").unwrap(),
            MarketplaceUrl::Profile("retroshop".to_string())
        );
        assert_eq!(
            classify("https://www.depop.com/products/retroshop-denim-jacket/").unwrap(),
            MarketplaceUrl::Product
        );
        assert_eq!(classify("https://depop.com").unwrap(), MarketplaceUrl::Product);
    }

    #[test]
    fn test_classify_checks_every_host_mention() {
        assert_eq!(
            classify("https://depop.com.example.net/r?to=https://www.depop.com/retroshop").unwrap(),
            MarketplaceUrl::Profile("retroshop".to_string())
        );
        assert_eq!(
            classify("https://www.depop.com/products/depop.com-fan-tee/").unwrap(),
            MarketplaceUrl::Product
        );
    }

    #[test]
    fn test_profile_products() {
        let products = import_from_url("https://www.depop.com/retroshop").unwrap();
        assert_eq!(products.len(), 6);

        // "retroshop" has 9 characters
        assert_eq!(products[0].name, "Vintage Shirt");
        assert_eq!(products[0].price, 34.0);
        assert_eq!(products[5].name, "Trendy Bag");
        assert_eq!(products[5].price, 59.0);
        assert_eq!(
            products[1].image,
            "/placeholder.svg?height=600&width=600&text=Modern%20Jacket&seed=1"
        );
        assert_eq!(
            products[2].source_url,
            "https://www.depop.com/retroshop/product-2"
        );
        assert!(products[3].description.starts_with("This designer dress is a unique"));
        assert!(products[3].description.contains("@retroshop."));
    }

    #[test]
    fn test_listing_product() {
        let url = "https://www.depop.com/products/retroshop-levis-denim-jacket/";
        let products = import_from_url(url).unwrap();
        assert_eq!(products.len(), 1);
        let p = &products[0];

        assert_eq!(p.name, "Levis Denim Jacket");
        // 18 * 3 + 9 * 2
        assert_eq!(p.price, 72.0);
        assert_eq!(p.source_url, url);
        assert!(p.image.contains("text=Levis%20Denim%20Jacket&seed="));
        let seed = (i64::from(hash_code("retroshop-levis-denim-jacket")).abs() % 10 + 1).to_string();
        assert!(p.image.ends_with(&format!("&seed={}", seed)));
        assert!(p.description.starts_with("This levis denim jacket is"));
    }

    #[test]
    fn test_listing_price_clamped() {
        let short = listing_product("https://depop.com/products/a-b").unwrap();
        assert_eq!(short.price, 19.99);

        let long_name = "x".repeat(80);
        let long = listing_product(&format!("https://depop.com/products/seller-{}", long_name)).unwrap();
        assert_eq!(long.price, 199.99);
    }

    #[test]
    fn test_listing_without_words_uses_fallback_name() {
        let p = listing_product("https://depop.com/products/seller").unwrap();
        assert_eq!(p.name, FALLBACK_NAME);
        assert_eq!(p.price, 19.99);
    }

    #[test]
    fn test_listing_without_products_segment() {
        let err = import_from_url("https://www.depop.com/retroshop/likes").unwrap_err();
        assert!(err.to_string().contains("Invalid Depop product URL format"));
    }

    #[test]
    fn test_hash_code() {
        assert_eq!(hash_code(""), 0);
        assert_eq!(hash_code("a"), 97);
        assert_eq!(hash_code("ab"), 97 * 31 + 98);
        // Wraps like a 32-bit integer
        assert_eq!(hash_code("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("Modern Jacket"), "Modern%20Jacket");
        assert_eq!(encode_uri_component("a&b=c'(d)"), "a%26b%3Dc'(d)");
        assert_eq!(encode_uri_component("ü"), "%C3%BC");
    }
}
