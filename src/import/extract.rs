//! Heuristic product extraction from arbitrary HTML.
//!
//! Any element that looks like a product card is mined for a name, price,
//! image and description. Results are best-effort and depend entirely on the
//! markup; missing pieces are filled with placeholders.

use super::ExtractedProduct;
use super::dom::{Document, NodeId, Selector};
use regex::Regex;
use std::sync::OnceLock;

const CONTAINER_SELECTOR: &str =
    ".product-item, .product-card, [data-product], .item, article, .card, .product, li";
const IMAGE_PARENT_SELECTOR: &str = "div, article, section, li";
const PRODUCT_LINK_SELECTOR: &str = r#"a[href*="/products/"]"#;
const NAME_SELECTOR: &str = "h1, h2, h3, h4, .product-name, .title";
const PRICE_SELECTOR: &str =
    r#"[aria-label="Price"], .price, [class*="price"], [data-price], .product-price"#;
const DESCRIPTION_SELECTOR: &str = ".description, .product-description, p";

pub const DEFAULT_PRICE: f64 = 29.99;
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=600&width=600";

/// First run of digits, commas and dots in a price label.
fn price_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9,.]+").expect("valid regex"))
}

/// Leading decimal number; whatever follows it is ignored.
fn number_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").expect("valid regex"))
}

/// Pull product-shaped fragments out of an HTML page.
///
/// Candidate containers are tried first; when none yields a product, every
/// image with a `src` is tried through its closest block ancestor.
pub fn extract_products(html: &str) -> Vec<ExtractedProduct> {
    let doc = Document::parse(html);

    let containers = doc.select(Document::ROOT, &Selector::new(CONTAINER_SELECTOR));
    let mut products: Vec<ExtractedProduct> = containers
        .iter()
        .enumerate()
        .filter_map(|(index, &el)| extract_one(&doc, el, index))
        .collect();

    if products.is_empty() {
        let parent_selector = Selector::new(IMAGE_PARENT_SELECTOR);
        let images = doc.select(Document::ROOT, &Selector::new("img"));
        for (index, &img) in images.iter().enumerate() {
            if doc.attr(img, "src").unwrap_or("").is_empty() {
                continue;
            }
            if let Some(parent) = doc.closest(img, &parent_selector) {
                if let Some(product) = extract_one(&doc, parent, index) {
                    products.push(product);
                }
            }
        }
        tracing::debug!(found = products.len(), "fell back to image-based extraction");
    }

    products
}

fn extract_one(doc: &Document, el: NodeId, index: usize) -> Option<ExtractedProduct> {
    let mut name = String::new();
    let mut source_url = String::new();

    if let Some(link) = doc.select_first(el, &Selector::new(PRODUCT_LINK_SELECTOR)) {
        let href = doc.attr(link, "href").unwrap_or("");
        source_url = href.to_string();
        if let Some(slug) = name_from_product_href(href) {
            name = slug;
        }
    }

    if name.is_empty() {
        if let Some(heading) = doc.select_first(el, &Selector::new(NAME_SELECTOR)) {
            name = doc.text(heading).trim().to_string();
        }
    }

    let price = doc
        .select_first(el, &Selector::new(PRICE_SELECTOR))
        .and_then(|p| parse_price(&doc.text(p)))
        .filter(|p| *p != 0.0)
        .unwrap_or(DEFAULT_PRICE);

    let image = doc
        .select_first(el, &Selector::new("img"))
        .map(|img| {
            let src = doc
                .attr(img, "src")
                .filter(|s| !s.is_empty())
                .or_else(|| doc.attr(img, "data-src"))
                .unwrap_or("");
            normalize_image(src)
        })
        .unwrap_or_default();

    let description = doc
        .select_first(el, &Selector::new(DESCRIPTION_SELECTOR))
        .map(|d| doc.text(d).trim().to_string())
        .unwrap_or_default();

    if name.is_empty() && image.is_empty() {
        return None;
    }

    let name = if name.is_empty() {
        format!("Product {}", index + 1)
    } else {
        name
    };
    let description = if description.is_empty() {
        format!("Description for {}", name)
    } else {
        description
    };
    let image = if image.is_empty() {
        PLACEHOLDER_IMAGE.to_string()
    } else {
        image
    };

    Some(ExtractedProduct {
        name: capitalize_words(&name),
        price,
        description,
        image,
        source_url,
    })
}

/// Name from a `/products/<seller>-<words>` link: the seller handle is
/// dropped when there is more than one part.
fn name_from_product_href(href: &str) -> Option<String> {
    let (_, after) = href.split_once("/products/")?;
    let slug = after.split('/').next().unwrap_or("");
    let mut parts: Vec<&str> = slug.split('-').collect();
    if parts.len() > 1 {
        parts.remove(0);
    }
    let name = parts.join(" ");
    (!name.is_empty()).then_some(name)
}

/// First run of digits, commas and dots, read as a number.
///
/// Commas are thousands separators; anything after a second dot is ignored.
pub fn parse_price(text: &str) -> Option<f64> {
    let run = price_run_re().find(text)?.as_str();
    let cleaned: String = run.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let number = number_prefix_re().find(&cleaned)?.as_str().trim_end_matches('.');
    number.parse::<f64>().ok()
}

/// Swap the thumbnail suffix for the full-size one and root relative paths.
fn normalize_image(src: &str) -> String {
    if src.is_empty() {
        return String::new();
    }
    let src = src.replacen("P10.jpg", "P0.jpg", 1);
    if src.starts_with("http") || src.starts_with('/') {
        src
    } else {
        format!("/{}", src)
    }
}

/// Upper-case every ASCII word character that starts a word.
pub fn capitalize_words(s: &str) -> String {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(s.len());
    let mut prev_word = false;
    for c in s.chars() {
        let word = is_word(c);
        if word && !prev_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_word = word;
    }
    out
}
