//! Catalog rules shared by the scraper, the importer and the pages
//!
//! Platform detection, category classification, price parsing and the
//! sort orders offered on category pages.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Categories the storefront groups products into, in display order
pub const KNOWN_CATEGORIES: [&str; 6] = [
    "Nails & Beauty",
    "Caps & Accessories",
    "Fashion & Clothing",
    "Home & Decor",
    "Kitchen & Dining",
    "Electronics",
];

pub const OTHER_CATEGORY: &str = "Other";

/// Marketplace a product URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Meesho,
    Amazon,
    Flipkart,
    Other,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meesho => "Meesho",
            Self::Amazon => "Amazon",
            Self::Flipkart => "Flipkart",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a URL by marketplace host (short links included)
pub fn detect_platform(url: &str) -> Platform {
    let lower = url.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["meesho.com"]) {
        Platform::Meesho
    } else if has(&["amazon.in", "amazon.com", "amzn.in", "amzn.to", "amzn.eu"]) {
        Platform::Amazon
    } else if has(&["flipkart.com", "fkrt.it"]) {
        Platform::Flipkart
    } else {
        Platform::Other
    }
}

/// Keyword rules applied to free text, first match wins
const CATEGORY_KEYWORDS: [(&str, &[&str]); 6] = [
    ("Nails & Beauty", &["nail", "manicure", "lipstick", "makeup", "beauty", "cosmetic"]),
    ("Caps & Accessories", &["cap", "hat", "beanie", "wallet", "belt", "sunglass", "jewel", "earring", "bracelet", "accessor"]),
    ("Fashion & Clothing", &["shirt", "hoodie", "sweatshirt", "kurti", "dress", "saree", "jacket", "jeans", "top", "legging"]),
    ("Home & Decor", &["lamp", "light", "led", "decor", "cushion", "curtain", "frame", "vase", "clock"]),
    ("Kitchen & Dining", &["bottle", "jar", "mug", "cup", "tumbler", "sipper", "kitchen", "plate", "bowl", "spoon"]),
    ("Electronics", &["earphone", "headphone", "charger", "cable", "speaker", "bluetooth", "usb", "power bank", "smartwatch"]),
];

/// Guess a storefront category from a product title
pub fn auto_category(text: &str) -> String {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(OTHER_CATEGORY, |(category, _)| category)
        .to_string()
}

/// Map a marketplace sub-category name onto a storefront category
pub fn map_marketplace_category(sub_category: &str) -> String {
    let lower = sub_category.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    let mapped = if has(&["nail"]) {
        "Nails & Beauty"
    } else if has(&["cap", "hat", "beanie", "accessories"]) {
        "Caps & Accessories"
    } else if has(&["sweatshirt", "hoodie", "shirt", "kurti", "dress", "fashion"]) {
        "Fashion & Clothing"
    } else if has(&["lamp", "light", "led", "decor", "home"]) {
        "Home & Decor"
    } else if has(&["bottle", "jar", "mug", "cup", "tumbler", "sipper", "kitchen"]) {
        "Kitchen & Dining"
    } else {
        return auto_category(sub_category);
    };
    mapped.to_string()
}

/// Numeric value of a display price such as "₹370" or "Rs. 1,234"
pub fn parse_price(price: &str) -> f64 {
    // dots before the first digit belong to prefixes like "Rs."
    let mut digits = String::new();
    for c in price.chars() {
        if c.is_ascii_digit() || (c == '.' && !digits.is_empty()) {
            digits.push(c);
        }
    }
    digits.parse().unwrap_or(0.0)
}

/// Whole-number discount percentage, zero when there is no real discount
pub fn discount_pct(price: &str, original_price: &str) -> i64 {
    let p = parse_price(price);
    let o = parse_price(original_price);
    if o <= 0.0 || p <= 0.0 || o <= p {
        return 0;
    }
    ((o - p) / o * 100.0) as i64
}

/// Sort orders offered on category pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Store order (newest first)
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Bestseller,
}

impl SortOrder {
    /// Unknown or missing values keep store order
    pub fn from_query(value: Option<&str>) -> Self {
        match value.unwrap_or_default() {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "bestseller" => Self::Bestseller,
            _ => Self::Newest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Bestseller => "bestseller",
        }
    }

    /// Reorder products in place; sorts are stable
    pub fn apply(self, products: &mut [Product]) {
        let by_price = |a: &Product, b: &Product| {
            parse_price(&a.price)
                .partial_cmp(&parse_price(&b.price))
                .unwrap_or(Ordering::Equal)
        };
        match self {
            Self::Newest => {}
            Self::PriceAsc => products.sort_by(by_price),
            Self::PriceDesc => products.sort_by(|a, b| by_price(b, a)),
            Self::Bestseller => products.sort_by(|a, b| b.is_bestseller.cmp(&a.is_bestseller)),
        }
    }
}

pub fn category_emoji(category: &str) -> &'static str {
    match category {
        "Nails & Beauty" => "💅",
        "Caps & Accessories" => "🧢",
        "Fashion & Clothing" => "👗",
        "Home & Decor" => "🏠",
        "Kitchen & Dining" => "🍽️",
        "Electronics" => "📱",
        _ => "📦",
    }
}

/// Animated Noto emoji for a category tile
pub fn category_gif(category: &str) -> String {
    let code = match category {
        "Nails & Beauty" => "1f485",
        "Caps & Accessories" => "1f48e",
        "Fashion & Clothing" => "1f49c",
        "Home & Decor" => "1f4a1",
        "Kitchen & Dining" => "2615",
        "Electronics" => "1f4ab",
        _ => "1f381",
    };
    format!("https://fonts.gstatic.com/s/e/notoemoji/latest/{code}/512.gif")
}

/// Display price with a rupee sign unless one is already present
pub fn format_price(price: &str) -> String {
    let trimmed = price.trim();
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('₹') || trimmed.starts_with("Rs") {
        trimmed.to_string()
    } else {
        format!("₹{trimmed}")
    }
}

/// Local images are served directly, remote ones through the image proxy
pub fn image_src(url: &str) -> String {
    if url.starts_with("/uploads/") || url.starts_with("/static/") {
        return url.to_string();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    format!("/img?url={encoded}")
}

/// Cut to at most `max_chars` characters, marking the cut with "..."
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}
