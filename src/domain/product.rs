use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry as stored in the `products` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub url: String,
    pub platform: String,
    pub title: String,
    pub price: String,
    pub original_price: String,
    pub image_url: String,
    pub description: String,
    pub rating: String,
    pub category: String,
    /// JSON array of image URLs, empty when only `image_url` is known
    pub images: String,
    pub long_description: String,
    pub is_new: bool,
    pub is_bestseller: bool,
    pub added_at: DateTime<Utc>,
}

/// Insert parameters for a product (everything the database does not assign)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub url: String,
    pub platform: String,
    pub title: String,
    pub price: String,
    pub original_price: String,
    pub image_url: String,
    pub description: String,
    pub rating: String,
    pub category: String,
    pub images: String,
    pub long_description: String,
    pub is_new: bool,
    pub is_bestseller: bool,
}

/// Partial update: `None` or an empty string keeps the stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub url: Option<String>,
    pub platform: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<String>,
    pub category: Option<String>,
    pub images: Option<String>,
    pub long_description: Option<String>,
    pub is_new: Option<String>,
    pub is_bestseller: Option<String>,
}

impl Product {
    /// Decoded gallery, falling back to the primary image
    pub fn image_list(&self) -> Vec<String> {
        let images = split_images(&self.images);
        if images.is_empty() && !self.image_url.is_empty() {
            return vec![self.image_url.clone()];
        }
        images
    }

    /// Category used for grouping; uncategorized products land in "Other"
    pub fn display_category(&self) -> &str {
        if self.category.is_empty() {
            "Other"
        } else {
            &self.category
        }
    }
}

impl ProductPatch {
    /// Merge the patch over an existing product
    pub fn apply(&self, current: &Product) -> Product {
        let pick = |value: &Option<String>, existing: &str| match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => existing.to_string(),
        };
        let flag = |value: &Option<String>, existing: bool| match value.as_deref() {
            Some("") | None => existing,
            Some(v) => parse_flag(v),
        };

        Product {
            id: current.id,
            url: pick(&self.url, &current.url),
            platform: pick(&self.platform, &current.platform),
            title: pick(&self.title, &current.title),
            price: pick(&self.price, &current.price),
            original_price: pick(&self.original_price, &current.original_price),
            image_url: pick(&self.image_url, &current.image_url),
            description: pick(&self.description, &current.description),
            rating: pick(&self.rating, &current.rating),
            category: pick(&self.category, &current.category),
            images: pick(&self.images, &current.images),
            long_description: pick(&self.long_description, &current.long_description),
            is_new: flag(&self.is_new, current.is_new),
            is_bestseller: flag(&self.is_bestseller, current.is_bestseller),
            added_at: current.added_at,
        }
    }
}

/// Lower-cased, trimmed title used as the import dedupe key
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Decode the `images` column; malformed JSON yields no images
pub fn split_images(images: &str) -> Vec<String> {
    if images.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(images).unwrap_or_default()
}

/// Form flags arrive as "1"/"0" or "true"/"false"; anything else is off
fn parse_flag(value: &str) -> bool {
    match value.trim() {
        "true" | "on" => true,
        v => v.parse::<i64>().map(|n| n != 0).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product {
            id: 7,
            url: "https://www.meesho.com/cap/p/abc".into(),
            platform: "Meesho".into(),
            title: "Denim Cap".into(),
            price: "₹199".into(),
            original_price: "₹299".into(),
            image_url: "https://images.meesho.com/cap.jpg".into(),
            description: "A cap".into(),
            rating: "4.2".into(),
            category: String::new(),
            images: String::new(),
            long_description: String::new(),
            is_new: false,
            is_bestseller: true,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn image_list_falls_back_to_primary_image() {
        let product = sample();
        assert_eq!(product.image_list(), vec!["https://images.meesho.com/cap.jpg".to_string()]);

        let mut with_gallery = sample();
        with_gallery.images = r#"["a.jpg","b.jpg"]"#.into();
        assert_eq!(with_gallery.image_list(), vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    }

    #[test]
    fn empty_category_displays_as_other() {
        assert_eq!(sample().display_category(), "Other");
    }

    #[test]
    fn patch_keeps_fields_that_are_missing_or_empty() {
        let current = sample();
        let patch = ProductPatch {
            title: Some("Washed Denim Cap".into()),
            price: Some(String::new()),
            is_new: Some("1".into()),
            is_bestseller: Some("0".into()),
            ..Default::default()
        };

        let updated = patch.apply(&current);
        assert_eq!(updated.title, "Washed Denim Cap");
        assert_eq!(updated.price, "₹199");
        assert_eq!(updated.url, current.url);
        assert!(updated.is_new);
        assert!(!updated.is_bestseller);
        assert_eq!(updated.added_at, current.added_at);
    }

    #[test]
    fn unparsable_flag_turns_off() {
        let patch = ProductPatch {
            is_bestseller: Some("yes please".into()),
            ..Default::default()
        };
        assert!(!patch.apply(&sample()).is_bestseller);
    }

    #[test]
    fn malformed_images_json_is_ignored() {
        assert!(split_images("not json").is_empty());
    }
}
