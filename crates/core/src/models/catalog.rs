//! Products, variants, images and categories.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ImageId, Price, ProductId, VariantId};

/// Placeholder shown when a product has no usable image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x850@2x.png";

/// A stored product image attached to one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub image_id: ImageId,
    pub variant_id: VariantId,
    pub image_url: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A purchasable size/color/price/stock combination of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub price: Price,
    pub stock: i32,
    pub sku: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Variant {
    /// In stock when at least one unit remains.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// The image flagged as default, falling back to the first image.
    #[must_use]
    pub fn default_image(&self) -> Option<&Image> {
        self.images
            .iter()
            .find(|image| image.is_default)
            .or_else(|| self.images.first())
    }

    /// Human label used in carts and orders ("Navy / M").
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} / {}", self.color, self.size)
    }

    /// Whether this variant has the given size and color.
    #[must_use]
    pub fn matches(&self, size: &str, color: &str) -> bool {
        self.size == size && self.color == color
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
}

/// Lowest and highest variant price of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    /// `"$12.00"` for a single price, `"$12.00 - $18.00"` otherwise.
    #[must_use]
    pub fn display(&self) -> String {
        if self.min == self.max {
            self.min.display()
        } else {
            format!("{} - {}", self.min.display(), self.max.display())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Product {
    /// Image used on listing cards.
    ///
    /// Taken from the first variant that has any images: its default image,
    /// or its first image when none is flagged.
    #[must_use]
    pub fn listing_image(&self) -> Option<&Image> {
        self.variants
            .iter()
            .find(|variant| !variant.images.is_empty())
            .and_then(Variant::default_image)
    }

    /// URL for [`Self::listing_image`], or the placeholder.
    #[must_use]
    pub fn listing_image_url(&self) -> &str {
        self.listing_image()
            .map(|image| image.image_url.as_str())
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Distinct variant colors in first-seen order.
    #[must_use]
    pub fn colors(&self) -> Vec<&str> {
        distinct(self.variants.iter().map(|variant| variant.color.as_str()))
    }

    /// Distinct variant sizes in first-seen order.
    #[must_use]
    pub fn sizes(&self) -> Vec<&str> {
        distinct(self.variants.iter().map(|variant| variant.size.as_str()))
    }

    /// The variant with exactly this color and size.
    #[must_use]
    pub fn find_variant(&self, color: &str, size: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|variant| variant.matches(size, color))
    }

    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|variant| &variant.variant_id == id)
    }

    /// Whether a new variant with this size and color would duplicate one.
    #[must_use]
    pub fn has_variant(&self, size: &str, color: &str) -> bool {
        self.variants.iter().any(|variant| variant.matches(size, color))
    }

    /// Every image across all variants, de-duplicated by id.
    ///
    /// Images without a URL are skipped.
    #[must_use]
    pub fn gallery_images(&self) -> Vec<&Image> {
        let mut seen = HashSet::new();
        self.variants
            .iter()
            .flat_map(|variant| variant.images.iter())
            .filter(|image| !image.image_url.is_empty())
            .filter(|image| seen.insert(&image.image_id))
            .collect()
    }

    #[must_use]
    pub fn price_range(&self) -> Option<PriceRange> {
        let min = self.variants.iter().map(|variant| variant.price).min()?;
        let max = self.variants.iter().map(|variant| variant.price).max()?;
        Some(PriceRange { min, max })
    }

    /// Lowest variant price, shown on listing cards.
    #[must_use]
    pub fn starting_price(&self) -> Option<Price> {
        self.price_range().map(|range| range.min)
    }

    /// Units in stock summed across every variant.
    #[must_use]
    pub fn total_stock(&self) -> i64 {
        self.variants
            .iter()
            .map(|variant| i64::from(variant.stock))
            .sum()
    }

    #[must_use]
    pub fn category_ids(&self) -> Vec<&CategoryId> {
        self.categories
            .iter()
            .map(|category| &category.category_id)
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn image(id: &str, variant: &str, is_default: bool) -> Image {
        Image {
            image_id: ImageId::new(id),
            variant_id: VariantId::new(variant),
            image_url: format!("https://cdn.test/{id}.jpg"),
            is_default,
        }
    }

    fn variant(id: &str, color: &str, size: &str, cents: i64, stock: i32) -> Variant {
        Variant {
            variant_id: VariantId::new(id),
            product_id: ProductId::new("p1"),
            size: size.to_owned(),
            color: color.to_owned(),
            price: Price::from_cents(cents),
            stock,
            sku: format!("SKU-{id}"),
            images: Vec::new(),
        }
    }

    fn product(variants: Vec<Variant>) -> Product {
        Product {
            product_id: ProductId::new("p1"),
            name: "Linen Shirt".to_owned(),
            description: String::new(),
            is_archived: false,
            variants,
            categories: Vec::new(),
        }
    }

    #[test]
    fn test_listing_image_prefers_default_of_first_variant_with_images() {
        let mut bare = variant("v1", "Navy", "S", 1000, 1);
        bare.images.clear();
        let mut pictured = variant("v2", "Navy", "M", 1000, 1);
        pictured.images = vec![image("i1", "v2", false), image("i2", "v2", true)];
        let mut later = variant("v3", "Red", "M", 1000, 1);
        later.images = vec![image("i3", "v3", true)];

        let product = product(vec![bare, pictured, later]);
        assert_eq!(product.listing_image().unwrap().image_id.as_str(), "i2");
    }

    #[test]
    fn test_listing_image_falls_back_to_first_and_placeholder() {
        let mut pictured = variant("v1", "Navy", "S", 1000, 1);
        pictured.images = vec![image("i1", "v1", false), image("i2", "v1", false)];
        assert_eq!(
            product(vec![pictured]).listing_image().unwrap().image_id.as_str(),
            "i1"
        );

        let empty = product(vec![variant("v1", "Navy", "S", 1000, 1)]);
        assert!(empty.listing_image().is_none());
        assert_eq!(empty.listing_image_url(), PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn test_distinct_colors_and_sizes_keep_first_seen_order() {
        let product = product(vec![
            variant("v1", "Navy", "M", 1000, 1),
            variant("v2", "Sand", "M", 1000, 1),
            variant("v3", "Navy", "L", 1000, 1),
        ]);
        assert_eq!(product.colors(), vec!["Navy", "Sand"]);
        assert_eq!(product.sizes(), vec!["M", "L"]);
    }

    #[test]
    fn test_find_variant_and_availability() {
        let product = product(vec![
            variant("v1", "Navy", "M", 1000, 0),
            variant("v2", "Navy", "L", 1000, 3),
        ]);
        assert!(!product.find_variant("Navy", "M").unwrap().is_available());
        assert!(product.find_variant("Navy", "L").unwrap().is_available());
        assert!(product.find_variant("Sand", "L").is_none());
        assert!(product.has_variant("L", "Navy"));
        assert!(!product.has_variant("l", "Navy"));
    }

    #[test]
    fn test_gallery_images_dedupes_by_id() {
        let mut first = variant("v1", "Navy", "M", 1000, 1);
        first.images = vec![image("i1", "v1", true), image("i2", "v1", false)];
        let mut second = variant("v2", "Navy", "L", 1000, 1);
        let mut blank = image("i4", "v2", false);
        blank.image_url.clear();
        second.images = vec![image("i2", "v1", false), image("i3", "v2", true), blank];

        let product = product(vec![first, second]);
        let ids: Vec<_> = product
            .gallery_images()
            .iter()
            .map(|image| image.image_id.as_str())
            .collect();
        assert_eq!(ids, vec!["i1", "i2", "i3"]);
    }

    #[test]
    fn test_price_range_display() {
        let single = product(vec![variant("v1", "Navy", "M", 2500, 1)]);
        assert_eq!(single.price_range().unwrap().display(), "$25.00");

        let spread = product(vec![
            variant("v1", "Navy", "M", 2500, 1),
            variant("v2", "Navy", "L", 1999, 1),
            variant("v3", "Navy", "XL", 3000, 1),
        ]);
        assert_eq!(spread.price_range().unwrap().display(), "$19.99 - $30.00");
        assert_eq!(spread.starting_price(), Some(Price::from_cents(1999)));
        assert!(product(Vec::new()).price_range().is_none());
    }

    #[test]
    fn test_total_stock() {
        let product = product(vec![
            variant("v1", "Navy", "M", 1000, 4),
            variant("v2", "Navy", "L", 1000, 0),
            variant("v3", "Navy", "XL", 1000, 7),
        ]);
        assert_eq!(product.total_stock(), 11);
    }

    #[test]
    fn test_deserializes_backend_payload() {
        let json = r#"{
            "productId": "p9",
            "name": "Wool Coat",
            "description": "Warm",
            "isArchived": false,
            "variants": [{
                "variantId": "v1", "productId": "p9", "size": "M", "color": "Navy",
                "price": 129.5, "stock": 2, "sku": "WC-M",
                "images": [{"imageId": "i1", "variantId": "v1", "imageUrl": "u", "isDefault": true}]
            }],
            "categories": [{"categoryId": "c1", "name": "Formal"}]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.variants[0].price, Price::from_cents(12950));
        assert_eq!(product.categories[0].name, "Formal");
    }
}
