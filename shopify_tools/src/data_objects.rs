use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShopifyProduct {
    pub title: String,
    pub variants: Vec<NewVariant>,
}

impl NewShopifyProduct {
    /// A single-variant product without inventory tracking.
    pub fn new<S: Into<String>>(title: S, price: S) -> Self {
        Self { title: title.into(), variants: vec![NewVariant { price: price.into(), inventory_management: None }] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVariant {
    pub price: String,
    /// Serialized as `null` so that Shopify does not track inventory for the variant
    pub inventory_management: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl ShopifyProduct {
    /// The price of the first variant, which is the product price for single-variant products.
    pub fn price(&self) -> Option<&str> {
        self.variants.first().map(|v| v.price.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    pub price: String,
}

/// The parts of an `orders/paid` webhook payload that matter for sales counting. Shopify sends many more fields,
/// which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopifyOrderWebhook {
    pub id: i64,
    #[serde(default)]
    pub line_items: Vec<ShopifyLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopifyLineItem {
    /// `None` for custom line items that do not refer to a product
    pub product_id: Option<i64>,
    pub quantity: i64,
}
