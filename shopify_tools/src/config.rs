use bo_common::Secret;
use log::*;

pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2024-01";

#[derive(Debug, Clone, Default)]
pub struct ShopifyConfig {
    /// The storefront domain, e.g. "my-shop.myshopify.com"
    pub shop: String,
    pub admin_access_token: Secret<String>,
    pub api_version: String,
}

impl ShopifyConfig {
    pub fn new_from_env_or_default() -> Self {
        let shop = std::env::var("BO_SHOPIFY_SHOP").map(|s| strip_scheme(&s)).unwrap_or_else(|_| {
            warn!("🛍️️ BO_SHOPIFY_SHOP not set, using (probably useless) default");
            "example.myshopify.com".to_string()
        });
        let api_version = std::env::var("BO_SHOPIFY_API_VERSION").unwrap_or_else(|_| {
            info!("🛍️️ BO_SHOPIFY_API_VERSION not set, using {DEFAULT_SHOPIFY_API_VERSION} as default");
            DEFAULT_SHOPIFY_API_VERSION.to_string()
        });
        let admin_access_token = Secret::new(std::env::var("BO_SHOPIFY_ADMIN_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("🛍️️ BO_SHOPIFY_ADMIN_ACCESS_TOKEN not set, using (probably useless) default");
            "shpat_00000000000000".to_string()
        }));
        Self { shop, admin_access_token, api_version }
    }
}

/// Accepts the shop as a bare domain or as a URL.
fn strip_scheme(shop: &str) -> String {
    let shop = shop.trim();
    let shop = shop.strip_prefix("https://").or_else(|| shop.strip_prefix("http://")).unwrap_or(shop);
    shop.trim_end_matches('/').to_string()
}
