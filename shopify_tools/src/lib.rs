//! A small client for the Shopify Admin REST API, plus the webhook payloads the back-office consumes.
mod api;
mod config;
mod data_objects;
mod error;
mod helpers;

pub use api::{ShopifyApi, StorefrontProducts};
pub use config::ShopifyConfig;
pub use data_objects::{NewShopifyProduct, NewVariant, ProductVariant, ShopifyLineItem, ShopifyOrderWebhook, ShopifyProduct};
pub use error::ShopifyApiError;
pub use helpers::validate_price;
