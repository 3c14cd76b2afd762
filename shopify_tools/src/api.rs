use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::ShopifyConfig,
    data_objects::{NewShopifyProduct, ShopifyProduct},
    helpers::validate_price,
    ShopifyApiError,
};

/// Product operations on the storefront. [`ShopifyApi`] is the live implementation.
#[allow(async_fn_in_trait)]
pub trait StorefrontProducts {
    async fn create_product(&self, title: &str, price: &str) -> Result<ShopifyProduct, ShopifyApiError>;
}

#[derive(Clone)]
pub struct ShopifyApi {
    config: ShopifyConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for ShopifyApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShopifyApi ({})", self.config.shop)
    }
}

impl ShopifyApi {
    pub fn new(config: ShopifyConfig) -> Result<Self, ShopifyApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.admin_access_token.reveal().as_str())
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        headers.insert("X-Shopify-Access-Token", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, ShopifyApiError> {
        let url = self.url(path);
        trace!("🛍️️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ShopifyApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🛍️️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ShopifyApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ShopifyApiError::RestResponseError(e.to_string()))?;
            Err(ShopifyApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("https://{}/admin/api/{}{path}", self.config.shop, self.config.api_version)
    }

    pub async fn get_product(&self, product_id: i64) -> Result<ShopifyProduct, ShopifyApiError> {
        #[derive(Deserialize)]
        struct ProductResponse {
            product: ShopifyProduct,
        }
        let path = format!("/products/{product_id}.json");
        debug!("🛍️️ Fetching product #{product_id}");
        let result = self.rest_query::<ProductResponse, ()>(Method::GET, &path, &[], None).await?;
        Ok(result.product)
    }
}

impl StorefrontProducts for ShopifyApi {
    async fn create_product(&self, title: &str, price: &str) -> Result<ShopifyProduct, ShopifyApiError> {
        #[derive(Serialize)]
        struct ProductRequest {
            product: NewShopifyProduct,
        }
        #[derive(Deserialize)]
        struct ProductResponse {
            product: ShopifyProduct,
        }
        let price = validate_price(price)?;
        let body = ProductRequest { product: NewShopifyProduct::new(title.to_string(), price) };
        debug!("🛍️️ Creating product '{title}'");
        let result = self.rest_query::<ProductResponse, _>(Method::POST, "/products.json", &[], Some(body)).await?;
        info!("🛍️️ Created product #{} ('{}')", result.product.id, result.product.title);
        Ok(result.product)
    }
}
