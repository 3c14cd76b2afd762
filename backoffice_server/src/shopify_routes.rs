//----------------------------------------------   Shopify  ----------------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use backoffice_engine::{
    db_types::{SalesLineItem, SalesOrder, SalesUpdate},
    traits::{ProductManagement, SalesTracking},
    ProductApi,
    SalesApi,
};
use log::*;
use shopify_tools::{validate_price, ShopifyOrderWebhook, StorefrontProducts};

use crate::{
    data_objects::{CreatedProduct, NewProductRequest, SalesWebhookResponse},
    errors::ServerError,
    route,
};

pub const SHOPIFY_WEBHOOK_ID_HEADER: &str = "X-Shopify-Webhook-Id";

route!(shopify_sales_webhook => Post "/shopify-sales" impl SalesTracking);
pub async fn shopify_sales_webhook<B: SalesTracking>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<SalesApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("🛍️️ Received sales webhook request: {}", req.uri());
    let order = serde_json::from_slice::<ShopifyOrderWebhook>(body.as_ref()).map_err(|e| {
        warn!("🛍️️ Could not parse sales webhook payload. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    let delivery_id = req
        .headers()
        .get(SHOPIFY_WEBHOOK_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let result = process_sales_webhook(order, delivery_id, api.get_ref()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Applies a paid order to the sales counts.
///
/// Line items without a product id (custom items) and items whose product is not mirrored locally are reported as
/// failed. A delivery that has been processed before is acknowledged without touching any counter, so that Shopify
/// stops retrying it.
pub async fn process_sales_webhook<B: SalesTracking>(
    order: ShopifyOrderWebhook,
    delivery_id: Option<String>,
    api: &SalesApi<B>,
) -> Result<SalesWebhookResponse, ServerError> {
    if order.line_items.is_empty() {
        info!("🛍️️ Order {} has no line items", order.id);
        return Err(ServerError::InvalidInput("The order contains no products".into()));
    }
    let (sales_order, skipped) = sales_order_from_webhook(&order, delivery_id);
    if skipped > 0 {
        debug!("🛍️️ Order {}: {skipped} line items have no product id", order.id);
    }
    if sales_order.line_items.is_empty() {
        return Ok(SalesWebhookResponse {
            message: "Webhook processed".into(),
            order_id: order.id,
            products_updated: 0,
            products_failed: skipped,
        });
    }
    let response = match api.record_sales(&sales_order).await? {
        SalesUpdate::Applied { products_updated, products_not_found } => {
            if products_not_found > 0 {
                warn!("🛍️️ Order {}: {products_not_found} products are not known to the back-office", order.id);
            }
            SalesWebhookResponse {
                message: "Webhook processed".into(),
                order_id: order.id,
                products_updated,
                products_failed: products_not_found + skipped,
            }
        },
        SalesUpdate::DuplicateDelivery => {
            info!("🛍️️ Order {} was delivered before. Ignoring the repeat.", order.id);
            SalesWebhookResponse {
                message: "Webhook already processed".into(),
                order_id: order.id,
                products_updated: 0,
                products_failed: 0,
            }
        },
    };
    Ok(response)
}

/// Converts the webhook payload into a [`SalesOrder`]. Also returns the number of line items that were dropped
/// because they do not refer to a product.
pub fn sales_order_from_webhook(order: &ShopifyOrderWebhook, delivery_id: Option<String>) -> (SalesOrder, usize) {
    let line_items = order
        .line_items
        .iter()
        .filter_map(|item| item.product_id.map(|product_id| SalesLineItem { product_id, quantity: item.quantity }))
        .collect::<Vec<_>>();
    let skipped = order.line_items.len() - line_items.len();
    (SalesOrder { order_id: order.id, delivery_id, line_items }, skipped)
}

/// Creates the product on the storefront and records the local mirror, owned by `user_id`.
///
/// The title and price are checked before anything is sent to Shopify.
pub async fn publish_product<A, S>(
    user_id: i64,
    request: NewProductRequest,
    api: &ProductApi<A>,
    storefront: &S,
) -> Result<CreatedProduct, ServerError>
where
    A: ProductManagement,
    S: StorefrontProducts,
{
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ServerError::InvalidInput("Product title is required".into()));
    }
    if request.price.trim().is_empty() {
        return Err(ServerError::InvalidInput("Product price is required".into()));
    }
    let price = validate_price(&request.price)?;
    let shopify_product = storefront.create_product(title, &price).await?;
    let product = api.register_product(shopify_product.id, user_id).await?;
    info!("🛍️️ User #{user_id} published product #{} (Shopify id {})", product.id, product.shopify_id);
    Ok(CreatedProduct {
        id: product.id,
        shopify_id: product.shopify_id.to_string(),
        price: shopify_product.price().map(String::from),
        title: shopify_product.title,
        created_by: product.created_by,
        sales_count: product.sales_count,
        created_at: product.created_at,
    })
}
