use crate::ShopifyApiError;

/// Shopify expresses prices as decimal strings. Accepts any finite, non-negative number and returns it trimmed, in
/// the form that will be sent to Shopify.
pub fn validate_price(price: &str) -> Result<String, ShopifyApiError> {
    let price = price.trim();
    let value = price.parse::<f64>().map_err(|e| ShopifyApiError::InvalidPrice(format!("{price}. {e}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ShopifyApiError::InvalidPrice(format!("{price} is not a non-negative number")));
    }
    Ok(price.to_string())
}
