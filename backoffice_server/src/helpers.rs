use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use bo_common::Secret;
use hmac::{Hmac, Mac};
use log::{debug, trace};
use regex::Regex;
use sha2::Sha256;

use crate::errors::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        // The left-most entry is the client. Proxies append themselves to the right.
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        let re = Regex::new(r#"for=(?P<ip>[^;,]+)"#).ok();
        result = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| re.as_ref().and_then(|re| re.captures(v)))
            .and_then(|caps| caps.name("ip"))
            .map(|m| m.as_str().trim().trim_matches('"'))
            .and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
    })
}

/// The base64-encoded HMAC-SHA256 of `data`, keyed with `secret`. This is the value Shopify sends in the
/// `X-Shopify-Hmac-Sha256` header.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(data);
    Some(base64::encode(mac.finalize().into_bytes()))
}

/// Checks a webhook signature against the raw, unparsed request body.
///
/// A blank secret or a missing or undecodable signature is a failure, as is a mismatch. The comparison is done in
/// constant time.
pub fn verify_webhook_signature(secret: &Secret<String>, body: &[u8], signature: Option<&str>) -> Result<(), AuthError> {
    if secret.is_blank() {
        debug!("🔐️ No webhook secret has been configured. Rejecting the signature.");
        return Err(AuthError::InvalidSignature);
    }
    let signature = signature.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        debug!("🔐️ No webhook signature was provided");
        AuthError::InvalidSignature
    })?;
    let expected = base64::decode(signature).map_err(|e| {
        debug!("🔐️ Webhook signature is not valid base64. {e}");
        AuthError::InvalidSignature
    })?;
    let mut mac = HmacSha256::new_from_slice(secret.reveal().as_bytes()).map_err(|_| AuthError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| {
        debug!("🔐️ Webhook signature does not match the body");
        AuthError::InvalidSignature
    })
}
