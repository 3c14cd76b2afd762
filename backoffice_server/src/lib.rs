//! # Back-office server
//! This crate hosts the HTTP API of the shop back-office. It is responsible for:
//! * Registering users, logging them in, and issuing access tokens (HS256 JWTs).
//! * Authenticating bearer tokens, including rejecting tokens that predate a password change, and checking the
//!   caller's role against the capability each route requires.
//! * Creating products on the Shopify storefront and keeping a local mirror of them.
//! * Receiving signed Shopify order webhooks and counting product sales.
//! * Per-client rate limiting and security headers.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/register`, `/api/login`: Account creation and login.
//! * `/api/change-password`, `/api/users`, `/api/my-user`, `/api/apikey`, `/api/products`, `/api/my-products`,
//!   `/api/my-bestsellers`: Authenticated routes. See [routes](routes/index.html).
//! * `/api/webhooks/shopify-sales`: The webhook route for Shopify `orders/paid` events. Requests must carry a valid
//!   HMAC signature.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod shopify_routes;

#[cfg(test)]
mod endpoint_tests;
