//! HTTP-level tests. Every route is served by the real middleware stack, with the database and the storefront
//! replaced by mocks.
mod access;
mod api_keys;
mod auth;
mod mocks;
mod webhooks;
