mod acl;
mod authentication;
mod hmac;
mod rate_limit;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use authentication::{AuthenticationMiddlewareFactory, AuthenticationMiddlewareService};
pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService, SHOPIFY_HMAC_HEADER};
pub use rate_limit::{RateLimitMiddlewareFactory, RateLimitMiddlewareService};
