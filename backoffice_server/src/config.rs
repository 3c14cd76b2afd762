use std::{env, time::Duration};

use backoffice_engine::DEFAULT_LOGIN_THROTTLE;
use bo_common::{parse_boolean_flag, parse_env_or_default, Secret};
use log::*;
use shopify_tools::ShopifyConfig as ShopifyApiConfig;

use crate::errors::ServerError;

const DEFAULT_BO_HOST: &str = "127.0.0.1";
const DEFAULT_BO_PORT: u16 = 8380;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/backoffice.db";
const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(3600);
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    /// The minimum interval between two login attempts for the same account.
    pub login_throttle: Duration,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the `for` field of the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// Shopify storefront configuration
    pub shopify_config: ShopifyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BO_HOST.to_string(),
            port: DEFAULT_BO_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            login_throttle: DEFAULT_LOGIN_THROTTLE,
            use_x_forwarded_for: false,
            use_forwarded: false,
            shopify_config: ShopifyConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BO_HOST").ok().unwrap_or_else(|| DEFAULT_BO_HOST.into());
        let port = env_or_default("BO_PORT", DEFAULT_BO_PORT);
        let database_url = env::var("BO_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ BO_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            error!("🪛️ Could not load the authentication configuration from environment variables. {e}");
            AuthConfig::default()
        });
        let rate_limit = RateLimitConfig::from_env_or_default();
        let login_throttle =
            Duration::from_secs(env_or_default("BO_LOGIN_THROTTLE_SECS", DEFAULT_LOGIN_THROTTLE.as_secs()));
        let use_x_forwarded_for = parse_boolean_flag(env::var("BO_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("BO_USE_FORWARDED").ok(), false);
        let shopify_config = ShopifyConfig::from_env_or_defaults();
        Self {
            host,
            port,
            database_url,
            auth,
            rate_limit,
            login_throttle,
            use_x_forwarded_for,
            use_forwarded,
            shopify_config,
        }
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions { use_x_forwarded_for: self.use_x_forwarded_for, use_forwarded: self.use_forwarded }
    }
}

/// Reads and parses `name`, logging and falling back to `default` if the value is invalid.
fn env_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    let (value, err) = parse_env_or_default(name, default);
    if let Some(e) = err {
        error!("🪛️ {e} Using the default, {default}, instead.");
    }
    value
}

/// The subset of the configuration that request handlers need.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 key used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an access token stays valid after it is issued.
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    /// An unusable configuration: the server refuses to start without a signing secret.
    fn default() -> Self {
        Self { jwt_secret: Secret::default(), token_expiry: DEFAULT_TOKEN_EXPIRY }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: &str, token_expiry: Duration) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.to_string()), token_expiry }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("BO_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [BO_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("BO_JWT_SECRET is empty".into()));
        }
        let expiry_secs = env_or_default("BO_JWT_EXPIRY_SECS", DEFAULT_TOKEN_EXPIRY.as_secs());
        if expiry_secs == 0 {
            return Err(ServerError::ConfigurationError("BO_JWT_EXPIRY_SECS must be positive".into()));
        }
        info!("🪛️ Access tokens expire after {expiry_secs} seconds");
        Ok(Self { jwt_secret: Secret::new(secret), token_expiry: Duration::from_secs(expiry_secs) })
    }
}

//-----------------------------------------------  RateLimitConfig  ----------------------------------------------------
#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
    /// The number of requests a single client may make within one window
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS, window: DEFAULT_RATE_LIMIT_WINDOW }
    }
}

impl RateLimitConfig {
    pub fn from_env_or_default() -> Self {
        let max_requests = env_or_default("BO_RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS);
        let window_secs = env_or_default("BO_RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW.as_secs());
        let window = if window_secs == 0 {
            warn!("🪛️ BO_RATE_LIMIT_WINDOW_SECS must be positive. Using the default.");
            DEFAULT_RATE_LIMIT_WINDOW
        } else {
            Duration::from_secs(window_secs)
        };
        info!("🪛️ Rate limit: {max_requests} requests per {}s per client", window.as_secs());
        Self { max_requests, window }
    }
}

//-----------------------------------------------  ShopifyConfig  ------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct ShopifyConfig {
    /// The url for the shopify storefront to use. e.g. "my-shop.myshopify.com"
    pub shop: String,
    pub api_version: String,
    pub admin_access_token: Secret<String>,
    /// The shared secret Shopify signs webhook payloads with. When blank, every webhook is rejected.
    pub hmac_secret: Secret<String>,
    pub hmac_checks: bool,
}

impl ShopifyConfig {
    pub fn from_env_or_defaults() -> Self {
        let api_config = ShopifyApiConfig::new_from_env_or_default();
        let hmac_secret = env::var("BO_SHOPIFY_HMAC_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ BO_SHOPIFY_HMAC_SECRET is not set. Please set it to the HMAC signing key for your Shopify app. \
                 Until then, all webhook calls will be rejected."
            );
            String::default()
        });
        let hmac_checks = parse_boolean_flag(env::var("BO_SHOPIFY_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🚨️ Shopify webhook HMAC checks are DISABLED. Never run a production server like this. 🚨️");
        }
        Self {
            shop: api_config.shop,
            api_version: api_config.api_version,
            admin_access_token: api_config.admin_access_token,
            hmac_secret: Secret::new(hmac_secret),
            hmac_checks,
        }
    }

    pub fn shopify_api_config(&self) -> ShopifyApiConfig {
        ShopifyApiConfig {
            shop: self.shop.clone(),
            api_version: self.api_version.clone(),
            admin_access_token: self.admin_access_token.clone(),
        }
    }
}
