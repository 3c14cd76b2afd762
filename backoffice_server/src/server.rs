use std::{sync::Arc, time::Duration};

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::{DefaultHeaders, Logger},
    web,
    App,
    HttpRequest,
    HttpServer,
};
use backoffice_engine::{ApiKeyApi, AuthApi, ProductApi, SalesApi, SqliteDatabase, UserApi};
use log::*;
use shopify_tools::ShopifyApi;

use crate::{
    auth::TokenCodec,
    config::ServerConfig,
    errors::ServerError,
    middleware::{HmacMiddlewareFactory, RateLimitMiddlewareFactory, SHOPIFY_HMAC_HEADER},
    rate_limit::{FixedWindowRateLimiter, RateLimiter},
    routes::{
        health,
        ApiKeysRoute,
        ChangePasswordRoute,
        CreateApiKeyRoute,
        CreateProductRoute,
        DeleteApiKeyRoute,
        LoginRoute,
        MyBestsellersRoute,
        MyProductsRoute,
        MyUserRoute,
        ProductsRoute,
        RegisterRoute,
        UsersRoute,
    },
    shopify_routes::ShopifySalesWebhookRoute,
};

/// Sent with every response.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("Permissions-Policy", "camera=(), microphone=(), geolocation=()"),
];

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    // Refuse to start without a signing secret
    let codec = TokenCodec::new(&config.auth)?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    info!("🗃️ Database at {} is ready", db.url());
    let storefront = ShopifyApi::new(config.shopify_config.shopify_api_config())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowRateLimiter::from_config(&config.rate_limit));
    let srv = create_server_instance(config, db, codec, storefront, limiter)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    codec: TokenCodec,
    storefront: ShopifyApi,
    limiter: Arc<dyn RateLimiter>,
) -> Result<Server, ServerError> {
    let bind_to = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let app = App::new()
            .wrap(security_headers())
            .wrap(Logger::new("%t (%D ms) %s %a %r \"%{User-Agent}i\"").log_target("bo::access_log"));
        app.configure(|cfg| {
            configure_app(cfg, &config, db.clone(), codec.clone(), storefront.clone(), Arc::clone(&limiter))
        })
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind_to)?
    .run();
    Ok(srv)
}

pub fn security_headers() -> DefaultHeaders {
    SECURITY_HEADERS.iter().fold(DefaultHeaders::new(), |headers, &(name, value)| headers.add((name, value)))
}

/// Registers the application state and every route. Shared by the server and the HTTP tests.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    config: &ServerConfig,
    db: SqliteDatabase,
    codec: TokenCodec,
    storefront: ShopifyApi,
    limiter: Arc<dyn RateLimiter>,
) {
    let auth_api = AuthApi::new(db.clone()).with_login_throttle(config.login_throttle);
    cfg.app_data(web::Data::new(auth_api))
        .app_data(web::Data::new(UserApi::new(db.clone())))
        .app_data(web::Data::new(ProductApi::new(db.clone())))
        .app_data(web::Data::new(ApiKeyApi::new(db.clone())))
        .app_data(web::Data::new(SalesApi::new(db)))
        .app_data(web::Data::new(codec))
        .app_data(web::Data::new(storefront))
        .app_data(json_config());
    // Webhooks are registered ahead of the /api scope and are not rate limited
    let shopify = &config.shopify_config;
    let webhook_scope = web::scope("/api/webhooks")
        .wrap(HmacMiddlewareFactory::new(SHOPIFY_HMAC_HEADER, shopify.hmac_secret.clone(), shopify.hmac_checks))
        .service(ShopifySalesWebhookRoute::<SqliteDatabase>::new());
    let api_scope = web::scope("/api")
        .wrap(RateLimitMiddlewareFactory::new(limiter, config.server_options()))
        .service(RegisterRoute::<SqliteDatabase>::new())
        .service(LoginRoute::<SqliteDatabase>::new())
        .service(ChangePasswordRoute::<SqliteDatabase>::new())
        .service(UsersRoute::<SqliteDatabase>::new())
        .service(MyUserRoute::<SqliteDatabase>::new())
        .service(ApiKeysRoute::<SqliteDatabase>::new())
        .service(CreateApiKeyRoute::<SqliteDatabase>::new())
        .service(DeleteApiKeyRoute::<SqliteDatabase>::new())
        .service(ProductsRoute::<SqliteDatabase>::new())
        .service(CreateProductRoute::<SqliteDatabase, ShopifyApi>::new())
        .service(MyProductsRoute::<SqliteDatabase>::new())
        .service(MyBestsellersRoute::<SqliteDatabase>::new());
    cfg.service(health).service(webhook_scope).service(api_scope);
}

/// Malformed JSON bodies are reported in the same `{"error": ...}` shape as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejected request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}
