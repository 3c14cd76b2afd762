//! Back-office engine
//!
//! This library contains the storage and business rules of the shop back-office. It knows nothing about HTTP.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need
//!    to access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database. These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@bo_api`]). This provides registration and login, password changes, the
//!    authentication and authorization of token holders, products, API keys and sales counting. Each API is generic
//!    over the storage traits it needs.
//! 3. Helpers for password hashing, API key generation and input validation ([`mod@helpers`]).
pub mod bo_api;
pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

pub use bo_api::{
    api_key_api::ApiKeyApi,
    auth_api::{AuthApi, DEFAULT_LOGIN_THROTTLE},
    product_api::ProductApi,
    sales_api::SalesApi,
    user_api::UserApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    ApiKeyApiError,
    ApiKeyManagement,
    AuthApiError,
    AuthManagement,
    ProductApiError,
    ProductManagement,
    SalesApiError,
    SalesTracking,
    UserApiError,
    UserManagement,
};
