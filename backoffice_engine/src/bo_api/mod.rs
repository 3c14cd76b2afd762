//! # Back-office engine public API
//!
//! The `bo_api` module exposes the programmatic API for the back-office engine.
//! The API is modular, so that clients can pick and choose the functionality they need, and each part can be backed
//! by a different storage backend.
//!
//! * [`auth_api`] handles registration, login, password changes, and the authentication and authorization of
//!   requests that carry an access token.
//! * [`user_api`] provides read access to user profiles.
//! * [`product_api`] stores and queries the local mirror of storefront products.
//! * [`api_key_api`] creates, lists and revokes per-user API keys.
//! * [`sales_api`] applies paid orders to product sales counts.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! ```rust,ignore
//! use backoffice_engine::{SqliteDatabase, UserApi};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements UserManagement
//! let api = UserApi::new(db);
//! let users = api.all_users().await?;
//! ```
pub mod api_key_api;
pub mod auth_api;
pub mod product_api;
pub mod sales_api;
pub mod user_api;
