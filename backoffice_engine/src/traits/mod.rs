//! # Storage backend contracts
//!
//! The traits in this module define what a database backend must provide in order to power the back-office engine.
//! The engine APIs (see [`crate::bo_api`]) are generic over these traits, so that the HTTP layer never needs to know
//! which database sits underneath, and so that tests can swap in mocks.
//!
//! * [`AuthManagement`] is the credential store and role table. It backs registration, login, password changes and
//!   every authenticated request.
//! * [`UserManagement`] provides read-only views of user accounts.
//! * [`ProductManagement`] stores the local mirror of products created on the storefront.
//! * [`ApiKeyManagement`] manages per-user API keys.
//! * [`SalesTracking`] applies paid-order sales counts to products.
mod api_key_management;
mod auth_management;
mod product_management;
mod sales_tracking;
mod user_management;

pub use api_key_management::{ApiKeyApiError, ApiKeyManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use product_management::{ProductApiError, ProductManagement};
pub use sales_tracking::{SalesApiError, SalesTracking};
pub use user_management::{UserApiError, UserManagement};
