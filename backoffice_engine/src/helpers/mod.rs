mod api_keys;
mod password;
mod validation;

pub use api_keys::{generate_api_key, API_KEY_PREFIX};
pub use password::{hash_password, spawn_hash_password, spawn_verify_password, verify_password, PasswordError};
pub use validation::{validate_display_name, validate_password, MIN_PASSWORD_LENGTH};
