//! Small building blocks shared by the back-office crates: redacted secrets, e-mail addresses and environment helpers.
mod email;
mod helpers;
mod secret;

pub use email::{EmailAddress, EmailAddressError};
pub use helpers::{parse_boolean_flag, parse_env_or_default};
pub use secret::Secret;
