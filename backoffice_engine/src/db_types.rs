use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use thiserror::Error;

/// The role that newly registered users receive.
pub const DEFAULT_ROLE_ID: i64 = 2;

//--------------------------------------        User        ---------------------------------------------------------
/// A row of the credential store.
///
/// `last_password_change` doubles as the password *epoch*: every access token carries the epoch that was current
/// when it was issued, and tokens carrying an older epoch are rejected.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
    pub last_password_change: DateTime<Utc>,
    pub last_login_attempt: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The password epoch, in milliseconds since the Unix epoch.
    pub fn password_epoch(&self) -> i64 {
        self.last_password_change.timestamp_millis()
    }

    pub fn identity(&self) -> Identity {
        Identity { user_id: self.id, name: self.name.clone(), email: self.email.clone(), role_id: self.role_id }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary { id: self.id, name: self.name.clone(), email: self.email.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// The public view of a user account. Password material and throttling state are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Identity      ---------------------------------------------------------
/// The identity of an authenticated caller. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
}

/// An [`Identity`] whose role has been resolved and checked against a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedIdentity {
    pub identity: Identity,
    pub role: Role,
}

/// What a verified access token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: i64,
    pub email: String,
    /// Milliseconds since the Unix epoch
    pub password_change_epoch: i64,
}

//--------------------------------------        Role        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub can_post_login: bool,
    pub can_get_my_user: bool,
    pub can_get_users: bool,
    pub can_post_products: bool,
    pub can_manage_api_keys: bool,
    pub can_upload_images: bool,
    pub can_get_bestsellers: bool,
}

impl Role {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::PostLogin => self.can_post_login,
            Capability::GetMyUser => self.can_get_my_user,
            Capability::GetUsers => self.can_get_users,
            Capability::PostProducts => self.can_post_products,
            Capability::ManageApiKeys => self.can_manage_api_keys,
            Capability::UploadImages => self.can_upload_images,
            Capability::GetBestsellers => self.can_get_bestsellers,
        }
    }
}

//--------------------------------------     Capability     ---------------------------------------------------------
/// The closed set of permissions a [`Role`] can grant. Each maps onto exactly one boolean column of the roles table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ManageApiKeys,
    PostProducts,
    GetUsers,
    GetBestsellers,
    PostLogin,
    UploadImages,
    GetMyUser,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::ManageApiKeys,
        Capability::PostProducts,
        Capability::GetUsers,
        Capability::GetBestsellers,
        Capability::PostLogin,
        Capability::UploadImages,
        Capability::GetMyUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageApiKeys => "manage-api-keys",
            Capability::PostProducts => "post-products",
            Capability::GetUsers => "get-users",
            Capability::GetBestsellers => "get-bestsellers",
            Capability::PostLogin => "post-login",
            Capability::UploadImages => "upload-images",
            Capability::GetMyUser => "get-my-user",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown capability: {0}")]
pub struct ConversionError(String);

impl FromStr for Capability {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL.into_iter().find(|c| c.as_str() == s).ok_or_else(|| ConversionError(s.to_string()))
    }
}

//--------------------------------------      Product       ---------------------------------------------------------
/// The local mirror of a product that was created on the Shopify storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(with = "id_as_string")]
    pub shopify_id: i64,
    pub created_by: i64,
    pub sales_count: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub shopify_id: i64,
    pub created_by: i64,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new(shopify_id: i64, created_by: i64) -> Self {
        Self { shopify_id, created_by, image_url: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCreator {
    pub id: i64,
    #[serde(with = "id_as_string")]
    pub shopify_id: i64,
    pub created_by: i64,
    pub sales_count: i64,
    pub created_at: DateTime<Utc>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
}

/// Shopify ids are 64-bit and overflow JavaScript numbers, so they are written to JSON as strings. Both forms are
/// accepted when reading.
mod id_as_string {
    use super::*;

    pub fn serialize<S: Serializer>(id: &i64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Id {
            Number(i64),
            Text(String),
        }
        match Id::deserialize(d)? {
            Id::Number(n) => Ok(n),
            Id::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

//--------------------------------------       ApiKey       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ApiKey {
    pub id: i64,
    pub name: String,
    pub key: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An API key as it is listed back to its owner. The key material itself is only ever shown once, on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    pub user_id: i64,
    pub name: String,
    pub key: String,
}

//--------------------------------------       Sales        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesLineItem {
    /// The Shopify product id
    pub product_id: i64,
    pub quantity: i64,
}

/// A paid order, as far as sales counting is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesOrder {
    pub order_id: i64,
    /// The webhook delivery id. Deliveries that have been seen before are not counted again.
    pub delivery_id: Option<String>,
    pub line_items: Vec<SalesLineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesUpdate {
    Applied { products_updated: usize, products_not_found: usize },
    DuplicateDelivery,
}
