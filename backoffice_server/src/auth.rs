//! Access tokens and the request-level authentication and authorization checks.
//!
//! Access tokens are HS256 JWTs. Besides the registered `iat` and `exp` claims they carry the user id, the user's
//! email and the password epoch (the time of the user's last password change, in milliseconds) that was current when
//! the token was issued. Changing a password moves the epoch forward, which retires every token issued before the
//! change without the server having to remember any of them.
use std::{
    fmt::{Debug, Formatter},
    future::{ready, Ready},
    time::Duration,
};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpMessage, HttpRequest};
use backoffice_engine::{
    db_types::{AuthorizedIdentity, Capability, Identity, TokenSubject, User},
    traits::AuthManagement,
    AuthApi,
};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    pub user_id: i64,
    pub email: String,
    /// Milliseconds since the Unix epoch
    pub password_change_epoch: i64,
    /// Seconds since the Unix epoch
    pub iat: i64,
    /// Seconds since the Unix epoch
    pub exp: i64,
}

impl JwtClaims {
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.user_id,
            email: self.email.clone(),
            password_change_epoch: self.password_change_epoch,
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Token is invalid. {0}")]
    Invalid(String),
    #[error("Token has expired")]
    Expired,
    #[error("Could not sign token. {0}")]
    Signing(String),
}

impl From<TokenError> for ServerError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(s) => ServerError::CouldNotSerializeAccessToken(s),
            TokenError::Invalid(_) | TokenError::Expired => ServerError::AuthenticationError(AuthError::Unauthenticated),
        }
    }
}

//--------------------------------------------------  TokenCodec  ------------------------------------------------------
/// Issues and verifies access tokens with a single server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl Debug for TokenCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenCodec (expiry: {}s)", self.expiry.as_secs())
    }
}

impl TokenCodec {
    /// Fails with [`ServerError::ConfigurationError`] if no signing secret has been configured.
    pub fn new(config: &AuthConfig) -> Result<Self, ServerError> {
        if config.jwt_secret.is_blank() {
            return Err(ServerError::ConfigurationError(
                "No JWT signing secret has been configured. Set BO_JWT_SECRET.".into(),
            ));
        }
        let secret = config.jwt_secret.reveal().as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: config.token_expiry,
        })
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// The token lifetime in the short form clients are given, e.g. "1h".
    pub fn expires_in(&self) -> String {
        duration_label(self.expiry)
    }

    pub fn issue(&self, user_id: i64, email: &str, password_change_epoch: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, email, password_change_epoch, Utc::now())
    }

    /// Issues a token for the user's current password epoch.
    pub fn issue_for_user(&self, user: &User) -> Result<String, TokenError> {
        self.issue(user.id, &user.email, user.password_epoch())
    }

    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        password_change_epoch: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let lifetime = i64::try_from(self.expiry.as_secs()).unwrap_or(i64::MAX);
        let claims = JwtClaims {
            user_id,
            email: email.to_string(),
            password_change_epoch,
            iat,
            exp: iat.saturating_add(lifetime),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks the signature and expiry of `token`. There is no leeway on the expiry time.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        decode::<JwtClaims>(token, &self.decoding_key, &validation).map(|data| data.claims).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })
    }
}

fn duration_label(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        s if s >= 3600 && s % 3600 == 0 => format!("{}h", s / 3600),
        s if s >= 60 && s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}

//----------------------------------------------  Request checks  ------------------------------------------------------
/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Establishes who is making the request.
///
/// Missing or malformed headers, bad signatures, expired tokens, tokens for users that no longer exist and tokens
/// that predate the user's last password change all fail with the same [`AuthError::Unauthenticated`]. The actual
/// reason is logged at debug level.
pub async fn authenticate_request<A>(req: &HttpRequest) -> Result<Identity, ServerError>
where A: AuthManagement + 'static {
    let codec = req
        .app_data::<web::Data<TokenCodec>>()
        .ok_or_else(|| ServerError::ConfigurationError("The token codec has not been registered".into()))?;
    let api = req
        .app_data::<web::Data<AuthApi<A>>>()
        .ok_or_else(|| ServerError::ConfigurationError("The auth API has not been registered".into()))?;
    let token = bearer_token(req).ok_or_else(|| {
        debug!("🔐️ Request to {} has no bearer token", req.path());
        AuthError::Unauthenticated
    })?;
    let claims = codec.verify(token).map_err(|e| {
        debug!("🔐️ Rejected access token for {}. {e}", req.path());
        AuthError::Unauthenticated
    })?;
    let identity = api.authenticate(&claims.subject()).await?;
    trace!("🔐️ Request to {} authenticated as user #{}", req.path(), identity.user_id);
    Ok(identity)
}

/// Establishes who is making the request, and checks that their role grants `capability`.
///
/// An identity that has already been placed in the request extensions is reused.
pub async fn authorize_request<A>(req: &HttpRequest, capability: Capability) -> Result<AuthorizedIdentity, ServerError>
where A: AuthManagement + 'static {
    let known = req.extensions().get::<Identity>().cloned();
    let identity = match known {
        Some(identity) => identity,
        None => authenticate_request::<A>(req).await?,
    };
    let api = req
        .app_data::<web::Data<AuthApi<A>>>()
        .ok_or_else(|| ServerError::ConfigurationError("The auth API has not been registered".into()))?;
    let authorized = api.authorize(identity, capability).await?;
    Ok(authorized)
}

//------------------------------------------------  Extractors  --------------------------------------------------------
/// The caller's identity, as placed in the request by the authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();
        ready(identity.map(AuthenticatedUser).ok_or_else(|| {
            warn!("🔐️ No identity found for {}. Is the route missing its authentication middleware?", req.path());
            ServerError::AuthenticationError(AuthError::Unauthenticated)
        }))
    }
}

/// The caller's identity and role, as placed in the request by the ACL middleware.
#[derive(Debug, Clone)]
pub struct AuthorizedUser(pub AuthorizedIdentity);

impl FromRequest for AuthorizedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let authorized = req.extensions().get::<AuthorizedIdentity>().cloned();
        ready(authorized.map(AuthorizedUser).ok_or_else(|| {
            warn!("🔐️ No authorized identity found for {}. Is the route missing its ACL middleware?", req.path());
            ServerError::AuthenticationError(AuthError::Unauthenticated)
        }))
    }
}
