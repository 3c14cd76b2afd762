use std::{fmt::Debug, time::Duration};

use bo_common::EmailAddress;
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{AuthorizedIdentity, Capability, Identity, NewUser, Role, TokenSubject, User, DEFAULT_ROLE_ID},
    helpers::{spawn_hash_password, spawn_verify_password, validate_display_name, validate_password, PasswordError},
    traits::{AuthApiError, AuthManagement},
};

pub const DEFAULT_LOGIN_THROTTLE: Duration = Duration::from_secs(5);

/// `AuthApi` owns the rules around credentials: who may register, who may log in and how often, how passwords
/// change, and whether the bearer of a verified token is still who the token says they are.
///
/// Token encoding and signing live in the server. This API only ever sees the already-verified [`TokenSubject`].
#[derive(Clone)]
pub struct AuthApi<B> {
    db: B,
    login_throttle: Duration,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, login_throttle: DEFAULT_LOGIN_THROTTLE }
    }

    /// Sets the minimum interval between two login attempts for the same account.
    pub fn with_login_throttle(mut self, throttle: Duration) -> Self {
        self.login_throttle = throttle;
        self
    }

    pub fn login_throttle(&self) -> Duration {
        self.login_throttle
    }

    /// Whole seconds (rounded up) until another login attempt is allowed, if the last attempt was too recent.
    fn remaining_throttle(&self, last_attempt: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<u64> {
        let last_attempt = last_attempt?;
        let elapsed = (now - last_attempt).to_std().unwrap_or(Duration::ZERO);
        if elapsed >= self.login_throttle {
            return None;
        }
        let remaining = (self.login_throttle - elapsed).as_millis();
        Some(u64::try_from(remaining.div_ceil(1000)).unwrap_or(u64::MAX))
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    /// Creates a new account with the default role.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthApiError> {
        let name = validate_display_name(name).map_err(AuthApiError::InvalidInput)?;
        let email = EmailAddress::parse(email).map_err(|e| AuthApiError::InvalidInput(e.to_string()))?;
        validate_password(password).map_err(AuthApiError::InvalidInput)?;
        let password_hash =
            spawn_hash_password(password).await.map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?;
        let new_user = NewUser {
            name,
            email: email.to_string(),
            password_hash,
            role_id: DEFAULT_ROLE_ID,
            created_at: Utc::now(),
        };
        let user = self.db.insert_user(new_user).await?;
        info!("🔐️ New user #{} registered", user.id);
        Ok(user)
    }

    /// Checks a user's credentials.
    ///
    /// Unknown emails and wrong passwords produce the same error. Every attempt against a known account is recorded,
    /// and attempts that follow the previous one too closely are refused before the password is even checked.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthApiError> {
        let email = EmailAddress::parse(email).map_err(|e| AuthApiError::InvalidInput(e.to_string()))?;
        validate_password(password).map_err(AuthApiError::InvalidInput)?;
        let user = self.db.fetch_user_by_email(email.as_str()).await?.ok_or_else(|| {
            debug!("🔐️ Login attempt for unknown email address");
            AuthApiError::InvalidCredentials
        })?;
        let now = Utc::now();
        if let Some(wait) = self.remaining_throttle(user.last_login_attempt, now) {
            debug!("🔐️ Login attempt for user #{} throttled. {wait}s remaining", user.id);
            return Err(AuthApiError::TooManyAttempts(wait));
        }
        self.db.record_login_attempt(user.id, now).await?;
        if !check_password(password, &user).await? {
            debug!("🔐️ Wrong password supplied for user #{}", user.id);
            return Err(AuthApiError::InvalidCredentials);
        }
        let role = self.role_for(&user.identity()).await?;
        if !role.allows(Capability::PostLogin) {
            debug!("🔐️ User #{} has role '{}', which may not log in", user.id, role.name);
            return Err(AuthApiError::PermissionDenied(Capability::PostLogin));
        }
        info!("🔐️ User #{} logged in", user.id);
        Ok(user)
    }

    /// Replaces the user's password after checking the current one.
    ///
    /// The new password epoch is always strictly later than the previous one at millisecond resolution, so every
    /// token issued before this call is rejected afterwards. Returns the updated user, whose epoch should go into the
    /// replacement token.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<User, AuthApiError> {
        if current_password.is_empty() {
            return Err(AuthApiError::InvalidInput("Current password is required".to_string()));
        }
        validate_password(new_password).map_err(AuthApiError::InvalidInput)?;
        let user = self.db.fetch_user_by_id(user_id).await?.ok_or(AuthApiError::UserNotFound)?;
        if !check_password(current_password, &user).await? {
            return Err(AuthApiError::IncorrectCurrentPassword);
        }
        let password_hash =
            spawn_hash_password(new_password).await.map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?;
        let changed_at = next_password_epoch(user.last_password_change, Utc::now());
        self.db.update_password(user.id, &password_hash, changed_at).await?;
        info!("🔐️ User #{} changed their password", user.id);
        Ok(User { password_hash, last_password_change: changed_at, updated_at: changed_at, ..user })
    }

    /// Checks that the subject of an already verified token still exists, and that the token was issued after the
    /// most recent password change.
    pub async fn authenticate(&self, subject: &TokenSubject) -> Result<Identity, AuthApiError> {
        let user = self.db.fetch_user_by_id(subject.user_id).await?.ok_or_else(|| {
            debug!("🔐️ Token refers to user #{}, who does not exist", subject.user_id);
            AuthApiError::UserNotFound
        })?;
        if subject.password_change_epoch < user.password_epoch() {
            debug!("🔐️ Token for user #{} predates the last password change", user.id);
            return Err(AuthApiError::TokenSuperseded);
        }
        Ok(user.identity())
    }

    /// Resolves the identity's role and checks that it grants `capability`.
    pub async fn authorize(
        &self,
        identity: Identity,
        capability: Capability,
    ) -> Result<AuthorizedIdentity, AuthApiError> {
        let role = self.role_for(&identity).await?;
        if !role.allows(capability) {
            debug!("🔐️ User #{} (role '{}') was denied {capability}", identity.user_id, role.name);
            return Err(AuthApiError::PermissionDenied(capability));
        }
        trace!("🔐️ User #{} granted {capability}", identity.user_id);
        Ok(AuthorizedIdentity { identity, role })
    }

    async fn role_for(&self, identity: &Identity) -> Result<Role, AuthApiError> {
        self.db.fetch_role_by_id(identity.role_id).await?.ok_or_else(|| {
            warn!("🔐️ User #{} refers to role {}, which does not exist", identity.user_id, identity.role_id);
            AuthApiError::RoleNotFound
        })
    }
}

async fn check_password(password: &str, user: &User) -> Result<bool, AuthApiError> {
    match spawn_verify_password(password, &user.password_hash).await {
        Ok(valid) => Ok(valid),
        Err(PasswordError::MalformedHash(e)) => {
            error!("🔐️ The stored password hash for user #{} is malformed. {e}", user.id);
            Ok(false)
        },
        Err(e) => Err(AuthApiError::PasswordHashError(e.to_string())),
    }
}

/// The timestamp to store as the new password epoch: now, or one millisecond past the previous epoch if the clock
/// has not moved on far enough.
pub fn next_password_epoch(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + chrono::Duration::milliseconds(1);
    if now.timestamp_millis() >= floor.timestamp_millis() {
        now
    } else {
        floor
    }
}
