use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use backoffice_engine::{AuthApiError, ApiKeyApiError, ProductApiError, SalesApiError, UserApiError};
use log::error;
use shopify_tools::ShopifyApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not issue access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error("The storefront request failed. {0}")]
    StorefrontError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::IncorrectPassword => StatusCode::UNAUTHORIZED,
                AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
                AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::StorefrontError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Internal details stay in the log. Clients get a generic message.
        let message = if status.is_server_error() {
            error!("💻️ {self}");
            match self {
                Self::StorefrontError(_) => "The storefront could not complete the request.".to_string(),
                _ => "An internal server error occurred.".to_string(),
            }
        } else {
            self.to_string()
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Covers missing, malformed, expired and superseded tokens, as well as tokens for unknown users. The reason is
    /// only ever logged.
    #[error("Invalid or expired access token.")]
    Unauthenticated,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("The current password is incorrect.")]
    IncorrectPassword,
    #[error("Insufficient Permissions. {0}")]
    PermissionDenied(String),
    #[error("Invalid webhook signature.")]
    InvalidSignature,
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::PasswordHashError(e) => Self::BackendError(format!("Password hashing error: {e}")),
            AuthApiError::InvalidInput(s) => Self::InvalidInput(s),
            AuthApiError::EmailAlreadyRegistered => Self::Conflict(e.to_string()),
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::IncorrectCurrentPassword => Self::AuthenticationError(AuthError::IncorrectPassword),
            AuthApiError::TooManyAttempts(_) => Self::TooManyRequests(e.to_string()),
            AuthApiError::UserNotFound | AuthApiError::TokenSuperseded => {
                Self::AuthenticationError(AuthError::Unauthenticated)
            },
            AuthApiError::RoleNotFound => Self::AuthenticationError(AuthError::PermissionDenied("Role not found".into())),
            AuthApiError::PermissionDenied(c) => {
                Self::AuthenticationError(AuthError::PermissionDenied(format!("Missing capability '{c}'")))
            },
        }
    }
}

impl From<UserApiError> for ServerError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            UserApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<ProductApiError> for ServerError {
    fn from(e: ProductApiError) -> Self {
        match e {
            ProductApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ProductApiError::ProductAlreadyExists(_) => Self::Conflict(e.to_string()),
            ProductApiError::InvalidInput(s) => Self::InvalidInput(s),
        }
    }
}

impl From<ApiKeyApiError> for ServerError {
    fn from(e: ApiKeyApiError) -> Self {
        match e {
            ApiKeyApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ApiKeyApiError::InvalidInput(s) => Self::InvalidInput(s),
            ApiKeyApiError::DuplicateName(_) => Self::InvalidInput(e.to_string()),
            ApiKeyApiError::KeyNotFound => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<SalesApiError> for ServerError {
    fn from(e: SalesApiError) -> Self {
        match e {
            SalesApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            SalesApiError::NoLineItems(_) | SalesApiError::InvalidQuantity { .. } => Self::InvalidInput(e.to_string()),
        }
    }
}

impl From<ShopifyApiError> for ServerError {
    fn from(e: ShopifyApiError) -> Self {
        match e {
            ShopifyApiError::InvalidPrice(_) => Self::InvalidInput(e.to_string()),
            _ => Self::StorefrontError(e.to_string()),
        }
    }
}
