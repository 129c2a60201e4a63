// src/error.rs

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use webapp_template_api::ErrorResponse;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    // === Erreurs Repository ===
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Erreurs d'Authentification ===
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email already exists")]
    UserAlreadyExists,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password too weak: {0}")]
    WeakPassword(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Login required")]
    LoginRequired { location: String },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // === Erreurs OAuth ===
    #[error("Social login failed: {0}")]
    OAuthFailed(String),
    #[error("Social application not configured: {0}")]
    OAuthNotConfigured(String),

    // === Erreurs de Hashing/Cryptographie ===
    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),
    #[error("Token generation failed: {0}")]
    TokenGenerationFailed(String),

    // === Erreurs de Validation ===
    #[error("Invalid JSON data")]
    InvalidJson,
    #[error("Validation error: {0}")]
    ValidationError(String),

    // === Erreurs internes ===
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Same behaviour as a login-gated page: send the browser to the login form.
        if let AppError::LoginRequired { location } = &self {
            return (StatusCode::FOUND, [(header::LOCATION, location.clone())]).into_response();
        }

        let (status, error_code, message, internal_detail) = self.get_error_info();

        if let Some(ref detail) = internal_detail {
            tracing::error!(error_code, %status, detail, "Internal server error");
        }

        let body = Json(ErrorResponse::new(error_code, message));

        (status, body).into_response()
    }
}

impl AppError {
    /// Récupère les informations d'erreur formatées pour la réponse HTTP
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            // 302 Found (handled in into_response)
            AppError::LoginRequired { .. } => {
                (StatusCode::FOUND, "LOGIN_REQUIRED", self.to_string(), None)
            }

            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::OAuthNotConfigured(msg) => (
                StatusCode::NOT_FOUND,
                "OAUTH_NOT_CONFIGURED",
                msg.clone(),
                None,
            ),

            // 409 Conflict
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone(), None)
            }
            AppError::UserAlreadyExists => (
                StatusCode::CONFLICT,
                "USER_EXISTS",
                "A user is already registered with this email address".to_string(),
                None,
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                "A user with that username already exists".to_string(),
                None,
            ),

            // 401 Unauthorized
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "The username and/or password you specified are not correct".to_string(),
                None,
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }

            // 400 Bad Request
            AppError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                "INVALID_JSON",
                "Invalid JSON data".to_string(),
                None,
            ),
            AppError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                "Enter a valid email address".to_string(),
                None,
            ),
            AppError::WeakPassword(msg) => {
                (StatusCode::BAD_REQUEST, "WEAK_PASSWORD", msg.clone(), None)
            }
            AppError::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                "PASSWORD_MISMATCH",
                "You must type the same password each time".to_string(),
                None,
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::OAuthFailed(msg) => (
                StatusCode::BAD_REQUEST,
                "OAUTH_FAILED",
                "Social login failed".to_string(),
                Some(msg.clone()),
            ),

            // 500 Internal Server Error
            AppError::PasswordHashingFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "HASHING_ERROR",
                "An error occurred while processing your request".to_string(),
                Some(msg.clone()),
            ),
            AppError::TokenGenerationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ERROR",
                "An error occurred while generating token".to_string(),
                Some(msg.clone()),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An error occurred with the database".to_string(),
                Some(msg.clone()),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    // === Constructeurs helpers ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Duplicate(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn oauth_failed(msg: impl Into<String>) -> Self {
        AppError::OAuthFailed(msg.into())
    }

    pub fn hashing_failed(msg: impl Into<String>) -> Self {
        AppError::PasswordHashingFailed(msg.into())
    }

    pub fn token_generation_failed(msg: impl Into<String>) -> Self {
        AppError::TokenGenerationFailed(msg.into())
    }

    /// Erreurs qu'un formulaire peut afficher à l'utilisateur.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials
                | AppError::UserAlreadyExists
                | AppError::UsernameTaken
                | AppError::InvalidEmail
                | AppError::WeakPassword(_)
                | AppError::PasswordMismatch
                | AppError::ValidationError(_)
        )
    }

    /// Message public (jamais le détail interne)
    pub fn public_message(&self) -> String {
        self.get_error_info().2
    }

    /// Retourne le code de statut HTTP
    pub fn status_code(&self) -> StatusCode {
        self.get_error_info().0
    }
}

// === Conversions automatiques depuis d'autres types d'erreurs ===

// Depuis RepositoryError
impl From<crate::db::error::RepositoryError> for AppError {
    fn from(err: crate::db::error::RepositoryError) -> Self {
        use crate::db::error::RepositoryError;

        match err {
            RepositoryError::NotFound(msg) => AppError::not_found(msg),
            RepositoryError::UniqueViolation(msg) => AppError::duplicate(msg),
            RepositoryError::PoolError(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseError(msg) => AppError::database(msg),
        }
    }
}

// Depuis diesel (transactions)
impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        AppError::from(crate::db::error::RepositoryError::from(err))
    }
}

// Depuis JwtError
impl From<crate::auth::jwt::JwtError> for AppError {
    fn from(err: crate::auth::jwt::JwtError) -> Self {
        match err {
            crate::auth::jwt::JwtError::GenerationFailed(e) => {
                AppError::token_generation_failed(e.to_string())
            }
            crate::auth::jwt::JwtError::VerificationFailed(_) => {
                AppError::unauthorized("Invalid session")
            }
        }
    }
}

// Depuis PasswordError
impl From<crate::auth::password::PasswordError> for AppError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        AppError::hashing_failed(err.to_string())
    }
}

// Depuis OAuthError
impl From<crate::auth::oauth::OAuthError> for AppError {
    fn from(err: crate::auth::oauth::OAuthError) -> Self {
        AppError::oauth_failed(err.to_string())
    }
}

// Depuis serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(_: serde_json::Error) -> Self {
        AppError::InvalidJson
    }
}
