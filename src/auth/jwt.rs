use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Token verification failed: {0}")]
    VerificationFailed(jsonwebtoken::errors::Error),
}

/// Session payload; `sub` is the account id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i32,
    pub exp: i64,
    pub iat: i64,
}

/// Signs and verifies the session tokens stored in the `sessionid` cookie.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

impl JwtManager {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            expiration_hours,
        }
    }

    /// Génère un token de session avec la durée configurée
    pub fn generate_session_token(&self, user_id: i32) -> Result<String, JwtError> {
        self.generate_token(user_id, self.expiration_hours)
    }

    pub fn expiration_hours(&self) -> i64 {
        self.expiration_hours
    }

    pub fn generate_token(&self, user_id: i32, expires_in_hours: i64) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(expires_in_hours)).timestamp();

        let claims = Claims {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::GenerationFailed)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(JwtError::VerificationFailed)
    }
}
