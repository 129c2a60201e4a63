use serde::{Deserialize, Serialize};

// -------- REQUEST DTOs --------

/// Body of `POST /accounts/login/` (form-encoded).
/// `login` accepts either the username or the email address.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub login: String,
    pub password: String, // Plain text
    #[serde(default)]
    pub next: Option<String>,
}

/// Body of `POST /accounts/signup/` (form-encoded).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password1: String, // Plain text
    pub password2: String, // Plain text
    #[serde(default)]
    pub next: Option<String>,
}

/// Query string accepted by the login and signup pages.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// Query string Google sends back to the OAuth callback.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
