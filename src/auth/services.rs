// src/auth/services.rs

use diesel::{Connection, SqliteConnection};
use webapp_template_api::SignupForm;

use super::jwt::JwtManager;
use super::password::PasswordManager;
use crate::db::models::social_account::NewSocialAccount;
use crate::db::models::user::{NewUser, User};
use crate::db::repositories::social_account_repository::SocialAccountRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::error::AppError;

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

/// Identity returned by a social provider after a successful code exchange.
#[derive(Debug, Clone)]
pub struct SocialIdentity<'a> {
    pub provider: &'a str,
    pub uid: &'a str,
    pub email: Option<&'a str>,
    pub email_verified: bool,
}

pub struct AuthService {
    jwt_manager: JwtManager,
}

impl AuthService {
    pub fn new(jwt_manager: JwtManager) -> Self {
        Self { jwt_manager }
    }

    pub fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Token stored in the session cookie for this account.
    pub fn issue_session(&self, user: &User) -> Result<String, AppError> {
        self.jwt_manager
            .generate_session_token(user.id)
            .map_err(AppError::from)
    }

    /// Resolves a session token to an active account.
    /// Invalid or expired tokens yield `None`: the caller is simply anonymous.
    pub fn user_from_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        let Ok(claims) = self.jwt_manager.verify_token(token) else {
            tracing::debug!("Ignoring invalid session token");
            return Ok(None);
        };

        let user = UserRepository::find_by_id(conn, claims.sub)?;
        Ok(user.filter(|u| u.is_active))
    }

    /// Inscription d'un nouvel utilisateur
    pub fn signup(conn: &mut SqliteConnection, form: &SignupForm) -> Result<User, AppError> {
        let username = form.username.trim();
        let email = form.email.trim();

        Self::validate_username(username)?;

        if !Self::is_valid_email(email) {
            return Err(AppError::InvalidEmail);
        }

        if form.password1 != form.password2 {
            return Err(AppError::PasswordMismatch);
        }
        Self::validate_password(&form.password1)?;

        if UserRepository::find_by_email(conn, email)?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }
        if UserRepository::find_by_username(conn, username)?.is_some() {
            return Err(AppError::UsernameTaken);
        }

        let password_hash = PasswordManager::hash(&form.password1)?;
        let new_user = NewUser::regular(username.to_string(), email.to_string(), Some(password_hash));

        let user = UserRepository::create(conn, &new_user)?;
        tracing::info!(user_id = user.id, "New account registered");
        Ok(user)
    }

    /// Connexion par nom d'utilisateur ou email
    pub fn authenticate(
        conn: &mut SqliteConnection,
        login: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let Some(user) = UserRepository::find_by_login(conn, login)? else {
            return Err(AppError::InvalidCredentials);
        };

        let Some(password_hash) = user.password_hash.as_deref() else {
            // Social-only account
            return Err(AppError::InvalidCredentials);
        };

        if !user.is_active || !PasswordManager::verify(password, password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        UserRepository::update_last_login(conn, user.id)?;
        Ok(user)
    }

    /// Creates an account with both the superuser and staff flags.
    /// Password rules are not applied here.
    pub fn create_superuser(
        conn: &mut SqliteConnection,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let password_hash = PasswordManager::hash(password)?;
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            is_superuser: true,
            is_staff: true,
        };

        UserRepository::create(conn, &new_user).map_err(AppError::from)
    }

    /// Signs in through a provider identity.
    ///
    /// An existing link wins. Otherwise a verified email is attached to the
    /// matching account, and a new account without a local password is
    /// created when nothing matches.
    pub fn sign_in_social(
        conn: &mut SqliteConnection,
        identity: &SocialIdentity<'_>,
    ) -> Result<User, AppError> {
        conn.transaction::<_, AppError, _>(|conn| {
            if let Some(link) =
                SocialAccountRepository::find_by_uid(conn, identity.provider, identity.uid)?
            {
                let user = UserRepository::find_by_id(conn, link.user_id)?
                    .filter(|u| u.is_active)
                    .ok_or(AppError::InvalidCredentials)?;
                UserRepository::update_last_login(conn, user.id)?;
                return Ok(user);
            }

            let email = identity
                .email
                .map(str::trim)
                .filter(|e| Self::is_valid_email(e))
                .ok_or_else(|| AppError::oauth_failed("Provider did not return an email address"))?;

            let user = match UserRepository::find_by_email(conn, email)? {
                Some(existing) if identity.email_verified => existing,
                // Unverified address: do not hand the account over.
                Some(_) => return Err(AppError::UserAlreadyExists),
                None => {
                    let username = Self::available_username(conn, email)?;
                    let user = UserRepository::create(
                        conn,
                        &NewUser::regular(username, email.to_string(), None),
                    )?;
                    tracing::info!(
                        user_id = user.id,
                        provider = identity.provider,
                        "Account created from social login"
                    );
                    user
                }
            };

            SocialAccountRepository::create(
                conn,
                &NewSocialAccount {
                    user_id: user.id,
                    provider: identity.provider,
                    uid: identity.uid,
                    email: Some(email),
                },
            )?;
            UserRepository::update_last_login(conn, user.id)?;

            Ok(user)
        })
    }

    // === Helpers de validation ===

    fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !email.chars().any(char::is_whitespace)
    }

    fn is_username_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
    }

    fn validate_username(username: &str) -> Result<(), AppError> {
        if username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(AppError::validation(format!(
                "Username must be at most {USERNAME_MAX_LEN} characters"
            )));
        }
        if !username.chars().all(Self::is_username_char) {
            return Err(AppError::validation(
                "Username may contain only letters, numbers, and @/./+/-/_ characters",
            ));
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), AppError> {
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AppError::WeakPassword(format!(
                "This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::WeakPassword(
                "This password is entirely numeric".to_string(),
            ));
        }
        Ok(())
    }

    /// Username derived from the email local part, suffixed until free.
    fn available_username(conn: &mut SqliteConnection, email: &str) -> Result<String, AppError> {
        let local = email.split('@').next().unwrap_or_default();
        let mut base: String = local
            .chars()
            .filter(|c| Self::is_username_char(*c))
            .take(USERNAME_MAX_LEN - 6)
            .collect();
        if base.is_empty() {
            base.push_str("user");
        }

        if UserRepository::find_by_username(conn, &base)?.is_none() {
            return Ok(base);
        }
        for suffix in 1..1000 {
            let candidate = format!("{base}{suffix}");
            if UserRepository::find_by_username(conn, &candidate)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(AppError::duplicate(format!("No free username for {base}")))
    }
}
