use anyhow::Result;
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Détecte automatiquement l'environnement
    pub fn detect() -> Self {
        // Méthode 1: Vérifier si on est dans AWS Lambda
        if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
            return Self::Production;
        }

        // Méthode 2: Vérifier la variable APP_ENV
        match env::var("APP_ENV").as_deref() {
            Ok("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

const DEV_SESSION_SECRET: &str = "dev_session_secret_change_in_production";
const DEFAULT_PRODUCTION_SITE_DOMAIN: &str = "django-template-test.onrender.com";
const DEFAULT_PRODUCTION_SITE_NAME: &str = "Django Template Test";

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub session_secret: String,
    pub session_expiration_hours: i64,
    /// Id of the "current site" row.
    pub site_id: i32,
    pub login_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Mounts `/debug/oauth/`. Discloses partial secrets.
    pub debug_routes: bool,
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    /// avec détection automatique de l'environnement
    pub fn from_env() -> Result<Self> {
        let environment = Environment::detect();

        tracing::info!(
            "🌍 Environment detected: {}",
            environment.as_str().to_uppercase()
        );

        // Charger le fichier .env approprié
        load_env_file(&environment);

        let database_url = get_database_url(&environment, |name| env::var(name).ok())?;
        let session_secret = Self::get_session_secret(&environment)?;
        let session_expiration_hours = parse_var(
            "SESSION_EXPIRATION_HOURS",
            env::var("SESSION_EXPIRATION_HOURS").ok(),
            24 * 14,
        );
        let site_id = parse_var("SITE_ID", env::var("SITE_ID").ok(), 1);
        let login_url = env::var("LOGIN_URL").unwrap_or_else(|_| "/accounts/login/".to_string());
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_var("SERVER_PORT", env::var("SERVER_PORT").ok(), 3000);
        let debug_routes = env::var("DEBUG_ROUTES")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(!environment.is_production());

        tracing::info!("✅ Configuration loaded successfully");
        tracing::debug!("   Database: {}", database_url);
        tracing::debug!("   Server: {}:{}", server_host, server_port);
        tracing::debug!("   Site id: {}, debug routes: {}", site_id, debug_routes);

        Ok(Self {
            environment,
            database_url,
            session_secret,
            session_expiration_hours,
            site_id,
            login_url,
            server_host,
            server_port,
            debug_routes,
        })
    }

    /// Récupère SESSION_SECRET avec validation
    fn get_session_secret(environment: &Environment) -> Result<String> {
        let secret = match env::var("SESSION_SECRET") {
            Ok(s) => s,
            Err(_) if environment.is_production() => {
                tracing::error!("❌ SESSION_SECRET not set in production!");
                anyhow::bail!("SESSION_SECRET is required in production");
            }
            Err(_) => {
                tracing::warn!("⚠️  SESSION_SECRET not set, using default (DEVELOPMENT ONLY!)");
                DEV_SESSION_SECRET.to_string()
            }
        };

        // Valider la longueur du secret en production
        if environment.is_production() && secret.len() < 32 {
            anyhow::bail!(
                "SESSION_SECRET must be at least 32 characters in production (current: {})",
                secret.len()
            );
        }

        Ok(secret)
    }

    /// Retourne true si on est en mode production
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Development defaults pointing at the given database.
    #[cfg(test)]
    pub fn for_tests(database_url: &str) -> Self {
        Self {
            environment: Environment::Development,
            database_url: database_url.to_string(),
            session_secret: "test_session_secret".to_string(),
            session_expiration_hours: 1,
            site_id: 1,
            login_url: "/accounts/login/".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            debug_routes: true,
        }
    }
}

/// Settings of the setup commands.
///
/// Unlike [`Config`] it never reads `SESSION_SECRET`: the commands issue no
/// session, so a fresh deploy can be prepared before the secret exists.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub database_url: String,
    pub site_id: i32,
    pub production_site_domain: String,
    pub production_site_name: String,
    pub google_client_id: String,
    pub google_client_secret: String,
}

impl SetupConfig {
    pub fn from_env() -> Result<Self> {
        let environment = Environment::detect();
        load_env_file(&environment);
        Self::from_lookup(&environment, |name| env::var(name).ok())
    }

    fn from_lookup(
        environment: &Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            database_url: get_database_url(environment, &lookup)?,
            site_id: parse_var("SITE_ID", lookup("SITE_ID"), 1),
            production_site_domain: lookup("PRODUCTION_SITE_DOMAIN")
                .unwrap_or_else(|| DEFAULT_PRODUCTION_SITE_DOMAIN.to_string()),
            production_site_name: lookup("PRODUCTION_SITE_NAME")
                .unwrap_or_else(|| DEFAULT_PRODUCTION_SITE_NAME.to_string()),
            google_client_id: lookup("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: lookup("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
        })
    }

    /// Development defaults with the given Google credentials.
    #[cfg(test)]
    pub fn for_tests(google_client_id: &str, google_client_secret: &str) -> Self {
        Self {
            database_url: "unused.sqlite3".to_string(),
            site_id: 1,
            production_site_domain: DEFAULT_PRODUCTION_SITE_DOMAIN.to_string(),
            production_site_name: DEFAULT_PRODUCTION_SITE_NAME.to_string(),
            google_client_id: google_client_id.to_string(),
            google_client_secret: google_client_secret.to_string(),
        }
    }
}

/// Charge le bon fichier .env selon l'environnement
fn load_env_file(environment: &Environment) {
    // En production, les variables sont déjà injectées
    if environment.is_production() {
        tracing::info!("📦 Production mode: using injected environment variables");
        return;
    }

    tracing::info!("📦 Development mode: loading .env file");
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("   Loaded: {}", path.display()),
        Err(e) if e.not_found() => {
            tracing::warn!("   .env file not found, using environment variables");
        }
        Err(e) => tracing::warn!("   Failed to load .env: {}", e),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{} has an invalid value {:?}, using default", name, raw);
            default
        }),
        None => default,
    }
}

/// Récupère DATABASE_URL (fichier SQLite)
fn get_database_url(
    environment: &Environment,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    if environment.is_production() {
        anyhow::bail!(
            "DATABASE_URL must be set in production! \
             Point it at a persistent SQLite file."
        );
    }

    Ok("db.sqlite3".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn environment_as_str() {
        assert_eq!(Environment::Production.as_str(), "production");
        assert_eq!(Environment::Development.as_str(), "development");
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn development_secret_is_used_as_fallback() {
        // SESSION_SECRET is never set by the test suite.
        let secret = Config::get_session_secret(&Environment::Development).unwrap();
        assert_eq!(secret, DEV_SESSION_SECRET);
    }

    #[test]
    fn production_requires_session_secret() {
        assert!(Config::get_session_secret(&Environment::Production).is_err());
    }

    #[test]
    fn parse_var_falls_back_on_missing_or_invalid_value() {
        assert_eq!(parse_var("SERVER_PORT", None, 42_u16), 42);
        assert_eq!(parse_var("SERVER_PORT", Some("abc".to_string()), 42_u16), 42);
        assert_eq!(parse_var("SERVER_PORT", Some("8080".to_string()), 42_u16), 8080);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn setup_config_loads_in_production_without_session_secret() {
        let config = SetupConfig::from_lookup(
            &Environment::Production,
            vars(&[
                ("DATABASE_URL", "/data/db.sqlite3"),
                ("GOOGLE_CLIENT_ID", "client"),
                ("GOOGLE_CLIENT_SECRET", "secret"),
                ("SITE_ID", "2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database_url, "/data/db.sqlite3");
        assert_eq!(config.site_id, 2);
        assert_eq!(config.google_client_id, "client");
        assert_eq!(config.production_site_domain, DEFAULT_PRODUCTION_SITE_DOMAIN);
        assert_eq!(config.production_site_name, DEFAULT_PRODUCTION_SITE_NAME);
    }

    #[test]
    fn setup_config_still_requires_database_url_in_production() {
        let result = SetupConfig::from_lookup(&Environment::Production, vars(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn setup_config_defaults_in_development() {
        let config = SetupConfig::from_lookup(&Environment::Development, vars(&[])).unwrap();

        assert_eq!(config.database_url, "db.sqlite3");
        assert_eq!(config.site_id, 1);
        assert!(config.google_client_id.is_empty());
        assert!(config.google_client_secret.is_empty());
    }
}
