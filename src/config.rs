// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toute la configuration vient des variables d'environnement (.env chargé
//   par dotenv dans main). Les valeurs optionnelles ont un défaut, les
//   obligatoires (DATABASE_URL, JWT_SECRET) font échouer le démarrage.
//
// ============================================================================

use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct FootballDataConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub competition: String,
    /// 0 = pas d'import périodique
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookie_secure: bool,
    pub frontend_base_url: String,
    pub upload_dir: String,
    pub smtp: Option<SmtpConfig>,
    pub football_data: FootballDataConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: load_or("SERVER_HOST", "127.0.0.1"),
            port: parse_or("SERVER_PORT", 8080)?,
            database_url: require("DATABASE_URL")?,
            jwt: JwtConfig {
                secret: require("JWT_SECRET")?,
                issuer: load_or("JWT_ISSUER", "matchboxd"),
                audience: load_or("JWT_AUDIENCE", "matchboxd-frontend"),
                expiry_minutes: parse_or("JWT_EXPIRY_MINUTES", 20)?,
            },
            cookie_secure: parse_or("COOKIE_SECURE", false)?,
            frontend_base_url: load_or("FRONTEND_BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            upload_dir: load_or("UPLOAD_DIR", "wwwroot/uploads"),
            smtp: smtp_from_env()?,
            football_data: FootballDataConfig {
                base_url: load_or("FOOTBALL_DATA_BASE_URL", "https://api.football-data.org/v4")
                    .trim_end_matches('/')
                    .to_string(),
                api_key: optional("FOOTBALL_DATA_API_KEY"),
                competition: load_or("FOOTBALL_DATA_COMPETITION", "2021"),
                poll_interval_secs: parse_or("MATCH_IMPORT_INTERVAL_SECS", 0)?,
            },
        })
    }
}

/// Le SMTP est optionnel : sans SMTP_HOST les emails sont seulement loggés.
fn smtp_from_env() -> Result<Option<SmtpConfig>, ConfigError> {
    let Some(host) = optional("SMTP_HOST") else {
        warn!("SMTP_HOST not set, verification emails will only be logged");
        return Ok(None);
    };

    Ok(Some(SmtpConfig {
        host,
        port: parse_or("SMTP_PORT", 587)?,
        username: require("SMTP_USERNAME")?,
        password: require("SMTP_PASSWORD")?,
        from: require("SMTP_FROM")?,
    }))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn load_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
impl AppConfig {
    /// Configuration utilisée par les tests (pas d'accès à l'environnement)
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "postgres://localhost/test".to_string(),
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                issuer: "matchboxd".to_string(),
                audience: "matchboxd-frontend".to_string(),
                expiry_minutes: 20,
            },
            cookie_secure: false,
            frontend_base_url: "http://localhost:3000".to_string(),
            upload_dir: std::env::temp_dir()
                .join("matchboxd-tests")
                .to_string_lossy()
                .into_owned(),
            smtp: None,
            football_data: FootballDataConfig {
                base_url: "http://localhost:9999".to_string(),
                api_key: None,
                competition: "2021".to_string(),
                poll_interval_secs: 0,
            },
        }
    }
}
