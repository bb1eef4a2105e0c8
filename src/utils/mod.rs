pub mod jwt;
pub mod password;

use chrono::{Duration, NaiveDateTime, Utc};
use uuid::Uuid;

/// Durée de validité d'un token de vérification email
pub const VERIFICATION_TOKEN_HOURS: i64 = 24;

/// Nouveau token de vérification email et sa date d'expiration (UTC)
pub fn new_verification_token() -> (String, NaiveDateTime) {
    let token = Uuid::new_v4().simple().to_string();
    let expires_at = now_utc() + Duration::hours(VERIFICATION_TOKEN_HOURS);
    (token, expires_at)
}

pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}
