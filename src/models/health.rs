use chrono::{DateTime, Utc};
use serde::Serialize;

/// Réponse de GET /api/health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" si la base répond, sinon "degraded"
    pub status: String,
    pub database: String,
    pub time: DateTime<Utc>,
}

impl HealthResponse {
    pub fn from_ping(database_up: bool) -> Self {
        Self {
            status: if database_up { "ok" } else { "degraded" }.to_string(),
            database: if database_up { "up" } else { "down" }.to_string(),
            time: Utc::now(),
        }
    }
}
