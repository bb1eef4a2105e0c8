use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::utils::jwt;

/// Nom du cookie HTTP-only posé au login
pub const TOKEN_COOKIE: &str = "token";

/// Infos de l'utilisateur authentifié, extraites du JWT
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Header `Authorization: Bearer <token>` en priorité, sinon le cookie `token`
pub fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::internal("Application config not registered"))?;

    let token = extract_token(req)?;

    let claims = jwt::verify_token(&config.jwt, &token).map_err(AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id: claims.uid,
        username: claims.sub,
    })
}

fn extract_token(req: &HttpRequest) -> Result<String, AppError> {
    if let Some(header) = req.headers().get("Authorization") {
        let auth_str = header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AppError::unauthorized(
                "Invalid Authorization format (expected: Bearer <token>)",
            )),
        };
    }

    match req.cookie(TOKEN_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => Ok(cookie.value().to_string()),
        _ => Err(AppError::unauthorized("Missing Authorization header")),
    }
}
