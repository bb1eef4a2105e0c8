use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::MatchIdRequest;
use crate::services::interaction_service::InteractionService;
use crate::services::library_service::LibraryService;

/// GET /watchlist - Matchs à regarder (PROTÉGÉE)
#[get("")]
pub async fn get_watchlist(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let matches = LibraryService::watchlist(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// POST /watchlist/add - body { matchId } (PROTÉGÉE)
#[post("/add")]
pub async fn add(
    auth_user: AuthUser,
    body: web::Json<MatchIdRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    InteractionService::add_to_watchlist(db.get_ref(), auth_user.user_id, body.match_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Match added to watchlist."
    })))
}

/// POST /watchlist/remove - body { matchId } (PROTÉGÉE)
#[post("/remove")]
pub async fn remove(
    auth_user: AuthUser,
    body: web::Json<MatchIdRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    InteractionService::remove_from_watchlist(db.get_ref(), auth_user.user_id, body.match_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Match removed from watchlist."
    })))
}

pub fn watchlist_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/watchlist")
            .service(get_watchlist)
            .service(add)
            .service(remove),
    );
}
