use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{MatchListQuery, RateCommentRequest};
use crate::services::interaction_service::InteractionService;
use crate::services::match_service::MatchService;

/// GET /matches?status=FINISHED - Liste des matchs (PUBLIC)
#[get("")]
pub async fn list_matches(
    query: web::Query<MatchListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let matches = MatchService::list(db.get_ref(), query.status).await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /matches/{id} - Détail avec notes et commentaires (PUBLIC)
#[get("/{id}")]
pub async fn get_match(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let detail = MatchService::detail(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /matches/{id}/user-actions (PROTÉGÉE)
#[get("/{id}/user-actions")]
pub async fn user_actions(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let actions = MatchService::user_actions(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(actions))
}

/// POST /matches/{id}/rate-comment - Noter et/ou commenter (PROTÉGÉE)
#[post("/{id}/rate-comment")]
pub async fn rate_comment(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RateCommentRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let response = InteractionService::rate_and_comment(
        db.get_ref(),
        auth_user.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /matches/{id}/watch - Marquer comme regardé (PROTÉGÉE)
#[post("/{id}/watch")]
pub async fn watch(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let watched = InteractionService::mark_watched(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Match marked as watched.",
        "watchedAt": watched.watched_at
    })))
}

/// POST /matches/{id}/favorite - Ajouter aux favoris (PROTÉGÉE)
#[post("/{id}/favorite")]
pub async fn favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    InteractionService::add_favorite(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Match added to favorites."
    })))
}

pub fn matches_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/matches")
            .service(list_matches)
            .service(user_actions)
            .service(rate_comment)
            .service(watch)
            .service(favorite)
            .service(get_match),
    );
}
