use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::MatchIdRequest;
use crate::services::interaction_service::InteractionService;
use crate::services::library_service::LibraryService;

// Toutes les routes /users/me/* sont PROTÉGÉES

/// GET /users/me/reviews
#[get("/me/reviews")]
pub async fn my_reviews(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let reviews = LibraryService::reviews(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// GET /users/me/favorites
#[get("/me/favorites")]
pub async fn my_favorites(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let favorites = LibraryService::favorites(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

/// GET /users/me/favorites/{matchId}
#[get("/me/favorites/{match_id}")]
pub async fn is_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let has_favorited = InteractionService::is_favorite(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "hasFavorited": has_favorited })))
}

/// POST /users/me/favorite/toggle - body { matchId }
#[post("/me/favorite/toggle")]
pub async fn toggle_favorite(
    auth_user: AuthUser,
    body: web::Json<MatchIdRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let favorited = InteractionService::toggle_favorite(db.get_ref(), auth_user.user_id, body.match_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "favorited": favorited })))
}

/// GET /users/me/diary
#[get("/me/diary")]
pub async fn my_diary(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let diary = LibraryService::diary(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(diary))
}

/// GET /users/me/matches/{matchId}/watched
#[get("/me/matches/{match_id}/watched")]
pub async fn has_watched(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let has_watched = InteractionService::has_watched(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "hasWatched": has_watched })))
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(my_reviews)
            .service(my_favorites)
            .service(is_favorite)
            .service(toggle_favorite)
            .service(my_diary)
            .service(has_watched),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::config::AppConfig;
    use crate::models::matches::MatchStatus;
    use crate::test_support::{favorite_fixture, match_fixture};
    use crate::utils::jwt;

    #[actix_web::test]
    async fn test_toggle_removes_existing_favorite() {
        let config = AppConfig::for_tests();
        let token = jwt::generate_token(&config.jwt, 7, "alice").unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(3, MatchStatus::Finished)]])
            .append_query_results([vec![favorite_fixture(1, 7, 3)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(config))
                .configure(users_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/users/me/favorite/toggle")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({"matchId": 3}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["favorited"], false);
    }
}
