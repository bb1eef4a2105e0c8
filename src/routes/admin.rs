use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::match_import_service::MatchImportService;

/// POST /admin/matches/import - Import football-data.org à la demande (PROTÉGÉE)
#[post("/import")]
pub async fn import_matches(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
    importer: web::Data<MatchImportService>,
) -> Result<HttpResponse, AppError> {
    info!(user_id = auth_user.user_id, "Manual match import requested");

    let summary = importer.import(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin/matches").service(import_matches));
}
