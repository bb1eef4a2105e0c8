use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::ProfileUpdateResponse;
use crate::services::email_service::Mailer;
use crate::services::profile_service::{ProfileImage, ProfileService, ProfileUpdate};

/// Formulaire multipart envoyé par la page settings (noms de champs en PascalCase)
#[derive(Debug, MultipartForm)]
pub struct SettingsForm {
    #[multipart(rename = "Username")]
    pub username: Option<Text<String>>,
    #[multipart(rename = "Email")]
    pub email: Option<Text<String>>,
    #[multipart(rename = "CurrentPassword")]
    pub current_password: Option<Text<String>>,
    #[multipart(rename = "NewPassword")]
    pub new_password: Option<Text<String>>,
    #[multipart(rename = "ConfirmNewPassword")]
    pub confirm_new_password: Option<Text<String>>,
    // La limite de 5 MB est vérifiée par le service, ici on coupe seulement les gros envois
    #[multipart(rename = "ProfileImage", limit = "8 MiB")]
    pub profile_image: Option<TempFile>,
}

/// PUT /settings - Modifier son profil (PROTÉGÉE)
#[put("")]
pub async fn update_settings(
    auth_user: AuthUser,
    MultipartForm(form): MultipartForm<SettingsForm>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
) -> Result<HttpResponse, AppError> {
    // Le fichier temporaire reste en vie jusqu'à la fin du handler
    let image = form.profile_image.as_ref().map(|file| ProfileImage {
        temp_path: file.file.path().to_path_buf(),
        file_name: file.file_name.clone(),
        size: file.size,
    });

    let update = ProfileUpdate {
        username: form.username.map(Text::into_inner),
        email: form.email.map(Text::into_inner),
        current_password: form.current_password.map(Text::into_inner),
        new_password: form.new_password.map(Text::into_inner),
        confirm_new_password: form.confirm_new_password.map(Text::into_inner),
        image,
    };

    let (user, token) = ProfileService::update_profile(
        db.get_ref(),
        config.get_ref(),
        mailer.get_ref(),
        auth_user.user_id,
        update,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ProfileUpdateResponse {
        message: "Profile updated successfully.".to_string(),
        token,
        avatar_url: user.profile_image_url,
        username: user.username,
    }))
}

pub fn settings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/settings").service(update_settings));
}
