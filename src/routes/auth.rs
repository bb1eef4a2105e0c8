use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::auth::TOKEN_COOKIE;
use crate::middleware::AuthUser;
use crate::models::dto::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, ResendVerificationRequest,
    VerifyEmailRequest,
};
use crate::services::auth_service::AuthService;
use crate::services::email_service::Mailer;

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
) -> Result<HttpResponse, AppError> {
    AuthService::register(db.get_ref(), mailer.get_ref(), &config.frontend_base_url, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Registration successful. Please check your email to verify your account."
    })))
}

/// POST /auth/login - Se connecter (PUBLIC)
/// Le JWT est renvoyé dans le body et dans un cookie HTTP-only
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = AuthService::login(db.get_ref(), &config.jwt, body.into_inner()).await?;

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(config.jwt.expiry_minutes))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        message: "Login successful.".to_string(),
        token,
        username: user.username,
        user_photo: user.profile_image_url,
    }))
}

/// POST /auth/logout - Supprime le cookie (PUBLIC)
#[post("/logout")]
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "message": "Logged out."
    }))
}

/// POST /auth/verify-email - Consommer le token reçu par email (PUBLIC)
#[post("/verify-email")]
pub async fn verify_email(
    body: web::Json<VerifyEmailRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    AuthService::verify_email(db.get_ref(), &body.token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Email verified successfully."
    })))
}

/// POST /auth/resend-verification-email (PUBLIC)
#[post("/resend-verification-email")]
pub async fn resend_verification_email(
    body: web::Json<ResendVerificationRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
) -> Result<HttpResponse, AppError> {
    AuthService::resend_verification(
        db.get_ref(),
        mailer.get_ref(),
        &config.frontend_base_url,
        &body.email,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Verification email sent."
    })))
}

/// GET /auth/me - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/me")]
pub async fn me(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = AuthService::current_user(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(MeResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
        email_verified: user.email_verified,
        profile_image_url: user.profile_image_url,
        created_at: user.created_at,
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(logout)
            .service(verify_email)
            .service(resend_verification_email)
            .service(me),
    );
}
