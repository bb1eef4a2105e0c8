use sea_orm::*;
use tracing::{error, info};
use validator::Validate;

use crate::config::JwtConfig;
use crate::error::AppError;
use crate::models::dto::{LoginRequest, RegisterRequest};
use crate::models::users;
use crate::services::email_service::{verification_link, Mailer};
use crate::utils::{jwt, new_verification_token, now_utc, password};

pub struct AuthService;

impl AuthService {
    /// Crée un compte non vérifié et envoie le lien de vérification.
    /// Un échec d'envoi est loggé sans annuler l'inscription (resend possible)
    pub async fn register(
        db: &DatabaseConnection,
        mailer: &dyn Mailer,
        frontend_base_url: &str,
        request: RegisterRequest,
    ) -> Result<users::Model, AppError> {
        let request = request.normalized();
        request.validate()?;

        let RegisterRequest {
            username,
            email,
            password: plain_password,
        } = request;

        if Self::find_by_username(db, &username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken."));
        }

        if Self::find_by_email(db, &email).await?.is_some() {
            return Err(AppError::conflict("Email already registered."));
        }

        let password_hash = password::hash_password(&plain_password)
            .map_err(AppError::Internal)?;
        let (token, expires_at) = new_verification_token();

        let user = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            email_verified: Set(false),
            verification_token: Set(Some(token)),
            verification_token_expires_at: Set(Some(expires_at)),
            profile_image_url: Set(None),
            created_at: Set(now_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(user_id = user.id, "User registered");
        Self::send_verification(mailer, frontend_base_url, &user).await;

        Ok(user)
    }

    /// Retourne l'utilisateur et un JWT signé
    pub async fn login(
        db: &DatabaseConnection,
        jwt_config: &JwtConfig,
        request: LoginRequest,
    ) -> Result<(users::Model, String), AppError> {
        let user = Self::find_by_username(db, request.username.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found."))?;

        // Vérifié avant le mot de passe : un compte non vérifié est toujours refusé
        if !user.email_verified {
            return Err(AppError::unauthorized("Email not verified."));
        }

        let is_valid = password::verify_password(&request.password, &user.password_hash)
            .map_err(AppError::Internal)?;
        if !is_valid {
            return Err(AppError::unauthorized("Invalid password."));
        }

        let token = jwt::generate_token(jwt_config, user.id, &user.username)
            .map_err(AppError::Internal)?;

        Ok((user, token))
    }

    /// Consomme un token de vérification
    pub async fn verify_email(db: &DatabaseConnection, token: &str) -> Result<(), AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::bad_request("Token is missing."));
        }

        let user = users::Entity::find()
            .filter(users::Column::VerificationToken.eq(token))
            .one(db)
            .await?
            .ok_or_else(|| AppError::bad_request("Invalid token."))?;

        let expired = user
            .verification_token_expires_at
            .is_none_or(|expires_at| expires_at < now_utc());
        if expired {
            return Err(AppError::bad_request("Token expired."));
        }

        let user_id = user.id;
        let mut active_model: users::ActiveModel = user.into();
        active_model.email_verified = Set(true);
        active_model.verification_token = Set(None);
        active_model.verification_token_expires_at = Set(None);
        active_model.update(db).await?;

        info!(user_id, "Email verified");
        Ok(())
    }

    /// Remplace le token précédent par un nouveau et renvoie l'email
    pub async fn resend_verification(
        db: &DatabaseConnection,
        mailer: &dyn Mailer,
        frontend_base_url: &str,
        email: &str,
    ) -> Result<(), AppError> {
        let user = Self::find_by_email(db, &email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found("User not found."))?;

        if user.email_verified {
            return Err(AppError::bad_request("Email already verified."));
        }

        let (token, expires_at) = new_verification_token();
        let mut active_model: users::ActiveModel = user.into();
        active_model.verification_token = Set(Some(token));
        active_model.verification_token_expires_at = Set(Some(expires_at));
        let user = active_model.update(db).await?;

        let token = user.verification_token.clone().unwrap_or_default();
        mailer
            .send_verification_email(
                &user.email,
                &user.username,
                &verification_link(frontend_base_url, &token),
            )
            .await
    }

    pub async fn current_user(db: &DatabaseConnection, user_id: i32) -> Result<users::Model, AppError> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("User not found."))
    }

    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await
    }

    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
    }

    pub async fn send_verification(mailer: &dyn Mailer, frontend_base_url: &str, user: &users::Model) {
        let Some(token) = user.verification_token.as_deref() else {
            return;
        };

        let link = verification_link(frontend_base_url, token);
        if let Err(e) = mailer
            .send_verification_email(&user.email, &user.username, &link)
            .await
        {
            error!(user_id = user.id, "Failed to send verification email: {}", e);
        }
    }
}
