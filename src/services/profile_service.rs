use sea_orm::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::dto::{USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH};
use crate::models::users;
use crate::services::auth_service::AuthService;
use crate::services::email_service::Mailer;
use crate::utils::{jwt, new_verification_token, password};

pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Préfixe public des fichiers servis depuis UPLOAD_DIR
pub const UPLOADS_URL_PREFIX: &str = "/uploads";
const PROFILES_DIR: &str = "profiles";

/// Image reçue en multipart, encore dans son fichier temporaire
#[derive(Debug)]
pub struct ProfileImage {
    pub temp_path: PathBuf,
    pub file_name: Option<String>,
    pub size: usize,
}

/// Champs du formulaire settings, tous optionnels
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
    pub image: Option<ProfileImage>,
}

pub struct ProfileService;

impl ProfileService {
    /// Applique les changements demandés et retourne l'utilisateur avec un nouveau JWT.
    /// Toutes les vérifications passent avant la première écriture
    pub async fn update_profile(
        db: &DatabaseConnection,
        config: &AppConfig,
        mailer: &dyn Mailer,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<(users::Model, String), AppError> {
        let user = AuthService::current_user(db, user_id).await?;

        let new_username = match non_blank(update.username) {
            Some(username) if username != user.username => {
                check_username_length(&username)?;
                let taken = AuthService::find_by_username(db, &username)
                    .await?
                    .is_some_and(|other| other.id != user.id);
                if taken {
                    return Err(AppError::bad_request("Username is already taken."));
                }
                Some(username)
            }
            _ => None,
        };

        let new_email = match non_blank(update.email).map(|e| e.to_lowercase()) {
            Some(email) if email != user.email => {
                if !validator::ValidateEmail::validate_email(&email) {
                    return Err(AppError::bad_request("Invalid email address."));
                }
                let taken = AuthService::find_by_email(db, &email)
                    .await?
                    .is_some_and(|other| other.id != user.id);
                if taken {
                    return Err(AppError::bad_request("Email is already taken."));
                }
                Some(email)
            }
            _ => None,
        };

        let new_password_hash = match (
            non_blank(update.current_password),
            non_blank(update.new_password),
        ) {
            (Some(current), Some(new)) => {
                check_password_change(
                    &user.password_hash,
                    &current,
                    &new,
                    update.confirm_new_password.as_deref(),
                )?;
                Some(password::hash_password(&new).map_err(AppError::Internal)?)
            }
            _ => None,
        };

        let image_extension = update
            .image
            .as_ref()
            .map(|image| validate_image(image.file_name.as_deref(), image.size))
            .transpose()?;

        // Écritures
        let stored_image = match (update.image, image_extension) {
            (Some(image), Some(extension)) => {
                Some(store_image(&config.upload_dir, &image.temp_path, extension).await?)
            }
            _ => None,
        };

        let previous_image = user.profile_image_url.clone();
        let email_changed = new_email.is_some();

        let mut active_model: users::ActiveModel = user.into();
        if let Some(username) = new_username {
            active_model.username = Set(username);
        }
        if let Some(email) = new_email {
            let (token, expires_at) = new_verification_token();
            active_model.email = Set(email);
            active_model.email_verified = Set(false);
            active_model.verification_token = Set(Some(token));
            active_model.verification_token_expires_at = Set(Some(expires_at));
        }
        if let Some(hash) = new_password_hash {
            active_model.password_hash = Set(hash);
        }
        if let Some((_, url)) = &stored_image {
            active_model.profile_image_url = Set(Some(url.clone()));
        }

        let updated = match active_model.update(db).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some((path, _)) = &stored_image {
                    remove_file_quietly(path).await;
                }
                return Err(e.into());
            }
        };

        if stored_image.is_some() {
            if let Some(old_path) = previous_image
                .as_deref()
                .and_then(|url| stored_image_path(&config.upload_dir, url))
            {
                remove_file_quietly(&old_path).await;
            }
        }

        if email_changed {
            AuthService::send_verification(mailer, &config.frontend_base_url, &updated).await;
        }

        let token = jwt::generate_token(&config.jwt, updated.id, &updated.username)
            .map_err(AppError::Internal)?;

        info!(user_id = updated.id, email_changed, "Profile updated");
        Ok((updated, token))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Même règle que l'inscription
pub fn check_username_length(username: &str) -> Result<(), AppError> {
    let length = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return Err(AppError::bad_request(format!(
            "Username must be between {} and {} characters.",
            USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
        )));
    }
    Ok(())
}

/// Règles du changement de mot de passe (confirmation facultative)
pub fn check_password_change(
    stored_hash: &str,
    current: &str,
    new: &str,
    confirm: Option<&str>,
) -> Result<(), AppError> {
    if new.chars().count() < password::MIN_PASSWORD_LENGTH {
        return Err(AppError::bad_request(format!(
            "New password must be at least {} characters long.",
            password::MIN_PASSWORD_LENGTH
        )));
    }

    if confirm.is_some_and(|confirm| !confirm.is_empty() && confirm != new) {
        return Err(AppError::bad_request("New password and confirmation do not match."));
    }

    let is_valid = password::verify_password(current, stored_hash).map_err(AppError::Internal)?;
    if !is_valid {
        return Err(AppError::bad_request("Current password is incorrect."));
    }

    Ok(())
}

/// Retourne l'extension (en minuscules) si l'image est acceptée
pub fn validate_image(file_name: Option<&str>, size: usize) -> Result<&'static str, AppError> {
    if size == 0 {
        return Err(AppError::bad_request("Profile image is empty."));
    }
    if size > MAX_PROFILE_IMAGE_BYTES {
        return Err(AppError::bad_request("Profile image must be at most 5 MB."));
    }

    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .find(|allowed| **allowed == extension)
        .copied()
        .ok_or_else(|| AppError::bad_request("Only jpg, jpeg, png and gif images are allowed."))
}

/// `/uploads/profiles/<fichier>` → `<UPLOAD_DIR>/profiles/<fichier>`.
/// Seul le nom de fichier est conservé, rien en dehors du dossier profiles
pub fn stored_image_path(upload_dir: &str, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix(UPLOADS_URL_PREFIX)?.trim_start_matches('/');
    let relative = relative.strip_prefix(PROFILES_DIR)?.trim_start_matches('/');
    let file_name = Path::new(relative).file_name()?;

    if file_name != relative {
        return None;
    }

    Some(Path::new(upload_dir).join(PROFILES_DIR).join(file_name))
}

async fn store_image(
    upload_dir: &str,
    temp_path: &Path,
    extension: &str,
) -> Result<(PathBuf, String), AppError> {
    let dir = Path::new(upload_dir).join(PROFILES_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::internal(format!("Cannot create upload directory: {}", e)))?;

    let file_name = format!("{}.{}", Uuid::new_v4(), extension);
    let destination = dir.join(&file_name);

    tokio::fs::copy(temp_path, &destination)
        .await
        .map_err(|e| AppError::internal(format!("Cannot store profile image: {}", e)))?;

    let url = format!("{}/{}/{}", UPLOADS_URL_PREFIX, PROFILES_DIR, file_name);
    Ok((destination, url))
}

async fn remove_file_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not delete {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::email_service::testing::RecordingMailer;
    use crate::test_support::user_fixture;

    #[test]
    fn test_password_change_rules() {
        let hash = password::hash_password("oldpassword").unwrap();

        assert!(check_password_change(&hash, "oldpassword", "newpassword", Some("newpassword")).is_ok());
        assert!(check_password_change(&hash, "oldpassword", "newpassword", None).is_ok());

        let short = check_password_change(&hash, "oldpassword", "short", None);
        assert!(matches!(short, Err(AppError::BadRequest(_))));

        let mismatch = check_password_change(&hash, "oldpassword", "newpassword", Some("other-one"));
        assert!(matches!(mismatch, Err(AppError::BadRequest(msg)) if msg.contains("do not match")));

        let wrong = check_password_change(&hash, "not-my-password", "newpassword", None);
        assert!(matches!(wrong, Err(AppError::BadRequest(msg)) if msg == "Current password is incorrect."));
    }

    #[test]
    fn test_validate_image() {
        assert_eq!(validate_image(Some("me.PNG"), 1024).unwrap(), "png");
        assert_eq!(validate_image(Some("photo.jpeg"), MAX_PROFILE_IMAGE_BYTES).unwrap(), "jpeg");
        assert!(validate_image(Some("me.bmp"), 1024).is_err());
        assert!(validate_image(Some("no-extension"), 1024).is_err());
        assert!(validate_image(None, 1024).is_err());
        assert!(validate_image(Some("big.gif"), MAX_PROFILE_IMAGE_BYTES + 1).is_err());
        assert!(validate_image(Some("empty.gif"), 0).is_err());
    }

    #[test]
    fn test_stored_image_path() {
        assert_eq!(
            stored_image_path("/srv/uploads", "/uploads/profiles/abc.png"),
            Some(PathBuf::from("/srv/uploads/profiles/abc.png"))
        );
        assert_eq!(stored_image_path("/srv/uploads", "/uploads/profiles/../../etc/passwd"), None);
        assert_eq!(stored_image_path("/srv/uploads", "https://cdn.example.com/a.png"), None);
    }

    #[actix_web::test]
    async fn test_username_taken_by_other_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_fixture(1, "alice", "alice@example.com", true)]])
            .append_query_results([vec![user_fixture(2, "bob", "bob@example.com", true)]])
            .into_connection();
        let mailer = RecordingMailer::default();

        let update = ProfileUpdate {
            username: Some("bob".to_string()),
            ..Default::default()
        };
        let result = ProfileService::update_profile(&db, &AppConfig::for_tests(), &mailer, 1, update).await;

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Username is already taken."));
    }

    #[actix_web::test]
    async fn test_email_change_marks_unverified_and_mails() {
        let current = user_fixture(1, "alice", "alice@example.com", true);
        let mut changed = current.clone();
        changed.email = "new@example.com".to_string();
        changed.email_verified = false;
        changed.verification_token = Some("fresh-token".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current]])
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([vec![changed]])
            .into_connection();
        let mailer = RecordingMailer::default();

        let update = ProfileUpdate {
            email: Some(" New@Example.com ".to_string()),
            ..Default::default()
        };
        let config = AppConfig::for_tests();
        let (user, token) = ProfileService::update_profile(&db, &config, &mailer, 1, update)
            .await
            .unwrap();

        assert!(!user.email_verified);
        assert_eq!(jwt::verify_token(&config.jwt, &token).unwrap().sub, "alice");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "new@example.com");
        assert!(sent[0].2.ends_with("token=fresh-token"));
    }

    #[actix_web::test]
    async fn test_new_username_length_checked() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_fixture(1, "alice", "alice@example.com", true)]])
            .into_connection();
        let mailer = RecordingMailer::default();

        let update = ProfileUpdate {
            username: Some("  al  ".to_string()),
            ..Default::default()
        };
        let result = ProfileService::update_profile(&db, &AppConfig::for_tests(), &mailer, 1, update).await;

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("between 3 and 32")));
        assert!(check_username_length(&"x".repeat(33)).is_err());
        assert!(check_username_length("bob").is_ok());
    }

    /// UPLOAD_DIR isolé par test, avec un fichier temporaire "uploadé"
    fn image_setup(name: &str) -> (AppConfig, PathBuf, ProfileImage) {
        let root = std::env::temp_dir().join(format!("matchboxd-{}-{}", name, Uuid::new_v4()));
        std::fs::create_dir_all(root.join(PROFILES_DIR)).unwrap();

        let upload = root.join("incoming.tmp");
        std::fs::write(&upload, b"\x89PNG fake image").unwrap();

        let mut config = AppConfig::for_tests();
        config.upload_dir = root.to_string_lossy().into_owned();

        let image = ProfileImage {
            temp_path: upload,
            file_name: Some("avatar.png".to_string()),
            size: 16,
        };
        (config, root, image)
    }

    fn stored_profiles(root: &Path) -> Vec<String> {
        std::fs::read_dir(root.join(PROFILES_DIR))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[actix_web::test]
    async fn test_image_replaces_previous_file() {
        let (config, root, image) = image_setup("replace");
        let old_file = root.join(PROFILES_DIR).join("old.png");
        std::fs::write(&old_file, b"old").unwrap();

        let mut current = user_fixture(1, "alice", "alice@example.com", true);
        current.profile_image_url = Some("/uploads/profiles/old.png".to_string());
        let mut saved = current.clone();
        saved.profile_image_url = Some("/uploads/profiles/new.png".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current]])
            .append_query_results([vec![saved]])
            .into_connection();
        let mailer = RecordingMailer::default();

        let update = ProfileUpdate {
            image: Some(image),
            ..Default::default()
        };
        ProfileService::update_profile(&db, &config, &mailer, 1, update)
            .await
            .unwrap();

        assert!(!old_file.exists());
        let files = stored_profiles(&root);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with(".png"));

        // l'URL écrite en base pointe vers le nouveau fichier
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&format!("/uploads/profiles/{}", files[0])));

        std::fs::remove_dir_all(root).ok();
    }

    #[actix_web::test]
    async fn test_stored_image_removed_when_update_fails() {
        let (config, root, image) = image_setup("rollback");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_fixture(1, "alice", "alice@example.com", true)]])
            .append_query_errors([DbErr::Custom("connection lost".to_string())])
            .into_connection();
        let mailer = RecordingMailer::default();

        let update = ProfileUpdate {
            image: Some(image),
            ..Default::default()
        };
        let result = ProfileService::update_profile(&db, &config, &mailer, 1, update).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(stored_profiles(&root).is_empty());

        std::fs::remove_dir_all(root).ok();
    }
}
