// Requêtes et réponses JSON de l'API (camelCase côté frontend)
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::matches::MatchStatus;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 32;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be between 3 and 32 characters."))]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    pub password: String,
}

impl RegisterRequest {
    /// Forme stockée : username sans espaces autour, email en minuscules.
    /// À appeler avant validate()
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub username: String,
    pub user_photo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub profile_image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Matchs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MatchListQuery {
    pub status: Option<MatchStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: i32,
    pub home_team: String,
    pub away_team: String,
    pub match_date: NaiveDateTime,
    pub status: MatchStatus,
    pub score_home: Option<i32>,
    pub score_away: Option<i32>,
    pub description: Option<String>,
    pub average_rating: f64,
    pub total_comments: i64,
    pub watch_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    pub score: f64,
    pub username: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub content: String,
    pub username: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    #[serde(flatten)]
    pub summary: MatchSummary,
    pub ratings: Vec<RatingView>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActions {
    pub has_watched: bool,
    pub has_favorited: bool,
    pub is_in_watchlist: bool,
    pub user_rating: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RateCommentRequest {
    #[validate(range(min = 0.5, max = 5.0, message = "Score must be between 0.5 and 5.0."))]
    pub score: Option<f64>,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters."))]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RateCommentResponse {
    pub message: String,
    pub score: Option<f64>,
    pub content: Option<String>,
}

/// Corps `{ "matchId": 12 }` des routes watchlist et favorite/toggle
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchIdRequest {
    pub match_id: i32,
}

// ---------------------------------------------------------------------------
// Pages utilisateur (reviews, favoris, diary)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub match_id: i32,
    pub home_team: String,
    pub away_team: String,
    pub score: Option<f64>,
    pub comment: Option<String>,
    pub reviewed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteMatch {
    pub match_id: i32,
    pub home_team: String,
    pub away_team: String,
    pub match_date: NaiveDateTime,
    pub status: MatchStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub match_id: i32,
    pub home_team: String,
    pub away_team: String,
    pub match_date: NaiveDateTime,
    pub score: Option<f64>,
    pub comment: Option<String>,
    pub favorite: bool,
    pub watched_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub token: String,
    pub avatar_url: Option<String>,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
}
