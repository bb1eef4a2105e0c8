// ============================================================================
// SERVICE : INTERACTIONS UTILISATEUR / MATCH
// ============================================================================
//
// Description:
//   Notes, commentaires, matchs regardés, favoris et watchlist.
//   Chaque relation est unique par (user_id, match_id) : vérification
//   d'existence avant l'insert, et index unique en base pour les requêtes
//   concurrentes (le DbErr devient un 409, voir error.rs).
//
// Points d'attention:
//   - Un commentaire n'est accepté que si le match est FINISHED
//   - Note entre 0.5 et 5.0 par pas de 0.5 (widget étoiles du frontend)
//   - Note et commentaire sont écrits dans la même transaction
//
// ============================================================================

use sea_orm::*;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::dto::{RateCommentRequest, RateCommentResponse};
use crate::models::matches::MatchStatus;
use crate::models::{comments, favorites, ratings, watched_matches, watchlist_items};
use crate::services::match_service::MatchService;
use crate::utils::now_utc;

pub struct InteractionService;

/// Note et/ou commentaire validés, prêts à être écrits
#[derive(Debug, PartialEq)]
pub struct ValidatedReview {
    pub score: Option<f64>,
    pub content: Option<String>,
}

impl InteractionService {
    /// Crée ou met à jour la note et/ou le commentaire de l'utilisateur
    pub async fn rate_and_comment(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
        request: RateCommentRequest,
    ) -> Result<RateCommentResponse, AppError> {
        let review = validate_review(request)?;

        let found = MatchService::require_match(db, match_id).await?;
        if review.content.is_some() && found.status != MatchStatus::Finished {
            return Err(AppError::bad_request(
                "Comments are only allowed once the match is finished.",
            ));
        }

        let txn = db.begin().await?;

        if let Some(score) = review.score {
            Self::upsert_rating(&txn, user_id, match_id, score).await?;
        }
        if let Some(content) = review.content.as_deref() {
            Self::upsert_comment(&txn, user_id, match_id, content).await?;
        }

        txn.commit().await?;

        info!(user_id, match_id, "Review saved");
        Ok(RateCommentResponse {
            message: "Review saved.".to_string(),
            score: review.score,
            content: review.content,
        })
    }

    async fn upsert_rating(
        txn: &DatabaseTransaction,
        user_id: i32,
        match_id: i32,
        score: f64,
    ) -> Result<ratings::Model, AppError> {
        let existing = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::MatchId.eq(match_id))
            .one(txn)
            .await?;

        let saved = match existing {
            Some(rating) => {
                let mut active_model: ratings::ActiveModel = rating.into_active_model();
                active_model.score = Set(score);
                active_model.update(txn).await?
            }
            None => {
                ratings::ActiveModel {
                    user_id: Set(user_id),
                    match_id: Set(match_id),
                    score: Set(score),
                    created_at: Set(now_utc()),
                    ..Default::default()
                }
                .insert(txn)
                .await?
            }
        };

        Ok(saved)
    }

    async fn upsert_comment(
        txn: &DatabaseTransaction,
        user_id: i32,
        match_id: i32,
        content: &str,
    ) -> Result<comments::Model, AppError> {
        let existing = comments::Entity::find()
            .filter(comments::Column::UserId.eq(user_id))
            .filter(comments::Column::MatchId.eq(match_id))
            .one(txn)
            .await?;

        let saved = match existing {
            Some(comment) => {
                let mut active_model: comments::ActiveModel = comment.into_active_model();
                active_model.content = Set(content.to_string());
                active_model.created_at = Set(now_utc());
                active_model.update(txn).await?
            }
            None => {
                comments::ActiveModel {
                    user_id: Set(user_id),
                    match_id: Set(match_id),
                    content: Set(content.to_string()),
                    created_at: Set(now_utc()),
                    ..Default::default()
                }
                .insert(txn)
                .await?
            }
        };

        Ok(saved)
    }

    pub async fn mark_watched(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<watched_matches::Model, AppError> {
        MatchService::require_match(db, match_id).await?;

        if Self::find_watched(db, user_id, match_id).await?.is_some() {
            return Err(AppError::conflict("You have already marked this match as watched."));
        }

        let watched = watched_matches::ActiveModel {
            user_id: Set(user_id),
            match_id: Set(match_id),
            watched_at: Set(now_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(watched)
    }

    pub async fn has_watched(db: &DatabaseConnection, user_id: i32, match_id: i32) -> Result<bool, AppError> {
        Ok(Self::find_watched(db, user_id, match_id).await?.is_some())
    }

    /// Ajout simple : un deuxième ajout est refusé (409)
    pub async fn add_favorite(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<favorites::Model, AppError> {
        MatchService::require_match(db, match_id).await?;

        if Self::find_favorite(db, user_id, match_id).await?.is_some() {
            return Err(AppError::conflict("This match is already in your favorites."));
        }

        Self::insert_favorite(db, user_id, match_id).await
    }

    /// Retire le favori s'il existe, l'ajoute sinon. Retourne l'état final
    pub async fn toggle_favorite(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<bool, AppError> {
        MatchService::require_match(db, match_id).await?;

        match Self::find_favorite(db, user_id, match_id).await? {
            Some(favorite) => {
                favorite.delete(db).await?;
                Ok(false)
            }
            None => {
                Self::insert_favorite(db, user_id, match_id).await?;
                Ok(true)
            }
        }
    }

    pub async fn is_favorite(db: &DatabaseConnection, user_id: i32, match_id: i32) -> Result<bool, AppError> {
        Ok(Self::find_favorite(db, user_id, match_id).await?.is_some())
    }

    pub async fn add_to_watchlist(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<watchlist_items::Model, AppError> {
        MatchService::require_match(db, match_id).await?;

        if Self::find_watchlist_item(db, user_id, match_id).await?.is_some() {
            return Err(AppError::conflict("This match is already in your watchlist."));
        }

        let item = watchlist_items::ActiveModel {
            user_id: Set(user_id),
            match_id: Set(match_id),
            added_at: Set(now_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(item)
    }

    pub async fn remove_from_watchlist(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<(), AppError> {
        let item = Self::find_watchlist_item(db, user_id, match_id)
            .await?
            .ok_or_else(|| AppError::not_found("This match is not in your watchlist."))?;

        item.delete(db).await?;
        Ok(())
    }

    async fn insert_favorite(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<favorites::Model, AppError> {
        let favorite = favorites::ActiveModel {
            user_id: Set(user_id),
            match_id: Set(match_id),
            created_at: Set(now_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(favorite)
    }

    async fn find_watched(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<Option<watched_matches::Model>, DbErr> {
        watched_matches::Entity::find()
            .filter(watched_matches::Column::UserId.eq(user_id))
            .filter(watched_matches::Column::MatchId.eq(match_id))
            .one(db)
            .await
    }

    async fn find_favorite(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<Option<favorites::Model>, DbErr> {
        favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::MatchId.eq(match_id))
            .one(db)
            .await
    }

    async fn find_watchlist_item(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<Option<watchlist_items::Model>, DbErr> {
        watchlist_items::Entity::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .filter(watchlist_items::Column::MatchId.eq(match_id))
            .one(db)
            .await
    }
}

/// Vérifie la requête sans toucher la base.
/// Un commentaire vide compte comme absent
pub fn validate_review(request: RateCommentRequest) -> Result<ValidatedReview, AppError> {
    request.validate()?;

    if let Some(score) = request.score {
        if (score * 2.0).fract() != 0.0 {
            return Err(AppError::Validation("Score must be a multiple of 0.5.".to_string()));
        }
    }

    let content = request
        .content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    if request.score.is_none() && content.is_none() {
        return Err(AppError::bad_request("Provide a score and/or a comment."));
    }

    Ok(ValidatedReview {
        score: request.score,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matches;
    use crate::test_support::*;

    fn review(score: Option<f64>, content: Option<&str>) -> RateCommentRequest {
        RateCommentRequest {
            score,
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_review() {
        assert_eq!(
            validate_review(review(Some(4.5), Some("  great  "))).unwrap(),
            ValidatedReview {
                score: Some(4.5),
                content: Some("great".to_string()),
            }
        );
        assert!(validate_review(review(Some(0.0), None)).is_err());
        assert!(validate_review(review(Some(5.5), None)).is_err());
        assert!(validate_review(review(Some(3.3), None)).is_err());
        assert!(validate_review(review(None, Some("   "))).is_err());
        assert!(validate_review(review(None, None)).is_err());
        assert!(validate_review(review(None, Some(&"x".repeat(2001)))).is_err());
    }

    #[actix_web::test]
    async fn test_comment_rejected_when_match_not_finished() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(1, MatchStatus::Timed)]])
            .into_connection();

        let result = InteractionService::rate_and_comment(
            &db,
            1,
            1,
            review(Some(4.0), Some("Too early to say")),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn test_rating_allowed_before_match_finished() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(1, MatchStatus::Scheduled)]])
            .append_query_results([Vec::<ratings::Model>::new()])
            .append_query_results([vec![rating_fixture(1, 1, 1, 4.0)]])
            .into_connection();

        let response = InteractionService::rate_and_comment(&db, 1, 1, review(Some(4.0), None))
            .await
            .unwrap();

        assert_eq!(response.score, Some(4.0));
        assert_eq!(response.content, None);
    }

    #[actix_web::test]
    async fn test_rate_unknown_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<matches::Model>::new()])
            .into_connection();

        let result = InteractionService::rate_and_comment(&db, 1, 99, review(Some(2.0), None)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_favorite_twice_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(1, MatchStatus::Finished)]])
            .append_query_results([vec![favorite_fixture(1, 1, 1)]])
            .into_connection();

        let result = InteractionService::add_favorite(&db, 1, 1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[actix_web::test]
    async fn test_toggle_favorite_removes_existing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(1, MatchStatus::Finished)]])
            .append_query_results([vec![favorite_fixture(1, 1, 1)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert!(!InteractionService::toggle_favorite(&db, 1, 1).await.unwrap());
    }

    #[actix_web::test]
    async fn test_toggle_favorite_adds_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(1, MatchStatus::Finished)]])
            .append_query_results([Vec::<favorites::Model>::new()])
            .append_query_results([vec![favorite_fixture(3, 1, 1)]])
            .into_connection();

        assert!(InteractionService::toggle_favorite(&db, 1, 1).await.unwrap());
    }

    #[actix_web::test]
    async fn test_mark_watched_twice_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(1, MatchStatus::Finished)]])
            .append_query_results([vec![watched_fixture(1, 1, 1, 3)]])
            .into_connection();

        let result = InteractionService::mark_watched(&db, 1, 1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[actix_web::test]
    async fn test_watchlist_add_and_remove_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![match_fixture(2, MatchStatus::Scheduled)]])
            .append_query_results([vec![watchlist_fixture(1, 1, 2)]])
            .append_query_results([Vec::<watchlist_items::Model>::new()])
            .into_connection();

        let duplicate = InteractionService::add_to_watchlist(&db, 1, 2).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let missing = InteractionService::remove_from_watchlist(&db, 1, 2).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
