use sea_orm::*;
use std::collections::{HashMap, HashSet};

use crate::error::AppError;
use crate::models::dto::{DiaryEntry, FavoriteMatch, MatchSummary, ReviewEntry};
use crate::models::{comments, favorites, matches, ratings, watched_matches, watchlist_items};
use crate::services::match_service::MatchService;

/// Pages "à moi" : reviews, favoris, diary, watchlist
pub struct LibraryService;

impl LibraryService {
    /// Un élément par match noté ou commenté par l'utilisateur
    pub async fn reviews(db: &DatabaseConnection, user_id: i32) -> Result<Vec<ReviewEntry>, AppError> {
        let user_ratings = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let user_comments = comments::Entity::find()
            .filter(comments::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let match_ids: HashSet<i32> = user_ratings
            .iter()
            .map(|r| r.match_id)
            .chain(user_comments.iter().map(|c| c.match_id))
            .collect();

        if match_ids.is_empty() {
            return Ok(Vec::new());
        }

        let reviewed_matches = matches::Entity::find()
            .filter(matches::Column::Id.is_in(match_ids))
            .all(db)
            .await?;

        Ok(build_reviews(reviewed_matches, user_ratings, user_comments))
    }

    pub async fn favorites(db: &DatabaseConnection, user_id: i32) -> Result<Vec<FavoriteMatch>, AppError> {
        let rows = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .find_also_related(matches::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, m)| m)
            .map(|m| FavoriteMatch {
                match_id: m.id,
                home_team: m.home_team,
                away_team: m.away_team,
                match_date: m.match_date,
                status: m.status,
            })
            .collect())
    }

    /// Journal : les matchs regardés avec la note, le commentaire et le favori
    pub async fn diary(db: &DatabaseConnection, user_id: i32) -> Result<Vec<DiaryEntry>, AppError> {
        let watched = watched_matches::Entity::find()
            .filter(watched_matches::Column::UserId.eq(user_id))
            .find_also_related(matches::Entity)
            .all(db)
            .await?;

        if watched.is_empty() {
            return Ok(Vec::new());
        }

        let match_ids: Vec<i32> = watched.iter().map(|(w, _)| w.match_id).collect();

        let user_ratings = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::MatchId.is_in(match_ids.clone()))
            .all(db)
            .await?;

        let user_comments = comments::Entity::find()
            .filter(comments::Column::UserId.eq(user_id))
            .filter(comments::Column::MatchId.is_in(match_ids.clone()))
            .all(db)
            .await?;

        let user_favorites = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::MatchId.is_in(match_ids))
            .all(db)
            .await?;

        Ok(build_diary(watched, user_ratings, user_comments, user_favorites))
    }

    /// Résumés des matchs de la watchlist, derniers ajoutés d'abord
    pub async fn watchlist(db: &DatabaseConnection, user_id: i32) -> Result<Vec<MatchSummary>, AppError> {
        let rows = watchlist_items::Entity::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .order_by_desc(watchlist_items::Column::AddedAt)
            .find_also_related(matches::Entity)
            .all(db)
            .await?;

        let queued: Vec<matches::Model> = rows.into_iter().filter_map(|(_, m)| m).collect();
        MatchService::summaries_for(db, queued).await
    }
}

/// `reviewed_at` = date du commentaire, sinon date de la note. Plus récents d'abord
pub fn build_reviews(
    reviewed_matches: Vec<matches::Model>,
    user_ratings: Vec<ratings::Model>,
    user_comments: Vec<comments::Model>,
) -> Vec<ReviewEntry> {
    let ratings_by_match: HashMap<i32, ratings::Model> =
        user_ratings.into_iter().map(|r| (r.match_id, r)).collect();
    let mut comments_by_match: HashMap<i32, comments::Model> =
        user_comments.into_iter().map(|c| (c.match_id, c)).collect();

    let mut entries: Vec<ReviewEntry> = reviewed_matches
        .into_iter()
        .map(|m| {
            let rating = ratings_by_match.get(&m.id);
            let comment = comments_by_match.remove(&m.id);
            let reviewed_at = comment
                .as_ref()
                .map(|c| c.created_at)
                .or_else(|| rating.map(|r| r.created_at));

            ReviewEntry {
                match_id: m.id,
                home_team: m.home_team,
                away_team: m.away_team,
                score: rating.map(|r| r.score),
                comment: comment.map(|c| c.content),
                reviewed_at,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.reviewed_at.cmp(&a.reviewed_at));
    entries
}

pub fn build_diary(
    watched: Vec<(watched_matches::Model, Option<matches::Model>)>,
    user_ratings: Vec<ratings::Model>,
    user_comments: Vec<comments::Model>,
    user_favorites: Vec<favorites::Model>,
) -> Vec<DiaryEntry> {
    let scores: HashMap<i32, f64> = user_ratings.into_iter().map(|r| (r.match_id, r.score)).collect();
    let mut texts: HashMap<i32, String> =
        user_comments.into_iter().map(|c| (c.match_id, c.content)).collect();
    let favorite_ids: HashSet<i32> = user_favorites.into_iter().map(|f| f.match_id).collect();

    let mut entries: Vec<DiaryEntry> = watched
        .into_iter()
        .filter_map(|(w, m)| m.map(|m| (w, m)))
        .map(|(w, m)| DiaryEntry {
            match_id: m.id,
            home_team: m.home_team,
            away_team: m.away_team,
            match_date: m.match_date,
            score: scores.get(&m.id).copied(),
            comment: texts.remove(&m.id),
            favorite: favorite_ids.contains(&m.id),
            watched_at: w.watched_at,
        })
        .collect();

    entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matches::MatchStatus;
    use crate::test_support::*;

    #[test]
    fn test_reviews_merge_rating_and_comment() {
        let reviews = build_reviews(
            vec![
                match_fixture(1, MatchStatus::Finished),
                match_fixture(2, MatchStatus::Timed),
            ],
            vec![rating_fixture(1, 7, 1, 4.5), rating_fixture(2, 7, 2, 2.0)],
            vec![comment_fixture(1, 7, 1, "Solid")],
        );

        assert_eq!(reviews.len(), 2);
        // le commentaire (11h) est plus récent que la note seule (10h)
        assert_eq!(reviews[0].match_id, 1);
        assert_eq!(reviews[0].score, Some(4.5));
        assert_eq!(reviews[0].comment.as_deref(), Some("Solid"));
        assert_eq!(reviews[0].reviewed_at, Some(at(20, 11)));
        assert_eq!(reviews[1].comment, None);
        assert_eq!(reviews[1].reviewed_at, Some(at(20, 10)));
    }

    #[test]
    fn test_diary_sorted_by_watch_date() {
        let diary = build_diary(
            vec![
                (watched_fixture(1, 7, 1, 3), Some(match_fixture(1, MatchStatus::Finished))),
                (watched_fixture(2, 7, 2, 9), Some(match_fixture(2, MatchStatus::Finished))),
                (watched_fixture(3, 7, 3, 5), None),
            ],
            vec![rating_fixture(1, 7, 1, 3.0)],
            vec![comment_fixture(1, 7, 2, "Late winner")],
            vec![favorite_fixture(1, 7, 2)],
        );

        assert_eq!(diary.len(), 2);
        assert_eq!(diary[0].match_id, 2);
        assert!(diary[0].favorite);
        assert_eq!(diary[0].comment.as_deref(), Some("Late winner"));
        assert_eq!(diary[0].score, None);
        assert_eq!(diary[1].match_id, 1);
        assert_eq!(diary[1].score, Some(3.0));
        assert!(!diary[1].favorite);
    }

    #[actix_web::test]
    async fn test_reviews_empty_without_queries_on_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ratings::Model>::new()])
            .append_query_results([Vec::<comments::Model>::new()])
            .into_connection();

        assert!(LibraryService::reviews(&db, 1).await.unwrap().is_empty());
    }
}
