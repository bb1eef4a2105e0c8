use sea_orm::*;
use sea_orm::sea_query::{Expr, Func};
use std::collections::HashMap;

use crate::error::AppError;
use crate::models::dto::{CommentView, MatchDetail, MatchSummary, RatingView, UserActions};
use crate::models::matches::{self, MatchStatus};
use crate::models::{comments, favorites, ratings, users, watched_matches, watchlist_items};

pub struct MatchService;

impl MatchService {
    /// Tous les matchs, plus récents d'abord, avec note moyenne et compteurs
    pub async fn list(
        db: &DatabaseConnection,
        status: Option<MatchStatus>,
    ) -> Result<Vec<MatchSummary>, AppError> {
        let mut query = matches::Entity::find()
            .order_by_desc(matches::Column::MatchDate)
            .order_by_desc(matches::Column::Id);

        if let Some(status) = status {
            query = query.filter(matches::Column::Status.eq(status));
        }

        let matches = query.all(db).await?;
        Self::summaries_for(db, matches).await
    }

    pub async fn require_match<C: ConnectionTrait>(db: &C, match_id: i32) -> Result<matches::Model, AppError> {
        matches::Entity::find_by_id(match_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Match not found."))
    }

    /// Résumés dans l'ordre des matchs reçus. Les agrégats sont calculés en SQL
    /// (une requête GROUP BY par table, pas une par match)
    pub async fn summaries_for(
        db: &DatabaseConnection,
        matches: Vec<matches::Model>,
    ) -> Result<Vec<MatchSummary>, AppError> {
        if matches.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = matches.iter().map(|m| m.id).collect();

        let rating_averages: HashMap<i32, f64> = ratings::Entity::find()
            .select_only()
            .column(ratings::Column::MatchId)
            .column_as(Expr::expr(Func::avg(Expr::col(ratings::Column::Score))), "average")
            .filter(ratings::Column::MatchId.is_in(ids.clone()))
            .group_by(ratings::Column::MatchId)
            .into_tuple::<(i32, Option<f64>)>()
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(id, avg)| avg.map(|avg| (id, avg)))
            .collect();

        let comment_counts: HashMap<i32, i64> = comments::Entity::find()
            .select_only()
            .column(comments::Column::MatchId)
            .column_as(Expr::col(comments::Column::Id).count(), "total")
            .filter(comments::Column::MatchId.is_in(ids.clone()))
            .group_by(comments::Column::MatchId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let watch_counts: HashMap<i32, i64> = watched_matches::Entity::find()
            .select_only()
            .column(watched_matches::Column::MatchId)
            .column_as(Expr::col(watched_matches::Column::Id).count(), "total")
            .filter(watched_matches::Column::MatchId.is_in(ids))
            .group_by(watched_matches::Column::MatchId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        Ok(build_summaries(matches, &rating_averages, &comment_counts, &watch_counts))
    }

    /// Détail d'un match avec les notes et commentaires (plus récents d'abord)
    pub async fn detail(db: &DatabaseConnection, match_id: i32) -> Result<MatchDetail, AppError> {
        let found = Self::require_match(db, match_id).await?;

        let rating_rows = ratings::Entity::find()
            .filter(ratings::Column::MatchId.eq(match_id))
            .order_by_desc(ratings::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        let comment_rows = comments::Entity::find()
            .filter(comments::Column::MatchId.eq(match_id))
            .order_by_desc(comments::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        let watch_count = watched_matches::Entity::find()
            .filter(watched_matches::Column::MatchId.eq(match_id))
            .count(db)
            .await?;

        Ok(build_detail(found, rating_rows, comment_rows, watch_count as i64))
    }

    /// Ce que l'utilisateur connecté a déjà fait sur ce match
    pub async fn user_actions(
        db: &DatabaseConnection,
        user_id: i32,
        match_id: i32,
    ) -> Result<UserActions, AppError> {
        let has_watched = watched_matches::Entity::find()
            .filter(watched_matches::Column::UserId.eq(user_id))
            .filter(watched_matches::Column::MatchId.eq(match_id))
            .one(db)
            .await?
            .is_some();

        let has_favorited = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::MatchId.eq(match_id))
            .one(db)
            .await?
            .is_some();

        let is_in_watchlist = watchlist_items::Entity::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .filter(watchlist_items::Column::MatchId.eq(match_id))
            .one(db)
            .await?
            .is_some();

        let user_rating = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::MatchId.eq(match_id))
            .one(db)
            .await?
            .map(|r| r.score);

        Ok(UserActions {
            has_watched,
            has_favorited,
            is_in_watchlist,
            user_rating,
        })
    }
}

pub fn build_summary(m: matches::Model, average_rating: f64, total_comments: i64, watch_count: i64) -> MatchSummary {
    MatchSummary {
        id: m.id,
        home_team: m.home_team,
        away_team: m.away_team,
        match_date: m.match_date,
        status: m.status,
        score_home: m.score_home,
        score_away: m.score_away,
        description: m.description,
        average_rating,
        total_comments,
        watch_count,
    }
}

/// Match sans note → moyenne 0
pub fn build_summaries(
    matches: Vec<matches::Model>,
    rating_averages: &HashMap<i32, f64>,
    comment_counts: &HashMap<i32, i64>,
    watch_counts: &HashMap<i32, i64>,
) -> Vec<MatchSummary> {
    matches
        .into_iter()
        .map(|m| {
            let id = m.id;
            build_summary(
                m,
                rating_averages.get(&id).copied().unwrap_or(0.0),
                comment_counts.get(&id).copied().unwrap_or(0),
                watch_counts.get(&id).copied().unwrap_or(0),
            )
        })
        .collect()
}

fn display_name(user: Option<users::Model>) -> String {
    user.map(|u| u.username).unwrap_or_else(|| "unknown".to_string())
}

pub fn build_detail(
    found: matches::Model,
    rating_rows: Vec<(ratings::Model, Option<users::Model>)>,
    comment_rows: Vec<(comments::Model, Option<users::Model>)>,
    watch_count: i64,
) -> MatchDetail {
    let average_rating = if rating_rows.is_empty() {
        0.0
    } else {
        rating_rows.iter().map(|(r, _)| r.score).sum::<f64>() / rating_rows.len() as f64
    };

    let summary = build_summary(found, average_rating, comment_rows.len() as i64, watch_count);

    MatchDetail {
        summary,
        ratings: rating_rows
            .into_iter()
            .map(|(r, user)| RatingView {
                score: r.score,
                username: display_name(user),
                created_at: r.created_at,
            })
            .collect(),
        comments: comment_rows
            .into_iter()
            .map(|(c, user)| CommentView {
                content: c.content,
                username: display_name(user),
                created_at: c.created_at,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_summaries_keep_order_and_default_to_zero() {
        let matches = vec![
            match_fixture(2, MatchStatus::Finished),
            match_fixture(1, MatchStatus::Timed),
        ];
        let averages = HashMap::from([(2, 4.25)]);
        let comments = HashMap::from([(2, 3)]);
        let watches = HashMap::from([(1, 7)]);

        let summaries = build_summaries(matches, &averages, &comments, &watches);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, 2);
        assert_eq!(summaries[0].average_rating, 4.25);
        assert_eq!(summaries[0].total_comments, 3);
        assert_eq!(summaries[0].watch_count, 0);
        assert_eq!(summaries[1].average_rating, 0.0);
        assert_eq!(summaries[1].watch_count, 7);
    }

    #[test]
    fn test_detail_averages_and_usernames() {
        let alice = user_fixture(1, "alice", "a@example.com", true);
        let bob = user_fixture(2, "bob", "b@example.com", true);

        let detail = build_detail(
            match_fixture(4, MatchStatus::Finished),
            vec![
                (rating_fixture(1, 1, 4, 5.0), Some(alice.clone())),
                (rating_fixture(2, 2, 4, 3.0), Some(bob)),
            ],
            vec![(comment_fixture(1, 1, 4, "What a game"), Some(alice))],
            12,
        );

        assert_eq!(detail.summary.average_rating, 4.0);
        assert_eq!(detail.summary.total_comments, 1);
        assert_eq!(detail.summary.watch_count, 12);
        assert_eq!(detail.ratings[1].username, "bob");
        assert_eq!(detail.comments[0].content, "What a game");
    }

    #[test]
    fn test_detail_json_is_flat_camel_case() {
        let detail = build_detail(match_fixture(1, MatchStatus::Scheduled), vec![], vec![], 0);
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["homeTeam"], "Home 1");
        assert_eq!(json["status"], "SCHEDULED");
        assert_eq!(json["averageRating"], 0.0);
        assert!(json["ratings"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_detail_unknown_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<matches::Model>::new()])
            .into_connection();

        let result = MatchService::detail(&db, 42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_user_actions() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![watched_fixture(1, 1, 3, 5)]])
            .append_query_results([Vec::<favorites::Model>::new()])
            .append_query_results([vec![watchlist_fixture(1, 1, 3)]])
            .append_query_results([vec![rating_fixture(1, 1, 3, 3.5)]])
            .into_connection();

        let actions = MatchService::user_actions(&db, 1, 3).await.unwrap();

        assert_eq!(
            actions,
            UserActions {
                has_watched: true,
                has_favorited: false,
                is_in_watchlist: true,
                user_rating: Some(3.5),
            }
        );
    }
}
