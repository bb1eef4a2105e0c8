// Fixtures partagées par les tests (MockDatabase)
use chrono::NaiveDate;
use sea_orm::prelude::DateTime;

use crate::models::{comments, favorites, matches, ratings, users, watched_matches, watchlist_items};
use crate::models::matches::MatchStatus;

pub fn at(day: u32, hour: u32) -> DateTime {
    NaiveDate::from_ymd_opt(2025, 5, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid fixture date")
}

pub fn user_fixture(id: i32, username: &str, email: &str, email_verified: bool) -> users::Model {
    users::Model {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "pbkdf2:sha256:1$c2FsdA$aGFzaA".to_string(),
        email_verified,
        verification_token: None,
        verification_token_expires_at: None,
        profile_image_url: None,
        created_at: at(1, 12),
    }
}

pub fn match_fixture(id: i32, status: MatchStatus) -> matches::Model {
    matches::Model {
        id,
        external_id: 1000 + id,
        home_team: format!("Home {}", id),
        away_team: format!("Away {}", id),
        match_date: at(10 + id as u32 % 15, 15),
        status,
        score_home: None,
        score_away: None,
        description: Some("Premier League - REGULAR_SEASON".to_string()),
    }
}

pub fn rating_fixture(id: i32, user_id: i32, match_id: i32, score: f64) -> ratings::Model {
    ratings::Model {
        id,
        user_id,
        match_id,
        score,
        created_at: at(20, 10),
    }
}

pub fn comment_fixture(id: i32, user_id: i32, match_id: i32, content: &str) -> comments::Model {
    comments::Model {
        id,
        user_id,
        match_id,
        content: content.to_string(),
        created_at: at(20, 11),
    }
}

pub fn favorite_fixture(id: i32, user_id: i32, match_id: i32) -> favorites::Model {
    favorites::Model {
        id,
        user_id,
        match_id,
        created_at: at(21, 9),
    }
}

pub fn watchlist_fixture(id: i32, user_id: i32, match_id: i32) -> watchlist_items::Model {
    watchlist_items::Model {
        id,
        user_id,
        match_id,
        added_at: at(21, 10),
    }
}

pub fn watched_fixture(id: i32, user_id: i32, match_id: i32, day: u32) -> watched_matches::Model {
    watched_matches::Model {
        id,
        user_id,
        match_id,
        watched_at: at(day, 20),
    }
}
