use chrono::{DateTime, Utc};
use reqwest::Client;
use sea_orm::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::FootballDataConfig;
use crate::error::AppError;
use crate::models::dto::ImportSummary;
use crate::models::matches::{self, MatchStatus};

// ---------------------------------------------------------------------------
// Réponse football-data.org v4 (seulement les champs utilisés)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<ProviderMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMatch {
    pub id: i32,
    pub utc_date: DateTime<Utc>,
    pub status: String,
    pub stage: Option<String>,
    pub home_team: ProviderTeam,
    pub away_team: ProviderTeam,
    pub competition: ProviderCompetition,
    #[serde(default)]
    pub score: ProviderScore,
}

#[derive(Debug, Deserialize)]
pub struct ProviderTeam {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderCompetition {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderScore {
    #[serde(default)]
    pub full_time: ProviderFullTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderFullTime {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

/// Client football-data.org, partagé entre la route d'import et le poller
#[derive(Clone)]
pub struct MatchImportService {
    client: Client,
    config: FootballDataConfig,
}

impl MatchImportService {
    pub fn new(config: FootballDataConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn fetch(&self) -> Result<Vec<ProviderMatch>, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::internal("FOOTBALL_DATA_API_KEY is not configured."))?;

        let url = format!(
            "{}/competitions/{}/matches",
            self.config.base_url, self.config.competition
        );

        let response = self
            .client
            .get(&url)
            .header("X-Auth-Token", api_key)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Football data request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::internal(format!("Football data returned an error: {}", e)))?;

        let body: MatchesResponse = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Invalid football data response: {}", e)))?;

        Ok(body.matches)
    }

    /// Récupère les matchs de la compétition et les upsert par `external_id`
    pub async fn import(&self, db: &DatabaseConnection) -> Result<ImportSummary, AppError> {
        let fixtures = self.fetch().await?;
        let summary = upsert_fixtures(db, fixtures).await?;

        info!(
            fetched = summary.fetched,
            inserted = summary.inserted,
            updated = summary.updated,
            "Match import finished"
        );
        Ok(summary)
    }

    /// Import périodique en tâche de fond. Les erreurs sont loggées, la boucle continue
    pub fn spawn_poller(self, db: DatabaseConnection) {
        let interval_secs = self.config.poll_interval_secs;
        if interval_secs == 0 {
            return;
        }
        if self.config.api_key.is_none() {
            warn!("MATCH_IMPORT_INTERVAL_SECS set without FOOTBALL_DATA_API_KEY, poller disabled");
            return;
        }

        info!(interval_secs, "Starting match import poller");
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if let Err(e) = self.import(&db).await {
                    error!("Scheduled match import failed: {}", e);
                }
            }
        });
    }
}

pub async fn upsert_fixtures(
    db: &DatabaseConnection,
    fixtures: Vec<ProviderMatch>,
) -> Result<ImportSummary, AppError> {
    let mut summary = ImportSummary {
        fetched: fixtures.len(),
        ..Default::default()
    };

    if fixtures.is_empty() {
        return Ok(summary);
    }

    let external_ids: Vec<i32> = fixtures.iter().map(|f| f.id).collect();

    let txn = db.begin().await?;

    let mut existing: HashMap<i32, matches::Model> = matches::Entity::find()
        .filter(matches::Column::ExternalId.is_in(external_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| (m.external_id, m))
        .collect();

    for fixture in fixtures {
        match existing.remove(&fixture.id) {
            Some(current) => {
                if let Some(changes) = refresh_match(current, &fixture) {
                    changes.update(&txn).await?;
                    summary.updated += 1;
                }
            }
            None => {
                new_match(&fixture).insert(&txn).await?;
                summary.inserted += 1;
            }
        }
    }

    txn.commit().await?;
    Ok(summary)
}

pub fn map_status(provider_status: &str) -> MatchStatus {
    match provider_status.to_ascii_uppercase().as_str() {
        "SCHEDULED" => MatchStatus::Scheduled,
        "TIMED" | "IN_PLAY" | "PAUSED" | "LIVE" => MatchStatus::Timed,
        "FINISHED" | "AWARDED" => MatchStatus::Finished,
        "POSTPONED" | "SUSPENDED" | "CANCELLED" | "CANCELED" => MatchStatus::Canceled,
        _ => MatchStatus::Scheduled,
    }
}

pub fn describe(fixture: &ProviderMatch) -> String {
    format!(
        "{} - {}",
        fixture.competition.name,
        fixture.stage.as_deref().unwrap_or("")
    )
}

fn team_name(team: &ProviderTeam) -> String {
    team.name.clone().unwrap_or_else(|| "TBD".to_string())
}

pub fn new_match(fixture: &ProviderMatch) -> matches::ActiveModel {
    matches::ActiveModel {
        external_id: Set(fixture.id),
        home_team: Set(team_name(&fixture.home_team)),
        away_team: Set(team_name(&fixture.away_team)),
        match_date: Set(fixture.utc_date.naive_utc()),
        status: Set(map_status(&fixture.status)),
        score_home: Set(fixture.score.full_time.home),
        score_away: Set(fixture.score.full_time.away),
        description: Set(Some(describe(fixture))),
        ..Default::default()
    }
}

/// Statut, date et score rafraîchis. `None` si rien n'a changé
pub fn refresh_match(current: matches::Model, fixture: &ProviderMatch) -> Option<matches::ActiveModel> {
    let status = map_status(&fixture.status);
    let match_date = fixture.utc_date.naive_utc();
    let score_home = fixture.score.full_time.home;
    let score_away = fixture.score.full_time.away;

    if current.status == status
        && current.match_date == match_date
        && current.score_home == score_home
        && current.score_away == score_away
    {
        return None;
    }

    let mut active_model: matches::ActiveModel = current.into();
    active_model.status = Set(status);
    active_model.match_date = Set(match_date);
    active_model.score_home = Set(score_home);
    active_model.score_away = Set(score_away);
    Some(active_model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::match_fixture;

    const SAMPLE: &str = r#"{
        "filters": {"season": "2024"},
        "matches": [
            {
                "id": 497410,
                "utcDate": "2024-08-16T19:00:00Z",
                "status": "FINISHED",
                "stage": "REGULAR_SEASON",
                "homeTeam": {"id": 66, "name": "Manchester United FC"},
                "awayTeam": {"id": 63, "name": "Fulham FC"},
                "competition": {"id": 2021, "name": "Premier League"},
                "score": {"winner": "HOME_TEAM", "fullTime": {"home": 1, "away": 0}}
            },
            {
                "id": 497900,
                "utcDate": "2025-05-25T15:00:00Z",
                "status": "TIMED",
                "stage": "REGULAR_SEASON",
                "homeTeam": {"id": null, "name": null},
                "awayTeam": {"id": 57, "name": "Arsenal FC"},
                "competition": {"id": 2021, "name": "Premier League"},
                "score": {"fullTime": {"home": null, "away": null}}
            }
        ]
    }"#;

    fn sample() -> Vec<ProviderMatch> {
        serde_json::from_str::<MatchesResponse>(SAMPLE).unwrap().matches
    }

    #[test]
    fn test_parse_provider_response() {
        let fixtures = sample();

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, 497410);
        assert_eq!(fixtures[0].score.full_time.home, Some(1));
        assert_eq!(describe(&fixtures[0]), "Premier League - REGULAR_SEASON");
        assert_eq!(fixtures[1].score.full_time.away, None);
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("SCHEDULED"), MatchStatus::Scheduled);
        assert_eq!(map_status("IN_PLAY"), MatchStatus::Timed);
        assert_eq!(map_status("PAUSED"), MatchStatus::Timed);
        assert_eq!(map_status("AWARDED"), MatchStatus::Finished);
        assert_eq!(map_status("POSTPONED"), MatchStatus::Canceled);
        assert_eq!(map_status("CANCELLED"), MatchStatus::Canceled);
        assert_eq!(map_status("something-new"), MatchStatus::Scheduled);
    }

    #[test]
    fn test_new_match_defaults_missing_team_name() {
        let fixtures = sample();
        let active = new_match(&fixtures[1]);

        assert_eq!(active.home_team, Set("TBD".to_string()));
        assert_eq!(active.status, Set(MatchStatus::Timed));
    }

    #[test]
    fn test_refresh_only_when_changed() {
        let fixtures = sample();

        let mut current = match_fixture(1, MatchStatus::Timed);
        current.external_id = fixtures[0].id;
        let changes = refresh_match(current.clone(), &fixtures[0]).unwrap();
        assert_eq!(changes.status, Set(MatchStatus::Finished));
        assert_eq!(changes.score_home, Set(Some(1)));

        current.status = MatchStatus::Finished;
        current.match_date = fixtures[0].utc_date.naive_utc();
        current.score_home = Some(1);
        current.score_away = Some(0);
        assert!(refresh_match(current, &fixtures[0]).is_none());
    }

    #[actix_web::test]
    async fn test_upsert_counts_inserted_and_updated() {
        let fixtures = sample();

        let mut known = match_fixture(1, MatchStatus::Timed);
        known.external_id = 497410;

        let mut refreshed = known.clone();
        refreshed.status = MatchStatus::Finished;

        let mut inserted = match_fixture(2, MatchStatus::Timed);
        inserted.external_id = 497900;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![known]])
            .append_query_results([vec![refreshed]])
            .append_query_results([vec![inserted]])
            .into_connection();

        let summary = upsert_fixtures(&db, fixtures).await.unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                fetched: 2,
                inserted: 1,
                updated: 1,
            }
        );
    }

    #[actix_web::test]
    async fn test_fetch_without_api_key() {
        let service = MatchImportService::new(FootballDataConfig {
            base_url: "http://localhost:9999".to_string(),
            api_key: None,
            competition: "2021".to_string(),
            poll_interval_secs: 0,
        });

        assert!(matches!(service.fetch().await, Err(AppError::Internal(_))));
    }
}
