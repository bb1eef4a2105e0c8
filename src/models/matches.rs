// ============================================================================
// MODÈLE : MATCHES
// ============================================================================
//
// Description:
//   Un match (fixture) importé depuis football-data.org. external_id est l'id
//   du fournisseur et sert de clé pour l'upsert de l'import.
//
// Points d'attention:
//   - Les commentaires ne sont acceptés que si status = FINISHED
//   - Les statuts du fournisseur sont ramenés aux 4 valeurs de MatchStatus
//     (voir services::match_import_service::map_status)
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[sea_orm(string_value = "SCHEDULED")]
    Scheduled,
    #[sea_orm(string_value = "TIMED")]
    Timed,
    #[sea_orm(string_value = "FINISHED")]
    Finished,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub external_id: i32,
    pub home_team: String,
    pub away_team: String,
    pub match_date: DateTime,
    pub status: MatchStatus,
    pub score_home: Option<i32>,
    pub score_away: Option<i32>,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,

    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,

    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,

    #[sea_orm(has_many = "super::watchlist_items::Entity")]
    WatchlistItems,

    #[sea_orm(has_many = "super::watched_matches::Entity")]
    WatchedMatches,
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::watchlist_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchlistItems.def()
    }
}

impl Related<super::watched_matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchedMatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
