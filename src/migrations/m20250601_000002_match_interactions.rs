use sea_orm_migration::prelude::*;

use super::m20250601_000001_users_and_matches::{Matches, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_interaction_table(
            manager,
            Interaction::Ratings,
            vec![
                ColumnDef::new(Interaction::Score).double().not_null().to_owned(),
                timestamp_col(Interaction::CreatedAt),
            ],
        )
        .await?;

        create_interaction_table(
            manager,
            Interaction::Comments,
            vec![
                ColumnDef::new(Interaction::Content).text().not_null().to_owned(),
                timestamp_col(Interaction::CreatedAt),
            ],
        )
        .await?;

        create_interaction_table(
            manager,
            Interaction::Favorites,
            vec![timestamp_col(Interaction::CreatedAt)],
        )
        .await?;

        create_interaction_table(
            manager,
            Interaction::WatchlistItems,
            vec![timestamp_col(Interaction::AddedAt)],
        )
        .await?;

        create_interaction_table(
            manager,
            Interaction::WatchedMatches,
            vec![timestamp_col(Interaction::WatchedAt)],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Interaction::WatchedMatches,
            Interaction::WatchlistItems,
            Interaction::Favorites,
            Interaction::Comments,
            Interaction::Ratings,
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

fn timestamp_col(column: Interaction) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// Table (id, user_id, match_id, ...) avec FK en cascade et unicité (user_id, match_id).
/// L'index unique empêche les doublons quand deux requêtes passent la
/// vérification d'existence en même temps.
async fn create_interaction_table(
    manager: &SchemaManager<'_>,
    table: Interaction,
    extra_columns: Vec<ColumnDef>,
) -> Result<(), DbErr> {
    let name = table.to_string();

    let mut create = Table::create();
    create
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(Interaction::Id).integer().not_null().auto_increment().primary_key())
        .col(ColumnDef::new(Interaction::UserId).integer().not_null())
        .col(ColumnDef::new(Interaction::MatchId).integer().not_null());

    for column in extra_columns {
        create.col(column);
    }

    create
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_user_id", name))
                .from(table, Interaction::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_match_id", name))
                .from(table, Interaction::MatchId)
                .to(Matches::Table, Matches::Id)
                .on_delete(ForeignKeyAction::Cascade),
        );

    manager.create_table(create.to_owned()).await?;

    manager
        .create_index(
            Index::create()
                .name(format!("uq_{}_user_match", name))
                .table(table)
                .col(Interaction::UserId)
                .col(Interaction::MatchId)
                .unique()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden, Clone, Copy)]
enum Interaction {
    Ratings,
    Comments,
    Favorites,
    WatchlistItems,
    WatchedMatches,
    Id,
    UserId,
    MatchId,
    Score,
    Content,
    CreatedAt,
    AddedAt,
    WatchedAt,
}
