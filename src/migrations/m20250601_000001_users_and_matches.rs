use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::EmailVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::VerificationToken).string().unique_key())
                    .col(ColumnDef::new(Users::VerificationTokenExpiresAt).timestamp())
                    .col(ColumnDef::new(Users::ProfileImageUrl).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Matches::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Matches::ExternalId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Matches::HomeTeam).string().not_null())
                    .col(ColumnDef::new(Matches::AwayTeam).string().not_null())
                    .col(ColumnDef::new(Matches::MatchDate).timestamp().not_null())
                    .col(ColumnDef::new(Matches::Status).text().not_null().default("SCHEDULED"))
                    .col(ColumnDef::new(Matches::ScoreHome).integer())
                    .col(ColumnDef::new(Matches::ScoreAway).integer())
                    .col(ColumnDef::new(Matches::Description).text())
                    .to_owned(),
            )
            .await?;

        // Liste des matchs triée par date
        manager
            .create_index(
                Index::create()
                    .name("idx_matches_match_date")
                    .table(Matches::Table)
                    .col(Matches::MatchDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    EmailVerified,
    VerificationToken,
    VerificationTokenExpiresAt,
    ProfileImageUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Matches {
    Table,
    Id,
    ExternalId,
    HomeTeam,
    AwayTeam,
    MatchDate,
    Status,
    ScoreHome,
    ScoreAway,
    Description,
}
