use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::extension::postgres::Type as PgType;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    CreatedAt,
}

#[derive(Iden)]
enum Games {
    Table,
    Id,
    Status,
    WinnerUserId,
    CreatedAt,
}

#[derive(Iden)]
enum GameStatusEnum {
    #[iden = "game_status"]
    Type,
    #[iden = "waiting"]
    Waiting,
    #[iden = "in_progress"]
    InProgress,
    #[iden = "finished"]
    Finished,
}

#[derive(Iden)]
enum GamePlayers {
    Table,
    Id,
    GameId,
    UserId,
    SeatNumber,
    TotalScore,
}

#[derive(Iden)]
enum Rounds {
    Table,
    Id,
    GameId,
    RoundNumber,
}

#[derive(Iden)]
enum RoundScores {
    Table,
    Id,
    RoundId,
    UserId,
    ScoreDelta,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                PgType::create()
                    .as_enum(GameStatusEnum::Type)
                    .values([GameStatusEnum::Waiting, GameStatusEnum::InProgress, GameStatusEnum::Finished])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Games::Status).custom(GameStatusEnum::Type).not_null())
                    .col(ColumnDef::new(Games::WinnerUserId).big_integer().null())
                    .col(ColumnDef::new(Games::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_winner_user")
                            .from(Games::Table, Games::WinnerUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GamePlayers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GamePlayers::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(GamePlayers::GameId).big_integer().not_null())
                    .col(ColumnDef::new(GamePlayers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(GamePlayers::SeatNumber).small_integer().not_null())
                    .col(ColumnDef::new(GamePlayers::TotalScore).big_integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_game")
                            .from(GamePlayers::Table, GamePlayers::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_user")
                            .from(GamePlayers::Table, GamePlayers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_players_game_user")
                    .table(GamePlayers::Table)
                    .col(GamePlayers::GameId)
                    .col(GamePlayers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_players_game_seat")
                    .table(GamePlayers::Table)
                    .col(GamePlayers::GameId)
                    .col(GamePlayers::SeatNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rounds::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Rounds::GameId).big_integer().not_null())
                    .col(ColumnDef::new(Rounds::RoundNumber).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_game")
                            .from(Rounds::Table, Rounds::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rounds_game_round_number")
                    .table(Rounds::Table)
                    .col(Rounds::GameId)
                    .col(Rounds::RoundNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoundScores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoundScores::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(RoundScores::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(RoundScores::UserId).big_integer().not_null())
                    .col(ColumnDef::new(RoundScores::ScoreDelta).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_scores_round")
                            .from(RoundScores::Table, RoundScores::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_scores_user")
                            .from(RoundScores::Table, RoundScores::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(RoundScores::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Rounds::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(GamePlayers::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Games::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        manager.drop_type(PgType::drop().name(GameStatusEnum::Type).to_owned()).await?;
        Ok(())
    }
}
