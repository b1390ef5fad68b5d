//! Repository: the narrow CRUD surface the core consumes, one function
//! per external-interface bullet, generic over `ConnectionTrait` so
//! callers can pass either a pooled connection or an open transaction.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::sea_orm_active_enums::GameStatus;
use crate::entities::{game_players, games, round_scores, rounds, users};
use crate::error::AppError;
use crate::errors::ErrorCode;

/// A waiting table along with its currently seated players, as needed
/// by matchmaking to find the lowest free seat.
pub struct WaitingGame {
    pub game: games::Model,
    pub players: Vec<game_players::Model>,
}

/// A table's full roster, as needed to build a game snapshot.
pub struct GameWithPlayers {
    pub game: games::Model,
    pub players: Vec<game_players::Model>,
}

pub async fn get_user_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find_by_id(id).one(db).await?)
}

/// Waiting tables that do not already seat `excluding_user`, oldest
/// first, with their current roster attached.
pub async fn find_waiting_games<C: ConnectionTrait>(db: &C, excluding_user: i64) -> Result<Vec<WaitingGame>, AppError> {
    let waiting = games::Entity::find()
        .filter(games::Column::Status.eq(GameStatus::Waiting))
        .order_by_asc(games::Column::CreatedAt)
        .all(db)
        .await?;

    let mut out = Vec::with_capacity(waiting.len());
    for game in waiting {
        let players = game_players::Entity::find()
            .filter(game_players::Column::GameId.eq(game.id))
            .all(db)
            .await?;
        if players.iter().any(|p| p.user_id == excluding_user) {
            continue;
        }
        out.push(WaitingGame { game, players });
    }
    Ok(out)
}

/// The non-finished game (if any) `user_id` already holds a seat at,
/// regardless of whether it's still waiting or already in progress.
/// Matchmaking must check this before seating a user anywhere new, or
/// two `find_or_create` calls racing the same table fill can seat the
/// same user twice.
pub async fn find_active_seat_for_user<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Option<i64>, AppError> {
    let row = game_players::Entity::find()
        .filter(game_players::Column::UserId.eq(user_id))
        .find_also_related(games::Entity)
        .all(db)
        .await?
        .into_iter()
        .find(|(_, game)| matches!(game, Some(g) if g.status != GameStatus::Finished));
    Ok(row.map(|(player, _)| player.game_id))
}

pub async fn get_game<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<GameWithPlayers>, AppError> {
    let Some(game) = games::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let players = game_players::Entity::find()
        .filter(game_players::Column::GameId.eq(game.id))
        .all(db)
        .await?;
    Ok(Some(GameWithPlayers { game, players }))
}

pub async fn create_game<C: ConnectionTrait>(db: &C) -> Result<games::Model, AppError> {
    let active = games::ActiveModel {
        status: Set(GameStatus::Waiting),
        winner_user_id: Set(None),
        created_at: Set(time::OffsetDateTime::now_utc().into()),
        ..Default::default()
    };
    Ok(active.insert(db).await?)
}

pub async fn seat_player<C: ConnectionTrait>(
    db: &C,
    game_id: i64,
    user_id: i64,
    seat: i16,
) -> Result<game_players::Model, AppError> {
    let active = game_players::ActiveModel {
        game_id: Set(game_id),
        user_id: Set(user_id),
        seat_number: Set(seat),
        total_score: Set(0),
        ..Default::default()
    };
    Ok(active.insert(db).await?)
}

pub async fn update_game_status<C: ConnectionTrait>(db: &C, game_id: i64, status: GameStatus) -> Result<(), AppError> {
    let Some(game) = games::Entity::find_by_id(game_id).one(db).await? else {
        return Err(AppError::not_found(ErrorCode::GameNotFound, "Game not found"));
    };
    let mut active: games::ActiveModel = game.into();
    active.status = Set(status);
    active.update(db).await?;
    Ok(())
}

pub async fn end_game<C: ConnectionTrait>(db: &C, game_id: i64, winner_id: Option<i64>) -> Result<(), AppError> {
    let Some(game) = games::Entity::find_by_id(game_id).one(db).await? else {
        return Err(AppError::not_found(ErrorCode::GameNotFound, "Game not found"));
    };
    let mut active: games::ActiveModel = game.into();
    active.status = Set(GameStatus::Finished);
    active.winner_user_id = Set(winner_id);
    active.update(db).await?;
    Ok(())
}

pub async fn create_round<C: ConnectionTrait>(db: &C, game_id: i64, round_number: i32) -> Result<rounds::Model, AppError> {
    let active = rounds::ActiveModel {
        game_id: Set(game_id),
        round_number: Set(round_number),
        ..Default::default()
    };
    Ok(active.insert(db).await?)
}

pub async fn record_round_score<C: ConnectionTrait>(db: &C, round_id: i64, user_id: i64, delta: i64) -> Result<(), AppError> {
    let active = round_scores::ActiveModel {
        round_id: Set(round_id),
        user_id: Set(user_id),
        score_delta: Set(delta),
        ..Default::default()
    };
    active.insert(db).await?;
    Ok(())
}

/// Adds `delta` to a seated player's running total, identified by the
/// (game, user) pair that uniquely determines their `game_players` row.
pub async fn add_total_score<C: ConnectionTrait>(db: &C, game_id: i64, user_id: i64, delta: i64) -> Result<(), AppError> {
    game_players::Entity::update_many()
        .col_expr(game_players::Column::TotalScore, Expr::col(game_players::Column::TotalScore).add(delta))
        .filter(game_players::Column::GameId.eq(game_id))
        .filter(game_players::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}
