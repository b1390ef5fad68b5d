//! Per-table coordination: matchmaking, connection join, and the
//! load -> validate -> mutate -> save -> broadcast cycle for every
//! inbound client message. The table lock is held across that full
//! cycle except the inter-trick pause, which releases and re-acquires
//! it so a slow trick never blocks other tables or other messages on
//! unrelated connections. Every store/repo call in that cycle goes
//! through `retry_or_fatal`, which retries once and closes the table
//! for good on a second failure.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::warn;

use crate::domain::cards::Card;
use crate::domain::scoring;
use crate::domain::snapshot::{self, GameSnapshot, PlayerSnapshot, RoundScoreEntry, RoundSnapshot, TableStateView, TrickCardView, UserRef};
use crate::domain::state::{Phase, Seat, SessionState, UserId};
use crate::entities::sea_orm_active_enums::GameStatus;
use crate::entities::{game_players, round_scores, rounds};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos;
use crate::state::app_state::AppState;
use crate::ws::protocol::ClientEvent;
use crate::ws::protocol::ServerEvent;
use crate::ws::session::Push;

const SEATS: usize = 4;
const TRICK_PAUSE: Duration = Duration::from_millis(2500);
const RECONNECT_GRACE: Duration = Duration::from_secs(30);

/// Runs a store/repository call, retrying once on failure. A second
/// failure is fatal for the table: it is marked `finished` with no
/// winner, every live connection is detached, and the session state is
/// dropped, since the load -> validate -> mutate -> save -> broadcast
/// cycle cannot be trusted to resume cleanly mid-way through.
async fn retry_or_fatal<T, F, Fut>(state: &AppState, table_id: i64, op: F) -> Result<T, AppError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    match op().await {
        Ok(v) => Ok(v),
        Err(first_err) => {
            warn!(table_id, error = %first_err, "store/repo call failed, retrying once");
            match op().await {
                Ok(v) => Ok(v),
                Err(second_err) => {
                    warn!(table_id, error = %second_err, "store/repo call failed twice, closing table");
                    fatal_close_table(state, table_id).await;
                    Err(second_err)
                }
            }
        }
    }
}

async fn fatal_close_table(state: &AppState, table_id: i64) {
    if let Ok(db) = state.require_db() {
        if let Err(e) = repos::end_game(db, table_id, None).await {
            warn!(table_id, error = %e, "failed to mark table finished after fatal store error");
        }
    }
    state.registry.broadcast(
        table_id,
        Push(ServerEvent::Error { message: "A server error interrupted this game.".to_string() }),
    );
    state.registry.detach_all(table_id);
    if let Err(e) = state.store.delete(table_id).await {
        warn!(table_id, error = %e, "failed to clear session state after fatal store error");
    }
    state.forget_table(table_id);
}

/// Seats `user_id` at the lowest-numbered free seat of the oldest
/// under-full waiting table, or creates a new one and seats them at
/// seat 1. Returns the resulting snapshot and whether a table was
/// created (for the REST layer's 201-vs-200 choice).
pub async fn find_or_create(state: &AppState, user_id: UserId) -> Result<(GameSnapshot, bool), AppError> {
    let db = state.require_db()?;

    if let Some(existing_game_id) = repos::find_active_seat_for_user(db, user_id).await? {
        let snapshot = build_snapshot(state, existing_game_id).await?;
        return Ok((snapshot, false));
    }

    let waiting = repos::find_waiting_games(db, user_id).await?;
    let target = waiting.into_iter().find(|candidate| candidate.players.len() < SEATS);

    let (game_id, created) = match target {
        Some(candidate) => {
            let taken: HashSet<i16> = candidate.players.iter().map(|p| p.seat_number).collect();
            let seat = (1..=SEATS as i16).find(|s| !taken.contains(s)).expect("under-full table has a free seat");
            repos::seat_player(db, candidate.game.id, user_id, seat).await?;
            (candidate.game.id, false)
        }
        None => {
            let game = repos::create_game(db).await?;
            repos::seat_player(db, game.id, user_id, 1).await?;
            (game.id, true)
        }
    };

    let with_players = repos::get_game(db, game_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::GameNotFound, "Game not found"))?;

    if with_players.players.len() == SEATS {
        repos::update_game_status(db, game_id, GameStatus::InProgress).await?;
        start_first_round(state, game_id, &with_players.players).await?;
    }

    let snapshot = build_snapshot(state, game_id).await?;
    Ok((snapshot, created))
}

async fn start_first_round(state: &AppState, game_id: i64, players: &[game_players::Model]) -> Result<(), AppError> {
    let seats: BTreeMap<Seat, UserId> = players.iter().map(|p| (p.seat_number, p.user_id)).collect();
    let session = scoring::start_round(1, seats);
    state.store.save(game_id, &session).await?;
    Ok(())
}

/// Builds the REST-visible `GameSnapshot` from persisted state.
pub async fn build_snapshot(state: &AppState, game_id: i64) -> Result<GameSnapshot, AppError> {
    let db = state.require_db()?;
    let with_players = repos::get_game(db, game_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::GameNotFound, "Game not found"))?;

    let mut players = Vec::with_capacity(with_players.players.len());
    for p in &with_players.players {
        let user = repos::get_user_by_id(db, p.user_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("seated user {} missing from users table", p.user_id)))?;
        players.push(PlayerSnapshot {
            user: UserRef { id: user.id, username: user.username },
            seat_number: p.seat_number,
            total_score: p.total_score,
        });
    }
    players.sort_by_key(|p| p.seat_number);

    let winner = match with_players.game.winner_user_id {
        Some(uid) => {
            let user = repos::get_user_by_id(db, uid)
                .await?
                .ok_or_else(|| AppError::internal("winner missing from users table"))?;
            Some(UserRef { id: user.id, username: user.username })
        }
        None => None,
    };

    let round_rows = rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .order_by_asc(rounds::Column::RoundNumber)
        .all(db)
        .await?;
    let mut round_snapshots = Vec::with_capacity(round_rows.len());
    for round in round_rows {
        let scores = round_scores::Entity::find()
            .filter(round_scores::Column::RoundId.eq(round.id))
            .all(db)
            .await?;
        round_snapshots.push(RoundSnapshot {
            id: round.id,
            round_number: round.round_number,
            scores: scores.into_iter().map(|s| RoundScoreEntry { user_id: s.user_id, score: s.score_delta }).collect(),
        });
    }

    Ok(GameSnapshot {
        id: with_players.game.id,
        status: match with_players.game.status {
            GameStatus::Waiting => "waiting".to_string(),
            GameStatus::InProgress => "in_progress".to_string(),
            GameStatus::Finished => "finished".to_string(),
        },
        created_at: with_players.game.created_at.into(),
        players,
        winner,
        rounds: round_snapshots,
    })
}

/// Called when a connection's actor starts: the user must already hold
/// a seat (the caller is expected to turn `NotSeated` into a 1008
/// close), and every currently connected viewer gets a refreshed
/// `player_update`.
pub async fn on_connect(state: &AppState, table_id: i64, user_id: UserId) -> Result<(), AppError> {
    let db = state.require_db()?;
    let with_players = repos::get_game(db, table_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::GameNotFound, "Game not found"))?;
    if !with_players.players.iter().any(|p| p.user_id == user_id) {
        return Err(AppError::NotSeated);
    }

    let lock = state.table_lock(table_id);
    let _guard = lock.lock().await;

    if with_players.players.len() == SEATS
        && state.registry.connected_count(table_id) == SEATS
        && retry_or_fatal(state, table_id, || async { state.store.load(table_id).await }).await?.is_none()
    {
        start_first_round(state, table_id, &with_players.players).await?;
    }

    broadcast_player_update(state, table_id).await
}

/// Called from the session actor's `stopping` hook, after it has
/// already detached from the registry.
pub async fn on_disconnect(state: &AppState, table_id: i64, user_id: UserId) {
    if let Err(e) = broadcast_player_update(state, table_id).await {
        warn!(table_id, user_id, error = %e, "failed to broadcast player_update after disconnect");
    }
    schedule_grace_cleanup(state.clone(), table_id);
}

fn schedule_grace_cleanup(state: AppState, table_id: i64) {
    actix::spawn(async move {
        if state.registry.connected_count(table_id) > 0 {
            return;
        }
        tokio::time::sleep(RECONNECT_GRACE).await;
        if state.registry.connected_count(table_id) == 0 {
            if let Err(e) = state.store.delete(table_id).await {
                warn!(table_id, error = %e, "failed to clear session state after grace window");
            }
            state.forget_table(table_id);
        }
    });
}

pub async fn handle_client_event(state: &AppState, table_id: i64, user_id: UserId, event: ClientEvent) {
    let result = match event {
        ClientEvent::RequestInitialState => send_initial_state(state, table_id, user_id).await,
        ClientEvent::PassCards { cards } => handle_pass_cards(state, table_id, user_id, cards).await,
        ClientEvent::PlayCard { card } => handle_play_card(state, table_id, user_id, card).await,
    };
    if let Err(e) = result {
        warn!(table_id, user_id, error = %e, "failed to handle client event");
    }
}

async fn send_initial_state(state: &AppState, table_id: i64, user_id: UserId) -> Result<(), AppError> {
    let lock = state.table_lock(table_id);
    let session = {
        let _guard = lock.lock().await;
        retry_or_fatal(state, table_id, || async { state.store.load(table_id).await }).await?
    };
    if let Some(session) = session {
        let view = snapshot::view_for(&session, user_id);
        state.registry.send(table_id, user_id, Push(ServerEvent::PlayerUpdate { state: view }));
    }
    Ok(())
}

async fn handle_pass_cards(state: &AppState, table_id: i64, user_id: UserId, cards: Vec<Card>) -> Result<(), AppError> {
    let lock = state.table_lock(table_id);
    let _guard = lock.lock().await;

    let mut session =
        retry_or_fatal(state, table_id, || async { state.store.load(table_id).await }).await?.ok_or(AppError::NotSeated)?;
    match crate::domain::rules::submit_pass(&mut session, user_id, cards) {
        Ok(all_submitted) => {
            if all_submitted {
                scoring::resolve_pass(&mut session)
                    .map_err(|e| AppError::internal(format!("pass resolution failed: {e}")))?;
            }
            retry_or_fatal(state, table_id, || async { state.store.save(table_id, &session).await }).await?;
            if all_submitted {
                broadcast_masked(state, table_id, &session, |view| ServerEvent::CardsPassedUpdate { state: view }).await;
                if let Some(starter) = session.turn_user_id {
                    state.registry.broadcast(table_id, Push(ServerEvent::YourTurn { user_id: starter }));
                }
            }
        }
        Err(domain_err) => {
            state.registry.send(table_id, user_id, Push(ServerEvent::Error { message: domain_err.message().to_string() }));
        }
    }
    Ok(())
}

async fn handle_play_card(state: &AppState, table_id: i64, user_id: UserId, card: Card) -> Result<(), AppError> {
    let lock = state.table_lock(table_id);
    let mut guard = lock.lock().await;

    let mut session =
        retry_or_fatal(state, table_id, || async { state.store.load(table_id).await }).await?.ok_or(AppError::NotSeated)?;
    if let Err(domain_err) = crate::domain::rules::apply_play(&mut session, user_id, card) {
        state.registry.send(table_id, user_id, Push(ServerEvent::Error { message: domain_err.message().to_string() }));
        return Ok(());
    }

    retry_or_fatal(state, table_id, || async { state.store.save(table_id, &session).await }).await?;
    state.registry.broadcast(
        table_id,
        Push(ServerEvent::CardPlayed {
            player_id: user_id,
            card,
            current_trick: session.current_trick.iter().map(|e| TrickCardView { user_id: e.user_id, card: e.card }).collect(),
        }),
    );

    let outcome = scoring::complete_trick_if_full(&mut session)
        .map_err(|e| AppError::internal(format!("trick completion failed: {e}")))?;
    let Some(outcome) = outcome else {
        return Ok(());
    };

    retry_or_fatal(state, table_id, || async { state.store.save(table_id, &session).await }).await?;
    state.registry.broadcast(table_id, Push(ServerEvent::TrickEnd { winner_id: outcome.winner, points: outcome.points }));

    // The pause applies unconditionally between trick_end and whatever
    // comes next, whether that's the next trick or the end of the round.
    drop(guard);
    tokio::time::sleep(TRICK_PAUSE).await;
    guard = lock.lock().await;

    let session =
        retry_or_fatal(state, table_id, || async { state.store.load(table_id).await }).await?.ok_or(AppError::NotSeated)?;

    if !scoring::is_round_complete(&session) {
        if let Some(starter) = session.turn_user_id {
            state.registry.broadcast(table_id, Push(ServerEvent::YourTurn { user_id: starter }));
        }
        drop(guard);
        return Ok(());
    }

    let deltas = scoring::round_deltas(&session);
    finish_round(state, table_id, &session, deltas).await?;
    drop(guard);
    Ok(())
}

async fn finish_round(state: &AppState, table_id: i64, session: &SessionState, deltas: BTreeMap<UserId, i64>) -> Result<(), AppError> {
    let round = retry_or_fatal(state, table_id, || async {
        let db = state.require_db()?;
        repos::create_round(db, table_id, session.round_number as i32).await
    })
    .await?;
    for (&user_id, &delta) in &deltas {
        retry_or_fatal(state, table_id, || async {
            let db = state.require_db()?;
            repos::record_round_score(db, round.id, user_id, delta).await
        })
        .await?;
        retry_or_fatal(state, table_id, || async {
            let db = state.require_db()?;
            repos::add_total_score(db, table_id, user_id, delta).await
        })
        .await?;
    }

    let with_players = retry_or_fatal(state, table_id, || async {
        let db = state.require_db()?;
        repos::get_game(db, table_id).await?.ok_or_else(|| AppError::not_found(ErrorCode::GameNotFound, "Game not found"))
    })
    .await?;
    let totals: BTreeMap<UserId, i64> = with_players.players.iter().map(|p| (p.user_id, p.total_score)).collect();
    let seats: BTreeMap<Seat, UserId> = with_players.players.iter().map(|p| (p.seat_number, p.user_id)).collect();

    state.registry.broadcast(
        table_id,
        Push(ServerEvent::RoundEndSummary { round_number: session.round_number, deltas, totals: totals.clone() }),
    );

    if scoring::is_game_over(&totals) {
        let winner = scoring::determine_winner(&totals, &seats);
        retry_or_fatal(state, table_id, || async {
            let db = state.require_db()?;
            repos::end_game(db, table_id, winner).await
        })
        .await?;
        retry_or_fatal(state, table_id, || async { state.store.delete(table_id).await }).await?;
        state.forget_table(table_id);
        if let Some(winner_id) = winner {
            state.registry.broadcast(table_id, Push(ServerEvent::GameOver { winner_id, totals }));
        }
        return Ok(());
    }

    let next = scoring::start_round(session.round_number + 1, seats);
    let is_playing = next.phase == Phase::Playing;
    let starter = next.turn_user_id;
    retry_or_fatal(state, table_id, || async { state.store.save(table_id, &next).await }).await?;
    broadcast_masked(state, table_id, &next, |view| ServerEvent::PlayerUpdate { state: view }).await;
    if is_playing {
        if let Some(starter) = starter {
            state.registry.broadcast(table_id, Push(ServerEvent::YourTurn { user_id: starter }));
        }
    }
    Ok(())
}

async fn broadcast_player_update(state: &AppState, table_id: i64) -> Result<(), AppError> {
    if let Some(session) = retry_or_fatal(state, table_id, || async { state.store.load(table_id).await }).await? {
        broadcast_masked(state, table_id, &session, |view| ServerEvent::PlayerUpdate { state: view }).await;
    }
    Ok(())
}

async fn broadcast_masked(state: &AppState, table_id: i64, session: &SessionState, make: impl Fn(TableStateView) -> ServerEvent) {
    for uid in state.registry.connected_users(table_id) {
        let view = snapshot::view_for(session, uid);
        state.registry.send(table_id, uid, Push(make(view)));
    }
}
