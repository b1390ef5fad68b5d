//! Redis-backed `SessionStore`: one hash per table at `game:{id}:state`.
//! Complex fields are JSON-encoded strings; scalars are string-coerced
//! hash fields, mirroring the original implementation's
//! `redis_client.hset`/`hgetall` usage.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::state::{Phase, PassDirection, SessionState};
use crate::error::AppError;
use crate::store::SessionStore;

fn table_key(table_id: i64) -> String {
    format!("game:{table_id}:state")
}

pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, table_id: i64) -> Result<Option<SessionState>, AppError> {
        let mut conn = self.conn.clone();
        let raw: std::collections::HashMap<String, String> = conn.hgetall(table_key(table_id)).await?;
        if raw.is_empty() {
            return Ok(None);
        }

        let field = |name: &str| -> Result<&str, AppError> {
            raw.get(name).map(String::as_str).ok_or_else(|| {
                AppError::internal(format!("session store hash missing field `{name}` for table {table_id}"))
            })
        };
        let json_field = |name: &str| -> Result<_, AppError> {
            serde_json::from_str(field(name)?)
                .map_err(|e| AppError::internal(format!("corrupt `{name}` for table {table_id}: {e}")))
        };

        let state = SessionState {
            round_number: field("round_number")?.parse().map_err(|_| bad_scalar(table_id, "round_number"))?,
            phase: parse_phase(field("phase")?, table_id)?,
            seats: json_field("seats")?,
            hands: json_field("hands")?,
            passed_cards: json_field("passed_cards")?,
            pass_direction: parse_direction(field("pass_direction")?, table_id)?,
            current_trick: json_field("current_trick")?,
            lead_suit: parse_opt_suit(field("lead_suit")?, table_id)?,
            turn_user_id: parse_opt_i64(field("turn_user_id")?, table_id)?,
            trick_starter_id: parse_opt_i64(field("trick_starter_id")?, table_id)?,
            round_scores: json_field("round_scores")?,
            hearts_broken: field("hearts_broken")? == "true",
            tricks_completed: field("tricks_completed")?.parse().map_err(|_| bad_scalar(table_id, "tricks_completed"))?,
        };
        Ok(Some(state))
    }

    async fn save(&self, table_id: i64, state: &SessionState) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let pairs: Vec<(&str, String)> = vec![
            ("round_number", state.round_number.to_string()),
            ("phase", render_phase(state.phase)),
            ("seats", serde_json::to_string(&state.seats)?),
            ("hands", serde_json::to_string(&state.hands)?),
            ("passed_cards", serde_json::to_string(&state.passed_cards)?),
            ("pass_direction", render_direction(state.pass_direction)),
            ("current_trick", serde_json::to_string(&state.current_trick)?),
            ("lead_suit", render_opt_suit(state.lead_suit)),
            ("turn_user_id", render_opt_i64(state.turn_user_id)),
            ("trick_starter_id", render_opt_i64(state.trick_starter_id)),
            ("round_scores", serde_json::to_string(&state.round_scores)?),
            ("hearts_broken", state.hearts_broken.to_string()),
            ("tricks_completed", state.tricks_completed.to_string()),
        ];
        let _: () = conn.hset_multiple(table_key(table_id), &pairs).await?;
        Ok(())
    }

    async fn delete(&self, table_id: i64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(table_key(table_id)).await?;
        Ok(())
    }
}

fn bad_scalar(table_id: i64, field: &str) -> AppError {
    AppError::internal(format!("corrupt `{field}` for table {table_id}"))
}

fn render_phase(phase: Phase) -> String {
    match phase {
        Phase::Passing => "passing".to_string(),
        Phase::Playing => "playing".to_string(),
    }
}

fn parse_phase(s: &str, table_id: i64) -> Result<Phase, AppError> {
    match s {
        "passing" => Ok(Phase::Passing),
        "playing" => Ok(Phase::Playing),
        _ => Err(bad_scalar(table_id, "phase")),
    }
}

fn render_direction(dir: PassDirection) -> String {
    match dir {
        PassDirection::Left => "left".to_string(),
        PassDirection::Right => "right".to_string(),
        PassDirection::Across => "across".to_string(),
        PassDirection::Hold => "hold".to_string(),
    }
}

fn parse_direction(s: &str, table_id: i64) -> Result<PassDirection, AppError> {
    match s {
        "left" => Ok(PassDirection::Left),
        "right" => Ok(PassDirection::Right),
        "across" => Ok(PassDirection::Across),
        "hold" => Ok(PassDirection::Hold),
        _ => Err(bad_scalar(table_id, "pass_direction")),
    }
}

fn render_opt_suit(suit: Option<crate::domain::cards::Suit>) -> String {
    match suit {
        None => "none".to_string(),
        Some(crate::domain::cards::Suit::Clubs) => "clubs".to_string(),
        Some(crate::domain::cards::Suit::Diamonds) => "diamonds".to_string(),
        Some(crate::domain::cards::Suit::Hearts) => "hearts".to_string(),
        Some(crate::domain::cards::Suit::Spades) => "spades".to_string(),
    }
}

fn parse_opt_suit(s: &str, table_id: i64) -> Result<Option<crate::domain::cards::Suit>, AppError> {
    use crate::domain::cards::Suit;
    match s {
        "none" => Ok(None),
        "clubs" => Ok(Some(Suit::Clubs)),
        "diamonds" => Ok(Some(Suit::Diamonds)),
        "hearts" => Ok(Some(Suit::Hearts)),
        "spades" => Ok(Some(Suit::Spades)),
        _ => Err(bad_scalar(table_id, "lead_suit")),
    }
}

fn render_opt_i64(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "none".to_string())
}

fn parse_opt_i64(s: &str, table_id: i64) -> Result<Option<i64>, AppError> {
    if s == "none" {
        return Ok(None);
    }
    s.parse().map(Some).map_err(|_| bad_scalar(table_id, "user id field"))
}
