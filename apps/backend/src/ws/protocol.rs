//! Wire protocol: one tagged JSON object per frame, `event` naming the
//! variant. `ClientEvent` is what the coordinator accepts inbound;
//! `ServerEvent` is everything it can push back, whether addressed to a
//! single connection or broadcast to the whole table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::snapshot::{TableStateView, TrickCardView};
use crate::domain::state::UserId;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    RequestInitialState,
    PassCards { cards: Vec<Card> },
    PlayCard { card: Card },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent privately to one connection: the reply to
    /// `request_initial_state`, and the per-recipient payload of every
    /// broadcast that carries hand data (hands are masked per viewer).
    PlayerUpdate { state: TableStateView },
    CardsPassedUpdate { state: TableStateView },
    YourTurn { user_id: UserId },
    CardPlayed { player_id: UserId, card: Card, current_trick: Vec<TrickCardView> },
    /// Normally sent privately to the offending connection only, with
    /// state unchanged and nobody else notified. Also broadcast
    /// table-wide, as a terminal notice, when a store/repository failure
    /// forces the table closed.
    Error { message: String },
    TrickEnd { winner_id: UserId, points: u32 },
    RoundEndSummary {
        round_number: u32,
        deltas: BTreeMap<UserId, i64>,
        totals: BTreeMap<UserId, i64>,
    },
    GameOver { winner_id: UserId, totals: BTreeMap<UserId, i64> },
}
