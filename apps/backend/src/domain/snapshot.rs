//! Client-facing views. `GameSnapshot` is the REST-visible persisted
//! record; `TableStateView` is the live, hand-masked view pushed over
//! the realtime connection — the only place a player's own hand and
//! everyone else's card counts sit side by side.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::cards::{Card, Suit};
use crate::domain::state::{Phase, Seat, SessionState, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub user: UserRef,
    pub seat_number: Seat,
    pub total_score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundScoreEntry {
    pub user_id: UserId,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    pub id: i64,
    pub round_number: i32,
    pub scores: Vec<RoundScoreEntry>,
}

/// The persisted, REST-visible record of a table: current standings and
/// completed-round history. Carries no in-progress hand/trick state.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub id: i64,
    pub status: String,
    pub created_at: time::OffsetDateTime,
    pub players: Vec<PlayerSnapshot>,
    pub winner: Option<UserRef>,
    pub rounds: Vec<RoundSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrickCardView {
    pub user_id: UserId,
    pub card: Card,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub seat_number: Seat,
    pub user_id: UserId,
    pub card_count: usize,
}

/// The live view of an in-progress table as seen by one specific
/// viewer: their own hand in full, everyone else reduced to a seat and
/// a card count.
#[derive(Debug, Clone, Serialize)]
pub struct TableStateView {
    pub round_number: u32,
    pub phase: Phase,
    pub seats: Vec<SeatView>,
    pub hand: Vec<Card>,
    pub current_trick: Vec<TrickCardView>,
    pub lead_suit: Option<Suit>,
    pub turn_user_id: Option<UserId>,
    pub hearts_broken: bool,
    pub round_scores: BTreeMap<UserId, u32>,
    pub has_passed: bool,
}

/// Builds the masked view for `viewer_id`: their hand is included in
/// full, every other hand is collapsed to a count.
pub fn view_for(state: &SessionState, viewer_id: UserId) -> TableStateView {
    let seats = state
        .seats
        .iter()
        .map(|(&seat_number, &user_id)| SeatView {
            seat_number,
            user_id,
            card_count: state.hand_of(user_id).len(),
        })
        .collect();

    TableStateView {
        round_number: state.round_number,
        phase: state.phase,
        seats,
        hand: state.hand_of(viewer_id).to_vec(),
        current_trick: state
            .current_trick
            .iter()
            .map(|e| TrickCardView { user_id: e.user_id, card: e.card })
            .collect(),
        lead_suit: state.lead_suit,
        turn_user_id: state.turn_user_id,
        hearts_broken: state.hearts_broken,
        round_scores: state.round_scores.clone(),
        has_passed: state.passed_cards.get(&viewer_id).is_some_and(|c| !c.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scoring::start_round;

    #[test]
    fn view_masks_other_hands() {
        let seats = BTreeMap::from([(1, 10), (2, 20), (3, 30), (4, 40)]);
        let state = start_round(1, seats);
        let view = view_for(&state, 10);
        assert_eq!(view.hand.len(), 13);
        for seat in &view.seats {
            if seat.user_id != 10 {
                assert_eq!(seat.card_count, 13);
            }
        }
    }
}
