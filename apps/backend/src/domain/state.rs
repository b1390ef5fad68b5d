//! Session State: the full volatile record of an in-progress table, held
//! in the session store (`store::SessionStore`) keyed by table id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;

pub type UserId = i64;
pub type Seat = i16; // 1..=4

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Passing,
    Playing,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassDirection {
    Left,
    Right,
    Across,
    Hold,
}

impl PassDirection {
    /// For round_number r, direction is element `((r-1) mod 4)` of
    /// [left, right, across, hold].
    pub fn for_round(round_number: u32) -> PassDirection {
        match (round_number - 1) % 4 {
            0 => PassDirection::Left,
            1 => PassDirection::Right,
            2 => PassDirection::Across,
            _ => PassDirection::Hold,
        }
    }

    /// Recipient seat for a sender seat under this direction. Panics on
    /// `Hold`, which the caller must special-case (passing is skipped).
    pub fn recipient(&self, sender: Seat) -> Seat {
        match self {
            PassDirection::Left => (sender % 4) + 1,
            PassDirection::Right => ((sender + 2) % 4) + 1,
            PassDirection::Across => ((sender + 1) % 4) + 1,
            PassDirection::Hold => unreachable!("hold rounds never resolve a pass"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrickEntry {
    pub user_id: UserId,
    pub card: Card,
}

/// The full volatile record of an in-progress table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub round_number: u32,
    pub phase: Phase,
    /// seat -> user id, fixed for the life of the table.
    pub seats: BTreeMap<Seat, UserId>,
    pub hands: BTreeMap<UserId, Vec<Card>>,
    /// Only populated during the passing phase; 0 or 3 cards per user.
    pub passed_cards: BTreeMap<UserId, Vec<Card>>,
    pub pass_direction: PassDirection,
    pub current_trick: Vec<TrickEntry>,
    pub lead_suit: Option<crate::domain::cards::Suit>,
    pub turn_user_id: Option<UserId>,
    pub trick_starter_id: Option<UserId>,
    pub round_scores: BTreeMap<UserId, u32>,
    pub hearts_broken: bool,
    /// Number of tricks completed so far this round; 0 until the first
    /// trick resolves. Used to identify the first trick for the
    /// lead-with-two-of-clubs and no-points-on-first-trick rules.
    pub tricks_completed: u8,
}

impl SessionState {
    pub fn seat_of(&self, user_id: UserId) -> Option<Seat> {
        self.seats.iter().find(|(_, &u)| u == user_id).map(|(&s, _)| s)
    }

    pub fn user_at_seat(&self, seat: Seat) -> Option<UserId> {
        self.seats.get(&seat).copied()
    }

    pub fn hand_of(&self, user_id: UserId) -> &[Card] {
        self.hands.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True exactly before any card of the round has been played: every
    /// hand still holds 13 cards and nothing is in the current trick.
    pub fn is_first_play_of_round(&self) -> bool {
        self.current_trick.is_empty() && self.hands.values().all(|h| h.len() == 13)
    }

    /// True while the first trick of the round is being played or has
    /// just completed scoring.
    pub fn is_first_trick_of_round(&self) -> bool {
        self.tricks_completed == 0
    }
}
