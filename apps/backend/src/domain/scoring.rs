//! Trick/round/game completion and round setup. Pure functions over
//! `SessionState`; shuffling is the only place randomness enters.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use crate::domain::cards::{full_deck, trick_winner, Card};
use crate::domain::errors::DomainError;
use crate::domain::state::{Phase, PassDirection, Seat, SessionState, UserId};

pub const GAME_OVER_THRESHOLD: i64 = 100;
const HAND_SIZE: usize = 13;

/// Outcome of a trick that just completed: who won it and how many
/// points it carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrickOutcome {
    pub winner: UserId,
    pub points: u32,
}

/// Deals a fresh round: shuffles the deck, gives each seated user 13
/// cards, and sets phase/turn according to the round's pass direction.
/// `Hold` rounds skip straight to play; all others start in `Passing`
/// with an empty hand of passed cards per user.
pub fn start_round(round_number: u32, seats: BTreeMap<Seat, UserId>) -> SessionState {
    let mut deck = full_deck();
    deck.shuffle(&mut rand::rng());

    let mut hands: BTreeMap<UserId, Vec<Card>> = BTreeMap::new();
    for (seat, &user_id) in &seats {
        let start = (*seat as usize - 1) * HAND_SIZE;
        let mut hand: Vec<Card> = deck[start..start + HAND_SIZE].to_vec();
        hand.sort();
        hands.insert(user_id, hand);
    }

    let direction = PassDirection::for_round(round_number);
    let (phase, turn_user_id, passed_cards) = if direction == PassDirection::Hold {
        let starter = holder_of_two_of_clubs(&hands);
        (Phase::Playing, starter, BTreeMap::new())
    } else {
        let passed = seats.values().map(|&u| (u, Vec::new())).collect();
        (Phase::Passing, None, passed)
    };

    SessionState {
        round_number,
        phase,
        seats,
        hands,
        passed_cards,
        pass_direction: direction,
        current_trick: Vec::new(),
        lead_suit: None,
        turn_user_id,
        trick_starter_id: turn_user_id,
        round_scores: BTreeMap::new(),
        hearts_broken: false,
        tricks_completed: 0,
    }
}

fn holder_of_two_of_clubs(hands: &BTreeMap<UserId, Vec<Card>>) -> Option<UserId> {
    hands
        .iter()
        .find(|(_, hand)| hand.iter().any(Card::is_two_of_clubs))
        .map(|(&user_id, _)| user_id)
}

/// Distributes passed cards once all four users have submitted theirs,
/// re-sorts hands, clears the passing bookkeeping, and starts play.
/// Returns an error if called before all four submissions are in, or
/// during a `Hold` round (which never enters the passing phase).
pub fn resolve_pass(state: &mut SessionState) -> Result<(), DomainError> {
    if state.phase != Phase::Passing {
        return Err(DomainError::WrongPhase);
    }
    if state.pass_direction == PassDirection::Hold {
        return Err(DomainError::WrongPhase);
    }
    if state.passed_cards.len() != 4 || state.passed_cards.values().any(|c| c.len() != 3) {
        return Err(DomainError::WrongPhase);
    }

    let incoming: Vec<(UserId, Vec<Card>)> = state
        .passed_cards
        .iter()
        .map(|(&sender_id, cards)| {
            let sender_seat = state.seat_of(sender_id).expect("seated user");
            let recipient_seat = state.pass_direction.recipient(sender_seat);
            let recipient_id = state.user_at_seat(recipient_seat).expect("seated recipient");
            (recipient_id, cards.clone())
        })
        .collect();

    for (sender_id, cards) in state.passed_cards.clone() {
        let hand = state.hands.get_mut(&sender_id).expect("seated user");
        hand.retain(|c| !cards.contains(c));
    }
    for (recipient_id, cards) in incoming {
        let hand = state.hands.entry(recipient_id).or_default();
        hand.extend(cards);
        hand.sort();
    }

    state.passed_cards.clear();
    state.phase = Phase::Playing;
    let starter = holder_of_two_of_clubs(&state.hands);
    state.turn_user_id = starter;
    state.trick_starter_id = starter;
    Ok(())
}

/// If the current trick has all four plays, scores it, advances the
/// turn to the winner, and resets trick-local state. Returns `None` if
/// the trick is not yet complete.
pub fn complete_trick_if_full(state: &mut SessionState) -> Result<Option<TrickOutcome>, DomainError> {
    if state.current_trick.len() < 4 {
        return Ok(None);
    }
    let lead_suit = state.lead_suit.expect("trick in progress has a lead suit");
    let cards: Vec<Card> = state.current_trick.iter().map(|e| e.card).collect();
    let winning_card = trick_winner(&cards, lead_suit)?;
    let winner = state
        .current_trick
        .iter()
        .find(|e| e.card == winning_card)
        .map(|e| e.user_id)
        .expect("winning card came from this trick");
    let points: u32 = cards.iter().map(Card::points).sum();

    *state.round_scores.entry(winner).or_insert(0) += points;

    state.current_trick.clear();
    state.lead_suit = None;
    state.tricks_completed += 1;
    state.turn_user_id = Some(winner);
    state.trick_starter_id = Some(winner);

    Ok(Some(TrickOutcome { winner, points }))
}

/// True once every hand is empty, i.e. all 13 tricks of the round have
/// been played.
pub fn is_round_complete(state: &SessionState) -> bool {
    state.hands.values().all(Vec::is_empty)
}

/// Converts a completed round's raw trick points into score deltas,
/// applying the shoot-the-moon inversion: a user who took all 26 points
/// scores 0 and everyone else scores 26.
pub fn round_deltas(state: &SessionState) -> BTreeMap<UserId, i64> {
    let shooter = state.seats.values().find(|&&u| state.round_scores.get(&u).copied().unwrap_or(0) == 26);

    state
        .seats
        .values()
        .map(|&user_id| {
            let delta = match shooter {
                Some(&shooter_id) if shooter_id == user_id => 0,
                Some(_) => 26,
                None => state.round_scores.get(&user_id).copied().unwrap_or(0) as i64,
            };
            (user_id, delta)
        })
        .collect()
}

/// True once any player's running total has reached the game-ending
/// threshold.
pub fn is_game_over(totals: &BTreeMap<UserId, i64>) -> bool {
    totals.values().any(|&t| t >= GAME_OVER_THRESHOLD)
}

/// The winner is whoever has the lowest total score; ties are broken by
/// lowest seat number.
pub fn determine_winner(totals: &BTreeMap<UserId, i64>, seats: &BTreeMap<Seat, UserId>) -> Option<UserId> {
    seats
        .iter()
        .min_by_key(|&(&seat, &user_id)| (totals.get(&user_id).copied().unwrap_or(0), seat))
        .map(|(_, &user_id)| user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::Suit;
    use crate::domain::state::TrickEntry;

    fn seats() -> BTreeMap<Seat, UserId> {
        BTreeMap::from([(1, 10), (2, 20), (3, 30), (4, 40)])
    }

    #[test]
    fn start_round_deals_13_each_and_sets_phase() {
        let state = start_round(1, seats());
        assert_eq!(state.phase, Phase::Passing);
        assert!(state.turn_user_id.is_none());
        for hand in state.hands.values() {
            assert_eq!(hand.len(), 13);
        }
        let total: usize = state.hands.values().map(Vec::len).sum();
        assert_eq!(total, 52);
    }

    #[test]
    fn hold_round_starts_in_playing_with_two_of_clubs_holder_on_turn() {
        let state = start_round(4, seats());
        assert_eq!(state.pass_direction, PassDirection::Hold);
        assert_eq!(state.phase, Phase::Playing);
        let starter = state.turn_user_id.expect("hold round has an immediate starter");
        assert!(state.hand_of(starter).iter().any(Card::is_two_of_clubs));
    }

    #[test]
    fn complete_trick_scores_winner_and_advances_turn() {
        let mut state = start_round(4, seats());
        state.lead_suit = Some(Suit::Clubs);
        state.current_trick = vec![
            TrickEntry { user_id: 10, card: Card::parse("2♣").unwrap() },
            TrickEntry { user_id: 20, card: Card::parse("K♣").unwrap() },
            TrickEntry { user_id: 30, card: Card::parse("A♥").unwrap() },
            TrickEntry { user_id: 40, card: Card::parse("3♣").unwrap() },
        ];
        let outcome = complete_trick_if_full(&mut state).unwrap().unwrap();
        assert_eq!(outcome.winner, 20);
        assert_eq!(outcome.points, 1); // the ace of hearts
        assert_eq!(state.turn_user_id, Some(20));
        assert!(state.current_trick.is_empty());
        assert_eq!(state.tricks_completed, 1);
    }

    #[test]
    fn shoot_the_moon_inverts_scores() {
        let mut state = start_round(4, seats());
        state.round_scores.insert(10, 26);
        let deltas = round_deltas(&state);
        assert_eq!(deltas[&10], 0);
        assert_eq!(deltas[&20], 26);
        assert_eq!(deltas[&30], 26);
        assert_eq!(deltas[&40], 26);
    }

    #[test]
    fn normal_round_deltas_pass_through() {
        let mut state = start_round(4, seats());
        state.round_scores.insert(10, 5);
        state.round_scores.insert(20, 21);
        let deltas = round_deltas(&state);
        assert_eq!(deltas[&10], 5);
        assert_eq!(deltas[&20], 21);
        assert_eq!(deltas[&30], 0);
    }

    #[test]
    fn winner_is_lowest_total_tiebroken_by_seat() {
        let totals = BTreeMap::from([(10, 50), (20, 50), (30, 99), (40, 101)]);
        assert_eq!(determine_winner(&totals, &seats()), Some(10));
        assert!(is_game_over(&totals));
    }

    #[test]
    fn resolve_pass_moves_cards_left() {
        let mut state = start_round(1, seats());
        assert_eq!(state.pass_direction, PassDirection::Left);
        let taken: BTreeMap<UserId, Vec<Card>> = state
            .seats
            .values()
            .map(|&u| (u, state.hand_of(u)[0..3].to_vec()))
            .collect();
        for (&u, cards) in &taken {
            state.passed_cards.insert(u, cards.clone());
        }
        let seat1_pass = taken[&10].clone();
        resolve_pass(&mut state).unwrap();
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.passed_cards.is_empty());
        // seat 1 (user 10) passes left to seat 2 (user 20).
        for c in &seat1_pass {
            assert!(state.hand_of(20).contains(c));
        }
    }
}
