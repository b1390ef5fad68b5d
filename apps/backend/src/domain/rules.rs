//! Play and pass validation. Pure functions over `SessionState`; no I/O.

use crate::domain::cards::{hand_has_only_hearts, hand_has_only_point_cards, hand_has_suit, Card};
use crate::domain::errors::DomainError;
use crate::domain::state::{Phase, Seat, SessionState, TrickEntry, UserId};

pub const PLAYERS: usize = 4;

/// Play validation per spec: the first violated rule, in this order,
/// names the error.
pub fn validate_play(state: &SessionState, user_id: UserId, card: Card) -> Result<(), DomainError> {
    if state.phase != Phase::Playing {
        return Err(DomainError::WrongPhase);
    }
    if state.turn_user_id != Some(user_id) {
        return Err(DomainError::NotYourTurn);
    }
    let hand = state.hand_of(user_id);
    if !hand.contains(&card) {
        return Err(DomainError::NotInHand);
    }
    if state.is_first_play_of_round() && !card.is_two_of_clubs() {
        return Err(DomainError::MustLeadTwoOfClubs);
    }
    if state.current_trick.is_empty()
        && card.suit == crate::domain::cards::Suit::Hearts
        && !state.hearts_broken
        && !hand_has_only_hearts(hand)
    {
        return Err(DomainError::HeartsNotBroken);
    }
    if let Some(lead_suit) = state.lead_suit {
        if card.suit != lead_suit && hand_has_suit(hand, lead_suit) {
            return Err(DomainError::MustFollowSuit);
        }
    }
    if state.is_first_trick_of_round() && card.points() > 0 && !hand_has_only_point_cards(hand) {
        return Err(DomainError::NoPointsFirstTrick);
    }
    Ok(())
}

/// Applies a validated play: removes the card from the hand, appends it
/// to the current trick, and updates lead_suit/hearts_broken.
pub fn apply_play(state: &mut SessionState, user_id: UserId, card: Card) -> Result<(), DomainError> {
    validate_play(state, user_id, card)?;

    let hand = state.hands.entry(user_id).or_default();
    let pos = hand.iter().position(|&c| c == card).expect("validated above");
    hand.remove(pos);

    if state.current_trick.is_empty() {
        state.lead_suit = Some(card.suit);
    }
    state.current_trick.push(TrickEntry { user_id, card });

    if card.suit == crate::domain::cards::Suit::Hearts || card.is_queen_of_spades() {
        state.hearts_broken = true;
    }

    Ok(())
}

/// Validates a single user's pass submission: exactly three distinct
/// cards, all currently in that user's hand, and not already submitted.
pub fn validate_pass(state: &SessionState, user_id: UserId, cards: &[Card]) -> Result<(), DomainError> {
    if state.phase != Phase::Passing {
        return Err(DomainError::WrongPhase);
    }
    if state.passed_cards.get(&user_id).is_some_and(|c| !c.is_empty()) {
        return Err(DomainError::PassAlreadySubmitted);
    }
    if cards.len() != 3 {
        return Err(DomainError::PassNotDistinct);
    }
    let mut seen = cards.to_vec();
    seen.sort();
    seen.dedup();
    if seen.len() != 3 {
        return Err(DomainError::PassNotDistinct);
    }
    let hand = state.hand_of(user_id);
    if cards.iter().any(|c| !hand.contains(c)) {
        return Err(DomainError::PassCardNotInHand);
    }
    Ok(())
}

/// Records a validated pass submission. Returns true once all four users
/// have submitted, signalling the caller to run `scoring::resolve_pass`.
pub fn submit_pass(state: &mut SessionState, user_id: UserId, cards: Vec<Card>) -> Result<bool, DomainError> {
    validate_pass(state, user_id, &cards)?;
    state.passed_cards.insert(user_id, cards);
    Ok(state.passed_cards.len() == PLAYERS && state.passed_cards.values().all(|c| c.len() == 3))
}

pub fn seats_in_order(state: &SessionState) -> Vec<Seat> {
    state.seats.keys().copied().collect()
}
