use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Pure rule-violation errors from the cards/rules/scoring engine.
///
/// Never crosses the WS/REST boundary as anything but a private
/// `error {message}` frame; this is expected user-facing control flow,
/// not a server fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    MalformedCard,
    EmptyTrick,
    WrongPhase,
    NotYourTurn,
    NotInHand,
    MustLeadTwoOfClubs,
    HeartsNotBroken,
    MustFollowSuit,
    NoPointsFirstTrick,
    PassNotDistinct,
    PassAlreadySubmitted,
    PassCardNotInHand,
}

impl DomainError {
    /// The message sent to the offending client in the private `error` frame.
    pub fn message(&self) -> &'static str {
        match self {
            DomainError::MalformedCard => "Malformed card.",
            DomainError::EmptyTrick => "Cannot determine winner of an empty trick.",
            DomainError::WrongPhase => "Not in the playing phase.",
            DomainError::NotYourTurn => "It is not your turn.",
            DomainError::NotInHand => "Card not in hand.",
            DomainError::MustLeadTwoOfClubs => "You must lead the two of clubs.",
            DomainError::HeartsNotBroken => "Hearts have not been broken yet.",
            DomainError::MustFollowSuit => "You must follow the lead suit.",
            DomainError::NoPointsFirstTrick => "Point cards cannot be played on the first trick.",
            DomainError::PassNotDistinct => "You must pass three distinct cards.",
            DomainError::PassAlreadySubmitted => "You have already submitted your pass this round.",
            DomainError::PassCardNotInHand => "One of the passed cards is not in your hand.",
        }
    }
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.message())
    }
}

impl Error for DomainError {}
