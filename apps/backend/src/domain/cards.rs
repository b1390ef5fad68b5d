//! Pure card model: suits, ranks, wire encoding, and point values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::errors::DomainError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

// Ord on Card is for stable sorting only: suit order C<D<H<S then rank.
// Never used for trick resolution, which goes through `trick_winner`.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.suit.cmp(&other.suit) {
            std::cmp::Ordering::Equal => self.rank.cmp(&other.rank),
            ord => ord,
        }
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card { suit, rank }
    }

    pub fn is_queen_of_spades(&self) -> bool {
        self.suit == Suit::Spades && self.rank == Rank::Queen
    }

    pub fn is_two_of_clubs(&self) -> bool {
        self.suit == Suit::Clubs && self.rank == Rank::Two
    }

    /// Point value: each heart is 1, the queen of spades is 13, everything else 0.
    pub fn points(&self) -> u32 {
        if self.is_queen_of_spades() {
            13
        } else if self.suit == Suit::Hearts {
            1
        } else {
            0
        }
    }

    pub fn render(&self) -> String {
        let rank_str = match self.rank {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        let suit_char = match self.suit {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        };
        format!("{rank_str}{suit_char}")
    }

    /// Accepts the wire form `<rank>{suit glyph}`, e.g. `"2♣"`, `"10♦"`,
    /// `"Q♠"`, `"A♥"`. The rank is everything before the final char, which
    /// must be one of the four suit glyphs.
    pub fn parse(s: &str) -> Result<Card, DomainError> {
        let mut chars = s.chars();
        let suit_ch = chars.next_back().ok_or(DomainError::MalformedCard)?;
        let rank_str = chars.as_str();

        let suit = match suit_ch {
            '♣' => Suit::Clubs,
            '♦' => Suit::Diamonds,
            '♥' => Suit::Hearts,
            '♠' => Suit::Spades,
            _ => return Err(DomainError::MalformedCard),
        };
        let rank = match rank_str {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            _ => return Err(DomainError::MalformedCard),
        };
        Ok(Card { suit, rank })
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.render())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Card::parse(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// A full 52-card deck in a fixed, unshuffled order.
pub fn full_deck() -> Vec<Card> {
    let suits = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
    let ranks = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];
    let mut deck = Vec::with_capacity(52);
    for &suit in &suits {
        for &rank in &ranks {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit == suit)
}

pub fn hand_has_only_hearts(hand: &[Card]) -> bool {
    !hand.is_empty() && hand.iter().all(|c| c.suit == Suit::Hearts)
}

pub fn hand_has_only_point_cards(hand: &[Card]) -> bool {
    !hand.is_empty() && hand.iter().all(|c| c.points() > 0)
}

/// Given the cards played this trick (in play order) and the lead suit,
/// returns the card with the highest rank among those following the lead
/// suit. Cards of other suits can never win.
pub fn trick_winner(cards: &[Card], lead_suit: Suit) -> Result<Card, DomainError> {
    if cards.is_empty() {
        return Err(DomainError::EmptyTrick);
    }
    let mut highest: Option<Card> = None;
    for &card in cards {
        if card.suit != lead_suit {
            continue;
        }
        match highest {
            None => highest = Some(card),
            Some(best) if card.rank > best.rank => highest = Some(card),
            _ => {}
        }
    }
    // The lead card always matches lead_suit by definition, so this is
    // unreachable when `cards` is non-empty, but fall back defensively.
    Ok(highest.unwrap_or(cards[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let cases = [
            (Rank::Ace, Suit::Spades, "A♠"),
            (Rank::Ten, Suit::Diamonds, "10♦"),
            (Rank::Three, Suit::Hearts, "3♥"),
            (Rank::Nine, Suit::Clubs, "9♣"),
        ];
        for (rank, suit, token) in cases {
            let c = Card { suit, rank };
            let s = serde_json::to_string(&c).unwrap();
            assert_eq!(s, format!("\"{token}\""));
            let decoded: Card = serde_json::from_str(&s).unwrap();
            assert_eq!(decoded, c);
        }
    }

    #[test]
    fn rejects_invalid_tokens() {
        for tok in ["1♥", "11♠", "Ah", "ZZ", "", "T♦", "AS"] {
            let res: Result<Card, _> = serde_json::from_str(&format!("\"{tok}\""));
            assert!(res.is_err());
        }
    }

    #[test]
    fn points_are_correct() {
        assert_eq!(Card::new(Suit::Spades, Rank::Queen).points(), 13);
        assert_eq!(Card::new(Suit::Hearts, Rank::Two).points(), 1);
        assert_eq!(Card::new(Suit::Hearts, Rank::Ace).points(), 1);
        assert_eq!(Card::new(Suit::Clubs, Rank::Ace).points(), 0);
        assert_eq!(Card::new(Suit::Spades, Rank::King).points(), 0);
    }

    #[test]
    fn deck_has_26_points() {
        let total: u32 = full_deck().iter().map(|c| c.points()).sum();
        assert_eq!(total, 26);
        assert_eq!(full_deck().len(), 52);
    }

    #[test]
    fn trick_winner_ignores_offsuit() {
        // Scenario 2 from the testable-properties scenarios.
        let cards = [
            Card::parse("2♣").unwrap(),
            Card::parse("K♣").unwrap(),
            Card::parse("A♥").unwrap(),
            Card::parse("3♣").unwrap(),
        ];
        let winner = trick_winner(&cards, Suit::Clubs).unwrap();
        assert_eq!(winner, Card::parse("K♣").unwrap());
    }

    #[test]
    fn trick_winner_empty_fails() {
        assert_eq!(trick_winner(&[], Suit::Hearts), Err(DomainError::EmptyTrick));
    }

    #[test]
    fn hand_has_suit_works() {
        let hand = vec![Card::parse("2♣").unwrap(), Card::parse("A♦").unwrap()];
        assert!(hand_has_suit(&hand, Suit::Clubs));
        assert!(!hand_has_suit(&hand, Suit::Hearts));
    }
}
