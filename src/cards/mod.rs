//! Cards and the two collaborators the table consumes.
//!
//! - `deck` - where cards come from (`Deck`, `DeckFactory`)
//! - `evaluator` - how strong a hand is (`HandEvaluator`)
//!
//! The table never looks inside a card beyond formatting it for clients.

pub mod deck;
pub mod evaluator;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use deck::{Deck, DeckError, DeckFactory, ShuffledDeck, ShuffledDeckFactory, StackedDeck, DECK_SIZE};
pub use evaluator::{HandClass, HandEvaluator, HandScore, StandardEvaluator};

/// Card suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        }
    }
}

/// Card ranks, valued 2 through 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
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

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        }
    }
}

/// A single playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Display record sent to clients.
    pub fn display(&self) -> DisplayCard {
        DisplayCard::from(*self)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// Client-facing rendering of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCard {
    pub rank: String,
    pub suit: String,
    #[serde(rename = "str")]
    pub label: String,
}

impl From<Card> for DisplayCard {
    fn from(card: Card) -> Self {
        let rank = card.rank.symbol().to_string();
        let suit = card.suit.symbol().to_string();
        let label = format!("{}{}", rank, suit);
        Self { rank, suit, label }
    }
}
