//! Round sequence of a hand.
//!
//! ```text
//! Preflop ──▶ Flop ──▶ Turn ──▶ River ──▶ Showdown ──▶ Result
//!             +3 cards  +1 card  +1 card   (scored,     (terminal)
//!                                           transient)
//! ```

use serde::{Deserialize, Serialize};

/// Phase label reported before the first hand is dealt.
pub const LOBBY_LABEL: &str = "LOBBY";

/// Betting rounds of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Result,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preflop => "PREFLOP",
            Self::Flop => "FLOP",
            Self::Turn => "TURN",
            Self::River => "RIVER",
            Self::Showdown => "SHOWDOWN",
            Self::Result => "RESULT",
        }
    }

    /// Token color for this round, used only for history and display.
    pub fn token_color(&self) -> &'static str {
        match self {
            Self::Preflop => "White",
            Self::Flop => "Yellow",
            Self::Turn => "Orange",
            Self::River | Self::Showdown | Self::Result => "Red",
        }
    }

    /// The phase that follows, or `None` at the end of the hand.
    pub fn next(&self) -> Option<Phase> {
        match self {
            Self::Preflop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            Self::River => Some(Self::Showdown),
            Self::Showdown => Some(Self::Result),
            Self::Result => None,
        }
    }

    /// Community cards revealed when entering this phase.
    pub fn reveals(&self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            _ => 0,
        }
    }

    /// Check if the hand is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
