//! Table errors.
//!
//! Every failure is reported back to the caller for display and leaves the
//! table untouched.

use thiserror::Error;

use super::tokens::Token;
use crate::cards::DeckError;

/// Broad error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or conflicting input
    Validation,
    /// Unknown player or connection
    NotFound,
    /// The action is not allowed right now
    Precondition,
    /// The requested token is not where the caller said it was
    Resource,
}

/// Table errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("player_id cannot be empty.")]
    EmptyPlayerId,

    #[error("player_id \"center\" is reserved for the token pool.")]
    ReservedPlayerId,

    #[error("Name cannot be empty.")]
    EmptyName,

    #[error("Name already taken.")]
    NameTaken,

    #[error("Player not found.")]
    PlayerNotFound,

    #[error("Connection is not bound to a player.")]
    UnknownConnection,

    #[error("Observers cannot hold tokens.")]
    Observer,

    #[error("You have already settled.")]
    AlreadySettled,

    #[error("You have not been dealt into this hand.")]
    NotDealt,

    #[error("The hand is over.")]
    HandOver,

    #[error("You are not holding a token.")]
    NoToken,

    #[error("You cannot take a token from yourself.")]
    SelfSteal,

    #[error("Need at least {required} players to start (have {present}).")]
    NotEnoughPlayers { required: usize, present: usize },

    #[error("Too many players for one deck ({present}, max {max}).")]
    TooManyPlayers { present: usize, max: usize },

    #[error("Cannot remove a connected player.")]
    PlayerConnected,

    #[error("Token {0} is not available.")]
    TokenUnavailable(Token),

    #[error("That player is not holding token {0}.")]
    TokenNotHeld(Token),

    #[error(transparent)]
    Deck(#[from] DeckError),
}

impl TableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPlayerId | Self::ReservedPlayerId | Self::EmptyName | Self::NameTaken => {
                ErrorKind::Validation
            }
            Self::PlayerNotFound | Self::UnknownConnection => ErrorKind::NotFound,
            Self::Observer
            | Self::AlreadySettled
            | Self::NotDealt
            | Self::HandOver
            | Self::NoToken
            | Self::SelfSteal
            | Self::NotEnoughPlayers { .. }
            | Self::TooManyPlayers { .. }
            | Self::PlayerConnected => ErrorKind::Precondition,
            Self::TokenUnavailable(_) | Self::TokenNotHeld(_) | Self::Deck(_) => {
                ErrorKind::Resource
            }
        }
    }
}
