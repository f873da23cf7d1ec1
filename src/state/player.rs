//! Player records.
//!
//! A player is keyed by a stable, client-supplied `player_id` and survives
//! disconnects. Everything under "hand-scoped" is wiped when the player falls
//! back to observing or a new hand is dealt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tokens::Token;
use crate::cards::Card;

/// Stable player identity (comes from the client, e.g. local storage).
pub type PlayerId = String;

/// A token held at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Color of the round the token was held in
    pub color: String,
    pub value: Token,
}

/// A seated player or observer.
#[derive(Debug, Clone)]
pub struct Player {
    pub player_id: PlayerId,

    /// Display name, unique case-insensitively
    pub name: String,

    pub is_observer: bool,

    /// Asked to play while a hand was running; seated at the next deal
    pub seat_requested: bool,

    // Hand-scoped
    pub hole_cards: Vec<Card>,
    pub token: Option<Token>,
    pub token_history: Vec<TokenEntry>,
    pub is_settled: bool,

    // Connection state (does not affect identity)
    pub is_connected: bool,
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a connected player.
    pub fn new(player_id: PlayerId, name: String, is_observer: bool) -> Self {
        Self {
            player_id,
            name,
            is_observer,
            seat_requested: false,
            hole_cards: Vec::new(),
            token: None,
            token_history: Vec::new(),
            is_settled: false,
            is_connected: true,
            disconnected_at: None,
        }
    }

    /// Whether this player was dealt into the current hand.
    pub fn has_hand(&self) -> bool {
        self.hole_cards.len() >= 2
    }

    /// Whether this player takes part in the current hand's token rounds.
    pub fn is_active(&self) -> bool {
        !self.is_observer
    }

    /// Check if name matches, ignoring case.
    pub fn name_matches(&self, candidate: &str) -> bool {
        self.name.to_lowercase() == candidate.to_lowercase()
    }

    /// Take the held token, clearing the settled flag.
    pub fn take_token(&mut self) -> Option<Token> {
        self.is_settled = false;
        self.token.take()
    }

    /// Hold a new token. Settling is always cleared when the token changes.
    pub fn give_token(&mut self, token: Token) {
        self.token = Some(token);
        self.is_settled = false;
    }

    /// Record the held token (if any) in history under a round color.
    pub fn archive_token(&mut self, color: &str) {
        if let Some(value) = self.token {
            self.token_history.push(TokenEntry {
                color: color.to_string(),
                value,
            });
        }
    }

    /// Wipe hand-scoped data, returning the token that was held.
    pub fn reset_hand(&mut self) -> Option<Token> {
        let token = self.take_token();
        self.hole_cards.clear();
        self.token_history.clear();
        token
    }

    pub fn mark_connected(&mut self) {
        self.is_connected = true;
        self.disconnected_at = None;
    }

    pub fn mark_disconnected(&mut self) {
        self.is_connected = false;
        self.disconnected_at = Some(Utc::now());
    }
}
