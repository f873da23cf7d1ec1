//! Token pool for the current round.
//!
//! Tokens `1..=N` exist each round, `N` being the number of non-observer
//! players when the round began. A token is either in the pool or held by
//! exactly one player; the table moves tokens between the two.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// A numbered token (1-based).
pub type Token = u32;

/// Wire name of the shared pool as a claim source.
pub const POOL_SOURCE: &str = "center";

/// Where a claimed token comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenSource {
    /// The shared pool
    Pool,
    /// Taken from another player
    Player(PlayerId),
}

impl From<String> for TokenSource {
    fn from(raw: String) -> Self {
        if raw == POOL_SOURCE {
            Self::Pool
        } else {
            Self::Player(raw)
        }
    }
}

impl From<&str> for TokenSource {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<TokenSource> for String {
    fn from(source: TokenSource) -> Self {
        match source {
            TokenSource::Pool => POOL_SOURCE.to_string(),
            TokenSource::Player(player_id) => player_id,
        }
    }
}

/// Unclaimed tokens, always in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPool {
    available: BTreeSet<Token>,
}

impl TokenPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill with `1..=count`.
    pub fn reset(&mut self, count: usize) {
        self.available = (1..=count as Token).collect();
    }

    /// Check if a token is unclaimed.
    pub fn contains(&self, token: Token) -> bool {
        self.available.contains(&token)
    }

    /// Remove a token from the pool. Returns false if it was not available.
    pub fn take(&mut self, token: Token) -> bool {
        self.available.remove(&token)
    }

    /// Put a token back.
    pub fn put_back(&mut self, token: Token) {
        self.available.insert(token);
    }

    /// Available tokens, ascending.
    pub fn available(&self) -> Vec<Token> {
        self.available.iter().copied().collect()
    }
}
