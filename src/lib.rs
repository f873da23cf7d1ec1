//! Heist State Library
//!
//! This crate provides the game engine for Heist, a cooperative party game
//! played over a poker deal.
//!
//! # Overview
//!
//! Each player is dealt two hole cards. Over four rounds (preflop, flop,
//! turn, river) the team passes numbered tokens around until everyone holds
//! the token they believe matches their hand's rank at the table: the
//! highest token for the strongest hand. At showdown the claims are scored
//! against the real ranking. A flawless hand cracks a vault; any miss trips
//! an alarm. Three vaults win the match, three alarms lose it.
//!
//! - **Identity** - Stable player ids survive refreshes and disconnects;
//!   connection handles come and go.
//!
//! - **Token economy** - Claim from the pool, take from another player,
//!   return, settle.
//!
//! - **Phase machine** - Rounds advance once every connected player has
//!   settled with a token.
//!
//! - **Showdown** - Tie-aware rank windows, error buckets, vault/alarm tally.
//!
//! - **Projection** - Per-viewer snapshots that hide other players' cards.
//!
//! # Design Principles
//!
//! 1. **Operations are atomic** - A failed action leaves the table untouched
//!    and reports why.
//!
//! 2. **No networking** - This crate is pure state; a server feeds it
//!    connection events and actions.
//!
//! 3. **Pluggable cards** - Decks and hand evaluation sit behind traits so
//!    hands can be scripted.
//!
//! 4. **Serialization-ready** - Views, actions and replies convert to JSON.
//!
//! # Example
//!
//! ```rust
//! use heist_state::config::TableConfig;
//! use heist_state::state::{Action, Table, TokenSource, ViewerRole};
//!
//! let mut table = Table::new(TableConfig::default());
//!
//! table.join_or_reconnect("sock-a", "p-a", "Alice", true).unwrap();
//! table.join_or_reconnect("sock-b", "p-b", "Bob", true).unwrap();
//! table.join_or_reconnect("sock-c", "p-c", "Cara", true).unwrap();
//! table.start_hand().unwrap();
//!
//! // Alice feels strong
//! table.claim_token("p-a", 3, &TokenSource::Pool).unwrap();
//! let reply = table.apply("sock-a", Action::ToggleSettled);
//! assert!(reply.success);
//!
//! let view = table.project_for_connection("sock-a");
//! assert_eq!(view.viewer_role, ViewerRole::Player);
//! assert_eq!(view.available_tokens, vec![1, 2]);
//! ```

pub mod cards;
pub mod config;
pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
