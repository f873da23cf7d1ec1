//! Table state for Heist.
//!
//! - `player` - player records, hole cards and token history
//! - `connection` - connection handle to player identity index
//! - `tokens` - the per-round token pool
//! - `phase` - round sequence of a hand
//! - `showdown` - scoring claims against true hand strength
//! - `table` - the aggregate tying it all together
//! - `view` - per-viewer snapshots for clients
//! - `action` - client requests and replies
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                               Table                                  │
//! │                                                                      │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────┐    │
//! │  │  ConnectionMap  │   │     players     │   │    TokenPool     │    │
//! │  │                 │   │                 │   │                  │    │
//! │  │ connection →    │──▶│ player_id →     │◀─▶│ 1..=N unclaimed  │    │
//! │  │   player_id     │   │   Player        │   │                  │    │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────┘    │
//! │                                 │                                    │
//! │                          all settled?                                │
//! │                                 ▼                                    │
//! │  Preflop ──▶ Flop ──▶ Turn ──▶ River ──▶ Showdown ──▶ Result         │
//! │                                              │                       │
//! │                                              ▼                       │
//! │                             showdown::score ──▶ MatchTally           │
//! └──────────────────────────────────────────────────────────────────────┘
//!            │
//!            ▼
//!     Table::project(viewer) ──▶ TableView
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use heist_state::state::{Action, Table, TokenSource};
//!
//! let mut table = Table::default();
//! table.join_or_reconnect("sock-1", "p-1", "Alice", true)?;
//! table.claim_token("p-1", 2, &TokenSource::Pool)?;
//!
//! let reply = table.apply("sock-1", Action::ToggleSettled);
//! let view = table.project_for_connection("sock-1");
//! ```

pub mod action;
pub mod connection;
pub mod error;
pub mod phase;
pub mod player;
pub mod showdown;
pub mod table;
pub mod tokens;
pub mod view;

// Re-export commonly used types
pub use action::{Action, ActionReply};
pub use connection::{ConnectionId, ConnectionMap};
pub use error::{ErrorKind, TableError};
pub use phase::{Phase, LOBBY_LABEL};
pub use player::{Player, PlayerId, TokenEntry};
pub use showdown::{
    rank_windows, Accuracy, MatchTally, Outcome, RankWindow, ScoredHand, ShowdownReport, Verdict,
};
pub use table::{JoinStatus, Table, MAX_SEATED_PLAYERS};
pub use tokens::{Token, TokenPool, TokenSource, POOL_SOURCE};
pub use view::{PlayerView, TableView, ViewerRole};
