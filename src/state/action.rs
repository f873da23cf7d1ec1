//! Client actions.
//!
//! Every request arriving over a connection is one `Action`. Apart from
//! `Join`, actions need a connection that is bound to a player, and the
//! acting player is whoever it is bound to.

use serde::{Deserialize, Serialize};

use super::error::TableError;
use super::player::PlayerId;
use super::table::Table;
use super::tokens::{Token, TokenSource};

fn default_true() -> bool {
    true
}

/// A request from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Join {
        player_id: PlayerId,
        name: String,
        #[serde(default = "default_true")]
        wants_to_play: bool,
    },
    Rename {
        name: String,
    },
    ClaimToken {
        value: Token,
        source: TokenSource,
    },
    ReturnToken,
    ToggleSettled,
    StartHand,
    RestartMatch,
    RemovePlayer {
        target_player_id: PlayerId,
    },
}

/// Outcome of an action, sent back to the requesting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    pub success: bool,
    pub message: String,
}

impl ActionReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<TableError> for ActionReply {
    fn from(err: TableError) -> Self {
        Self::failure(err.to_string())
    }
}

impl Table {
    /// Apply an action received on a connection.
    pub fn apply(&mut self, connection: &str, action: Action) -> ActionReply {
        match self.dispatch(connection, &action) {
            Ok(message) => ActionReply::ok(message),
            Err(err) => {
                log::warn!("Rejected {:?} from {}: {}", action, connection, err);
                err.into()
            }
        }
    }

    fn actor(&self, connection: &str) -> Result<PlayerId, TableError> {
        self.player_for_connection(connection)
            .cloned()
            .ok_or(TableError::UnknownConnection)
    }

    fn dispatch(&mut self, connection: &str, action: &Action) -> Result<&'static str, TableError> {
        match action {
            Action::Join {
                player_id,
                name,
                wants_to_play,
            } => self
                .join_or_reconnect(connection, player_id, name, *wants_to_play)
                .map(|status| status.message()),
            Action::Rename { name } => {
                let actor = self.actor(connection)?;
                self.rename(&actor, name)?;
                Ok("Name changed.")
            }
            Action::ClaimToken { value, source } => {
                let actor = self.actor(connection)?;
                self.claim_token(&actor, *value, source)?;
                Ok("Token claimed.")
            }
            Action::ReturnToken => {
                let actor = self.actor(connection)?;
                self.return_token(&actor)?;
                Ok("Token returned.")
            }
            Action::ToggleSettled => {
                let actor = self.actor(connection)?;
                if self.toggle_settled(&actor)? {
                    Ok("Settled.")
                } else {
                    Ok("Unsettled.")
                }
            }
            Action::StartHand => {
                self.actor(connection)?;
                self.start_hand()?;
                Ok("Hand started.")
            }
            Action::RestartMatch => {
                self.actor(connection)?;
                self.restart_match()?;
                Ok("Match restarted.")
            }
            Action::RemovePlayer { target_player_id } => {
                self.actor(connection)?;
                self.remove_disconnected_player(target_player_id)?;
                Ok("Removed disconnected player.")
            }
        }
    }
}
