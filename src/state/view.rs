//! Per-viewer snapshots of a table.
//!
//! A projection is what one client is allowed to see. Hole cards of other
//! players stay hidden unless the viewer is observing or the hand is over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Phase, LOBBY_LABEL};
use super::player::{Player, PlayerId, TokenEntry};
use super::table::Table;
use super::tokens::Token;
use crate::cards::DisplayCard;

/// Who is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    Observer,
    Player,
    /// No identity, or one the table does not know
    Unknown,
}

/// One player as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub name: String,
    pub is_observer: bool,
    /// Empty when hidden from this viewer
    pub hand: Vec<DisplayCard>,
    pub token: Option<Token>,
    pub token_history: Vec<TokenEntry>,
    pub is_settled: bool,
    pub is_connected: bool,
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl PlayerView {
    fn new(player: &Player, show_hand: bool) -> Self {
        let hand = if show_hand {
            player.hole_cards.iter().map(|c| c.display()).collect()
        } else {
            Vec::new()
        };

        Self {
            player_id: player.player_id.clone(),
            name: player.name.clone(),
            is_observer: player.is_observer,
            hand,
            token: player.token,
            token_history: player.token_history.clone(),
            is_settled: player.is_settled,
            is_connected: player.is_connected,
            disconnected_at: player.disconnected_at,
        }
    }
}

/// Everything one client needs to render the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    /// Phase name, `LOBBY` before the first hand
    pub phase: String,
    pub token_color: String,
    pub community_cards: Vec<DisplayCard>,
    /// Ascending
    pub available_tokens: Vec<Token>,
    /// Seat order
    pub players: Vec<PlayerView>,
    pub viewer_role: ViewerRole,
    /// The viewer's own record, hand always visible
    pub me: Option<PlayerView>,
    pub result_log: Vec<String>,
    pub vaults: u32,
    pub alarms: u32,
    pub match_target: u32,
}

impl TableView {
    /// Convert to JSON for clients.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Table {
    /// Snapshot the table for a viewer. Has no side effects.
    pub fn project(&self, viewer: Option<&str>) -> TableView {
        let me = viewer.and_then(|id| self.player(id));
        let viewer_role = match me {
            Some(p) if p.is_observer => ViewerRole::Observer,
            Some(_) => ViewerRole::Player,
            None => ViewerRole::Unknown,
        };

        let phase = self.phase().unwrap_or_default();
        let reveal_all = self.phase() == Some(Phase::Result);
        let sees_all = viewer_role == ViewerRole::Observer || reveal_all;

        let players = self
            .players()
            .map(|p| {
                let own = me.is_some_and(|m| m.player_id == p.player_id);
                PlayerView::new(p, sees_all || own)
            })
            .collect();

        let tally = self.tally();
        TableView {
            phase: match self.phase() {
                Some(phase) => phase.as_str().to_string(),
                None => LOBBY_LABEL.to_string(),
            },
            token_color: phase.token_color().to_string(),
            community_cards: self.community().iter().map(|c| c.display()).collect(),
            available_tokens: self.available_tokens(),
            players,
            viewer_role,
            me: me.map(|p| PlayerView::new(p, true)),
            result_log: self.result_log().to_vec(),
            vaults: tally.vaults,
            alarms: tally.alarms,
            match_target: tally.target,
        }
    }

    /// Snapshot the table for whoever holds a connection.
    pub fn project_for_connection(&self, connection: &str) -> TableView {
        let viewer = self.player_for_connection(connection).map(String::as_str);
        self.project(viewer)
    }
}
