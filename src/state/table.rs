//! The table: one game of Heist.
//!
//! Owns every player, the connection index, the community cards, the token
//! pool and the match tally. All mutation goes through the operations below;
//! each one either completes or fails with the table unchanged.
//!
//! A `Table` is not internally synchronized. Callers serialize access, e.g.
//! by running it inside a single event loop or behind a mutex.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::connection::ConnectionMap;
use super::error::TableError;
use super::phase::Phase;
use super::player::{Player, PlayerId};
use super::showdown::{self, MatchTally, ScoredHand, ShowdownReport};
use super::tokens::{Token, TokenPool, TokenSource, POOL_SOURCE};
use crate::cards::{
    Card, Deck, DeckError, DeckFactory, HandEvaluator, ShuffledDeckFactory, StandardEvaluator,
    DECK_SIZE,
};
use crate::config::TableConfig;

/// Cards revealed on the board over a full hand.
const BOARD_SIZE: usize = 5;

/// Most players one deck can deal in alongside a full board.
pub const MAX_SEATED_PLAYERS: usize = (DECK_SIZE - BOARD_SIZE) / 2;

/// Result of a join or reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStatus {
    Joined,
    /// New player who asked to play while a hand was running
    JoinedAsObserver,
    Reconnected,
    /// Returning player who was not dealt into the running hand
    ReconnectedAsObserver,
}

impl JoinStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Joined => "Joined.",
            Self::JoinedAsObserver => "Joined as observer until the next hand.",
            Self::Reconnected => "Reconnected.",
            Self::ReconnectedAsObserver => "Reconnected as observer until the next hand.",
        }
    }
}

/// Game state for a single table.
pub struct Table {
    config: TableConfig,

    /// Players indexed by player_id
    players: HashMap<PlayerId, Player>,

    /// Join order, used for dealing and the roster
    seat_order: Vec<PlayerId>,

    connections: ConnectionMap,

    community: Vec<Card>,
    deck: Option<Box<dyn Deck>>,
    deck_factory: Box<dyn DeckFactory>,
    evaluator: Box<dyn HandEvaluator>,

    phase: Phase,
    pool: TokenPool,

    /// Tokens issued at the start of the current round
    round_size: usize,

    game_started: bool,
    tally: MatchTally,
    result_log: Vec<String>,
    last_report: Option<ShowdownReport>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("config", &self.config)
            .field("players", &self.players)
            .field("seat_order", &self.seat_order)
            .field("connections", &self.connections)
            .field("community", &self.community)
            .field("phase", &self.phase)
            .field("pool", &self.pool)
            .field("game_started", &self.game_started)
            .field("tally", &self.tally)
            .finish_non_exhaustive()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl Table {
    /// Create a table with a shuffled deck and the standard evaluator.
    pub fn new(config: TableConfig) -> Self {
        let factory = ShuffledDeckFactory::new(config.deck_seed);
        Self::with_collaborators(config, factory, StandardEvaluator::new())
    }

    /// Create a table with custom card supply and hand evaluation.
    pub fn with_collaborators(
        config: TableConfig,
        deck_factory: impl DeckFactory + 'static,
        evaluator: impl HandEvaluator + 'static,
    ) -> Self {
        let tally = MatchTally::new(config.match_target);
        Self {
            config,
            players: HashMap::new(),
            seat_order: Vec::new(),
            connections: ConnectionMap::new(),
            community: Vec::new(),
            deck: None,
            deck_factory: Box::new(deck_factory),
            evaluator: Box::new(evaluator),
            phase: Phase::Preflop,
            pool: TokenPool::new(),
            round_size: 0,
            game_started: false,
            tally,
            result_log: Vec::new(),
            last_report: None,
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Current phase, or `None` before the first hand.
    pub fn phase(&self) -> Option<Phase> {
        self.game_started.then_some(self.phase)
    }

    pub fn is_started(&self) -> bool {
        self.game_started
    }

    /// Get a player.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// All players in seat order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.seat_order.iter().filter_map(|id| self.players.get(id))
    }

    /// Player count, observers included.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Non-observer count.
    pub fn active_count(&self) -> usize {
        self.players.values().filter(|p| p.is_active()).count()
    }

    /// Resolve a connection to its player.
    pub fn player_for_connection(&self, connection: &str) -> Option<&PlayerId> {
        self.connections.player_for(connection)
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    /// Unclaimed tokens, ascending.
    pub fn available_tokens(&self) -> Vec<Token> {
        self.pool.available()
    }

    /// Tokens issued for the current round.
    pub fn round_size(&self) -> usize {
        self.round_size
    }

    pub fn tally(&self) -> &MatchTally {
        &self.tally
    }

    /// Narrative of the last showdown.
    pub fn result_log(&self) -> &[String] {
        &self.result_log
    }

    pub fn last_report(&self) -> Option<&ShowdownReport> {
        self.last_report.as_ref()
    }

    // ---------------------------------------------------------------------
    // Identity
    // ---------------------------------------------------------------------

    fn is_duplicate_name(&self, candidate: &str, exclude: &str) -> bool {
        self.players
            .values()
            .any(|p| p.player_id != exclude && p.name_matches(candidate))
    }

    /// Handle a client announcing itself on a connection.
    ///
    /// New identities are created; known ones reconnect and keep their hand.
    /// A player who asks to play while a hand is running without having been
    /// dealt into it observes until the next deal.
    pub fn join_or_reconnect(
        &mut self,
        connection: &str,
        player_id: &str,
        name: &str,
        wants_to_play: bool,
    ) -> Result<JoinStatus, TableError> {
        let player_id = player_id.trim();
        let name = name.trim();

        if player_id.is_empty() {
            return Err(TableError::EmptyPlayerId);
        }
        if player_id == POOL_SOURCE {
            return Err(TableError::ReservedPlayerId);
        }
        if name.is_empty() {
            return Err(TableError::EmptyName);
        }
        if self.is_duplicate_name(name, player_id) {
            return Err(TableError::NameTaken);
        }

        if let Some(previous) = self
            .connections
            .bind(connection.to_string(), player_id.to_string())
        {
            // The connection moved to another identity.
            if previous != player_id && !self.connections.has_connections(&previous) {
                if let Some(player) = self.players.get_mut(&previous) {
                    player.mark_disconnected();
                    log::debug!("Player {} disconnected", previous);
                }
            }
        }

        let Some(player) = self.players.get_mut(player_id) else {
            let forced = self.game_started && wants_to_play;
            let observer = forced || !wants_to_play;
            let mut player = Player::new(player_id.to_string(), name.to_string(), observer);
            player.seat_requested = forced;
            self.players.insert(player_id.to_string(), player);
            self.seat_order.push(player_id.to_string());

            log::info!("Player {} joined as '{}' (observer: {})", player_id, name, observer);
            return Ok(if forced {
                JoinStatus::JoinedAsObserver
            } else {
                JoinStatus::Joined
            });
        };

        player.name = name.to_string();
        let forced = self.game_started && wants_to_play && !player.has_hand();
        player.is_observer = forced || !wants_to_play;
        player.seat_requested = forced;
        player.mark_connected();

        if player.is_observer {
            if let Some(token) = player.reset_hand() {
                self.pool.put_back(token);
            }
        }

        log::info!("Player {} reconnected (observer: {})", player_id, player.is_observer);
        Ok(if forced {
            JoinStatus::ReconnectedAsObserver
        } else {
            JoinStatus::Reconnected
        })
    }

    /// Change a player's display name.
    pub fn rename(&mut self, player_id: &str, new_name: &str) -> Result<(), TableError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(TableError::EmptyName);
        }
        if self.is_duplicate_name(new_name, player_id) {
            return Err(TableError::NameTaken);
        }

        let player = self
            .players
            .get_mut(player_id)
            .ok_or(TableError::PlayerNotFound)?;
        player.name = new_name.to_string();
        Ok(())
    }

    /// Handle a closed connection. The player stays at the table; they are
    /// marked disconnected once their last connection is gone.
    ///
    /// Returns whether a player was affected.
    pub fn handle_disconnect(&mut self, connection: &str) -> bool {
        let Some(player_id) = self.connections.unbind(connection) else {
            return false;
        };
        let still_connected = self.connections.has_connections(&player_id);

        match self.players.get_mut(&player_id) {
            Some(player) => {
                if !still_connected {
                    player.mark_disconnected();
                    log::debug!("Player {} disconnected", player_id);
                }
                true
            }
            None => false,
        }
    }

    /// Remove a player who is currently disconnected, returning their token.
    pub fn remove_disconnected_player(&mut self, target_player_id: &str) -> Result<(), TableError> {
        let target = target_player_id.trim();
        if target.is_empty() {
            return Err(TableError::EmptyPlayerId);
        }

        let player = self.players.get(target).ok_or(TableError::PlayerNotFound)?;
        if player.is_connected {
            return Err(TableError::PlayerConnected);
        }

        self.connections.purge_player(target);
        if let Some(player) = self.players.remove(target) {
            if let Some(token) = player.token {
                self.pool.put_back(token);
            }
        }
        self.seat_order.retain(|id| id != target);

        log::info!("Removed disconnected player {}", target);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tokens
    // ---------------------------------------------------------------------

    /// Check the actor may move tokens right now.
    fn token_actor(&self, player_id: &str) -> Result<&Player, TableError> {
        let player = self.players.get(player_id).ok_or(TableError::PlayerNotFound)?;
        if player.is_observer {
            return Err(TableError::Observer);
        }
        if self.game_started && self.phase.is_terminal() {
            return Err(TableError::HandOver);
        }
        if player.is_settled {
            return Err(TableError::AlreadySettled);
        }
        Ok(player)
    }

    /// Claim a token from the pool or from another player.
    ///
    /// Any token the actor already holds goes back to the pool. Taking a
    /// token from another player leaves them empty-handed and unsettled.
    pub fn claim_token(
        &mut self,
        actor_id: &str,
        value: Token,
        source: &TokenSource,
    ) -> Result<(), TableError> {
        let actor = self.token_actor(actor_id)?;
        if !actor.has_hand() {
            return Err(TableError::NotDealt);
        }
        let held = actor.token;

        match source {
            TokenSource::Pool => {
                if !self.pool.contains(value) && held != Some(value) {
                    return Err(TableError::TokenUnavailable(value));
                }
                if let Some(token) = held {
                    self.pool.put_back(token);
                }
                self.pool.take(value);
            }
            TokenSource::Player(victim_id) => {
                if victim_id == actor_id {
                    return Err(TableError::SelfSteal);
                }
                let victim = self
                    .players
                    .get_mut(victim_id)
                    .ok_or(TableError::PlayerNotFound)?;
                if victim.token != Some(value) {
                    return Err(TableError::TokenNotHeld(value));
                }
                victim.take_token();
                if let Some(token) = held {
                    self.pool.put_back(token);
                }
            }
        }

        if let Some(actor) = self.players.get_mut(actor_id) {
            actor.give_token(value);
        }
        log::debug!("Player {} claimed token {} from {:?}", actor_id, value, source);
        Ok(())
    }

    /// Put the held token back in the pool.
    pub fn return_token(&mut self, player_id: &str) -> Result<Token, TableError> {
        let token = self.token_actor(player_id)?.token.ok_or(TableError::NoToken)?;

        if let Some(player) = self.players.get_mut(player_id) {
            player.take_token();
        }
        self.pool.put_back(token);

        log::debug!("Player {} returned token {}", player_id, token);
        Ok(token)
    }

    /// Flip a player's settled flag. Returns the new flag.
    ///
    /// When every connected player is settled with a token, the table moves
    /// to the next round.
    pub fn toggle_settled(&mut self, player_id: &str) -> Result<bool, TableError> {
        let player = self.players.get(player_id).ok_or(TableError::PlayerNotFound)?;
        if player.is_observer {
            return Err(TableError::Observer);
        }
        if player.token.is_none() {
            return Err(TableError::NoToken);
        }
        if self.game_started && self.phase.is_terminal() {
            return Err(TableError::HandOver);
        }

        let settled = !player.is_settled;
        self.set_settled(player_id, settled);

        if self.barrier_reached() {
            if let Err(e) = self.advance() {
                self.set_settled(player_id, !settled);
                return Err(e);
            }
        }
        Ok(settled)
    }

    fn set_settled(&mut self, player_id: &str, settled: bool) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.is_settled = settled;
        }
    }

    /// Every connected player is settled with a token. Disconnected players
    /// do not hold the table up.
    fn barrier_reached(&self) -> bool {
        let mut active = self
            .players
            .values()
            .filter(|p| p.is_connected && p.is_active())
            .peekable();
        active.peek().is_some() && active.all(|p| p.is_settled && p.token.is_some())
    }

    // ---------------------------------------------------------------------
    // Hand flow
    // ---------------------------------------------------------------------

    /// Deal a new hand. Ends a finished match first.
    pub fn start_hand(&mut self) -> Result<(), TableError> {
        self.deal(false)
    }

    /// Reset vaults and alarms, then deal a new hand.
    pub fn restart_match(&mut self) -> Result<(), TableError> {
        self.deal(true)
    }

    fn deal(&mut self, reset_match: bool) -> Result<(), TableError> {
        let seated: HashSet<PlayerId> = self
            .players
            .values()
            .filter(|p| p.is_active() || p.seat_requested)
            .map(|p| p.player_id.clone())
            .collect();

        if seated.len() < self.config.min_players {
            return Err(TableError::NotEnoughPlayers {
                required: self.config.min_players,
                present: seated.len(),
            });
        }
        if seated.len() > MAX_SEATED_PLAYERS {
            return Err(TableError::TooManyPlayers {
                present: seated.len(),
                max: MAX_SEATED_PLAYERS,
            });
        }

        let mut deck = self.deck_factory.fresh_deck();
        let mut hands = Vec::with_capacity(seated.len());
        for player_id in self.seat_order.iter().filter(|id| seated.contains(*id)) {
            hands.push((player_id.clone(), deck.draw(2)?));
        }

        if reset_match || self.tally.is_over() {
            self.tally.reset();
        }

        for player in self.players.values_mut() {
            player.reset_hand();
            if seated.contains(&player.player_id) {
                player.is_observer = false;
                player.seat_requested = false;
            }
        }
        for (player_id, cards) in hands {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.hole_cards = cards;
            }
        }

        self.deck = Some(deck);
        self.game_started = true;
        self.phase = Phase::Preflop;
        self.community.clear();
        self.result_log.clear();
        self.last_report = None;
        self.reset_round();

        log::info!(
            "Dealt a new hand to {} players (vaults {}, alarms {})",
            seated.len(),
            self.tally.vaults,
            self.tally.alarms
        );
        Ok(())
    }

    /// Fresh pool of `1..=N` for the non-observers; nobody holds a token.
    fn reset_round(&mut self) {
        self.round_size = self.active_count();
        self.pool.reset(self.round_size);
        for player in self.players.values_mut() {
            player.take_token();
        }
    }

    /// Move to the next phase.
    ///
    /// Tokens held in the outgoing round are archived under its color.
    /// Leaving the river scores the hand and lands on `Result`.
    pub fn advance(&mut self) -> Result<(), TableError> {
        if !self.game_started {
            return Ok(());
        }
        let Some(next) = self.phase.next() else {
            return Ok(());
        };

        let revealed = match (next.reveals(), self.deck.as_mut()) {
            (0, _) => Vec::new(),
            (count, Some(deck)) => deck.draw(count)?,
            (count, None) => {
                return Err(DeckError::Exhausted {
                    requested: count,
                    remaining: 0,
                }
                .into())
            }
        };

        let color = self.phase.token_color();
        for player in self.players.values_mut().filter(|p| p.is_active()) {
            player.archive_token(color);
        }

        self.phase = next;
        self.community.extend(revealed);
        log::info!("Table advanced to {}", self.phase);

        match self.phase {
            Phase::Flop | Phase::Turn | Phase::River => self.reset_round(),
            Phase::Showdown => {
                self.run_showdown();
                self.phase = Phase::Result;
            }
            Phase::Preflop | Phase::Result => {}
        }
        Ok(())
    }

    fn run_showdown(&mut self) {
        let hands: Vec<ScoredHand> = self
            .players()
            .filter(|p| p.is_active())
            .filter_map(|p| {
                let token = p.token?;
                let score = self.evaluator.evaluate(&self.community, &p.hole_cards);
                Some(ScoredHand {
                    player_id: p.player_id.clone(),
                    name: p.name.clone(),
                    token,
                    score,
                    class_label: self.evaluator.class_label(score),
                })
            })
            .collect();

        let report = showdown::score(hands);
        let outcome = report.outcome();
        self.tally.record(outcome);
        self.result_log = self.tally.narrative(&report);

        log::info!(
            "Showdown: {:?} with total error {} (vaults {}, alarms {})",
            outcome,
            report.total_error,
            self.tally.vaults,
            self.tally.alarms
        );
        self.last_report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank::*, StackedDeck, Suit::*};
    use crate::state::showdown::{Accuracy, Outcome};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn c(rank: crate::cards::Rank, suit: crate::cards::Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Alice: pair of aces, Bob: pair of kings, Cara: jack high.
    fn scripted_cards() -> Vec<Card> {
        vec![
            c(Ace, Spades),
            c(Ace, Hearts),
            c(King, Spades),
            c(King, Hearts),
            c(Three, Diamonds),
            c(Five, Hearts),
            // flop, turn, river
            c(Two, Clubs),
            c(Seven, Diamonds),
            c(Nine, Hearts),
            c(Jack, Spades),
            c(Four, Clubs),
        ]
    }

    fn table_with_cards(cards: Vec<Card>) -> Table {
        Table::with_collaborators(
            TableConfig::default(),
            move || Box::new(StackedDeck::new(cards.clone())) as Box<dyn Deck>,
            StandardEvaluator::new(),
        )
    }

    /// Three connected players, hand not dealt yet.
    fn seated_table() -> Table {
        let mut table = table_with_cards(scripted_cards());
        table.join_or_reconnect("c-a", "a", "Alice", true).unwrap();
        table.join_or_reconnect("c-b", "b", "Bob", true).unwrap();
        table.join_or_reconnect("c-c", "c", "Cara", true).unwrap();
        table
    }

    fn dealt_table() -> Table {
        let mut table = seated_table();
        table.start_hand().unwrap();
        table
    }

    /// Claim from the pool and settle, in order.
    fn play_round(table: &mut Table, claims: &[(&str, Token)]) {
        for (player_id, token) in claims {
            table.claim_token(player_id, *token, &TokenSource::Pool).unwrap();
        }
        for (player_id, _) in claims {
            table.toggle_settled(player_id).unwrap();
        }
    }

    fn held(table: &Table, player_id: &str) -> Option<Token> {
        table.player(player_id).unwrap().token
    }

    // --- identity ---

    #[test]
    fn test_join_validation() {
        let mut table = Table::default();

        assert_eq!(
            table.join_or_reconnect("c-1", "  ", "Alice", true),
            Err(TableError::EmptyPlayerId)
        );
        assert_eq!(
            table.join_or_reconnect("c-1", "a", " ", true),
            Err(TableError::EmptyName)
        );
        assert_eq!(table.join_or_reconnect("c-1", "a", "Alice", true), Ok(JoinStatus::Joined));
        assert_eq!(
            table.join_or_reconnect("c-2", "b", "ALICE", true),
            Err(TableError::NameTaken)
        );
        assert_eq!(table.player_count(), 1);
        assert!(table.player_for_connection("c-2").is_none());
    }

    #[test]
    fn test_join_trims_and_observer_choice() {
        let mut table = Table::default();
        table.join_or_reconnect("c-1", " a ", " Alice ", false).unwrap();

        let alice = table.player("a").unwrap();
        assert_eq!(alice.name, "Alice");
        assert!(alice.is_observer);
        assert!(!alice.seat_requested);
    }

    #[test]
    fn test_reserved_player_id() {
        let mut table = Table::default();
        assert_eq!(
            table.join_or_reconnect("c-1", "center", "Alice", true),
            Err(TableError::ReservedPlayerId)
        );
        assert_eq!(table.player_count(), 0);
        assert!(table.player_for_connection("c-1").is_none());
    }

    #[test]
    fn test_rebound_connection_disconnects_previous_player() {
        let mut table = dealt_table();
        table.claim_token("a", 3, &TokenSource::Pool).unwrap();

        // Alice's socket now announces a new identity.
        table.join_or_reconnect("c-a", "d", "Dan", true).unwrap();

        let alice = table.player("a").unwrap();
        assert!(!alice.is_connected);
        assert!(alice.disconnected_at.is_some());

        // Alice no longer blocks the round.
        play_round(&mut table, &[("b", 2), ("c", 1)]);
        assert_eq!(table.phase(), Some(Phase::Flop));

        table.remove_disconnected_player("a").unwrap();
        assert!(table.player("a").is_none());
        assert!(table.player("d").unwrap().is_connected);
    }

    #[test]
    fn test_rebinding_keeps_player_with_other_connections() {
        let mut table = seated_table();
        table.join_or_reconnect("c-a2", "a", "Alice", true).unwrap();

        table.join_or_reconnect("c-a", "d", "Dan", true).unwrap();

        assert!(table.player("a").unwrap().is_connected);
        assert_eq!(
            table.player_for_connection("c-a").map(String::as_str),
            Some("d")
        );
    }

    #[test]
    fn test_rename() {
        let mut table = seated_table();

        assert_eq!(table.rename("a", "bob"), Err(TableError::NameTaken));
        assert_eq!(table.rename("a", ""), Err(TableError::EmptyName));
        assert_eq!(table.rename("zed", "Zed"), Err(TableError::PlayerNotFound));

        table.rename("a", "ALICE").unwrap();
        assert_eq!(table.player("a").unwrap().name, "ALICE");
    }

    #[test]
    fn test_same_identity_can_change_name_on_reconnect() {
        let mut table = seated_table();
        let status = table.join_or_reconnect("c-a2", "a", "Ally", true).unwrap();

        assert_eq!(status, JoinStatus::Reconnected);
        assert_eq!(table.player("a").unwrap().name, "Ally");
        assert_eq!(table.player_count(), 3);
    }

    #[test]
    fn test_new_player_mid_hand_is_forced_to_observe() {
        let mut table = dealt_table();
        let status = table.join_or_reconnect("c-d", "d", "Dan", true).unwrap();

        assert_eq!(status, JoinStatus::JoinedAsObserver);
        let dan = table.player("d").unwrap();
        assert!(dan.is_observer);
        assert!(dan.hole_cards.is_empty());
        assert_eq!(table.round_size(), 3);
    }

    #[test]
    fn test_forced_observer_is_seated_next_hand() {
        let cards: Vec<Card> = crate::cards::deck::full_set();
        let mut table = table_with_cards(cards);
        table.join_or_reconnect("c-a", "a", "Alice", true).unwrap();
        table.join_or_reconnect("c-b", "b", "Bob", true).unwrap();
        table.join_or_reconnect("c-c", "c", "Cara", true).unwrap();
        table.start_hand().unwrap();
        table.join_or_reconnect("c-d", "d", "Dan", true).unwrap();

        table.start_hand().unwrap();

        let dan = table.player("d").unwrap();
        assert!(!dan.is_observer);
        assert_eq!(dan.hole_cards.len(), 2);
        assert_eq!(table.available_tokens(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reconnect_preserves_hand() {
        let mut table = dealt_table();
        table.claim_token("a", 3, &TokenSource::Pool).unwrap();
        let before = table.player("a").unwrap().clone();

        assert!(table.handle_disconnect("c-a"));
        assert!(!table.player("a").unwrap().is_connected);

        let status = table.join_or_reconnect("c-a-new", "a", "Alice", true).unwrap();
        assert_eq!(status, JoinStatus::Reconnected);

        let after = table.player("a").unwrap();
        assert!(after.is_connected);
        assert!(after.disconnected_at.is_none());
        assert_eq!(after.hole_cards, before.hole_cards);
        assert_eq!(after.token, Some(3));
        assert_eq!(after.token_history, before.token_history);
    }

    #[test]
    fn test_undealt_player_reconnects_as_observer() {
        let mut table = dealt_table();
        table.join_or_reconnect("c-e", "e", "Eve", true).unwrap();
        table.handle_disconnect("c-e");

        let status = table.join_or_reconnect("c-e2", "e", "Eve", true).unwrap();

        assert_eq!(status, JoinStatus::ReconnectedAsObserver);
        let eve = table.player("e").unwrap();
        assert!(eve.is_observer);
        assert!(eve.seat_requested);
        assert!(eve.is_connected);
    }

    #[test]
    fn test_switching_to_observer_returns_token() {
        let mut table = dealt_table();
        table.claim_token("b", 2, &TokenSource::Pool).unwrap();
        table.toggle_settled("b").unwrap();

        let status = table.join_or_reconnect("c-b", "b", "Bob", false).unwrap();
        assert_eq!(status, JoinStatus::Reconnected);

        let bob = table.player("b").unwrap();
        assert!(bob.is_observer);
        assert_eq!(bob.token, None);
        assert!(!bob.is_settled);
        assert!(bob.hole_cards.is_empty());
        assert_eq!(table.available_tokens(), vec![1, 2, 3]);
    }

    #[test]
    fn test_multiple_connections_keep_player_connected() {
        let mut table = seated_table();
        table.join_or_reconnect("c-a-tab2", "a", "Alice", true).unwrap();

        assert!(table.handle_disconnect("c-a"));
        assert!(table.player("a").unwrap().is_connected);

        assert!(table.handle_disconnect("c-a-tab2"));
        assert!(!table.player("a").unwrap().is_connected);

        assert!(!table.handle_disconnect("c-a-tab2"));
    }

    #[test]
    fn test_remove_connected_player_fails() {
        let mut table = dealt_table();
        table.claim_token("b", 2, &TokenSource::Pool).unwrap();

        assert_eq!(table.remove_disconnected_player("b"), Err(TableError::PlayerConnected));
        assert_eq!(table.remove_disconnected_player("zed"), Err(TableError::PlayerNotFound));
        assert_eq!(table.remove_disconnected_player(""), Err(TableError::EmptyPlayerId));
        assert_eq!(held(&table, "b"), Some(2));
        assert_eq!(table.player_count(), 3);
    }

    #[test]
    fn test_remove_disconnected_player_returns_token() {
        let mut table = dealt_table();
        table.claim_token("b", 2, &TokenSource::Pool).unwrap();
        table.handle_disconnect("c-b");

        table.remove_disconnected_player("b").unwrap();

        assert!(table.player("b").is_none());
        assert_eq!(table.available_tokens(), vec![1, 2, 3]);
        assert_eq!(table.players().count(), 2);
    }

    // --- tokens ---

    #[test]
    fn test_claim_before_deal_fails() {
        let mut table = seated_table();
        assert_eq!(
            table.claim_token("a", 1, &TokenSource::Pool),
            Err(TableError::NotDealt)
        );
    }

    #[test]
    fn test_claim_from_pool_and_swap() {
        let mut table = dealt_table();

        table.claim_token("a", 1, &TokenSource::Pool).unwrap();
        assert_eq!(table.available_tokens(), vec![2, 3]);

        // Swapping releases the old token.
        table.claim_token("a", 3, &TokenSource::Pool).unwrap();
        assert_eq!(held(&table, "a"), Some(3));
        assert_eq!(table.available_tokens(), vec![1, 2]);

        // Re-claiming the held token is a no-op.
        table.claim_token("a", 3, &TokenSource::Pool).unwrap();
        assert_eq!(held(&table, "a"), Some(3));
        assert_eq!(table.available_tokens(), vec![1, 2]);
    }

    #[test]
    fn test_failed_claim_leaves_state_unchanged() {
        let mut table = dealt_table();
        table.claim_token("a", 1, &TokenSource::Pool).unwrap();
        table.claim_token("b", 2, &TokenSource::Pool).unwrap();

        assert_eq!(
            table.claim_token("a", 2, &TokenSource::Pool),
            Err(TableError::TokenUnavailable(2))
        );
        assert_eq!(
            table.claim_token("a", 9, &TokenSource::Pool),
            Err(TableError::TokenUnavailable(9))
        );
        assert_eq!(
            table.claim_token("a", 3, &TokenSource::Player("b".to_string())),
            Err(TableError::TokenNotHeld(3))
        );
        assert_eq!(
            table.claim_token("a", 1, &TokenSource::Player("ghost".to_string())),
            Err(TableError::PlayerNotFound)
        );

        assert_eq!(held(&table, "a"), Some(1));
        assert_eq!(held(&table, "b"), Some(2));
        assert_eq!(table.available_tokens(), vec![3]);
    }

    #[test]
    fn test_steal_unsettles_victim() {
        let mut table = dealt_table();
        table.claim_token("a", 1, &TokenSource::Pool).unwrap();
        table.claim_token("b", 3, &TokenSource::Pool).unwrap();
        table.toggle_settled("b").unwrap();

        table
            .claim_token("a", 3, &TokenSource::Player("b".to_string()))
            .unwrap();

        let bob = table.player("b").unwrap();
        assert_eq!(bob.token, None);
        assert!(!bob.is_settled);
        assert_eq!(held(&table, "a"), Some(3));
        assert_eq!(table.available_tokens(), vec![1, 2]);
    }

    #[test]
    fn test_cannot_steal_from_self() {
        let mut table = dealt_table();
        table.claim_token("a", 1, &TokenSource::Pool).unwrap();
        assert_eq!(
            table.claim_token("a", 1, &TokenSource::Player("a".to_string())),
            Err(TableError::SelfSteal)
        );
        assert_eq!(held(&table, "a"), Some(1));
    }

    #[test]
    fn test_settled_player_is_locked() {
        let mut table = dealt_table();
        table.claim_token("a", 1, &TokenSource::Pool).unwrap();
        table.toggle_settled("a").unwrap();

        assert_eq!(
            table.claim_token("a", 2, &TokenSource::Pool),
            Err(TableError::AlreadySettled)
        );
        assert_eq!(table.return_token("a"), Err(TableError::AlreadySettled));

        // Unsettling unlocks.
        assert_eq!(table.toggle_settled("a"), Ok(false));
        assert_eq!(table.return_token("a"), Ok(1));
    }

    #[test]
    fn test_return_token() {
        let mut table = dealt_table();
        assert_eq!(table.return_token("a"), Err(TableError::NoToken));

        table.claim_token("a", 2, &TokenSource::Pool).unwrap();
        table.claim_token("b", 1, &TokenSource::Pool).unwrap();
        assert_eq!(table.return_token("b"), Ok(1));
        assert_eq!(table.available_tokens(), vec![1, 3]);
    }

    #[test]
    fn test_observer_cannot_use_tokens() {
        let mut table = dealt_table();
        table.join_or_reconnect("c-d", "d", "Dan", false).unwrap();

        assert_eq!(
            table.claim_token("d", 1, &TokenSource::Pool),
            Err(TableError::Observer)
        );
        assert_eq!(table.return_token("d"), Err(TableError::Observer));
        assert_eq!(table.toggle_settled("d"), Err(TableError::Observer));
    }

    #[test]
    fn test_settle_requires_token() {
        let mut table = dealt_table();
        assert_eq!(table.toggle_settled("a"), Err(TableError::NoToken));
        assert_eq!(table.toggle_settled("ghost"), Err(TableError::PlayerNotFound));
    }

    // --- phases ---

    #[test]
    fn test_start_requires_players() {
        let mut table = table_with_cards(scripted_cards());
        table.join_or_reconnect("c-a", "a", "Alice", true).unwrap();
        table.join_or_reconnect("c-b", "b", "Bob", true).unwrap();
        table.join_or_reconnect("c-x", "x", "Xavier", false).unwrap();

        assert_eq!(
            table.start_hand(),
            Err(TableError::NotEnoughPlayers {
                required: 3,
                present: 2
            })
        );
        assert_eq!(table.phase(), None);
    }

    #[test]
    fn test_start_rejects_more_players_than_the_deck_holds() {
        let mut table = Table::default();
        for i in 0..=MAX_SEATED_PLAYERS {
            let id = format!("p-{i}");
            table.join_or_reconnect(&format!("c-{i}"), &id, &id, true).unwrap();
        }

        assert_eq!(
            table.start_hand(),
            Err(TableError::TooManyPlayers {
                present: 24,
                max: 23
            })
        );
        assert!(!table.is_started());
    }

    #[test]
    fn test_start_hand_deals() {
        let mut table = seated_table();
        table.join_or_reconnect("c-x", "x", "Xavier", false).unwrap();
        table.start_hand().unwrap();

        assert_eq!(table.phase(), Some(Phase::Preflop));
        assert_eq!(
            table.player("a").unwrap().hole_cards,
            vec![c(Ace, Spades), c(Ace, Hearts)]
        );
        assert_eq!(table.player("c").unwrap().hole_cards.len(), 2);
        assert!(table.player("x").unwrap().hole_cards.is_empty());
        assert!(table.community().is_empty());
        assert_eq!(table.available_tokens(), vec![1, 2, 3]);
    }

    #[test]
    fn test_barrier_advances_once() {
        let mut table = dealt_table();
        table.claim_token("a", 3, &TokenSource::Pool).unwrap();
        table.claim_token("b", 2, &TokenSource::Pool).unwrap();
        table.claim_token("c", 1, &TokenSource::Pool).unwrap();
        table.toggle_settled("a").unwrap();
        table.toggle_settled("b").unwrap();
        assert_eq!(table.phase(), Some(Phase::Preflop));

        table.toggle_settled("c").unwrap();

        assert_eq!(table.phase(), Some(Phase::Flop));
        assert_eq!(table.community().len(), 3);
        assert_eq!(table.available_tokens(), vec![1, 2, 3]);
        for id in ["a", "b", "c"] {
            let player = table.player(id).unwrap();
            assert_eq!(player.token, None);
            assert!(!player.is_settled);
            assert_eq!(player.token_history.len(), 1);
            assert_eq!(player.token_history[0].color, "White");
        }
        assert_eq!(table.player("a").unwrap().token_history[0].value, 3);
    }

    #[test]
    fn test_disconnected_player_does_not_block_barrier() {
        let mut table = dealt_table();
        table.claim_token("c", 1, &TokenSource::Pool).unwrap();
        table.handle_disconnect("c-c");

        play_round(&mut table, &[("a", 3), ("b", 2)]);

        assert_eq!(table.phase(), Some(Phase::Flop));
        assert_eq!(table.player("c").unwrap().token_history[0].value, 1);
    }

    #[test]
    fn test_perfect_hand_vaults() {
        let mut table = dealt_table();
        let claims = [("a", 3), ("b", 2), ("c", 1)];
        play_round(&mut table, &claims);
        play_round(&mut table, &claims);
        play_round(&mut table, &claims);
        assert_eq!(table.phase(), Some(Phase::River));
        assert_eq!(table.community().len(), 5);

        play_round(&mut table, &claims);

        assert_eq!(table.phase(), Some(Phase::Result));
        assert_eq!(table.tally().vaults, 1);
        assert_eq!(table.tally().alarms, 0);

        let report = table.last_report().unwrap();
        assert_eq!(report.outcome(), Outcome::Vault);
        assert_eq!(report.bucket(Accuracy::Perfect).len(), 3);
        assert_eq!(
            table.result_log(),
            &[
                "HEIST SUCCESS! 💰 (1/3)".to_string(),
                "Everyone nailed their spot. Total error: 0".to_string(),
                "✅ Perfect: Alice (#1 • Pair), Bob (#2 • Pair), Cara (#3 • High Card)".to_string(),
            ]
        );

        // Four rounds archived, no showdown entry.
        let history = &table.player("a").unwrap().token_history;
        let colors: Vec<&str> = history.iter().map(|e| e.color.as_str()).collect();
        assert_eq!(colors, vec!["White", "Yellow", "Orange", "Red"]);
        assert_eq!(held(&table, "a"), Some(3));
    }

    #[test]
    fn test_tokens_are_final_after_showdown() {
        let mut table = dealt_table();
        let claims = [("a", 3), ("b", 2), ("c", 1)];
        for _ in 0..4 {
            play_round(&mut table, &claims);
        }

        assert_eq!(
            table.claim_token("c", 3, &TokenSource::Player("a".to_string())),
            Err(TableError::HandOver)
        );
        assert_eq!(table.toggle_settled("a"), Err(TableError::HandOver));
        assert_eq!(table.return_token("b"), Err(TableError::HandOver));
    }

    #[test]
    fn test_wrong_claims_trip_alarm() {
        let mut table = dealt_table();
        let claims = [("a", 1), ("b", 2), ("c", 3)];
        for _ in 0..4 {
            play_round(&mut table, &claims);
        }

        assert_eq!(table.tally().alarms, 1);
        assert_eq!(table.tally().vaults, 0);
        assert_eq!(table.result_log()[0], "ALARM TRIPPED! 🚨 (1/3)");
        assert_eq!(table.last_report().unwrap().total_error, 4);
    }

    #[test]
    fn test_showdown_with_no_tokens_trips_alarm() {
        let mut table = dealt_table();
        for _ in 0..4 {
            table.advance().unwrap();
        }

        assert_eq!(table.phase(), Some(Phase::Result));
        assert_eq!(table.tally().alarms, 1);
        assert!(table.last_report().unwrap().verdicts.is_empty());

        // Terminal phase stays put.
        table.advance().unwrap();
        assert_eq!(table.phase(), Some(Phase::Result));
        assert_eq!(table.tally().alarms, 1);
    }

    #[test]
    fn test_match_over_resets_on_next_hand() {
        let mut table = dealt_table();
        for _ in 0..3 {
            table.start_hand().unwrap();
            for _ in 0..4 {
                table.advance().unwrap();
            }
        }
        assert_eq!(table.tally().alarms, 3);
        assert_eq!(
            table.result_log().last().unwrap(),
            "GAME OVER! THE POLICE ARRIVED! 🚓"
        );

        table.start_hand().unwrap();

        assert_eq!(table.tally().alarms, 0);
        assert_eq!(table.tally().vaults, 0);
        assert!(table.result_log().is_empty());
    }

    #[test]
    fn test_restart_match() {
        let mut table = dealt_table();
        for _ in 0..4 {
            table.advance().unwrap();
        }
        assert_eq!(table.tally().alarms, 1);

        table.restart_match().unwrap();
        assert_eq!(table.tally().alarms, 0);
        assert_eq!(table.phase(), Some(Phase::Preflop));
    }

    #[test]
    fn test_restart_match_is_atomic() {
        let mut table = dealt_table();
        for _ in 0..4 {
            table.advance().unwrap();
        }
        table.handle_disconnect("c-c");
        table.remove_disconnected_player("c").unwrap();

        assert!(matches!(
            table.restart_match(),
            Err(TableError::NotEnoughPlayers { .. })
        ));
        assert_eq!(table.tally().alarms, 1);
        assert_eq!(table.phase(), Some(Phase::Result));
    }

    #[test]
    fn test_round_size_follows_player_count() {
        let cards = crate::cards::deck::full_set();
        let mut table = table_with_cards(cards);
        for (id, name) in [("a", "Alice"), ("b", "Bob"), ("c", "Cara"), ("d", "Dan")] {
            table.join_or_reconnect(&format!("c-{id}"), id, name, true).unwrap();
        }
        table.start_hand().unwrap();
        assert_eq!(table.available_tokens(), vec![1, 2, 3, 4]);

        // Dan drops to observer mid-hand; next round has three tokens.
        table.join_or_reconnect("c-d", "d", "Dan", false).unwrap();
        play_round(&mut table, &[("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(table.phase(), Some(Phase::Flop));
        assert_eq!(table.round_size(), 3);
        assert_eq!(table.available_tokens(), vec![1, 2, 3]);
    }

    #[derive(Debug, Clone)]
    enum Move {
        Claim(usize, Token),
        Steal(usize, usize),
        Return(usize),
        Settle(usize),
    }

    fn move_strategy() -> impl Strategy<Value = Move> {
        prop_oneof![
            (0usize..4, 1u32..6).prop_map(|(p, t)| Move::Claim(p, t)),
            (0usize..4, 0usize..4).prop_map(|(p, v)| Move::Steal(p, v)),
            (0usize..4).prop_map(Move::Return),
            (0usize..4).prop_map(Move::Settle),
        ]
    }

    proptest! {
        #[test]
        fn test_token_conservation(moves in prop::collection::vec(move_strategy(), 0..60)) {
            let ids = ["a", "b", "c", "d"];
            let mut table = table_with_cards(crate::cards::deck::full_set());
            for id in ids {
                table.join_or_reconnect(&format!("c-{id}"), id, &id.to_uppercase(), true).unwrap();
            }
            table.start_hand().unwrap();

            for mv in moves {
                let _ = match mv {
                    Move::Claim(p, t) => table.claim_token(ids[p], t, &TokenSource::Pool),
                    Move::Steal(p, v) => {
                        let value = held(&table, ids[v]).unwrap_or(1);
                        table.claim_token(ids[p], value, &TokenSource::Player(ids[v].to_string()))
                    }
                    Move::Return(p) => table.return_token(ids[p]).map(|_| ()),
                    Move::Settle(p) => table.toggle_settled(ids[p]).map(|_| ()),
                };

                let mut all: Vec<Token> = table.available_tokens();
                all.extend(table.players().filter_map(|p| p.token));
                all.sort_unstable();
                let expected: Vec<Token> = (1..=table.round_size() as Token).collect();
                prop_assert_eq!(all, expected);

                for player in table.players() {
                    prop_assert!(!player.is_settled || player.token.is_some());
                }
            }
        }
    }
}
