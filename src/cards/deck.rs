//! Card supply.
//!
//! A `Deck` hands out unique cards from a single 52-card set. The table asks a
//! `DeckFactory` for a fresh deck at the start of every hand.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use super::{Card, Rank, Suit};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Deck errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("Deck exhausted: requested {requested} cards, {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
}

/// Source of previously undealt, unique cards.
pub trait Deck: Send {
    /// Draw `count` cards. Fails without drawing anything if the deck cannot
    /// supply all of them.
    fn draw(&mut self, count: usize) -> Result<Vec<Card>, DeckError>;

    /// Cards left in the deck.
    fn remaining(&self) -> usize;
}

/// Produces a fresh deck for each hand.
pub trait DeckFactory: Send {
    fn fresh_deck(&mut self) -> Box<dyn Deck>;
}

impl<F> DeckFactory for F
where
    F: FnMut() -> Box<dyn Deck> + Send,
{
    fn fresh_deck(&mut self) -> Box<dyn Deck> {
        self()
    }
}

/// All 52 cards in suit-major order.
pub fn full_set() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
        .collect()
}

/// A deck that deals cards in a fixed order, first card first.
#[derive(Debug, Clone)]
pub struct StackedDeck {
    cards: Vec<Card>,
}

impl StackedDeck {
    pub fn new(cards: Vec<Card>) -> Self {
        let mut cards = cards;
        // Dealing pops from the back.
        cards.reverse();
        Self { cards }
    }
}

impl Deck for StackedDeck {
    fn draw(&mut self, count: usize) -> Result<Vec<Card>, DeckError> {
        if count > self.cards.len() {
            return Err(DeckError::Exhausted {
                requested: count,
                remaining: self.cards.len(),
            });
        }
        Ok((0..count).filter_map(|_| self.cards.pop()).collect())
    }

    fn remaining(&self) -> usize {
        self.cards.len()
    }
}

/// A shuffled 52-card deck.
#[derive(Debug, Clone)]
pub struct ShuffledDeck {
    inner: StackedDeck,
}

impl ShuffledDeck {
    /// Shuffle with the thread-local RNG.
    pub fn new() -> Self {
        let mut cards = full_set();
        cards.shuffle(&mut rand::rng());
        Self {
            inner: StackedDeck::new(cards),
        }
    }

    /// Shuffle deterministically from a seed.
    pub fn seeded(seed: u64) -> Self {
        let mut cards = full_set();
        cards.shuffle(&mut StdRng::seed_from_u64(seed));
        Self {
            inner: StackedDeck::new(cards),
        }
    }
}

impl Default for ShuffledDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck for ShuffledDeck {
    fn draw(&mut self, count: usize) -> Result<Vec<Card>, DeckError> {
        self.inner.draw(count)
    }

    fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

/// Default factory: a new shuffled deck per hand, reproducible when seeded.
#[derive(Debug, Clone, Default)]
pub struct ShuffledDeckFactory {
    seed: Option<u64>,
    decks_made: u64,
}

impl ShuffledDeckFactory {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            decks_made: 0,
        }
    }
}

impl DeckFactory for ShuffledDeckFactory {
    fn fresh_deck(&mut self) -> Box<dyn Deck> {
        let deck = match self.seed {
            Some(seed) => ShuffledDeck::seeded(seed.wrapping_add(self.decks_made)),
            None => ShuffledDeck::new(),
        };
        self.decks_made += 1;
        Box::new(deck)
    }
}
