//! Hand strength evaluation.
//!
//! Scores follow the "lower is stronger" convention: the best possible hand
//! has the smallest score, and two hands of identical strength always get
//! the same score.

use std::fmt;

use super::{Card, Rank};

/// Strength score. Lower is stronger.
pub type HandScore = u32;

/// Evaluates hands for the showdown.
pub trait HandEvaluator: Send {
    /// Score the best five-card hand from community plus hole cards.
    fn evaluate(&self, community: &[Card], hole: &[Card]) -> HandScore;

    /// Human-readable category for a score (e.g. "Full House").
    fn class_label(&self, score: HandScore) -> String;
}

/// Hand categories, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandClass {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::Pair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        }
    }

    fn from_index(index: u32) -> Self {
        match index {
            0 => Self::HighCard,
            1 => Self::Pair,
            2 => Self::TwoPair,
            3 => Self::ThreeOfAKind,
            4 => Self::Straight,
            5 => Self::Flush,
            6 => Self::FullHouse,
            7 => Self::FourOfAKind,
            8 => Self::StraightFlush,
            _ => Self::RoyalFlush,
        }
    }
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bits used by the tie-break ranks below the class.
const CLASS_SHIFT: u32 = 20;

/// Every strength is strictly below this, so scores are never zero.
const SCORE_CEILING: u32 = (HandClass::RoyalFlush as u32 + 1) << CLASS_SHIFT;

/// Texas Hold'em evaluator: best five of up to seven cards.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl StandardEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Strength of the best hand in `cards`. Higher is stronger.
    pub fn strength(cards: &[Card]) -> u32 {
        if cards.len() <= 5 {
            return strength_of_five(cards);
        }

        let n = cards.len();
        let mut best = 0;
        let mut hand = [cards[0]; 5];
        for a in 0..n {
            for b in a + 1..n {
                for c in b + 1..n {
                    for d in c + 1..n {
                        for e in d + 1..n {
                            hand[0] = cards[a];
                            hand[1] = cards[b];
                            hand[2] = cards[c];
                            hand[3] = cards[d];
                            hand[4] = cards[e];
                            best = best.max(strength_of_five(&hand));
                        }
                    }
                }
            }
        }
        best
    }

    /// Category of a score produced by `evaluate`.
    pub fn class_of(score: HandScore) -> HandClass {
        let strength = SCORE_CEILING.saturating_sub(score);
        HandClass::from_index(strength >> CLASS_SHIFT)
    }
}

impl HandEvaluator for StandardEvaluator {
    fn evaluate(&self, community: &[Card], hole: &[Card]) -> HandScore {
        let cards: Vec<Card> = community.iter().chain(hole.iter()).copied().collect();
        SCORE_CEILING - Self::strength(&cards)
    }

    fn class_label(&self, score: HandScore) -> String {
        Self::class_of(score).to_string()
    }
}

/// Pack a class and up to five tie-break ranks into one comparable number.
fn pack(class: HandClass, ranks: &[u8]) -> u32 {
    let mut value = (class as u32) << CLASS_SHIFT;
    for (i, rank) in ranks.iter().take(5).enumerate() {
        value |= (*rank as u32) << (16 - 4 * i as u32);
    }
    value
}

/// High card of a five-rank straight, counting the wheel as five-high.
fn straight_high(ranks_desc: &[u8]) -> Option<u8> {
    let mut distinct = ranks_desc.to_vec();
    distinct.dedup();
    if distinct.len() != 5 {
        return None;
    }
    if distinct[0] - distinct[4] == 4 {
        return Some(distinct[0]);
    }
    if distinct == [Rank::Ace.value(), 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

fn strength_of_five(cards: &[Card]) -> u32 {
    if cards.is_empty() {
        return 0;
    }
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.len() == 5 && cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = if cards.len() == 5 {
        straight_high(&ranks)
    } else {
        None
    };

    if let (true, Some(high)) = (is_flush, straight) {
        let class = if high == Rank::Ace.value() {
            HandClass::RoyalFlush
        } else {
            HandClass::StraightFlush
        };
        return pack(class, &[high]);
    }

    // (count, rank) groups, biggest group first, then highest rank.
    let mut groups: Vec<(u8, u8)> = Vec::new();
    for rank in &ranks {
        match groups.iter_mut().find(|(_, r)| r == rank) {
            Some(group) => group.0 += 1,
            None => groups.push((1, *rank)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let group_ranks: Vec<u8> = groups.iter().map(|(_, r)| *r).collect();
    let top = groups[0].0;
    let second = groups.get(1).map_or(0, |g| g.0);

    if top == 4 {
        return pack(HandClass::FourOfAKind, &group_ranks);
    }
    if top == 3 && second == 2 {
        return pack(HandClass::FullHouse, &group_ranks);
    }
    if is_flush {
        return pack(HandClass::Flush, &ranks);
    }
    if let Some(high) = straight {
        return pack(HandClass::Straight, &[high]);
    }

    let class = match (top, second) {
        (3, _) => HandClass::ThreeOfAKind,
        (2, 2) => HandClass::TwoPair,
        (2, _) => HandClass::Pair,
        _ => HandClass::HighCard,
    };
    pack(class, &group_ranks)
}
