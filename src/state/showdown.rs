//! Showdown scoring.
//!
//! Every player holding a token at the end of the river has implicitly
//! ranked their own hand: the highest token is the boldest claim (guess rank
//! 1), the next highest is guess rank 2, and so on. The true ranking comes
//! from the evaluator. Players with identical scores share a rank window, so
//! a three-way tie for second occupies `2-4` and any guess inside it is exact.
//!
//! The team vaults when nobody is off by even one place; otherwise an alarm
//! trips.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::tokens::Token;
use crate::cards::HandScore;

/// Input to the scorer: one player's claim and true strength.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredHand {
    pub player_id: PlayerId,
    pub name: String,
    pub token: Token,
    pub score: HandScore,
    pub class_label: String,
}

/// Inclusive range of true ranks occupied by a tie group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankWindow {
    pub start: usize,
    pub end: usize,
}

impl RankWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, rank: usize) -> bool {
        self.start <= rank && rank <= self.end
    }

    /// Distance from `rank` to the window, zero inside it.
    pub fn error(&self, rank: usize) -> usize {
        if self.contains(rank) {
            0
        } else {
            rank.abs_diff(self.start).min(rank.abs_diff(self.end))
        }
    }
}

impl fmt::Display for RankWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Error buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Accuracy {
    Perfect,
    Close,
    Off,
    WayOff,
}

impl Accuracy {
    pub const ALL: [Accuracy; 4] = [
        Accuracy::Perfect,
        Accuracy::Close,
        Accuracy::Off,
        Accuracy::WayOff,
    ];

    pub fn from_error(error: usize) -> Self {
        match error {
            0 => Self::Perfect,
            1 => Self::Close,
            2 => Self::Off,
            _ => Self::WayOff,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Perfect => "✅ Perfect",
            Self::Close => "🟨 Close",
            Self::Off => "🟧 Off",
            Self::WayOff => "🟥 Way off",
        }
    }
}

/// How one player's claim compared to the truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub player_id: PlayerId,
    pub name: String,
    pub token: Token,
    pub guess_rank: usize,
    pub window: RankWindow,
    pub class_label: String,
    pub error: usize,
}

impl Verdict {
    pub fn accuracy(&self) -> Accuracy {
        Accuracy::from_error(self.error)
    }
}

/// Outcome of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Vault,
    Alarm,
}

/// Scored showdown, verdicts in guess order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShowdownReport {
    pub verdicts: Vec<Verdict>,
    pub total_error: usize,
    pub max_error: usize,
}

impl ShowdownReport {
    /// A hand only vaults if someone played and nobody missed.
    pub fn outcome(&self) -> Outcome {
        if !self.verdicts.is_empty() && self.max_error == 0 {
            Outcome::Vault
        } else {
            Outcome::Alarm
        }
    }

    /// Verdicts in one bucket, guess order.
    pub fn bucket(&self, accuracy: Accuracy) -> Vec<&Verdict> {
        self.verdicts
            .iter()
            .filter(|v| v.accuracy() == accuracy)
            .collect()
    }

    /// Per-bucket summary lines. Perfect players share one line.
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let perfect = self.bucket(Accuracy::Perfect);
        if !perfect.is_empty() {
            let names: Vec<String> = perfect
                .iter()
                .map(|v| format!("{} (#{} • {})", v.name, v.window, v.class_label))
                .collect();
            lines.push(format!("{}: {}", Accuracy::Perfect.label(), names.join(", ")));
        }

        for accuracy in &Accuracy::ALL[1..] {
            for v in self.bucket(*accuracy) {
                lines.push(format!(
                    "{}: {} guessed #{}, true #{} ({})",
                    accuracy.label(),
                    v.name,
                    v.guess_rank,
                    v.window,
                    v.class_label
                ));
            }
        }

        lines
    }
}

/// True rank windows for scores, in input order. Lower score is stronger.
pub fn rank_windows(scores: &[HandScore]) -> Vec<RankWindow> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&i| scores[i]);

    let mut windows = vec![RankWindow::new(0, 0); scores.len()];
    let mut idx = 0;
    while idx < order.len() {
        let group_score = scores[order[idx]];
        let group_len = order[idx..]
            .iter()
            .take_while(|&&i| scores[i] == group_score)
            .count();
        let window = RankWindow::new(idx + 1, idx + group_len);
        for &i in &order[idx..idx + group_len] {
            windows[i] = window;
        }
        idx += group_len;
    }
    windows
}

/// Score a showdown.
pub fn score(hands: Vec<ScoredHand>) -> ShowdownReport {
    let mut hands = hands;
    // Highest token is guess rank 1.
    hands.sort_by(|a, b| b.token.cmp(&a.token));

    let scores: Vec<HandScore> = hands.iter().map(|h| h.score).collect();
    let windows = rank_windows(&scores);

    let verdicts: Vec<Verdict> = hands
        .into_iter()
        .zip(windows)
        .enumerate()
        .map(|(idx, (hand, window))| {
            let guess_rank = idx + 1;
            Verdict {
                error: window.error(guess_rank),
                player_id: hand.player_id,
                name: hand.name,
                token: hand.token,
                guess_rank,
                window,
                class_label: hand.class_label,
            }
        })
        .collect();

    ShowdownReport {
        total_error: verdicts.iter().map(|v| v.error).sum(),
        max_error: verdicts.iter().map(|v| v.error).max().unwrap_or(0),
        verdicts,
    }
}

/// Cross-hand vault/alarm counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTally {
    pub vaults: u32,
    pub alarms: u32,
    pub target: u32,
}

impl MatchTally {
    pub fn new(target: u32) -> Self {
        Self {
            vaults: 0,
            alarms: 0,
            target,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Vault => self.vaults += 1,
            Outcome::Alarm => self.alarms += 1,
        }
    }

    pub fn is_lost(&self) -> bool {
        self.alarms >= self.target
    }

    pub fn is_won(&self) -> bool {
        self.vaults >= self.target
    }

    /// Check if the match has ended either way.
    pub fn is_over(&self) -> bool {
        self.is_lost() || self.is_won()
    }

    pub fn reset(&mut self) {
        self.vaults = 0;
        self.alarms = 0;
    }

    /// Narrative for a hand just recorded in this tally.
    pub fn narrative(&self, report: &ShowdownReport) -> Vec<String> {
        let mut lines = match report.outcome() {
            Outcome::Vault => vec![
                format!("HEIST SUCCESS! 💰 ({}/{})", self.vaults, self.target),
                format!(
                    "Everyone nailed their spot. Total error: {}",
                    report.total_error
                ),
            ],
            Outcome::Alarm => vec![
                format!("ALARM TRIPPED! 🚨 ({}/{})", self.alarms, self.target),
                format!(
                    "Missed spots, but we learn together. Total error: {}",
                    report.total_error
                ),
            ],
        };
        lines.extend(report.log_lines());

        if self.is_lost() {
            lines.push("GAME OVER! THE POLICE ARRIVED! 🚓".to_string());
        } else if self.is_won() {
            lines.push("YOU WIN! RETIRE RICH! 💎".to_string());
        }
        lines
    }
}
