use std::cmp::Ordering;
use std::collections::HashMap;

use crate::record::{GameRecord, Outcome, SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallTally {
    pub calls: usize,
    pub correct: usize,
}

impl CallTally {
    fn record(&mut self, hit: bool) {
        self.calls += 1;
        if hit {
            self.correct += 1;
        }
    }

    pub fn rate(&self) -> Option<f64> {
        if self.calls == 0 {
            None
        } else {
            Some(self.correct as f64 / self.calls as f64)
        }
    }
}

/// Running totals for one aggregation pass. Rebuilt from scratch every time.
#[derive(Debug, Clone, Default)]
pub struct RunningAccuracyState {
    pub total: CallTally,
    opponent_index: HashMap<String, usize>,
    opponents: Vec<(String, CallTally)>,
}

impl RunningAccuracyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, opponent: &str, hit: bool) {
        self.total.record(hit);
        let idx = match self.opponent_index.get(opponent) {
            Some(idx) => *idx,
            None => {
                self.opponents
                    .push((opponent.to_string(), CallTally::default()));
                let idx = self.opponents.len() - 1;
                self.opponent_index.insert(opponent.to_string(), idx);
                idx
            }
        };
        self.opponents[idx].1.record(hit);
    }

    /// Rows by calls descending, then hit rate descending; ties keep first-seen order.
    pub fn opponent_rows(&self) -> Vec<OpponentRow> {
        let mut rows: Vec<OpponentRow> = self
            .opponents
            .iter()
            .map(|(opponent, tally)| OpponentRow {
                opponent: opponent.clone(),
                calls: tally.calls,
                correct: tally.correct,
                rate: tally.rate(),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.calls.cmp(&a.calls).then_with(|| {
                b.rate
                    .unwrap_or(0.0)
                    .partial_cmp(&a.rate.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            })
        });
        rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpponentRow {
    pub opponent: String,
    pub calls: usize,
    pub correct: usize,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonAccuracy {
    pub calls: usize,
    pub correct: usize,
    pub rate: Option<f64>,
    pub opponents: Vec<OpponentRow>,
    /// Cumulative hit rate after each callable game, in schedule order.
    pub running: Vec<f64>,
    /// Expected-win fraction of the game behind each `running` entry.
    pub call_expected_win: Vec<Option<f64>>,
}

/// A game is callable when both the pick and the final result are concrete.
pub fn callable(game: &GameRecord) -> Option<(Outcome, Outcome)> {
    Some((game.oracle.pick?, game.result?))
}

pub fn season_accuracy(games: &[GameRecord]) -> SeasonAccuracy {
    let mut state = RunningAccuracyState::new();
    let mut running = Vec::new();
    let mut call_expected_win = Vec::new();

    for game in games {
        let Some((pick, result)) = callable(game) else {
            continue;
        };
        state.record(&game.opponent_label(), pick == result);
        running.push(state.total.correct as f64 / state.total.calls as f64);
        call_expected_win.push(game.usable_expected_win());
    }

    SeasonAccuracy {
        calls: state.total.calls,
        correct: state.total.correct,
        rate: state.total.rate(),
        opponents: state.opponent_rows(),
        running,
        call_expected_win,
    }
}

pub fn rate_label(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{}%", (rate * 100.0).round() as i64),
        None => SENTINEL.to_string(),
    }
}
