use crate::record::{GameRecord, LockVerdict, SENTINEL};

pub const CONFIDENCE_SEGMENTS: usize = 5;
const FILLED: char = '▮';
const EMPTY: char = '▯';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Match,
    Diverge,
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Good,
    Bad,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockSummary {
    pub matches: usize,
    pub diverges: usize,
}

/// `n={n} : C|D`, where C leans Win and D leans Loss or lacks history.
pub fn evidence_label(game: &GameRecord) -> String {
    let n = game.oracle.sample_count;
    match game.usable_expected_win() {
        Some(exp) => {
            let lean = if exp >= 0.5 { "C" } else { "D" };
            format!("n={n} : {lean}")
        }
        None => "n=0 : D".to_string(),
    }
}

/// Upstream verdicts are trusted verbatim; nothing is inferred from the result.
pub fn coherence_lock(game: &GameRecord) -> LockState {
    match game.oracle.reality_lock {
        Some(LockVerdict::Match) => LockState::Match,
        Some(LockVerdict::Diverge) => LockState::Diverge,
        None => LockState::Unresolved,
    }
}

pub fn lock_label(state: LockState) -> &'static str {
    match state {
        LockState::Match => "MATCH",
        LockState::Diverge => "DIVERGE",
        LockState::Unresolved => SENTINEL,
    }
}

pub fn lock_tag_class(state: LockState) -> TagClass {
    match state {
        LockState::Match => TagClass::Good,
        LockState::Diverge => TagClass::Bad,
        LockState::Unresolved => TagClass::Neutral,
    }
}

pub fn lock_subtitle(game: &GameRecord) -> String {
    let coherence = game.coherence_label();
    match coherence_lock(game) {
        LockState::Match => format!("Story held. Postgame coherence: {coherence}"),
        LockState::Diverge => format!("Story broke. Postgame coherence: {coherence}"),
        LockState::Unresolved => format!(
            "No reality lock (insufficient similar-history). Postgame coherence: {coherence}"
        ),
    }
}

/// Number of filled segments out of [`CONFIDENCE_SEGMENTS`]; `None` when missing.
pub fn confidence_segments(confidence: Option<f64>) -> Option<usize> {
    let conf = confidence.filter(|c| c.is_finite())?;
    let filled = (conf / 20.0).round().clamp(0.0, CONFIDENCE_SEGMENTS as f64);
    Some(filled as usize)
}

pub fn confidence_bar(confidence: Option<f64>) -> String {
    let Some(filled) = confidence_segments(confidence) else {
        return SENTINEL.to_string();
    };
    let mut bar = String::with_capacity(CONFIDENCE_SEGMENTS * 3);
    bar.extend(std::iter::repeat_n(FILLED, filled));
    bar.extend(std::iter::repeat_n(EMPTY, CONFIDENCE_SEGMENTS - filled));
    bar
}

pub fn outcome_label(game: &GameRecord) -> String {
    if let Some(outcome) = game.result {
        return outcome.label().to_string();
    }
    match game.result_raw.as_deref() {
        None => "Upcoming".to_string(),
        Some(raw) if raw.eq_ignore_ascii_case("TBD") => "TBD".to_string(),
        Some(raw) => raw.to_string(),
    }
}

pub fn snapshot_label(game: &GameRecord) -> String {
    match game.oracle.sample_count {
        0 => SENTINEL.to_string(),
        n => format!("SNAP n={n} (league-wide similar)"),
    }
}

pub fn snapshot_cell(game: &GameRecord) -> String {
    match game.oracle.sample_count {
        0 => SENTINEL.to_string(),
        n => format!("SNAP n={n}"),
    }
}

pub fn lock_summary(games: &[GameRecord]) -> LockSummary {
    let mut summary = LockSummary::default();
    for game in games {
        match coherence_lock(game) {
            LockState::Match => summary.matches += 1,
            LockState::Diverge => summary.diverges += 1,
            LockState::Unresolved => {}
        }
    }
    summary
}

pub fn lock_summary_label(games: Option<&[GameRecord]>) -> String {
    match games {
        Some(games) if !games.is_empty() => {
            let summary = lock_summary(games);
            format!(
                "Matches: {} | Diverges: {}",
                summary.matches, summary.diverges
            )
        }
        _ => format!("Matches: {SENTINEL} | Diverges: {SENTINEL}"),
    }
}

/// Selector line for a game: `Week 3 vs DAL — W`.
pub fn game_option_label(game: &GameRecord) -> String {
    let result = match game.result_label().as_str() {
        SENTINEL => "Upcoming".to_string(),
        other => other.to_string(),
    };
    format!(
        "Week {} vs {} — {result}",
        game.week_label(),
        game.opponent_label()
    )
}

/// One season-table row, in column order.
pub fn season_row(game: &GameRecord) -> [String; 10] {
    [
        game.week_label(),
        game.opponent_label(),
        game.result_label(),
        game.score_label(),
        game.pick_label(),
        game.expected_win_label(),
        game.confidence_label(),
        evidence_label(game),
        lock_label(coherence_lock(game)).to_string(),
        snapshot_cell(game),
    ]
}
