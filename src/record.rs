use std::fmt;

use anyhow::{Context, Result};
use serde_json::Value;

/// Display sentinel for any missing or malformed field.
pub const SENTINEL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "W" | "WIN" => Some(Outcome::Win),
            "L" | "LOSS" => Some(Outcome::Loss),
            "T" | "TIE" => Some(Outcome::Tie),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Outcome::Win => "W",
            Outcome::Loss => "L",
            Outcome::Tie => "T",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Tie => "Tie",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockVerdict {
    Match,
    Diverge,
}

impl LockVerdict {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MATCH" => Some(LockVerdict::Match),
            "DIVERGE" => Some(LockVerdict::Diverge),
            _ => None,
        }
    }
}

/// A probability normalized from either a 0-1 fraction or a 0-100 percentage.
///
/// Sources at or below 1.0 are read as fractions, anything above as percent.
/// Comparisons go through [`Probability::fraction`], display through
/// [`Probability::percent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probability {
    fraction: f64,
}

impl Probability {
    pub fn from_source(raw: f64) -> Option<Self> {
        if !raw.is_finite() || raw < 0.0 {
            return None;
        }
        let fraction = if raw <= 1.0 { raw } else { raw / 100.0 };
        Some(Self { fraction })
    }

    pub fn fraction(self) -> f64 {
        self.fraction
    }

    pub fn percent(self) -> f64 {
        self.fraction * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleAssessment {
    pub pick: Option<Outcome>,
    pub pick_raw: Option<String>,
    pub expected_win: Option<Probability>,
    pub confidence: Option<f64>,
    pub sample_count: u32,
    pub pregame_story: Option<String>,
    pub postgame_story: Option<String>,
    pub coherence: Option<f64>,
    pub reality_lock: Option<LockVerdict>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameRecord {
    pub week: Option<u32>,
    pub opponent: Option<String>,
    pub result: Option<Outcome>,
    pub result_raw: Option<String>,
    pub score: Option<String>,
    pub oracle: OracleAssessment,
}

/// Identity of a game within one season: (week, opponent).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameKey {
    pub week: String,
    pub opponent: String,
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.week, self.opponent)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonSnapshot {
    pub team: Option<String>,
    pub season: Option<u32>,
    pub generated_at: Option<String>,
    pub games: Vec<GameRecord>,
}

impl SeasonSnapshot {
    pub fn find(&self, key: &GameKey) -> Option<&GameRecord> {
        self.games.iter().find(|g| &g.key() == key)
    }

    pub fn first_key(&self) -> Option<GameKey> {
        self.games.first().map(GameRecord::key)
    }

    fn from_value(root: &Value) -> Self {
        let summary = root.get("summary").unwrap_or(&Value::Null);
        let team = pick_string(root, &["team"]).or_else(|| pick_string(summary, &["team"]));
        let season = pick_u32(root, &["season"]).or_else(|| pick_u32(summary, &["season"]));
        let generated_at = pick_string(root, &["generatedAt", "generated_at"])
            .or_else(|| pick_string(summary, &["generatedAt", "generated_at"]));

        let games = root
            .get("games")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(GameRecord::from_value)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            team,
            season,
            generated_at,
            games,
        }
    }
}

pub fn parse_season_json(raw: &str) -> Result<SeasonSnapshot> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(SeasonSnapshot::default());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid season json")?;
    match root {
        Value::Null => Ok(SeasonSnapshot::default()),
        Value::Object(_) => Ok(SeasonSnapshot::from_value(&root)),
        _ => Err(anyhow::anyhow!("season document must be a json object")),
    }
}

impl GameRecord {
    fn from_value(game: &Value) -> Self {
        let result_raw = pick_string(game, &["result"]);
        let oracle = game
            .get("oracle")
            .map(OracleAssessment::from_value)
            .unwrap_or_default();
        Self {
            week: pick_u32(game, &["week"]),
            opponent: pick_string(game, &["opponent", "opp"]),
            result: result_raw.as_deref().and_then(Outcome::parse),
            result_raw,
            score: pick_string(game, &["score"]),
            oracle,
        }
    }

    pub fn key(&self) -> GameKey {
        GameKey {
            week: self.week_label(),
            opponent: self.opponent_label(),
        }
    }

    pub fn week_label(&self) -> String {
        self.week
            .map(|w| w.to_string())
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    pub fn opponent_label(&self) -> String {
        display_or_sentinel(self.opponent.as_deref())
    }

    pub fn result_label(&self) -> String {
        display_or_sentinel(self.result_raw.as_deref())
    }

    pub fn score_label(&self) -> String {
        display_or_sentinel(self.score.as_deref())
    }

    pub fn pick_label(&self) -> String {
        display_or_sentinel(self.oracle.pick_raw.as_deref())
    }

    pub fn expected_win_label(&self) -> String {
        percent_label(self.oracle.expected_win)
    }

    pub fn confidence_label(&self) -> String {
        match self.oracle.confidence {
            Some(conf) => format!("{}", conf.round() as i64),
            None => SENTINEL.to_string(),
        }
    }

    pub fn coherence_label(&self) -> String {
        match self.oracle.coherence {
            Some(value) => format_number(value),
            None => SENTINEL.to_string(),
        }
    }

    /// Expected-win fraction usable for scoring; `None` without history.
    pub fn usable_expected_win(&self) -> Option<f64> {
        if self.oracle.sample_count == 0 {
            return None;
        }
        self.oracle.expected_win.map(Probability::fraction)
    }
}

impl OracleAssessment {
    fn from_value(oracle: &Value) -> Self {
        let pick_raw = pick_string(oracle, &["pregame_pick"]);
        let sample_count = oracle
            .get("pregame_historical_map")
            .and_then(|map| map.get("n"))
            .or_else(|| oracle.get("n"))
            .and_then(as_count)
            .unwrap_or(0);
        Self {
            pick: pick_raw.as_deref().and_then(Outcome::parse),
            pick_raw,
            expected_win: pick_number(oracle, &["pregame_expected_win_rate", "pregame_expected_win"])
                .and_then(Probability::from_source),
            confidence: pick_number(oracle, &["pregame_confidence"]),
            sample_count,
            pregame_story: pick_string(
                oracle,
                &["pregame_story", "pregame_rationale", "pregame_narrative"],
            ),
            postgame_story: pick_string(
                oracle,
                &["postgame_story", "postgame_rationale", "postgame_narrative"],
            ),
            coherence: pick_number(oracle, &["coherence", "postgame_coherence"]),
            reality_lock: pick_string(oracle, &["reality_lock"])
                .as_deref()
                .and_then(LockVerdict::parse),
        }
    }
}

pub fn display_or_sentinel(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => SENTINEL.to_string(),
    }
}

pub fn percent_label(value: Option<Probability>) -> String {
    match value {
        Some(p) => format!("{}%", p.percent().round() as i64),
        None => SENTINEL.to_string(),
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key)
            && let Some(text) = as_text(v)
        {
            return Some(text);
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(num) = value.get(*key).and_then(as_count) {
            return Some(num);
        }
    }
    None
}

fn pick_number(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(num) = value.get(*key).and_then(as_number) {
            return Some(num);
        }
    }
    None
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    num.is_finite().then_some(num)
}

fn as_count(value: &Value) -> Option<u32> {
    let num = as_number(value)?;
    if num < 0.0 {
        return None;
    }
    Some(num.floor().min(u32::MAX as f64) as u32)
}
