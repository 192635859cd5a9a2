use serde::{Deserialize, Serialize};

use crate::record::SENTINEL;

const ELLIPSIS: char = '…';

/// Find/replace pairs applied in order before any truncation.
const PHRASE_SWAPS: &[(&str, &str)] = &[
    ("pregame_historical_map", "historical comparison"),
    ("pregame_expected_win_rate", "expected win rate"),
    ("league-wide similar", "similar games"),
    ("Reality lock", "Outcome check"),
    ("reality lock", "outcome check"),
    ("SNAP ", "snapshot "),
    ("C-lean", "leans win"),
    ("D-lean", "leans loss"),
    ("The Oracle", "The model"),
    ("the Oracle", "the model"),
    ("Oracle", "Model"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalGain {
    Quiet,
    #[default]
    Balanced,
    Amplified,
}

impl SignalGain {
    pub fn level(self) -> u8 {
        match self {
            SignalGain::Quiet => 0,
            SignalGain::Balanced => 1,
            SignalGain::Amplified => 2,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(SignalGain::Quiet),
            1 => Some(SignalGain::Balanced),
            2 => Some(SignalGain::Amplified),
            _ => None,
        }
    }

    /// Accepts a name or a numeric level.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        if let Ok(level) = raw.parse::<u8>() {
            return Self::from_level(level);
        }
        match raw.as_str() {
            "quiet" => Some(SignalGain::Quiet),
            "balanced" => Some(SignalGain::Balanced),
            "amplified" => Some(SignalGain::Amplified),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            SignalGain::Quiet => SignalGain::Balanced,
            SignalGain::Balanced => SignalGain::Amplified,
            SignalGain::Amplified => SignalGain::Quiet,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalGain::Quiet => "Quiet",
            SignalGain::Balanced => "Balanced",
            SignalGain::Amplified => "Amplified",
        }
    }

    /// Maximum output length in chars, ellipsis included.
    pub fn cap(self) -> usize {
        match self {
            SignalGain::Quiet => 140,
            SignalGain::Balanced => 240,
            SignalGain::Amplified => 360,
        }
    }
}

pub fn sanitize_narrative(text: Option<&str>, gain: SignalGain) -> String {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return SENTINEL.to_string();
    };

    let mut cleaned = text.to_string();
    for (from, to) in PHRASE_SWAPS {
        if cleaned.contains(from) {
            cleaned = cleaned.replace(from, to);
        }
    }
    let cleaned = strip_sample_annotations(&cleaned);
    let cleaned = collapse_whitespace(&cleaned);
    if cleaned.is_empty() {
        return SENTINEL.to_string();
    }

    match gain {
        SignalGain::Quiet => quiet_cut(&cleaned, gain.cap()),
        SignalGain::Balanced | SignalGain::Amplified => cap_chars(&cleaned, gain.cap()),
    }
}

/// First sentence only. Dropping the remainder counts as a cut and gets the marker too.
fn quiet_cut(text: &str, cap: usize) -> String {
    let sentence = first_sentence(text);
    if sentence.len() == text.len() {
        return cap_chars(text, cap);
    }
    if sentence.chars().count() < cap {
        format!("{sentence}{ELLIPSIS}")
    } else {
        cap_chars(text, cap)
    }
}

/// Removes `(n=<digits>)` annotations; anything else in parentheses stays.
fn strip_sample_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("(n=") {
        let after = &rest[pos + 3..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && after[digits..].starts_with(')') {
            out.push_str(&rest[..pos]);
            rest = &after[digits + 1..];
        } else {
            out.push_str(&rest[..pos + 3]);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_sentence(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                return &text[..idx + ch.len_utf8()];
            }
        }
    }
    text
}

fn cap_chars(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let mut out: String = text.chars().take(cap.saturating_sub(1)).collect();
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push(ELLIPSIS);
    out
}
