use std::collections::VecDeque;

use crate::accuracy::{SeasonAccuracy, season_accuracy};
use crate::gate::Gate;
use crate::narrative::SignalGain;
use crate::record::{GameKey, GameRecord, SENTINEL, SeasonSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Gate,
    Lens,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub gate: Gate,
    pub teams: Vec<String>,
    pub team_idx: usize,
    pub season: u32,
    pub snapshot: Option<SeasonSnapshot>,
    pub accuracy: Option<SeasonAccuracy>,
    pub selected: Option<GameKey>,
    pub gain: SignalGain,
    pub loaded_tag: String,
    pub loading: bool,
    /// Blocking notice shown after a failed load.
    pub notice: Option<String>,
    pub latest_request: u64,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchSeason {
        request_id: u64,
        team: String,
        bust: bool,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    SeasonLoaded {
        request_id: u64,
        team: String,
        snapshot: SeasonSnapshot,
    },
    SeasonFailed {
        request_id: u64,
        team: String,
        location: String,
        error: String,
    },
    Log(String),
}

impl AppState {
    pub fn new(teams: Vec<String>, team: &str, season: u32, gate: Gate, gain: SignalGain) -> Self {
        let mut teams = teams;
        let team_idx = match teams.iter().position(|t| t == team) {
            Some(idx) => idx,
            None => {
                teams.push(team.to_string());
                teams.len() - 1
            }
        };
        let screen = if gate.is_unlocked() {
            Screen::Lens
        } else {
            Screen::Gate
        };
        Self {
            screen,
            gate,
            teams,
            team_idx,
            season,
            snapshot: None,
            accuracy: None,
            selected: None,
            gain,
            loaded_tag: format!("Loaded: {SENTINEL}"),
            loading: false,
            notice: None,
            latest_request: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn current_team(&self) -> &str {
        self.teams
            .get(self.team_idx)
            .map(String::as_str)
            .unwrap_or(SENTINEL)
    }

    /// Allocates a new request id; responses to older ids are dropped on arrival.
    pub fn begin_request(&mut self, bust: bool) -> ProviderCommand {
        self.latest_request += 1;
        self.loading = true;
        ProviderCommand::FetchSeason {
            request_id: self.latest_request,
            team: self.current_team().to_string(),
            bust,
        }
    }

    pub fn cycle_team_next(&mut self) {
        if self.teams.is_empty() {
            return;
        }
        self.team_idx = (self.team_idx + 1) % self.teams.len();
    }

    pub fn cycle_team_prev(&mut self) {
        if self.teams.is_empty() {
            return;
        }
        self.team_idx = if self.team_idx == 0 {
            self.teams.len() - 1
        } else {
            self.team_idx - 1
        };
    }

    pub fn games(&self) -> &[GameRecord] {
        self.snapshot
            .as_ref()
            .map(|s| s.games.as_slice())
            .unwrap_or(&[])
    }

    /// The selected game, falling back to the first one when the key is stale.
    pub fn selected_game(&self) -> Option<&GameRecord> {
        let snapshot = self.snapshot.as_ref()?;
        let key = self.selected.as_ref()?;
        snapshot.find(key).or_else(|| snapshot.games.first())
    }

    pub fn selected_index(&self) -> Option<usize> {
        let key = self.selected.as_ref()?;
        self.games().iter().position(|g| &g.key() == key)
    }

    pub fn select_next(&mut self) {
        let total = self.games().len();
        if total == 0 {
            self.selected = None;
            return;
        }
        let next = match self.selected_index() {
            Some(idx) => (idx + 1) % total,
            None => 0,
        };
        self.selected = Some(self.games()[next].key());
    }

    pub fn select_prev(&mut self) {
        let total = self.games().len();
        if total == 0 {
            self.selected = None;
            return;
        }
        let prev = match self.selected_index() {
            Some(0) | None => total - 1,
            Some(idx) => idx - 1,
        };
        self.selected = Some(self.games()[prev].key());
    }

    pub fn cycle_gain(&mut self) -> SignalGain {
        self.gain = self.gain.next();
        self.gain
    }

    pub fn submit_gate(&mut self) -> bool {
        let ok = self.gate.attempt();
        if ok {
            self.screen = Screen::Lens;
        }
        ok
    }

    pub fn running_series(&self) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        match &self.accuracy {
            Some(acc) => (
                acc.running.iter().copied().map(Some).collect(),
                acc.call_expected_win.clone(),
            ),
            None => (Vec::new(), Vec::new()),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SeasonLoaded {
            request_id,
            team,
            snapshot,
        } => {
            if request_id != state.latest_request {
                state.push_log(format!(
                    "[INFO] Dropped stale response #{request_id} for {team}"
                ));
                return;
            }
            let shown_team = snapshot.team.clone().unwrap_or_else(|| team.clone());
            let shown_season = snapshot.season.unwrap_or(state.season);
            state.loaded_tag = format!("Loaded: {shown_team} {shown_season}");
            state.accuracy = Some(season_accuracy(&snapshot.games));
            state.selected = snapshot.first_key();
            state.push_log(format!(
                "[INFO] Loaded {} games for {team}",
                snapshot.games.len()
            ));
            state.snapshot = Some(snapshot);
            state.loading = false;
            state.notice = None;
        }
        Delta::SeasonFailed {
            request_id,
            team,
            location,
            error,
        } => {
            if request_id != state.latest_request {
                state.push_log(format!(
                    "[INFO] Dropped stale failure #{request_id} for {team}"
                ));
                return;
            }
            state.snapshot = None;
            state.accuracy = None;
            state.selected = None;
            state.loading = false;
            state.loaded_tag = format!("Loaded: {SENTINEL}");
            state.push_log(format!("[WARN] Load failed for {team}: {error}"));
            state.notice = Some(format!(
                "Could not load data for {team}. Expected: {location}\n\n{error}"
            ));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
