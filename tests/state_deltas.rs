use oracle_lens::gate::Gate;
use oracle_lens::narrative::SignalGain;
use oracle_lens::record::{SENTINEL, SeasonSnapshot, parse_season_json};
use oracle_lens::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

fn new_state() -> AppState {
    AppState::new(
        vec!["ARI".to_string(), "KC".to_string(), "SF".to_string()],
        "ARI",
        2025,
        Gate::new(None),
        SignalGain::Balanced,
    )
}

fn fixture_snapshot() -> SeasonSnapshot {
    parse_season_json(include_str!("fixtures/season_ari.json")).expect("fixture should parse")
}

fn request_id(cmd: &ProviderCommand) -> u64 {
    match cmd {
        ProviderCommand::FetchSeason { request_id, .. } => *request_id,
    }
}

#[test]
fn loaded_season_replaces_state_and_selects_first_game() {
    let mut state = new_state();
    let cmd = state.begin_request(false);
    assert!(state.loading);

    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            request_id: request_id(&cmd),
            team: "ARI".to_string(),
            snapshot: fixture_snapshot(),
        },
    );

    assert!(!state.loading);
    assert_eq!(state.loaded_tag, "Loaded: ARI 2025");
    assert_eq!(state.games().len(), 6);
    assert_eq!(state.selected.as_ref().map(|k| k.to_string()).as_deref(), Some("1_DAL"));
    let acc = state.accuracy.as_ref().expect("accuracy computed on load");
    assert_eq!(acc.calls, 3);

    let (running, expected) = state.running_series();
    assert_eq!(running.len(), 3);
    assert_eq!(expected.len(), 3);
}

#[test]
fn stale_responses_are_dropped() {
    let mut state = new_state();
    let first = state.begin_request(false);
    state.cycle_team_next();
    let second = state.begin_request(false);
    assert!(request_id(&second) > request_id(&first));

    // The newer request resolves first, then the older one arrives.
    let mut kc = fixture_snapshot();
    kc.team = Some("KC".to_string());
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            request_id: request_id(&second),
            team: "KC".to_string(),
            snapshot: kc,
        },
    );
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            request_id: request_id(&first),
            team: "ARI".to_string(),
            snapshot: SeasonSnapshot::default(),
        },
    );
    apply_delta(
        &mut state,
        Delta::SeasonFailed {
            request_id: request_id(&first),
            team: "ARI".to_string(),
            location: "data/ari.json".to_string(),
            error: "boom".to_string(),
        },
    );

    assert_eq!(state.loaded_tag, "Loaded: KC 2025");
    assert_eq!(state.games().len(), 6);
    assert!(state.notice.is_none());
    assert!(
        state
            .logs
            .iter()
            .any(|line| line.contains("Dropped stale response"))
    );
}

#[test]
fn failure_clears_to_sentinels_and_raises_notice() {
    let mut state = new_state();
    let cmd = state.begin_request(false);
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            request_id: request_id(&cmd),
            team: "ARI".to_string(),
            snapshot: fixture_snapshot(),
        },
    );

    let cmd = state.begin_request(true);
    apply_delta(
        &mut state,
        Delta::SeasonFailed {
            request_id: request_id(&cmd),
            team: "ARI".to_string(),
            location: "data/ari.json".to_string(),
            error: "read data/ari.json: No such file".to_string(),
        },
    );

    assert!(state.snapshot.is_none());
    assert!(state.accuracy.is_none());
    assert!(state.selected_game().is_none());
    assert_eq!(state.loaded_tag, format!("Loaded: {SENTINEL}"));
    let notice = state.notice.as_deref().expect("notice shown");
    assert!(notice.contains("Could not load data for ARI"));
    assert!(notice.contains("data/ari.json"));
    let (running, _) = state.running_series();
    assert!(running.is_empty());
}

#[test]
fn selection_wraps_both_ways() {
    let mut state = new_state();
    let cmd = state.begin_request(false);
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            request_id: request_id(&cmd),
            team: "ARI".to_string(),
            snapshot: fixture_snapshot(),
        },
    );

    state.select_prev();
    assert_eq!(state.selected_index(), Some(5));
    state.select_next();
    assert_eq!(state.selected_index(), Some(0));
    state.select_next();
    let game = state.selected_game().expect("selected");
    assert_eq!(game.key().to_string(), "2_SF");
}

#[test]
fn stale_selection_falls_back_to_first_game() {
    let mut state = new_state();
    let cmd = state.begin_request(false);
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            request_id: request_id(&cmd),
            team: "ARI".to_string(),
            snapshot: fixture_snapshot(),
        },
    );
    state.selected = Some(oracle_lens::record::GameKey {
        week: "99".to_string(),
        opponent: "XYZ".to_string(),
    });
    let game = state.selected_game().expect("falls back");
    assert_eq!(game.week, Some(1));
}

#[test]
fn team_cycle_wraps_and_unknown_team_is_appended() {
    let mut state = AppState::new(
        vec!["ARI".to_string(), "KC".to_string()],
        "HOU",
        2025,
        Gate::new(None),
        SignalGain::Quiet,
    );
    assert_eq!(state.current_team(), "HOU");
    state.cycle_team_next();
    assert_eq!(state.current_team(), "ARI");
    state.cycle_team_prev();
    state.cycle_team_prev();
    assert_eq!(state.current_team(), "KC");

    match state.begin_request(true) {
        ProviderCommand::FetchSeason { team, bust, .. } => {
            assert_eq!(team, "KC");
            assert!(bust);
        }
    }
}

#[test]
fn gate_blocks_until_password_matches() {
    let mut state = AppState::new(
        vec!["ARI".to_string()],
        "ARI",
        2025,
        Gate::new(Some("OMA")),
        SignalGain::Balanced,
    );
    assert_eq!(state.screen, Screen::Gate);
    for ch in "nope".chars() {
        state.gate.push_char(ch);
    }
    assert!(!state.submit_gate());
    assert_eq!(state.screen, Screen::Gate);
    for ch in "OMA".chars() {
        state.gate.push_char(ch);
    }
    assert!(state.submit_gate());
    assert_eq!(state.screen, Screen::Lens);
}

#[test]
fn gain_cycles_and_log_is_capped() {
    let mut state = new_state();
    assert_eq!(state.cycle_gain(), SignalGain::Amplified);
    assert_eq!(state.cycle_gain(), SignalGain::Quiet);

    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] line 249"));
}
