use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use oracle_lens::accuracy::{rate_label, season_accuracy};
use oracle_lens::evidence::{
    coherence_lock, confidence_bar, lock_label, lock_subtitle, lock_summary_label, outcome_label,
    season_row, snapshot_label,
};
use oracle_lens::narrative::{SignalGain, sanitize_narrative};
use oracle_lens::record::{SENTINEL, parse_season_json};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/ari.json"));
    let gain = args
        .next()
        .and_then(|raw| SignalGain::parse(&raw))
        .unwrap_or_default();

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let snapshot = parse_season_json(&raw)?;

    // Offline view of one season document; same derived values as the terminal UI.
    println!(
        "{} {} ({} games) | {}",
        snapshot.team.as_deref().unwrap_or(SENTINEL),
        snapshot
            .season
            .map(|s| s.to_string())
            .unwrap_or_else(|| SENTINEL.to_string()),
        snapshot.games.len(),
        lock_summary_label(Some(&snapshot.games)),
    );
    println!();
    println!("Wk | Opp | Res | Score | Pick | Exp | Conf | Evidence | Lock | Snapshot");
    for game in &snapshot.games {
        println!("{}", season_row(game).join(" | "));
    }

    for game in &snapshot.games {
        println!();
        println!("Week {} vs {}", game.week_label(), game.opponent_label());
        println!(
            "  {} {} | reality {} | lock {}",
            game.confidence_label(),
            confidence_bar(game.oracle.confidence),
            outcome_label(game),
            lock_label(coherence_lock(game))
        );
        println!("  {}", lock_subtitle(game));
        println!("  {}", snapshot_label(game));
        println!(
            "  pregame: {}",
            sanitize_narrative(game.oracle.pregame_story.as_deref(), gain)
        );
        println!(
            "  postgame: {}",
            sanitize_narrative(game.oracle.postgame_story.as_deref(), gain)
        );
    }

    let acc = season_accuracy(&snapshot.games);
    println!();
    println!(
        "Calls: {} | Correct: {} | Rate: {}",
        acc.calls,
        acc.correct,
        rate_label(acc.rate)
    );
    for row in &acc.opponents {
        println!(
            "  {:<5} {:>3} calls {:>3} correct {:>5}",
            row.opponent,
            row.calls,
            row.correct,
            rate_label(row.rate)
        );
    }
    let running = acc
        .running
        .iter()
        .map(|r| format!("{r:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("Running: {running}");

    Ok(())
}
