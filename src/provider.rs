use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::DataSource;
use crate::season_fetch::{fetch_season, season_location};
use crate::state::{Delta, ProviderCommand};

/// Serves fetch commands on a background thread until either channel closes.
pub fn spawn_season_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    source: DataSource,
    timeout_secs: u64,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = handle_command(cmd, &source, timeout_secs, &tx);
            if tx.send(delta).is_err() {
                break;
            }
        }
    })
}

fn handle_command(
    cmd: ProviderCommand,
    source: &DataSource,
    timeout_secs: u64,
    tx: &Sender<Delta>,
) -> Delta {
    match cmd {
        ProviderCommand::FetchSeason {
            request_id,
            team,
            bust,
        } => {
            let location = season_location(source, &team, bust);
            let _ = tx.send(Delta::Log(format!("[INFO] Fetch {location}")));
            match fetch_season(&location, source, timeout_secs) {
                Ok(snapshot) => Delta::SeasonLoaded {
                    request_id,
                    team,
                    snapshot,
                },
                Err(err) => Delta::SeasonFailed {
                    request_id,
                    team,
                    location,
                    error: format!("{err:#}"),
                },
            }
        }
    }
}
