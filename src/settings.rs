use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::narrative::SignalGain;

const SETTINGS_DIR: &str = "oracle_lens";
const SETTINGS_FILE: &str = "settings.json";
const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    version: u32,
    #[serde(default)]
    signal_gain: SignalGain,
}

pub fn load_signal_gain() -> SignalGain {
    settings_path()
        .map(|path| load_signal_gain_from(&path))
        .unwrap_or_default()
}

pub fn save_signal_gain(gain: SignalGain) -> Result<()> {
    let Some(path) = settings_path() else {
        return Ok(());
    };
    save_signal_gain_to(&path, gain)
}

/// Missing, unreadable, malformed or other-version files all read as the default.
pub fn load_signal_gain_from(path: &Path) -> SignalGain {
    let Ok(raw) = fs::read_to_string(path) else {
        return SignalGain::default();
    };
    let Ok(file) = serde_json::from_str::<SettingsFile>(&raw) else {
        return SignalGain::default();
    };
    if file.version != SETTINGS_VERSION {
        return SignalGain::default();
    }
    file.signal_gain
}

pub fn save_signal_gain_to(path: &Path, gain: SignalGain) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create settings dir")?;
    }
    let file = SettingsFile {
        version: SETTINGS_VERSION,
        signal_gain: gain,
    };
    let json = serde_json::to_string(&file).context("serialize settings")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write settings")?;
    fs::rename(&tmp, path).context("swap settings")?;
    Ok(())
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(SETTINGS_DIR).join(SETTINGS_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(SETTINGS_DIR)
            .join(SETTINGS_FILE),
    )
}
