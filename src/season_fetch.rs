use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::header::CACHE_CONTROL;

use crate::config::DataSource;
use crate::http_client::http_client;
use crate::record::{SeasonSnapshot, parse_season_json};

/// Where a team's season document lives. `bust` appends `?t=<unix millis>` to URLs.
pub fn season_location(source: &DataSource, team: &str, bust: bool) -> String {
    let file = format!("{}.json", team.trim().to_ascii_lowercase());
    match source {
        DataSource::Dir(dir) => dir.join(file).display().to_string(),
        DataSource::Url(base) => {
            let url = format!("{base}/{file}");
            if bust {
                format!("{url}?t={}", Utc::now().timestamp_millis())
            } else {
                url
            }
        }
    }
}

/// Single attempt; no retry.
pub fn fetch_season(location: &str, source: &DataSource, timeout_secs: u64) -> Result<SeasonSnapshot> {
    let body = match source {
        DataSource::Dir(_) => {
            fs::read_to_string(location).with_context(|| format!("read {location}"))?
        }
        DataSource::Url(_) => fetch_text(location, timeout_secs)?,
    };
    parse_season_json(&body).with_context(|| format!("parse {location}"))
}

fn fetch_text(url: &str, timeout_secs: u64) -> Result<String> {
    let client = http_client(timeout_secs)?;
    let resp = client
        .get(url)
        .header(CACHE_CONTROL, "no-store")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}"));
    }
    Ok(body)
}
