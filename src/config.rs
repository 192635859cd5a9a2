use std::env;
use std::path::PathBuf;

pub const DEFAULT_TEAMS: &[&str] = &[
    "PHI", "GB", "DAL", "KC", "SF", "BUF", "BAL", "NYG", "NYJ", "MIA", "DET", "MIN", "LAR", "LAC",
    "DEN", "TB", "WAS", "CHI", "SEA", "ARI", "CLE", "CIN", "PIT", "TEN", "IND", "JAX", "ATL", "CAR",
    "NO", "HOU",
];
const DEFAULT_TEAM: &str = "ARI";
const DEFAULT_SEASON: u32 = 2025;
const DEFAULT_DATA: &str = "data";
const DEFAULT_PASSWORD: &str = "OMA";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Dir(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.trim_end_matches('/').to_string())
        } else if trimmed.is_empty() {
            DataSource::Dir(PathBuf::from(DEFAULT_DATA))
        } else {
            DataSource::Dir(PathBuf::from(trimmed))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataSource,
    pub teams: Vec<String>,
    pub team: String,
    pub season: u32,
    /// `None` disables the gate.
    pub password: Option<String>,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataSource::Dir(PathBuf::from(DEFAULT_DATA)),
            teams: DEFAULT_TEAMS.iter().map(|t| t.to_string()).collect(),
            team: DEFAULT_TEAM.to_string(),
            season: DEFAULT_SEASON,
            password: Some(DEFAULT_PASSWORD.to_string()),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data = lookup("ORACLE_LENS_DATA")
            .map(|raw| DataSource::parse(&raw))
            .unwrap_or(defaults.data);

        let mut teams = lookup("ORACLE_LENS_TEAMS")
            .map(|raw| parse_teams(&raw))
            .filter(|teams| !teams.is_empty())
            .unwrap_or(defaults.teams);

        let team = lookup("ORACLE_LENS_TEAM")
            .map(|raw| raw.trim().to_ascii_uppercase())
            .filter(|team| !team.is_empty())
            .unwrap_or(defaults.team);
        if !teams.contains(&team) {
            teams.push(team.clone());
        }

        let season = lookup("ORACLE_LENS_SEASON")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(defaults.season);

        let password = match lookup("ORACLE_LENS_PASSWORD") {
            Some(raw) if raw.is_empty() => None,
            Some(raw) => Some(raw),
            None => defaults.password,
        };

        let http_timeout_secs = lookup("ORACLE_LENS_HTTP_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(defaults.http_timeout_secs)
            .max(1);

        Self {
            data,
            teams,
            team,
            season,
            password,
            http_timeout_secs,
        }
    }
}

fn parse_teams(raw: &str) -> Vec<String> {
    let mut teams: Vec<String> = Vec::new();
    for part in raw.split([',', ';', ' ']) {
        let team = part.trim().to_ascii_uppercase();
        if !team.is_empty() && !teams.contains(&team) {
            teams.push(team);
        }
    }
    teams
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = Config::from_lookup(|_| None);
        assert_eq!(cfg.team, "ARI");
        assert_eq!(cfg.season, 2025);
        assert_eq!(cfg.teams.len(), 30);
        assert_eq!(cfg.password.as_deref(), Some("OMA"));
        assert_eq!(cfg.data, DataSource::Dir(PathBuf::from("data")));
    }

    #[test]
    fn overrides_and_fallbacks() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("ORACLE_LENS_DATA", "https://example.org/lens/"),
            ("ORACLE_LENS_TEAMS", "kc; buf,kc"),
            ("ORACLE_LENS_TEAM", "det"),
            ("ORACLE_LENS_SEASON", "not-a-year"),
            ("ORACLE_LENS_PASSWORD", ""),
            ("ORACLE_LENS_HTTP_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(
            cfg.data,
            DataSource::Url("https://example.org/lens".to_string())
        );
        assert_eq!(cfg.teams, vec!["KC", "BUF", "DET"]);
        assert_eq!(cfg.team, "DET");
        assert_eq!(cfg.season, 2025);
        assert!(cfg.password.is_none());
        assert_eq!(cfg.http_timeout_secs, 1);
    }
}
