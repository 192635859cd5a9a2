pub mod accuracy;
pub mod chart;
pub mod config;
pub mod evidence;
pub mod gate;
pub mod http_client;
pub mod narrative;
pub mod provider;
pub mod record;
pub mod season_fetch;
pub mod settings;
pub mod state;
