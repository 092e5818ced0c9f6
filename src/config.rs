use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub system: SystemConfig,
    pub provider: ProviderConfig,
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub scoring: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    pub default_season: i32,
    pub days_forward: u32,
    pub session_ttl_secs: u64,
    #[serde(default = "default_max_listed")]
    pub max_listed_fixtures: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub live_cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub csv_logging: bool,
    pub csv_log_path: String,
}

/// Heuristic weights for the three scoring strategies.
///
/// None of these are calibrated; they exist so the heuristics can be tuned
/// from `config.toml` without touching scoring code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // Pre-match
    pub shots_on_goal_weight: f64,
    pub team_to_score_weight: f64,
    pub moneyline_power_gap: f64,
    pub moneyline_base: f64,
    pub moneyline_gap_weight: f64,

    // Live
    pub live_goal_line_base: f64,
    pub live_under_goals_base: f64,
    pub live_btts_base: f64,
    pub live_corner_line_base: f64,
    pub live_next_corner_base: f64,
    pub live_late_under_base: f64,
    pub live_late_result_base: f64,
    pub live_next_goal_base: f64,
    pub live_next_goal_gap_weight: f64,
    pub live_shot_bonus: f64,
    pub live_time_swing: f64,
    pub unknown_score_factor: f64,

    // Player markets
    pub player_goal_reference: f64,
    pub player_shots_reference: f64,
    pub player_shots_line: f64,
    pub player_assist_reference: f64,
    pub player_passes_reference: f64,
    pub player_passes_line: f64,
    pub player_weight: f64,
    pub player_confidence_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            shots_on_goal_weight: 1.6,
            team_to_score_weight: 8.0,
            moneyline_power_gap: 4.0,
            moneyline_base: 55.0,
            moneyline_gap_weight: 2.5,

            live_goal_line_base: 70.0,
            live_under_goals_base: 65.0,
            live_btts_base: 75.0,
            live_corner_line_base: 80.0,
            live_next_corner_base: 60.0,
            live_late_under_base: 85.0,
            live_late_result_base: 70.0,
            live_next_goal_base: 50.0,
            live_next_goal_gap_weight: 5.0,
            live_shot_bonus: 1.5,
            live_time_swing: 0.4,
            unknown_score_factor: 0.5,

            player_goal_reference: 0.7,
            player_shots_reference: 3.0,
            player_shots_line: 1.5,
            player_assist_reference: 0.4,
            player_passes_reference: 45.0,
            player_passes_line: 29.5,
            player_weight: 1.0,
            player_confidence_cap: 95.0,
        }
    }
}

fn default_max_listed() -> usize {
    20
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub api_sports_key: Option<String>,
    pub api_sports_url: String,
    pub session_id: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            api_sports_key: std::env::var("API_SPORTS_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            api_sports_url: std::env::var("API_SPORTS_URL")
                .unwrap_or_else(|_| "https://v3.football.api-sports.io".to_string()),
            session_id: std::env::var("SESSION_ID")
                .unwrap_or_else(|_| "console".to_string()),
        })
    }
}
