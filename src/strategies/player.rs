use serde_json::Value;
use tracing::debug;

use crate::config::ScoringWeights;
use crate::data::coerce::{as_float, as_int};
use crate::data::resolver::{field, text, Field};
use crate::data::types::{PlayerPayload, ResolvedStat};
use crate::recommendation::{assemble, ContextMetadata, PlayerContext, PlayerMeta, Recommendation};
use crate::strategies::confidence::score_confidence;
use crate::strategies::types::{Market, Pick};

#[derive(Debug, Clone, Default)]
struct SeasonTotals {
    appearances: u32,
    minutes: f64,
    goals: f64,
    assists: f64,
    shots: f64,
    shots_on: f64,
    passes: f64,
    key_passes: f64,
}

impl SeasonTotals {
    fn add_entry(&mut self, entry: &Value, appearances: u32) {
        let count = |f: Field| as_float(field(entry, f), 0.0).max(0.0);

        self.appearances = self.appearances.saturating_add(appearances);
        self.minutes += count(Field::EntryMinutes);
        self.goals += count(Field::EntryGoals);
        self.assists += count(Field::EntryAssists);
        self.shots += count(Field::EntryShots);
        self.shots_on += count(Field::EntryShotsOn);
        self.passes += count(Field::EntryPasses);
        self.key_passes += count(Field::EntryKeyPasses);
    }

    fn per_game(&self, total: f64) -> f64 {
        if self.appearances == 0 {
            0.0
        } else {
            total / f64::from(self.appearances)
        }
    }
}

/// Score per-market player picks from season statistics.
pub fn score_player(payload: &PlayerPayload, weights: &ScoringWeights) -> Recommendation {
    let record = &payload.player;
    let entries: Vec<&Value> = match field(record, Field::PlayerStatistics) {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|entry| season_matches(entry, payload.season))
            .collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };

    let mut totals = SeasonTotals::default();
    for entry in &entries {
        let appearances = as_int(field(entry, Field::EntryAppearances), 0);
        // Entries with no appearances carry no signal.
        if let Ok(apps @ 1..) = u32::try_from(appearances) {
            totals.add_entry(entry, apps);
        }
    }

    let player = player_meta(record, entries.first().copied(), payload.season);
    let (picks, key_stats) = if totals.appearances == 0 {
        debug!(player = ?player.id, "no appearances, no player picks");
        (Vec::new(), Vec::new())
    } else {
        (player_picks(&player, &totals, weights), key_stats(&totals))
    };

    assemble(
        ContextMetadata::Player(PlayerContext {
            player,
            appearances: totals.appearances,
            key_stats,
        }),
        picks,
    )
}

fn season_matches(entry: &Value, season: Option<i32>) -> bool {
    match (season, field(entry, Field::EntrySeason)) {
        (Some(wanted), Some(found)) => as_int(Some(found), i64::from(wanted)) == i64::from(wanted),
        _ => true,
    }
}

fn player_meta(record: &Value, first_entry: Option<&Value>, season: Option<i32>) -> PlayerMeta {
    let entry_text = |f: Field| first_entry.and_then(|entry| text(entry, f));

    PlayerMeta {
        id: field(record, Field::PlayerId).map(|v| as_int(Some(v), -1)).filter(|id| *id >= 0),
        name: text(record, Field::PlayerName).unwrap_or_else(|| "Unknown player".to_string()),
        nationality: text(record, Field::PlayerNationality),
        age: field(record, Field::PlayerAge).map(|v| as_int(Some(v), 0)).filter(|age| *age > 0),
        team: entry_text(Field::EntryTeamName),
        league: entry_text(Field::EntryLeagueName),
        season: season.or_else(|| {
            first_entry
                .and_then(|entry| field(entry, Field::EntrySeason))
                .and_then(|v| i32::try_from(as_int(Some(v), -1)).ok())
                .filter(|s| *s > 0)
        }),
    }
}

fn key_stats(totals: &SeasonTotals) -> Vec<ResolvedStat> {
    vec![
        ResolvedStat::new("appearances", f64::from(totals.appearances)),
        ResolvedStat::new("goals", totals.goals),
        ResolvedStat::new("goals_per_game", totals.per_game(totals.goals)),
        ResolvedStat::new("shots_per_game", totals.per_game(totals.shots)),
        ResolvedStat::new("shots_on_per_game", totals.per_game(totals.shots_on)),
        ResolvedStat::new("assists_per_game", totals.per_game(totals.assists)),
        ResolvedStat::new("passes_per_game", totals.per_game(totals.passes)),
        ResolvedStat::new("key_passes_per_game", totals.per_game(totals.key_passes)),
        ResolvedStat::new("minutes_per_game", totals.per_game(totals.minutes)),
    ]
}

/// Confidence from a per-game rate measured against the market's reference rate.
fn rate_confidence(rate: f64, reference: f64, weights: &ScoringWeights) -> Option<f64> {
    if rate <= 0.0 || reference <= 0.0 {
        return None;
    }
    let confidence = score_confidence(rate / reference * 100.0, weights.player_weight);
    Some(confidence.min(weights.player_confidence_cap.max(0.0)))
}

// Lower-risk markets first so they win confidence ties.
fn player_picks(player: &PlayerMeta, totals: &SeasonTotals, weights: &ScoringWeights) -> Vec<Pick> {
    let markets = [
        (
            Market::PlayerPasses,
            format!("Over {:.1} passes", weights.player_passes_line),
            totals.per_game(totals.passes),
            weights.player_passes_reference,
            "passes per game",
        ),
        (
            Market::PlayerShots,
            format!("Over {:.1} shots", weights.player_shots_line),
            totals.per_game(totals.shots),
            weights.player_shots_reference,
            "shots per game",
        ),
        (
            Market::PlayerToScore,
            "Yes".to_string(),
            totals.per_game(totals.goals),
            weights.player_goal_reference,
            "goals per game",
        ),
        (
            Market::PlayerToAssist,
            "Yes".to_string(),
            totals.per_game(totals.assists),
            weights.player_assist_reference,
            "assists per game",
        ),
    ];

    markets
        .into_iter()
        .filter_map(|(market, selection, rate, reference, unit)| {
            let confidence = rate_confidence(rate, reference, weights)?;
            Some(
                Pick::new(market, selection, confidence)
                    .with_subject(player.name.clone())
                    .with_reason(format!(
                        "{:.2} {} over {} games",
                        rate, unit, totals.appearances
                    ))
                    .with_stat("rate", rate)
                    .with_stat("reference", reference),
            )
        })
        .collect()
}
