use serde_json::{Map, Value};

use crate::data::coerce::{as_float, as_int};
use crate::data::resolver::{field, resolve, text, walk, Field, KeyPath, SCORE_SOURCES};
use crate::data::types::{ResolvedStat, Score};

/// Team-level match statistics, keyed by normalized label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKey {
    ShotsOnGoal,
    ShotsOffGoal,
    TotalShots,
    BlockedShots,
    Corners,
    Possession,
    Fouls,
    YellowCards,
    RedCards,
    Offsides,
    Saves,
}

impl StatKey {
    pub const ALL: [StatKey; 11] = [
        StatKey::ShotsOnGoal,
        StatKey::ShotsOffGoal,
        StatKey::TotalShots,
        StatKey::BlockedShots,
        StatKey::Corners,
        StatKey::Possession,
        StatKey::Fouls,
        StatKey::YellowCards,
        StatKey::RedCards,
        StatKey::Offsides,
        StatKey::Saves,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKey::ShotsOnGoal => "shots_on_goal",
            StatKey::ShotsOffGoal => "shots_off_goal",
            StatKey::TotalShots => "total_shots",
            StatKey::BlockedShots => "blocked_shots",
            StatKey::Corners => "corner_kicks",
            StatKey::Possession => "ball_possession",
            StatKey::Fouls => "fouls",
            StatKey::YellowCards => "yellow_cards",
            StatKey::RedCards => "red_cards",
            StatKey::Offsides => "offsides",
            StatKey::Saves => "goalkeeper_saves",
        }
    }

    /// Normalized labels seen for this statistic across providers.
    pub fn aliases(self) -> &'static [KeyPath] {
        match self {
            StatKey::ShotsOnGoal => &[&["shots_on_goal"], &["shots_on_target"], &["on_target"]],
            StatKey::ShotsOffGoal => &[&["shots_off_goal"], &["shots_off_target"], &["off_target"]],
            StatKey::TotalShots => &[&["total_shots"], &["shots_total"], &["shots"]],
            StatKey::BlockedShots => &[&["blocked_shots"], &["shots_blocked"]],
            StatKey::Corners => &[&["corner_kicks"], &["corners"], &["corner"]],
            StatKey::Possession => &[&["ball_possession"], &["possession"]],
            StatKey::Fouls => &[&["fouls"], &["fouls_committed"]],
            StatKey::YellowCards => &[&["yellow_cards"], &["yellowcards"]],
            StatKey::RedCards => &[&["red_cards"], &["redcards"]],
            StatKey::Offsides => &[&["offsides"], &["offside"]],
            StatKey::Saves => &[&["goalkeeper_saves"], &["saves"]],
        }
    }
}

/// `"Shots on Goal"` → `shots_on_goal`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamStats {
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    values: Value,
}

impl TeamStats {
    fn from_values(team_id: Option<i64>, team_name: Option<String>, values: Map<String, Value>) -> Self {
        Self {
            team_id,
            team_name,
            values: Value::Object(values),
        }
    }

    /// Value of a statistic; missing or malformed reads as zero.
    pub fn get(&self, key: StatKey) -> f64 {
        as_float(self.raw(key), 0.0)
    }

    pub fn has(&self, key: StatKey) -> bool {
        self.raw(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.as_object().map_or(true, Map::is_empty)
    }

    pub fn resolved(&self) -> Vec<ResolvedStat> {
        StatKey::ALL
            .iter()
            .map(|key| ResolvedStat::new(key.name(), self.get(*key)))
            .collect()
    }

    fn raw(&self, key: StatKey) -> Option<&Value> {
        resolve(&self.values, key.aliases())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchStats {
    pub home: TeamStats,
    pub away: TeamStats,
}

/// Split a statistics block into home and away sides.
///
/// Accepts the provider's list form (`[{team, statistics: [{type, value}]}]`)
/// and the pre-split object form (`{home: {...}, away: {...}}`). Returns `None`
/// when the block carries no statistics at all.
pub fn split_statistics(block: &Value, home_id: Option<i64>, away_id: Option<i64>) -> Option<MatchStats> {
    let stats = match block {
        Value::Array(entries) => split_entries(entries, home_id, away_id),
        Value::Object(map) if map.contains_key("home") || map.contains_key("away") => MatchStats {
            home: map.get("home").map(team_from_entry).unwrap_or_default(),
            away: map.get("away").map(team_from_entry).unwrap_or_default(),
        },
        Value::Object(_) => {
            let entries = resolve(block, &[&["response"], &["statistics"]])?.as_array()?;
            split_entries(entries, home_id, away_id)
        }
        _ => return None,
    };

    (!(stats.home.is_empty() && stats.away.is_empty())).then_some(stats)
}

fn split_entries(entries: &[Value], home_id: Option<i64>, away_id: Option<i64>) -> MatchStats {
    let teams: Vec<TeamStats> = entries.iter().map(team_from_entry).collect();

    let by_id = |wanted: Option<i64>| {
        wanted.and_then(|id| teams.iter().position(|t| t.team_id == Some(id)))
    };
    let home_idx = by_id(home_id);
    let away_idx = by_id(away_id).filter(|idx| Some(*idx) != home_idx);

    // Without ids, the provider lists home first.
    let mut unclaimed = (0..teams.len()).filter(|idx| Some(*idx) != home_idx && Some(*idx) != away_idx);
    let home_idx = home_idx.or_else(|| unclaimed.next());
    let away_idx = away_idx.or_else(|| unclaimed.next());

    let pick = |idx: Option<usize>| idx.and_then(|i| teams.get(i)).cloned().unwrap_or_default();
    MatchStats {
        home: pick(home_idx),
        away: pick(away_idx),
    }
}

fn team_from_entry(entry: &Value) -> TeamStats {
    let team_id = field(entry, Field::StatTeamId).map(|v| as_int(Some(v), -1)).filter(|id| *id >= 0);
    let team_name = text(entry, Field::StatTeamName);

    let mut values = Map::new();
    match field(entry, Field::StatList) {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(label) = text(item, Field::StatLabel) {
                    let value = field(item, Field::StatValue).cloned().unwrap_or(Value::Null);
                    values.insert(normalize_label(&label), value);
                }
            }
        }
        Some(Value::Object(map)) => insert_flat(&mut values, map),
        _ => {
            // Flat `{ "Total Shots": 9, ... }` shape.
            if let Value::Object(map) = entry {
                insert_flat(&mut values, map);
            }
        }
    }

    TeamStats::from_values(team_id, team_name, values)
}

fn insert_flat(values: &mut Map<String, Value>, map: &Map<String, Value>) {
    for (label, value) in map {
        if !value.is_object() && !value.is_array() {
            values.insert(normalize_label(label), value.clone());
        }
    }
}

/// Resolve the current score, falling back across sources.
///
/// A source counts when at least one side is present; the absent side then
/// reads as zero. When no source has either side the score is unknown.
pub fn resolve_score(fixture: &Value) -> Score {
    let side = |path: KeyPath| {
        walk(fixture, path)
            .filter(|v| !v.is_null())
            .map(|v| as_int(Some(v), -1))
            .and_then(|goals| u32::try_from(goals).ok())
    };

    SCORE_SOURCES
        .iter()
        .find_map(|&(home_path, away_path)| match (side(home_path), side(away_path)) {
            (None, None) => None,
            (home, away) => Some(Score::Known {
                home: home.unwrap_or(0),
                away: away.unwrap_or(0),
            }),
        })
        .unwrap_or(Score::Unknown)
}
