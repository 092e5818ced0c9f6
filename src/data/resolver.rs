use serde_json::Value;

/// A sequence of nested keys. Segments that parse as integers index into arrays.
pub type KeyPath = &'static [&'static str];

/// Walk each candidate path in order and return the first non-null value.
pub fn resolve<'a>(record: &'a Value, candidates: &[KeyPath]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|path| walk(record, path).filter(|value| !value.is_null()))
}

/// Follow a single path. An empty path yields the record itself.
pub fn walk<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |node, key| match node {
        Value::Object(map) => map.get(*key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// Logical fields the engine reads from provider payloads.
///
/// Each variant maps to the ordered list of places a provider version has been
/// seen to put it. Supporting a new variant means appending a path here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    // Fixture records
    FixtureId,
    FixtureDate,
    StatusShort,
    StatusLong,
    Elapsed,
    LeagueName,
    HomeTeamId,
    HomeTeamName,
    AwayTeamId,
    AwayTeamName,
    Statistics,
    Events,

    // One team's entry inside a statistics block
    StatTeamId,
    StatTeamName,
    StatList,
    StatLabel,
    StatValue,

    // Event records
    EventType,
    EventDetail,
    EventElapsed,
    EventExtra,
    EventPlayer,
    EventTeam,

    // Player records
    PlayerId,
    PlayerName,
    PlayerNationality,
    PlayerAge,
    PlayerStatistics,

    // One entry of a player's season statistics
    EntryTeamId,
    EntryTeamName,
    EntryLeagueName,
    EntrySeason,
    EntryAppearances,
    EntryMinutes,
    EntryGoals,
    EntryAssists,
    EntryShots,
    EntryShotsOn,
    EntryPasses,
    EntryKeyPasses,
}

impl Field {
    pub fn paths(self) -> &'static [KeyPath] {
        match self {
            Field::FixtureId => &[&["fixture", "id"], &["game_id"], &["id"]],
            Field::FixtureDate => &[&["fixture", "date"], &["date"]],
            Field::StatusShort => &[&["fixture", "status", "short"], &["status", "short"]],
            Field::StatusLong => &[&["fixture", "status", "long"], &["status", "long"]],
            Field::Elapsed => &[
                &["fixture", "status", "elapsed"],
                &["status", "elapsed"],
                &["elapsed"],
                &["minute"],
            ],
            Field::LeagueName => &[&["league", "name"], &["competition", "name"]],
            Field::HomeTeamId => &[&["teams", "home", "id"], &["home", "id"]],
            Field::HomeTeamName => &[&["teams", "home", "name"], &["home", "name"], &["home_team"]],
            Field::AwayTeamId => &[&["teams", "away", "id"], &["away", "id"]],
            Field::AwayTeamName => &[&["teams", "away", "name"], &["away", "name"], &["away_team"]],
            Field::Statistics => &[&["statistics"], &["stats"]],
            Field::Events => &[&["events"]],

            Field::StatTeamId => &[&["team", "id"], &["team_id"]],
            Field::StatTeamName => &[&["team", "name"], &["team_name"]],
            Field::StatList => &[&["statistics"], &["stats"]],
            Field::StatLabel => &[&["type"], &["name"], &["label"]],
            Field::StatValue => &[&["value"], &["total"]],

            Field::EventType => &[&["type"], &["event_type"], &["kind"]],
            Field::EventDetail => &[&["detail"], &["description"], &["text"]],
            Field::EventElapsed => &[&["time", "elapsed"], &["elapsed"], &["minute"]],
            Field::EventExtra => &[&["time", "extra"], &["extra"], &["added_time"]],
            Field::EventPlayer => &[&["player", "name"], &["player_name"], &["player"]],
            Field::EventTeam => &[&["team", "name"], &["team_name"]],

            Field::PlayerId => &[&["player", "id"], &["id"]],
            Field::PlayerName => &[&["player", "name"], &["name"]],
            Field::PlayerNationality => &[&["player", "nationality"], &["nationality"]],
            Field::PlayerAge => &[&["player", "age"], &["age"]],
            Field::PlayerStatistics => &[&["statistics"], &["stats"]],

            Field::EntryTeamId => &[&["team", "id"]],
            Field::EntryTeamName => &[&["team", "name"]],
            Field::EntryLeagueName => &[&["league", "name"]],
            Field::EntrySeason => &[&["league", "season"], &["season"]],
            // "appearences" is the provider's own spelling.
            Field::EntryAppearances => &[
                &["games", "appearences"],
                &["games", "appearances"],
                &["games", "apps"],
                &["appearances"],
            ],
            Field::EntryMinutes => &[&["games", "minutes"], &["minutes"]],
            Field::EntryGoals => &[&["goals", "total"], &["goals"]],
            Field::EntryAssists => &[&["goals", "assists"], &["assists"]],
            Field::EntryShots => &[&["shots", "total"], &["shots"]],
            Field::EntryShotsOn => &[&["shots", "on"], &["shots_on_target"]],
            Field::EntryPasses => &[&["passes", "total"], &["passes"]],
            Field::EntryKeyPasses => &[&["passes", "key"], &["key_passes"]],
        }
    }
}

/// Resolve a logical field against a record.
pub fn field(record: &Value, field: Field) -> Option<&Value> {
    resolve(record, field.paths())
}

/// Resolve a field as display text. Numbers are rendered; objects and arrays are not text.
pub fn text(record: &Value, f: Field) -> Option<String> {
    match field(record, f)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Both halves of a score source. Sources are tried in order; see `stats::resolve_score`.
pub const SCORE_SOURCES: &[(KeyPath, KeyPath)] = &[
    (&["goals", "home"], &["goals", "away"]),
    (&["score", "home"], &["score", "away"]),
    (&["score", "fulltime", "home"], &["score", "fulltime", "away"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_present_path_wins() {
        let record = json!({ "b": { "c": 2 }, "d": 3 });
        let value = resolve(&record, &[&["a"], &["b", "c"], &["d"]]);
        assert_eq!(value, Some(&json!(2)));
    }

    #[test]
    fn test_null_is_skipped() {
        let record = json!({ "a": null, "b": 0 });
        assert_eq!(resolve(&record, &[&["a"], &["b"]]), Some(&json!(0)));
    }

    #[test]
    fn test_nothing_resolves() {
        let record = json!({ "a": null });
        assert_eq!(resolve(&record, &[&["a"], &["x", "y"]]), None);
        assert_eq!(resolve(&json!(null), &[&["a"]]), None);
    }

    #[test]
    fn test_array_index_segments() {
        let record = json!({ "statistics": [{ "team": { "name": "Porto" } }] });
        assert_eq!(
            resolve(&record, &[&["statistics", "0", "team", "name"]]),
            Some(&json!("Porto"))
        );
        assert_eq!(resolve(&record, &[&["statistics", "3", "team"]]), None);
        assert_eq!(resolve(&record, &[&["statistics", "first"]]), None);
    }

    #[test]
    fn test_walk_through_scalar_fails() {
        let record = json!({ "a": 5 });
        assert_eq!(walk(&record, &["a", "b"]), None);
        assert_eq!(walk(&record, &[]), Some(&record));
    }

    #[test]
    fn test_appearances_spelling_variants() {
        let old = json!({ "games": { "appearences": 12 } });
        let new = json!({ "games": { "appearances": 9 } });
        assert_eq!(field(&old, Field::EntryAppearances), Some(&json!(12)));
        assert_eq!(field(&new, Field::EntryAppearances), Some(&json!(9)));
    }

    #[test]
    fn test_text_trims_and_renders_numbers() {
        let record = json!({ "fixture": { "id": 881 }, "teams": { "home": { "name": "  Benfica " } } });
        assert_eq!(text(&record, Field::FixtureId).as_deref(), Some("881"));
        assert_eq!(text(&record, Field::HomeTeamName).as_deref(), Some("Benfica"));
        assert_eq!(text(&record, Field::AwayTeamName), None);
    }

    mod properties {
        use crate::data::resolver::{resolve, KeyPath};
        use proptest::prelude::*;
        use serde_json::{json, Value};

        const CANDIDATES: &[KeyPath] = &[&["k0"], &["k1"], &["k2"], &["k3"], &["k4"]];

        proptest! {
            #[test]
            fn prop_resolves_first_present(present in proptest::collection::vec(any::<bool>(), 5), values in proptest::collection::vec(any::<i32>(), 5)) {
                let mut map = serde_json::Map::new();
                for (idx, keep) in present.iter().enumerate() {
                    let value = if *keep { json!(values[idx]) } else { Value::Null };
                    map.insert(format!("k{idx}"), value);
                }
                let record = Value::Object(map);
                let expected = present.iter().position(|p| *p).map(|idx| json!(values[idx]));
                prop_assert_eq!(resolve(&record, CANDIDATES).cloned(), expected);
            }
        }
    }
}
