use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::data::coerce::as_int;
use crate::data::resolver::{field, resolve, text, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Goal,
    Card,
    Substitution,
    Corner,
    Other,
}

impl EventCategory {
    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Goal => "Goal",
            EventCategory::Card => "Card",
            EventCategory::Substitution => "Substitution",
            EventCategory::Corner => "Corner",
            EventCategory::Other => "Event",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEvent {
    pub category: EventCategory,
    pub minute: Option<u32>,
    pub extra: Option<u32>,
    pub time_label: String,
    pub detail: String,
    pub player: Option<String>,
    pub team: Option<String>,
}

impl NormalizedEvent {
    /// Position on the match clock, stoppage time included.
    pub fn sort_key(&self) -> u32 {
        self.minute.unwrap_or(0).saturating_add(self.extra.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Type,
    Detail,
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Exact(&'static str),
    Contains(&'static str),
}

struct Rule {
    source: Source,
    matcher: Matcher,
    category: EventCategory,
}

const fn rule(source: Source, matcher: Matcher, category: EventCategory) -> Rule {
    Rule { source, matcher, category }
}

// First match wins.
const RULES: &[Rule] = &[
    rule(Source::Type, Matcher::Exact("var"), EventCategory::Other),
    rule(Source::Detail, Matcher::Contains("missed penalty"), EventCategory::Other),
    rule(Source::Type, Matcher::Exact("goal"), EventCategory::Goal),
    rule(Source::Detail, Matcher::Contains("goal"), EventCategory::Goal),
    rule(Source::Type, Matcher::Exact("card"), EventCategory::Card),
    rule(Source::Detail, Matcher::Contains("card"), EventCategory::Card),
    rule(Source::Type, Matcher::Exact("subst"), EventCategory::Substitution),
    rule(Source::Type, Matcher::Contains("substitution"), EventCategory::Substitution),
    rule(Source::Detail, Matcher::Contains("substitution"), EventCategory::Substitution),
    rule(Source::Type, Matcher::Contains("corner"), EventCategory::Corner),
    rule(Source::Detail, Matcher::Contains("corner"), EventCategory::Corner),
];

fn categorize(kind: &str, detail: &str) -> EventCategory {
    RULES
        .iter()
        .find(|r| {
            let haystack = match r.source {
                Source::Type => kind,
                Source::Detail => detail,
            };
            match r.matcher {
                Matcher::Exact(needle) => haystack == needle,
                Matcher::Contains(needle) => haystack.contains(needle),
            }
        })
        .map(|r| r.category)
        .unwrap_or(EventCategory::Other)
}

/// Render the match clock: `55'`, `90+3'`, or `-` when the minute is missing.
pub fn format_time_label(minute: Option<u32>, extra: Option<u32>) -> String {
    match (minute, extra.filter(|x| *x > 0)) {
        (None, _) => "-".to_string(),
        (Some(m), Some(x)) => format!("{}+{}'", m, x),
        (Some(m), None) => format!("{}'", m),
    }
}

fn minute_of(record: &Value, f: Field) -> Option<u32> {
    u32::try_from(as_int(field(record, f), -1)).ok()
}

/// Classify one raw provider event. Never fails; unknown kinds become `Other`.
pub fn classify(raw: &Value) -> NormalizedEvent {
    let kind = text(raw, Field::EventType).unwrap_or_default().to_lowercase();
    let detail = text(raw, Field::EventDetail).unwrap_or_default();
    let category = categorize(kind.trim(), detail.trim().to_lowercase().as_str());

    let minute = minute_of(raw, Field::EventElapsed);
    let extra = minute_of(raw, Field::EventExtra);

    NormalizedEvent {
        category,
        minute,
        extra,
        time_label: format_time_label(minute, extra),
        detail,
        player: text(raw, Field::EventPlayer),
        team: text(raw, Field::EventTeam),
    }
}

/// Classify an event list (bare array or a `{response: [...]}` envelope), newest first.
pub fn classify_all(events: &Value) -> Vec<NormalizedEvent> {
    let items = match events {
        Value::Array(items) => Some(items),
        other => resolve(other, &[&["response"], &["events"]]).and_then(Value::as_array),
    };

    let mut classified: Vec<NormalizedEvent> = items
        .map(|items| items.iter().map(classify).collect())
        .unwrap_or_default();

    classified.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stoppage_time_goal() {
        let event = json!({ "type": "Goal", "detail": "Normal Goal", "time": { "elapsed": 90, "extra": 3 } });
        let normalized = classify(&event);
        assert_eq!(normalized.category, EventCategory::Goal);
        assert_eq!(normalized.time_label, "90+3'");

        let flat = json!({ "type": "Goal", "detail": "Normal Goal", "elapsed": 90, "extra": 3 });
        assert_eq!(classify(&flat).time_label, "90+3'");
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let event = json!({ "type": "  CARD ", "detail": "Yellow Card", "time": { "elapsed": "34" } });
        let normalized = classify(&event);
        assert_eq!(normalized.category, EventCategory::Card);
        assert_eq!(normalized.time_label, "34'");
        assert_eq!(normalized.detail, "Yellow Card");
    }

    #[test]
    fn test_provider_kinds() {
        let subst = json!({ "type": "subst", "detail": "Substitution 1", "time": { "elapsed": 60, "extra": null } });
        assert_eq!(classify(&subst).category, EventCategory::Substitution);
        assert_eq!(classify(&subst).time_label, "60'");

        let var = json!({ "type": "Var", "detail": "Goal cancelled" });
        assert_eq!(classify(&var).category, EventCategory::Other);

        let missed = json!({ "type": "Goal", "detail": "Missed Penalty" });
        assert_eq!(classify(&missed).category, EventCategory::Other);

        let own_goal = json!({ "type": "goal", "detail": "Own Goal" });
        assert_eq!(classify(&own_goal).category, EventCategory::Goal);

        let corner = json!({ "type": "Corner Kick" });
        assert_eq!(classify(&corner).category, EventCategory::Corner);
    }

    #[test]
    fn test_unknown_event_is_kept_as_other() {
        let event = json!({ "type": "Injury", "detail": "Knock", "time": { "elapsed": 12 } });
        let normalized = classify(&event);
        assert_eq!(normalized.category, EventCategory::Other);
        assert_eq!(normalized.time_label, "12'");

        let empty = classify(&json!({}));
        assert_eq!(empty.category, EventCategory::Other);
        assert_eq!(empty.time_label, "-");
    }

    #[test]
    fn test_player_and_team_names() {
        let event = json!({
            "type": "Goal",
            "detail": "Normal Goal",
            "time": { "elapsed": 12 },
            "player": { "id": 9, "name": "Gyökeres" },
            "team": { "id": 228, "name": "Sporting CP" }
        });
        let normalized = classify(&event);
        assert_eq!(normalized.player.as_deref(), Some("Gyökeres"));
        assert_eq!(normalized.team.as_deref(), Some("Sporting CP"));
    }

    #[test]
    fn test_classify_all_orders_newest_first() {
        let events = json!({ "response": [
            { "type": "Goal", "detail": "Normal Goal", "time": { "elapsed": 10 } },
            { "type": "Card", "detail": "Yellow Card", "time": { "elapsed": 45, "extra": 2 } },
            { "type": "subst", "detail": "Substitution 1", "time": { "elapsed": 46 } },
            { "type": "Card", "detail": "Red Card", "time": { "elapsed": 46 } },
        ]});
        let classified = classify_all(&events);
        let labels: Vec<&str> = classified.iter().map(|e| e.time_label.as_str()).collect();
        assert_eq!(labels, vec!["45+2'", "46'", "46'", "10'"]);
        // Equal clock positions keep provider order.
        assert_eq!(classified[1].category, EventCategory::Substitution);
        assert_eq!(classified[2].category, EventCategory::Card);
    }

    #[test]
    fn test_sort_key_saturates_on_huge_clock() {
        let events = json!([
            { "type": "Goal", "time": { "elapsed": 3_000_000_000u64, "extra": 3_000_000_000u64 } },
            { "type": "Card", "time": { "elapsed": 20 } },
        ]);
        let classified = classify_all(&events);
        assert_eq!(classified[0].sort_key(), u32::MAX);
        assert_eq!(classified[1].time_label, "20'");
    }

    #[test]
    fn test_classify_all_non_list() {
        assert!(classify_all(&json!(null)).is_empty());
        assert!(classify_all(&json!({ "errors": [] })).is_empty());
    }

    mod properties {
        use crate::data::events::{classify, EventCategory};
        use proptest::prelude::*;
        use serde_json::json;

        proptest! {
            #[test]
            fn prop_classify_is_total(kind in "\\PC{0,16}", detail in "\\PC{0,24}", elapsed in proptest::option::of(-5i64..130)) {
                let event = json!({ "type": kind, "detail": detail, "time": { "elapsed": elapsed } });
                let normalized = classify(&event);
                prop_assert!(matches!(
                    normalized.category,
                    EventCategory::Goal | EventCategory::Card | EventCategory::Substitution | EventCategory::Corner | EventCategory::Other
                ));
                prop_assert!(!normalized.time_label.is_empty());
            }
        }
    }
}
