use tracing::debug;

use crate::config::ScoringWeights;
use crate::data::coerce::as_int;
use crate::data::events::classify_all;
use crate::data::resolver::{field, Field};
use crate::data::stats::{resolve_score, split_statistics, MatchStats, StatKey, TeamStats};
use crate::data::types::{LivePayload, Score};
use crate::recommendation::{assemble, ContextMetadata, FixtureMeta, LiveContext, Recommendation};
use crate::strategies::confidence::{falling_with_clock, rising_with_clock, score_confidence};
use crate::strategies::types::{Market, Pick, TeamSide};

/// Totals pulled out of the statistics block once, so the rules below read plainly.
#[derive(Debug, Clone, Copy)]
struct LiveNumbers {
    home_shots: f64,
    away_shots: f64,
    home_on_goal: f64,
    away_on_goal: f64,
    corners: f64,
}

impl LiveNumbers {
    fn from_stats(stats: &MatchStats) -> Self {
        let get = |team: &TeamStats, key| team.get(key).max(0.0);
        Self {
            home_shots: get(&stats.home, StatKey::TotalShots),
            away_shots: get(&stats.away, StatKey::TotalShots),
            home_on_goal: get(&stats.home, StatKey::ShotsOnGoal),
            away_on_goal: get(&stats.away, StatKey::ShotsOnGoal),
            corners: get(&stats.home, StatKey::Corners) + get(&stats.away, StatKey::Corners),
        }
    }

    fn total_shots(&self) -> f64 {
        self.home_shots + self.away_shots
    }

    /// The side pushing harder on shot volume; home on a tie.
    fn busier_side(&self) -> TeamSide {
        if self.away_shots > self.home_shots {
            TeamSide::Away
        } else {
            TeamSide::Home
        }
    }
}

/// Score one in-progress fixture from its live statistics.
pub fn score_live(payload: &LivePayload, weights: &ScoringWeights) -> Recommendation {
    let fixture = FixtureMeta::from_record(&payload.fixture);
    let score = resolve_score(&payload.fixture);
    let elapsed = u32::try_from(as_int(field(&payload.fixture, Field::Elapsed), 0)).unwrap_or(0);

    let events = payload
        .events
        .as_ref()
        .filter(|events| !events.is_null())
        .or_else(|| field(&payload.fixture, Field::Events))
        .map(classify_all)
        .unwrap_or_default();

    let stats = payload
        .statistics
        .as_ref()
        .filter(|block| !block.is_null())
        .or_else(|| field(&payload.fixture, Field::Statistics))
        .and_then(|block| split_statistics(block, fixture.home_id, fixture.away_id));

    let (picks, home_stats, away_stats) = match &stats {
        Some(stats) => (
            live_picks(&fixture, stats, score, elapsed, weights),
            stats.home.resolved(),
            stats.away.resolved(),
        ),
        None => {
            debug!(fixture = ?fixture.id, "no live statistics, no picks");
            (Vec::new(), Vec::new(), Vec::new())
        }
    };

    assemble(
        ContextMetadata::Live(LiveContext {
            fixture,
            elapsed,
            score,
            home_stats,
            away_stats,
            events,
        }),
        picks,
    )
}

// Emission order is lower-risk first: late-game, corners, goal lines, both
// teams to score, next goal. The assembler keeps that order on equal confidence.
fn live_picks(
    fixture: &FixtureMeta,
    stats: &MatchStats,
    score: Score,
    elapsed: u32,
    weights: &ScoringWeights,
) -> Vec<Pick> {
    let n = LiveNumbers::from_stats(stats);
    let rising = rising_with_clock(elapsed, weights.live_time_swing);
    let falling = falling_with_clock(elapsed, weights.live_time_swing);
    let unknown = if score.is_known() { 1.0 } else { weights.unknown_score_factor };
    let team_name = |side: TeamSide| match side {
        TeamSide::Home => fixture.home.clone(),
        TeamSide::Away => fixture.away.clone(),
    };

    let mut picks = Vec::new();
    let mut push = |pick: Pick| {
        picks.push(
            pick.with_subject(fixture.label())
                .with_fixture(fixture.id)
                .with_stat("elapsed", f64::from(elapsed)),
        )
    };

    // Closing stages
    if elapsed > 75 {
        match score.goals() {
            Some((0, 0)) => push(
                Pick::new(
                    Market::GoalLine,
                    "Under 1.5",
                    score_confidence(weights.live_late_under_base, rising),
                )
                .with_reason(format!("Goalless at {}' with little time left", elapsed)),
            ),
            Some((home, away)) if home != away => {
                let leader = if home > away { TeamSide::Home } else { TeamSide::Away };
                push(
                    Pick::new(
                        Market::FullTimeResult,
                        team_name(leader),
                        score_confidence(weights.live_late_result_base, rising),
                    )
                    .with_reason(format!("Leading {} at {}'", score, elapsed)),
                )
            }
            Some(_) => {}
            None => push(
                Pick::new(
                    Market::GoalLine,
                    "Under current total + 0.5 (score unknown)",
                    score_confidence(weights.live_late_under_base, rising * unknown),
                )
                .with_reason(format!("{}' played, score unknown", elapsed)),
            ),
        }
    }

    // Corners
    if elapsed > 25 {
        if n.corners > 5.0 {
            push(
                Pick::new(
                    Market::CornerLine,
                    format!("Over {:.1}", n.corners + 1.5),
                    score_confidence(weights.live_corner_line_base, falling),
                )
                .with_reason(format!("{} corners already taken", n.corners))
                .with_stat("corners", n.corners),
            );
        } else if n.total_shots() > 10.0 && n.corners < 4.0 {
            push(
                Pick::new(
                    Market::NextCorner,
                    team_name(n.busier_side()),
                    score_confidence(weights.live_next_corner_base, 1.0),
                )
                .with_reason("High pressure, few corners")
                .with_stat("total_shots", n.total_shots())
                .with_stat("corners", n.corners),
            );
        }
    }

    // Goal lines
    if elapsed > 20 {
        let total_goals = score.total();
        if n.total_shots() > 7.0 && total_goals.map_or(true, |g| g < 2) {
            let base = weights.live_goal_line_base + (n.total_shots() - 7.0) * weights.live_shot_bonus;
            let selection = match total_goals {
                Some(goals) => format!("Over {:.1}", f64::from(goals) + 0.5),
                None => "Over current total + 0.5 (score unknown)".to_string(),
            };
            push(
                Pick::new(Market::GoalLine, selection, score_confidence(base, falling * unknown))
                    .with_reason(format!("{} total shots", n.total_shots()))
                    .with_stat("total_shots", n.total_shots()),
            );
        } else if n.total_shots() < 3.0 {
            let selection = match total_goals {
                Some(goals) => format!("Under {:.1}", f64::from(goals) + 1.5),
                None => "Under current total + 1.5 (score unknown)".to_string(),
            };
            push(
                Pick::new(
                    Market::GoalLine,
                    selection,
                    score_confidence(weights.live_under_goals_base, rising * unknown),
                )
                .with_reason(format!("Only {} shots", n.total_shots()))
                .with_stat("total_shots", n.total_shots()),
            );
        }
    }

    // Both teams to score
    let both_scored = matches!(score.goals(), Some((home, away)) if home > 0 && away > 0);
    if n.home_shots > 3.0 && n.away_shots > 3.0 && !both_scored && score.total().map_or(true, |g| g < 3) {
        let base = weights.live_btts_base
            + (n.home_shots.min(n.away_shots) - 3.0) * weights.live_shot_bonus;
        let selection = if score.is_known() { "Yes" } else { "Yes (score unknown)" };
        push(
            Pick::new(Market::BothTeamsToScore, selection, score_confidence(base, falling * unknown))
                .with_reason(format!("Both sides shooting ({} vs {})", n.home_shots, n.away_shots))
                .with_stat("home_shots", n.home_shots)
                .with_stat("away_shots", n.away_shots),
        );
    }

    // Next goal
    let on_goal_gap = n.home_on_goal - n.away_on_goal;
    if elapsed < 88 && on_goal_gap.abs() >= 2.0 {
        let side = if on_goal_gap > 0.0 { TeamSide::Home } else { TeamSide::Away };
        let base = weights.live_next_goal_base + on_goal_gap.abs() * weights.live_next_goal_gap_weight;
        push(
            Pick::new(Market::NextGoal, team_name(side), score_confidence(base, falling))
                .with_reason(format!(
                    "Shots on goal {} vs {}",
                    n.home_on_goal, n.away_on_goal
                ))
                .with_stat("shots_on_goal_gap", on_goal_gap.abs()),
        );
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fixture(goals: Value, score: Value, elapsed: i64) -> Value {
        json!({
            "fixture": { "id": 77, "status": { "long": "Second Half", "short": "2H", "elapsed": elapsed } },
            "teams": { "home": { "id": 1, "name": "Braga" }, "away": { "id": 2, "name": "Vitória" } },
            "goals": goals,
            "score": score
        })
    }

    fn stats(home: (i64, i64, i64), away: (i64, i64, i64)) -> Value {
        let side = |id: i64, (shots, on_goal, corners): (i64, i64, i64)| {
            json!({ "team": { "id": id }, "statistics": [
                { "type": "Total Shots", "value": shots },
                { "type": "Shots on Goal", "value": on_goal },
                { "type": "Corner Kicks", "value": corners },
            ]})
        };
        json!([side(1, home), side(2, away)])
    }

    fn payload(fixture: Value, statistics: Option<Value>) -> LivePayload {
        LivePayload { fixture, statistics, events: None }
    }

    fn score_of(rec: &Recommendation) -> Score {
        match rec.context() {
            ContextMetadata::Live(ctx) => ctx.score,
            other => panic!("unexpected context {:?}", other),
        }
    }

    fn find(rec: &Recommendation, market: Market) -> Option<&Pick> {
        rec.picks().iter().find(|p| p.market == market)
    }

    #[test]
    fn test_score_fallback_to_secondary_field() {
        let input = payload(
            fixture(json!({ "home": null, "away": null }), json!({ "home": 1, "away": 0 }), 55),
            Some(stats((6, 3, 2), (4, 1, 1))),
        );
        let rec = score_live(&input, &ScoringWeights::default());
        assert_eq!(score_of(&rec), Score::Known { home: 1, away: 0 });
        match rec.context() {
            ContextMetadata::Live(ctx) => assert_eq!(ctx.elapsed, 55),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_huge_score_does_not_overflow() {
        let input = payload(
            fixture(json!({ "home": 3_000_000_000u64, "away": 3_000_000_000u64 }), json!({}), 80),
            Some(json!([{ "team": { "id": 1 }, "statistics": [{ "type": "Total Shots", "value": 2 }] }])),
        );
        let rec = score_live(&input, &ScoringWeights::default());
        assert_eq!(score_of(&rec), Score::Known { home: 3_000_000_000, away: 3_000_000_000 });
        for pick in rec.picks() {
            assert!((0.0..=100.0).contains(&pick.confidence()));
        }
    }

    #[test]
    fn test_huge_event_clock_without_statistics() {
        let input = LivePayload {
            fixture: fixture(json!({ "home": 1, "away": 0 }), json!({}), 50),
            statistics: None,
            events: Some(json!([
                { "type": "Goal", "detail": "Normal Goal", "time": { "elapsed": 3_000_000_000u64, "extra": 3_000_000_000u64 } },
                { "type": "Card", "detail": "Yellow Card", "time": { "elapsed": 12 } }
            ])),
        };
        let rec = score_live(&input, &ScoringWeights::default());
        assert!(rec.is_empty());
        match rec.context() {
            ContextMetadata::Live(ctx) => assert_eq!(ctx.events.len(), 2),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_no_statistics_block_is_empty() {
        let input = payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), 60), None);
        let rec = score_live(&input, &ScoringWeights::default());
        assert!(rec.is_empty());
        assert_eq!(score_of(&rec), Score::Known { home: 0, away: 0 });
    }

    #[test]
    fn test_unknown_score_is_reported_not_nil_nil() {
        let input = payload(
            fixture(json!({ "home": null, "away": null }), json!({ "home": null, "away": null }), 80),
            Some(stats((6, 4, 1), (5, 1, 1))),
        );
        let rec = score_live(&input, &ScoringWeights::default());
        assert_eq!(score_of(&rec), Score::Unknown);
        assert!(!rec.is_empty());
        assert!(rec.picks().iter().all(|p| !p.selection.contains("0-0")));
        assert!(find(&rec, Market::FullTimeResult).is_none());

        let over = rec
            .picks()
            .iter()
            .find(|p| p.market == Market::GoalLine && p.selection.starts_with("Over"))
            .unwrap();
        assert!(over.selection.contains("score unknown"));
    }

    #[test]
    fn test_unknown_score_lowers_confidence() {
        let weights = ScoringWeights::default();
        let known = score_live(
            &payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), 40), Some(stats((6, 2, 1), (4, 1, 1)))),
            &weights,
        );
        let unknown = score_live(
            &payload(fixture(json!({}), json!({}), 40), Some(stats((6, 2, 1), (4, 1, 1)))),
            &weights,
        );
        let k = find(&known, Market::GoalLine).unwrap().confidence();
        let u = find(&unknown, Market::GoalLine).unwrap().confidence();
        assert!(u < k);
    }

    #[test]
    fn test_partial_statistics_read_as_zero() {
        let block = json!([
            { "team": { "id": 1 }, "statistics": [{ "type": "Total Shots", "value": 9 }] },
            { "team": { "id": 2 }, "statistics": [] }
        ]);
        let input = payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), 30), Some(block));
        let rec = score_live(&input, &ScoringWeights::default());
        let over = find(&rec, Market::GoalLine).unwrap();
        assert_eq!(over.selection, "Over 0.5");
        assert!(find(&rec, Market::CornerLine).is_none());
    }

    #[test]
    fn test_statistics_embedded_in_fixture() {
        let mut record = fixture(json!({ "home": 1, "away": 1 }), json!({}), 50);
        record["statistics"] = stats((8, 5, 3), (2, 1, 4));
        let rec = score_live(&payload(record, None), &ScoringWeights::default());
        let next = find(&rec, Market::NextGoal).unwrap();
        assert_eq!(next.selection, "Braga");
    }

    #[test]
    fn test_late_game_picks() {
        let weights = ScoringWeights::default();
        let goalless = score_live(
            &payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), 80), Some(stats((4, 1, 2), (3, 1, 1)))),
            &weights,
        );
        let under = find(&goalless, Market::GoalLine).unwrap();
        assert_eq!(under.selection, "Under 1.5");

        let away_lead = score_live(
            &payload(fixture(json!({ "home": 0, "away": 2 }), json!({}), 82), Some(stats((4, 1, 2), (3, 1, 1)))),
            &weights,
        );
        assert_eq!(find(&away_lead, Market::FullTimeResult).unwrap().selection, "Vitória");
    }

    #[test]
    fn test_corner_picks() {
        let weights = ScoringWeights::default();
        let many = score_live(
            &payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), 50), Some(stats((5, 1, 4), (4, 1, 3)))),
            &weights,
        );
        assert_eq!(find(&many, Market::CornerLine).unwrap().selection, "Over 8.5");

        let pressure = score_live(
            &payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), 50), Some(stats((3, 1, 1), (9, 2, 1)))),
            &weights,
        );
        assert_eq!(find(&pressure, Market::NextCorner).unwrap().selection, "Vitória");
    }

    #[test]
    fn test_events_are_classified() {
        let mut input = payload(fixture(json!({ "home": 1, "away": 0 }), json!({}), 50), None);
        input.events = Some(json!([
            { "type": "Goal", "detail": "Normal Goal", "time": { "elapsed": 12 } },
            { "type": "Card", "detail": "Yellow Card", "time": { "elapsed": 45, "extra": 1 } }
        ]));
        let rec = score_live(&input, &ScoringWeights::default());
        match rec.context() {
            ContextMetadata::Live(ctx) => {
                assert_eq!(ctx.events.len(), 2);
                assert_eq!(ctx.events[0].time_label, "45+1'");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_idempotent() {
        let input = payload(
            fixture(json!({ "home": 1, "away": 0 }), json!({}), 64),
            Some(stats((9, 4, 6), (5, 1, 2))),
        );
        let weights = ScoringWeights::default();
        assert_eq!(score_live(&input, &weights), score_live(&input, &weights));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_confidence_in_range(
                elapsed in -10i64..200,
                home in (-1_000_000i64..1_000_000, -1_000i64..1_000_000, -10i64..1_000),
                away in (-1_000i64..1_000, -1_000i64..1_000, -1_000_000i64..1_000_000),
                goals in proptest::option::of((0i64..10, 0i64..10)),
            ) {
                let goals = goals.map_or(json!({}), |(h, a)| json!({ "home": h, "away": a }));
                let rec = score_live(&payload(fixture(goals, json!({}), elapsed), Some(stats(home, away))), &ScoringWeights::default());
                for pick in rec.picks() {
                    prop_assert!((0.0..=100.0).contains(&pick.confidence()));
                }
            }

            #[test]
            fn prop_more_shots_never_lowers_over_confidence(elapsed in 21i64..88, shots in 8i64..40, extra in 0i64..20) {
                let weights = ScoringWeights::default();
                let conf = |shots: i64| {
                    let rec = score_live(
                        &payload(fixture(json!({ "home": 0, "away": 0 }), json!({}), elapsed), Some(stats((shots, 0, 0), (0, 0, 0)))),
                        &weights,
                    );
                    rec.picks().iter()
                        .find(|p| p.market == Market::GoalLine && p.selection.starts_with("Over"))
                        .map(|p| p.confidence())
                        .unwrap_or(0.0)
                };
                prop_assert!(conf(shots + extra) >= conf(shots));
            }
        }
    }
}
