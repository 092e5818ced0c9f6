use tracing::debug;

use crate::config::ScoringWeights;
use crate::data::resolver::{field, Field};
use crate::data::stats::{split_statistics, StatKey, TeamStats};
use crate::data::types::PreMatchPayload;
use crate::recommendation::{assemble, ContextMetadata, FixtureMeta, PreMatchContext, Recommendation};
use crate::strategies::confidence::score_confidence;
use crate::strategies::types::{Market, Pick, TeamSide};

/// Attacking signal for one team in one fixture.
#[derive(Debug, Clone)]
struct TeamPower {
    name: String,
    fixture_id: Option<i64>,
    fixture_label: String,
    shots_on_goal: f64,
    total_shots: f64,
    power: f64,
}

impl TeamPower {
    /// `None` when the provider gave neither shot count for this team.
    fn from_stats(stats: &TeamStats, fallback_name: &str, meta: &FixtureMeta, weights: &ScoringWeights) -> Option<Self> {
        if !stats.has(StatKey::ShotsOnGoal) && !stats.has(StatKey::TotalShots) {
            return None;
        }

        let shots_on_goal = stats.get(StatKey::ShotsOnGoal).max(0.0);
        let total_shots = stats.get(StatKey::TotalShots).max(0.0);

        Some(Self {
            name: stats.team_name.clone().unwrap_or_else(|| fallback_name.to_string()),
            fixture_id: meta.id,
            fixture_label: meta.label(),
            shots_on_goal,
            total_shots,
            power: shots_on_goal * weights.shots_on_goal_weight,
        })
    }

    fn to_score_pick(&self, weights: &ScoringWeights) -> Pick {
        Pick::new(
            Market::TeamToScore,
            self.name.clone(),
            score_confidence(self.power, weights.team_to_score_weight),
        )
        .with_subject(self.fixture_label.clone())
        .with_fixture(self.fixture_id)
        .with_reason(format!(
            "{} shots on goal from {} total",
            self.shots_on_goal, self.total_shots
        ))
        .with_stat("shots_on_goal", self.shots_on_goal)
        .with_stat("total_shots", self.total_shots)
        .with_stat("power", self.power)
    }
}

/// Score upcoming fixtures on shot statistics. Goals are never consulted.
pub fn score_prematch(payload: &PreMatchPayload, weights: &ScoringWeights) -> Recommendation {
    let mut fixtures = Vec::with_capacity(payload.fixtures.len());
    let mut teams: Vec<TeamPower> = Vec::new();
    let mut winners: Vec<Pick> = Vec::new();

    for record in &payload.fixtures {
        let meta = FixtureMeta::from_record(record);

        let stats = field(record, Field::Statistics)
            .and_then(|block| split_statistics(block, meta.home_id, meta.away_id));
        let Some(stats) = stats else {
            debug!(fixture = ?meta.id, "no statistics for fixture, skipping");
            fixtures.push(meta);
            continue;
        };

        let home = TeamPower::from_stats(&stats.home, &meta.home, &meta, weights);
        let away = TeamPower::from_stats(&stats.away, &meta.away, &meta, weights);

        if let (Some(home), Some(away)) = (&home, &away) {
            if let Some(pick) = match_winner(home, away, weights) {
                winners.push(pick);
            }
        }

        teams.extend(home);
        teams.extend(away);
        fixtures.push(meta);
    }

    // Equal power goes to the team with more shot volume behind it.
    teams.sort_by(|a, b| {
        b.power
            .total_cmp(&a.power)
            .then(b.total_shots.total_cmp(&a.total_shots))
    });

    // Team-to-score picks are emitted ahead of the riskier winner market.
    let mut picks: Vec<Pick> = teams.iter().map(|t| t.to_score_pick(weights)).collect();
    picks.extend(winners);

    assemble(
        ContextMetadata::PreMatch(PreMatchContext {
            window: payload.window,
            fixtures,
        }),
        picks,
    )
}

fn match_winner(home: &TeamPower, away: &TeamPower, weights: &ScoringWeights) -> Option<Pick> {
    let gap = home.power - away.power;
    if gap.abs() <= weights.moneyline_power_gap {
        return None;
    }

    let (side, favourite) = if gap > 0.0 {
        (TeamSide::Home, home)
    } else {
        (TeamSide::Away, away)
    };
    let base = weights.moneyline_base
        + (gap.abs() - weights.moneyline_power_gap) * weights.moneyline_gap_weight;

    Some(
        Pick::new(Market::MatchWinner, favourite.name.clone(), score_confidence(base, 1.0))
            .with_subject(favourite.fixture_label.clone())
            .with_fixture(favourite.fixture_id)
            .with_reason(format!(
                "{} side power {:.1} vs {:.1}",
                match side {
                    TeamSide::Home => "Home",
                    TeamSide::Away => "Away",
                },
                home.power,
                away.power
            ))
            .with_stat("power_gap", gap.abs()),
    )
}
