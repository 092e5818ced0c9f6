use serde::Serialize;
use serde_json::Value;

use crate::data::coerce::as_int;
use crate::data::events::NormalizedEvent;
use crate::data::resolver::{field, text, Field};
use crate::data::types::{DateWindow, ResolvedStat, Score};
use crate::strategies::types::{Pick, Strategy};

/// Identifying details of one fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureMeta {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub league: Option<String>,
    pub status: Option<String>,
    pub home: String,
    pub away: String,
    pub home_id: Option<i64>,
    pub away_id: Option<i64>,
}

impl FixtureMeta {
    pub fn from_record(record: &Value) -> Self {
        let id_of = |f: Field| field(record, f).map(|v| as_int(Some(v), -1)).filter(|id| *id >= 0);

        Self {
            id: id_of(Field::FixtureId),
            date: text(record, Field::FixtureDate),
            league: text(record, Field::LeagueName),
            status: text(record, Field::StatusLong).or_else(|| text(record, Field::StatusShort)),
            home: text(record, Field::HomeTeamName).unwrap_or_else(|| "Home".to_string()),
            away: text(record, Field::AwayTeamName).unwrap_or_else(|| "Away".to_string()),
            home_id: id_of(Field::HomeTeamId),
            away_id: id_of(Field::AwayTeamId),
        }
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

/// Identifying details of one player for a season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMeta {
    pub id: Option<i64>,
    pub name: String,
    pub nationality: Option<String>,
    pub age: Option<i64>,
    pub team: Option<String>,
    pub league: Option<String>,
    pub season: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreMatchContext {
    pub window: Option<DateWindow>,
    pub fixtures: Vec<FixtureMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveContext {
    pub fixture: FixtureMeta,
    pub elapsed: u32,
    pub score: Score,
    pub home_stats: Vec<ResolvedStat>,
    pub away_stats: Vec<ResolvedStat>,
    pub events: Vec<NormalizedEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerContext {
    pub player: PlayerMeta,
    pub appearances: u32,
    pub key_stats: Vec<ResolvedStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "context", rename_all = "snake_case")]
pub enum ContextMetadata {
    PreMatch(PreMatchContext),
    Live(LiveContext),
    Player(PlayerContext),
}

impl ContextMetadata {
    pub fn strategy(&self) -> Strategy {
        match self {
            ContextMetadata::PreMatch(_) => Strategy::PreMatch,
            ContextMetadata::Live(_) => Strategy::Live,
            ContextMetadata::Player(_) => Strategy::PlayerMarket,
        }
    }

    /// Short label naming what the recommendation is about.
    pub fn subject(&self) -> String {
        match self {
            ContextMetadata::PreMatch(ctx) => match ctx.fixtures.as_slice() {
                [only] => only.label(),
                many => format!("{} fixtures", many.len()),
            },
            ContextMetadata::Live(ctx) => ctx.fixture.label(),
            ContextMetadata::Player(ctx) => ctx.player.name.clone(),
        }
    }
}

/// Ranked picks plus the metadata they were scored against. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    context: ContextMetadata,
    picks: Vec<Pick>,
}

impl Recommendation {
    pub(super) fn new(context: ContextMetadata, picks: Vec<Pick>) -> Self {
        Self { context, picks }
    }

    pub fn context(&self) -> &ContextMetadata {
        &self.context
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    /// The `n` highest-confidence picks.
    pub fn top(&self, n: usize) -> &[Pick] {
        &self.picks[..n.min(self.picks.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}
