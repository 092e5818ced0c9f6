use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One provider payload. Shape varies by endpoint and provider version.
pub type RawRecord = Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStat {
    pub name: String,
    pub value: f64,
}

impl ResolvedStat {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: if value.is_finite() { value } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Score {
    Known { home: u32, away: u32 },
    Unknown,
}

impl Score {
    pub fn goals(&self) -> Option<(u32, u32)> {
        match self {
            Score::Known { home, away } => Some((*home, *away)),
            Score::Unknown => None,
        }
    }

    pub fn total(&self) -> Option<u32> {
        self.goals().map(|(home, away)| home.saturating_add(away))
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Score::Known { .. })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Known { home, away } => write!(f, "{}-{}", home, away),
            Score::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{} to {}", self.from, self.to)
        }
    }
}

/// Upcoming fixtures to score before kickoff. Each record may embed a `statistics` block.
#[derive(Debug, Clone, Default)]
pub struct PreMatchPayload {
    pub fixtures: Vec<RawRecord>,
    pub window: Option<DateWindow>,
}

/// One in-progress fixture with its statistics block and event list.
#[derive(Debug, Clone)]
pub struct LivePayload {
    pub fixture: RawRecord,
    pub statistics: Option<RawRecord>,
    pub events: Option<RawRecord>,
}

/// A player record with season statistics, as returned by `/players`.
#[derive(Debug, Clone)]
pub struct PlayerPayload {
    pub player: RawRecord,
    pub season: Option<i32>,
}
