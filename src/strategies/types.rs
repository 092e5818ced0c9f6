use serde::Serialize;
use std::fmt;

use crate::data::types::ResolvedStat;
use crate::strategies::confidence::clamp_confidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamSide {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    PreMatch,
    Live,
    PlayerMarket,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::PreMatch => "pre_match",
            Strategy::Live => "live",
            Strategy::PlayerMarket => "player_market",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Market {
    TeamToScore,
    MatchWinner,
    GoalLine,
    BothTeamsToScore,
    CornerLine,
    NextCorner,
    FullTimeResult,
    NextGoal,
    PlayerShots,
    PlayerToScore,
    PlayerToAssist,
    PlayerPasses,
}

impl Market {
    pub fn label(&self) -> &'static str {
        match self {
            Market::TeamToScore => "Team to score",
            Market::MatchWinner => "Match winner",
            Market::GoalLine => "Total goals",
            Market::BothTeamsToScore => "Both teams to score",
            Market::CornerLine => "Total corners",
            Market::NextCorner => "Next corner",
            Market::FullTimeResult => "Full-time result",
            Market::NextGoal => "Next goal",
            Market::PlayerShots => "Player shots",
            Market::PlayerToScore => "Player to score",
            Market::PlayerToAssist => "Player to assist",
            Market::PlayerPasses => "Player passes",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One market recommendation. Confidence is a percentage clamped to [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub market: Market,
    pub selection: String,
    confidence: f64,
    pub reason: String,
    pub subject: Option<String>,
    pub fixture_id: Option<i64>,
    pub stats: Vec<ResolvedStat>,
}

impl Pick {
    pub fn new(market: Market, selection: impl Into<String>, confidence: f64) -> Self {
        Self {
            market,
            selection: selection.into(),
            confidence: clamp_confidence(confidence),
            reason: String::new(),
            subject: None,
            fixture_id: None,
            stats: Vec::new(),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_fixture(mut self, fixture_id: Option<i64>) -> Self {
        self.fixture_id = fixture_id;
        self
    }

    pub fn with_stat(mut self, name: &str, value: f64) -> Self {
        self.stats.push(ResolvedStat::new(name, value));
        self
    }
}
