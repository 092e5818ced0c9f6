pub mod commands;
pub mod render;
pub mod session;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SystemConfig;
use crate::data::api_sports::ApiSportsClient;
use crate::data::cache::ResponseCache;
use crate::data::coerce::as_int;
use crate::data::resolver::{field, Field};
use crate::data::types::{DateWindow, LivePayload, PlayerPayload, PreMatchPayload, RawRecord};
use crate::monitoring::logger::CsvLogger;
use crate::recommendation::{FixtureMeta, Recommendation};
use crate::strategies::HeuristicScorer;
use commands::{Command, CommandError};
use session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Quit,
}

#[derive(Debug, Error)]
enum LookupError {
    #[error("no fixture list yet, send 'games' first")]
    NoListing,

    #[error("no fixture {index} in your last list")]
    NotListed { index: usize },

    #[error("no player {id} found for season {season}")]
    UnknownPlayer { id: i64, season: i32 },
}

/// Turns one line of user input into a reply.
pub struct Bot {
    client: ApiSportsClient,
    scorer: HeuristicScorer,
    sessions: Arc<SessionStore>,
    cache: Arc<ResponseCache>,
    logger: Option<CsvLogger>,
    system: SystemConfig,
}

impl Bot {
    pub fn new(
        client: ApiSportsClient,
        scorer: HeuristicScorer,
        sessions: Arc<SessionStore>,
        cache: Arc<ResponseCache>,
        logger: Option<CsvLogger>,
        system: SystemConfig,
    ) -> Self {
        Self {
            client,
            scorer,
            sessions,
            cache,
            logger,
            system,
        }
    }

    pub async fn handle(&self, session: &str, line: &str) -> Reply {
        let command = match Command::parse(line) {
            Ok(Command::Quit) => return Reply::Quit,
            Ok(command) => command,
            Err(CommandError::Empty) => return Reply::Message(render::help()),
            Err(e) => return Reply::Message(e.to_string()),
        };

        match self.dispatch(session, command).await {
            Ok(text) => Reply::Message(text),
            Err(e) => match e.downcast_ref::<LookupError>() {
                Some(lookup) => Reply::Message(lookup.to_string()),
                None => {
                    warn!(%session, "command failed: {:#}", e);
                    Reply::Message(format!("Could not complete the request: {:#}", e))
                }
            },
        }
    }

    async fn dispatch(&self, session: &str, command: Command) -> Result<String> {
        match command {
            Command::Help | Command::Quit => Ok(render::help()),
            Command::Games { date } => self.list_games(session, date).await,
            Command::LiveGames => {
                let fixtures = self.client.live_fixtures().await?;
                Ok(self.remember_listing(session, "Live fixtures", fixtures, None))
            }
            Command::Analyze { index } => self.analyze(session, index).await,
            Command::Live { index } => self.live(session, index).await,
            Command::Player { id, season } => {
                let season = season.unwrap_or(self.system.default_season);
                let rec = self.player(id, season).await?;
                Ok(render::recommendation(&rec))
            }
        }
    }

    async fn list_games(&self, session: &str, date: Option<chrono::NaiveDate>) -> Result<String> {
        let (fixtures, window) = match date {
            Some(day) => (self.client.fixtures_on(day).await?, DateWindow::single(day)),
            None => {
                let today = Utc::now().date_naive();
                self.client
                    .fixtures_for_window(today, self.system.days_forward)
                    .await?
            }
        };
        let heading = if window.from == window.to {
            format!("Fixtures on {}", window)
        } else {
            format!("Fixtures {}", window)
        };
        Ok(self.remember_listing(session, &heading, fixtures, Some(window)))
    }

    fn remember_listing(
        &self,
        session: &str,
        heading: &str,
        fixtures: Vec<RawRecord>,
        window: Option<DateWindow>,
    ) -> String {
        if fixtures.is_empty() {
            return "No fixtures found.".to_string();
        }
        info!(%session, count = fixtures.len(), "listed fixtures");
        let text = render::fixture_list(heading, &fixtures, self.system.max_listed_fixtures);
        self.sessions.remember(session, fixtures, window);
        text
    }

    fn listed_fixture(&self, session: &str, index: usize) -> Result<RawRecord> {
        if !self.sessions.has_listing(session) {
            return Err(LookupError::NoListing.into());
        }
        Ok(self
            .sessions
            .fixture_at(session, index)
            .ok_or(LookupError::NotListed { index })?)
    }

    async fn analyze(&self, session: &str, index: usize) -> Result<String> {
        let mut record = self.listed_fixture(session, index)?;
        let meta = FixtureMeta::from_record(&record);

        if field(&record, Field::Statistics).is_none() {
            if let Some(id) = meta.id {
                let stats = self
                    .client
                    .fixture_statistics(id)
                    .await
                    .with_context(|| format!("statistics for fixture {}", id))?;
                if let Value::Object(map) = &mut record {
                    map.insert("statistics".to_string(), stats);
                }
            }
        }

        let fixture_rec = self.scorer.score_prematch(&PreMatchPayload {
            fixtures: vec![record],
            window: self.sessions.window(session),
        });
        self.log(&fixture_rec);

        let player_rec = match meta.home_id {
            Some(team_id) => match self.featured_player(team_id).await {
                Ok(rec) => rec,
                Err(e) => {
                    warn!(team_id, "player analysis unavailable: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(render::analysis(&fixture_rec, player_rec.as_ref()))
    }

    /// Player picks for the first player in the team's squad listing.
    async fn featured_player(&self, team_id: i64) -> Result<Option<Recommendation>> {
        let season = self.system.default_season;
        let squad = self.client.squad_players(team_id, season).await?;
        let Some(first) = squad.into_iter().next() else {
            return Ok(None);
        };

        let rec = self.scorer.score_player(&PlayerPayload {
            player: first,
            season: Some(season),
        });
        self.log(&rec);
        Ok(Some(rec))
    }

    async fn live(&self, session: &str, index: usize) -> Result<String> {
        let listed = self.listed_fixture(session, index)?;
        let Some(id) = field(&listed, Field::FixtureId).map(|v| as_int(Some(v), -1)).filter(|id| *id >= 0) else {
            let rec = self.scorer.score_live(&LivePayload {
                fixture: listed,
                statistics: None,
                events: None,
            });
            return Ok(render::recommendation(&rec));
        };

        // The listing may be stale; prefer the current fixture state.
        let fixture = match self.client.fixture(id).await {
            Ok(Some(current)) => current,
            Ok(None) => listed,
            Err(e) => {
                warn!(fixture = id, "using listed fixture state: {}", e);
                listed
            }
        };
        let statistics = self
            .client
            .fixture_statistics(id)
            .await
            .with_context(|| format!("statistics for fixture {}", id))?;
        let events = match self.client.fixture_events(id).await {
            Ok(events) => Some(events),
            Err(e) => {
                warn!(fixture = id, "events unavailable: {}", e);
                None
            }
        };

        let rec = self.scorer.score_live(&LivePayload {
            fixture,
            statistics: Some(statistics),
            events,
        });
        self.log(&rec);
        Ok(render::recommendation(&rec))
    }

    async fn player(&self, id: i64, season: i32) -> Result<Recommendation> {
        let record = self
            .client
            .player(id, season)
            .await?
            .ok_or(LookupError::UnknownPlayer { id, season })?;

        let rec = self.scorer.score_player(&PlayerPayload {
            player: record,
            season: Some(season),
        });
        self.log(&rec);
        Ok(rec)
    }

    fn log(&self, rec: &Recommendation) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log_recommendation(rec) {
                warn!("failed to write pick log: {}", e);
            }
        }
    }

    /// Drop expired session listings and cached responses.
    pub fn purge_expired(&self) -> usize {
        self.sessions.purge_expired() + self.cache.purge_expired()
    }

    pub fn shutdown(&self) {
        info!(cached = self.cache.len(), "clearing session state");
        self.sessions.clear();
        self.cache.clear();
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log_event("shutdown") {
                warn!("failed to write pick log: {}", e);
            }
        }
    }
}
