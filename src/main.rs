mod bot;
mod config;
mod data;
mod monitoring;
mod recommendation;
mod strategies;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use bot::session::SessionStore;
use bot::{Bot, Reply};
use config::{Config, EnvConfig};
use data::api_sports::ApiSportsClient;
use data::cache::ResponseCache;
use monitoring::logger::CsvLogger;
use strategies::HeuristicScorer;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("matchday-picks starting");

    let config = Config::load("config.toml")?;
    let env_config = EnvConfig::load()?;

    if env_config.api_sports_key.is_none() {
        tracing::warn!("API_SPORTS_KEY not set, provider commands will fail");
    }
    tracing::info!("Default season: {}", config.system.default_season);
    tracing::info!("Provider: {}", env_config.api_sports_url);

    let cache = Arc::new(ResponseCache::new(Duration::from_secs(
        config.provider.cache_ttl_secs,
    )));
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.system.session_ttl_secs,
    )));

    let logger = if config.monitoring.csv_logging {
        tracing::info!("Logging picks to {}", config.monitoring.csv_log_path);
        Some(CsvLogger::new(config.monitoring.csv_log_path.clone())?)
    } else {
        None
    };

    let client = ApiSportsClient::new(&env_config, &config.provider, cache.clone())?;
    let bot = Arc::new(Bot::new(
        client,
        HeuristicScorer::new(config.scoring.clone()),
        sessions,
        cache,
        logger,
        config.system.clone(),
    ));

    let purger = {
        let bot = bot.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PURGE_INTERVAL);
            loop {
                ticker.tick().await;
                let purged = bot.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "expired cache entries dropped");
                }
            }
        })
    };

    println!("{}", bot::render::help());
    run_session(&bot, &env_config.session_id).await?;

    tracing::info!("Shutting down...");
    purger.abort();
    bot.shutdown();

    Ok(())
}

/// Read commands from stdin until EOF, `quit` or Ctrl-C.
async fn run_session(bot: &Bot, session: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            return Ok(());
        };

        match bot.handle(session, &line).await {
            Reply::Message(text) => {
                stdout.write_all(format!("{}\n\n", text).as_bytes()).await?;
            }
            Reply::Quit => return Ok(()),
        }
    }
}
