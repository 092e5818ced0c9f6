use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::recommendation::Recommendation;

const HEADER: &str = "timestamp,context,subject,market,selection,confidence";

/// Append-only CSV record of every pick the bot hands out.
pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)
                .with_context(|| format!("Failed to create {}", log_path))?;

            writeln!(file, "{}", HEADER)?;
        }

        Ok(Self { log_path })
    }

    /// One row per pick, in ranked order.
    pub fn log_recommendation(&self, recommendation: &Recommendation) -> Result<usize> {
        if recommendation.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;
        let timestamp = Utc::now().to_rfc3339();
        let context = recommendation.context();

        for pick in recommendation.picks() {
            let subject = pick.subject.clone().unwrap_or_else(|| context.subject());
            writeln!(
                file,
                "{},{},{},{},{},{:.1}",
                timestamp,
                context.strategy().as_str(),
                csv_field(&subject),
                csv_field(pick.market.label()),
                csv_field(&pick.selection),
                pick.confidence()
            )?;
        }

        Ok(recommendation.picks().len())
    }

    /// Log a lifecycle event
    pub fn log_event(&self, event: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;

        writeln!(file, "{},EVENT,{},,,", Utc::now().to_rfc3339(), csv_field(event))?;

        Ok(())
    }
}

/// Quote a field when it holds a comma, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
