use std::fmt::Write;

use crate::data::coerce::format_confidence;
use crate::data::events::NormalizedEvent;
use crate::data::types::{RawRecord, ResolvedStat, Score};
use crate::recommendation::{ContextMetadata, FixtureMeta, LiveContext, PlayerContext, Recommendation};

const RECENT_EVENTS: usize = 3;
const SHOWN_PICKS: usize = 5;

pub fn help() -> String {
    [
        "Commands:",
        "  games [YYYY-MM-DD]    list fixtures (today by default, live games first)",
        "  live                  list fixtures in play",
        "  analyze <n>           pre-match picks for fixture n of the last list",
        "  live <n>              live picks for fixture n of the last list",
        "  player <id> [season]  player market picks",
        "  help                  this message",
        "  quit                  leave",
    ]
    .join("\n")
}

/// Numbered fixture list, capped at `max` rows.
pub fn fixture_list(heading: &str, fixtures: &[RawRecord], max: usize) -> String {
    let mut out = format!("{}:", heading);
    for (i, record) in fixtures.iter().take(max).enumerate() {
        let meta = FixtureMeta::from_record(record);
        let _ = write!(out, "\n{}. {}", i + 1, meta.label());
        if let Some(league) = &meta.league {
            let _ = write!(out, " ({})", league);
        }
        if let Some(status) = &meta.status {
            let _ = write!(out, " [{}]", status);
        }
    }
    if fixtures.len() > max {
        let _ = write!(out, "\n... and {} more", fixtures.len() - max);
    }
    out.push_str("\n\nReply with 'analyze <n>' or 'live <n>'.");
    out
}

/// Full text for one recommendation.
pub fn recommendation(rec: &Recommendation) -> String {
    let mut out = match rec.context() {
        ContextMetadata::PreMatch(ctx) => {
            let mut header = format!("Pre-match analysis: {}", rec.context().subject());
            if let Some(window) = &ctx.window {
                let _ = write!(header, " (fixtures of {})", window);
            }
            header
        }
        ContextMetadata::Live(ctx) => live_header(ctx),
        ContextMetadata::Player(ctx) => player_header(ctx),
    };

    out.push('\n');
    out.push_str(&picks(rec));
    out
}

/// Pre-match picks for a fixture followed by the featured player's picks.
pub fn analysis(fixture: &Recommendation, player: Option<&Recommendation>) -> String {
    let mut out = recommendation(fixture);
    out.push_str("\n\nFeatured player:\n");
    match player {
        Some(rec) => out.push_str(&recommendation(rec)),
        None => out.push_str("No player analysis available."),
    }
    out.push_str("\n\nDo your own research. Odds move.");
    out
}

fn picks(rec: &Recommendation) -> String {
    if rec.is_empty() {
        return "No picks: not enough data.".to_string();
    }

    rec.top(SHOWN_PICKS)
        .iter()
        .enumerate()
        .map(|(i, pick)| {
            let mut line = format!(
                "{}. {}: {} (confidence {})",
                i + 1,
                pick.market,
                pick.selection,
                format_confidence(pick.confidence())
            );
            if !pick.reason.is_empty() {
                let _ = write!(line, "\n   {}", pick.reason);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn live_header(ctx: &LiveContext) -> String {
    let score = match ctx.score {
        Score::Known { home, away } => format!("{} {} x {} {}", ctx.fixture.home, home, away, ctx.fixture.away),
        Score::Unknown => format!("{} ? x ? {} (score unknown)", ctx.fixture.home, ctx.fixture.away),
    };

    let mut out = format!("Live: {} ({}')", score, ctx.elapsed);
    if !ctx.home_stats.is_empty() || !ctx.away_stats.is_empty() {
        out.push_str("\n---");
        for (label, key) in [
            ("Possession", "ball_possession"),
            ("Shots", "total_shots"),
            ("On target", "shots_on_goal"),
            ("Corners", "corner_kicks"),
        ] {
            let _ = write!(
                out,
                "\n{}: {} / {}",
                label,
                stat(&ctx.home_stats, key),
                stat(&ctx.away_stats, key)
            );
        }
    }

    out.push_str("\n---\nRecent events:");
    if ctx.events.is_empty() {
        out.push_str("\n- none");
    }
    for event in ctx.events.iter().take(RECENT_EVENTS) {
        let _ = write!(out, "\n- {}", event_line(event));
    }
    out.push_str("\n---");
    out
}

fn player_header(ctx: &PlayerContext) -> String {
    let player = &ctx.player;
    let mut out = player.name.clone();
    if let Some(team) = &player.team {
        let _ = write!(out, " ({})", team);
    }
    if let Some(season) = player.season {
        let _ = write!(out, ", season {}", season);
    }
    let _ = write!(out, "\nAppearances: {}", ctx.appearances);
    for key in ["goals_per_game", "shots_per_game", "assists_per_game"] {
        if let Some(s) = ctx.key_stats.iter().find(|s| s.name == key) {
            let _ = write!(out, "\n{}: {:.2}", key.replace('_', " "), s.value);
        }
    }
    out
}

fn stat(stats: &[ResolvedStat], name: &str) -> String {
    let value = stats.iter().find(|s| s.name == name).map_or(0.0, |s| s.value);
    if name == "ball_possession" {
        format!("{:.0}%", value)
    } else {
        format!("{:.0}", value)
    }
}

fn event_line(event: &NormalizedEvent) -> String {
    let mut line = format!("{} {}", event.time_label, event.category);
    if !event.detail.is_empty() {
        let _ = write!(line, ": {}", event.detail);
    }
    if let Some(player) = &event.player {
        let _ = write!(line, " ({})", player);
    }
    line
}
