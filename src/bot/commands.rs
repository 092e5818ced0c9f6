use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List fixtures for a date (today when omitted), live games included.
    Games { date: Option<NaiveDate> },
    /// List fixtures currently in play.
    LiveGames,
    /// Pre-match analysis of a listed fixture, by 1-based index.
    Analyze { index: usize },
    /// Live analysis of a listed fixture, by 1-based index.
    Live { index: usize },
    Player { id: i64, season: Option<i32> },
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),

    #[error("invalid format, use: {usage}")]
    Usage { usage: &'static str },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("index must be 1 or greater")]
    ZeroIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Games,
    LiveGames,
    Analyze,
    Live,
    Player,
    Help,
    Quit,
}

/// Tried in order; the first match wins.
const RULES: [(&str, Rule); 7] = [
    (r"^(?:games|jogos)(?:\s+(?:today|hoje))?(?:\s+(?P<date>\S+))?$", Rule::Games),
    (r"^(?:live|ao vivo)$", Rule::LiveGames),
    (r"^(?:analyze|analisar)(?:\s+(?P<index>\S+))?$", Rule::Analyze),
    (r"^(?:live|ao vivo)\s+(?P<index>\S+)$", Rule::Live),
    (r"^player(?:\s+(?P<id>\S+))?(?:\s+(?P<season>\S+))?$", Rule::Player),
    (r"^(?:help|ajuda|\?)$", Rule::Help),
    (r"^(?:quit|exit)$", Rule::Quit),
];

fn grammar() -> &'static [(Regex, Rule)] {
    static GRAMMAR: OnceLock<Vec<(Regex, Rule)>> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        RULES
            .iter()
            .map(|&(pattern, rule)| (Regex::new(pattern).expect("invalid command pattern"), rule))
            .collect()
    })
}

impl Command {
    /// Parse one line of user input. Keywords are case-insensitive.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if normalized.is_empty() {
            return Err(CommandError::Empty);
        }

        let Some((caps, rule)) = grammar()
            .iter()
            .find_map(|(re, rule)| re.captures(&normalized).map(|caps| (caps, *rule)))
        else {
            let word = normalized.split(' ').next().unwrap_or_default().to_string();
            return Err(CommandError::Unknown(word));
        };

        let group = |key: &str| caps.name(key).map(|m| m.as_str());

        match rule {
            Rule::Games => {
                let date = group("date")
                    .map(|raw| {
                        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                            .map_err(|_| CommandError::InvalidDate(raw.to_string()))
                    })
                    .transpose()?;
                Ok(Command::Games { date })
            }
            Rule::LiveGames => Ok(Command::LiveGames),
            Rule::Analyze => Ok(Command::Analyze {
                index: parse_index(group("index"), "analyze <n>")?,
            }),
            Rule::Live => Ok(Command::Live {
                index: parse_index(group("index"), "live <n>")?,
            }),
            Rule::Player => {
                const USAGE: &str = "player <id> [season]";
                let id = group("id")
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0)
                    .ok_or(CommandError::Usage { usage: USAGE })?;
                let season = group("season")
                    .map(|raw| raw.parse::<i32>().map_err(|_| CommandError::Usage { usage: USAGE }))
                    .transpose()?;
                Ok(Command::Player { id, season })
            }
            Rule::Help => Ok(Command::Help),
            Rule::Quit => Ok(Command::Quit),
        }
    }
}

fn parse_index(raw: Option<&str>, usage: &'static str) -> Result<usize, CommandError> {
    let index = raw
        .and_then(|raw| raw.parse::<usize>().ok())
        .ok_or(CommandError::Usage { usage })?;
    if index == 0 {
        return Err(CommandError::ZeroIndex);
    }
    Ok(index)
}
