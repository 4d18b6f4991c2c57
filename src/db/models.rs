use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::analysis::Category;

/// A competition (e.g. Serie A) as listed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    pub logo: Option<String>,
    /// Season currently in progress, if known
    pub current_season: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
}

/// Per-match counts for both sides. Absent values deserialize as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchStatistics {
    pub shots_home: u32,
    pub shots_away: u32,
    pub shots_on_target_home: u32,
    pub shots_on_target_away: u32,
    pub corners_home: u32,
    pub corners_away: u32,
    /// First-half corners
    pub corners_ht_home: u32,
    pub corners_ht_away: u32,
    pub fouls_home: u32,
    pub fouls_away: u32,
    pub yellow_cards_home: u32,
    pub yellow_cards_away: u32,
    pub red_cards_home: u32,
    pub red_cards_away: u32,
    pub offsides_home: u32,
    pub offsides_away: u32,
    pub saves_home: u32,
    pub saves_away: u32,
}

impl MatchStatistics {
    pub fn cards_home(&self) -> u32 {
        self.yellow_cards_home + self.red_cards_home
    }

    pub fn cards_away(&self) -> u32 {
        self.yellow_cards_away + self.red_cards_away
    }
}

/// Fixture status as reported by the data provider's short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FixtureStatus {
    NotStarted,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    BreakTime,
    PenaltiesInProgress,
    Live,
    Suspended,
    Interrupted,
    Finished,
    FinishedAfterExtraTime,
    FinishedAfterPenalties,
    Postponed,
    Cancelled,
    Abandoned,
    Other(String),
}

impl FixtureStatus {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "NS" | "TBD" | "NOT STARTED" => FixtureStatus::NotStarted,
            "1H" => FixtureStatus::FirstHalf,
            "HT" => FixtureStatus::HalfTime,
            "2H" => FixtureStatus::SecondHalf,
            "ET" => FixtureStatus::ExtraTime,
            "BT" => FixtureStatus::BreakTime,
            "P" => FixtureStatus::PenaltiesInProgress,
            "LIVE" => FixtureStatus::Live,
            "SUSP" => FixtureStatus::Suspended,
            "INT" => FixtureStatus::Interrupted,
            "FT" => FixtureStatus::Finished,
            "AET" => FixtureStatus::FinishedAfterExtraTime,
            "PEN" => FixtureStatus::FinishedAfterPenalties,
            "PST" => FixtureStatus::Postponed,
            "CANC" => FixtureStatus::Cancelled,
            "ABD" => FixtureStatus::Abandoned,
            _ => FixtureStatus::Other(code.trim().to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            FixtureStatus::NotStarted => "NS",
            FixtureStatus::FirstHalf => "1H",
            FixtureStatus::HalfTime => "HT",
            FixtureStatus::SecondHalf => "2H",
            FixtureStatus::ExtraTime => "ET",
            FixtureStatus::BreakTime => "BT",
            FixtureStatus::PenaltiesInProgress => "P",
            FixtureStatus::Live => "LIVE",
            FixtureStatus::Suspended => "SUSP",
            FixtureStatus::Interrupted => "INT",
            FixtureStatus::Finished => "FT",
            FixtureStatus::FinishedAfterExtraTime => "AET",
            FixtureStatus::FinishedAfterPenalties => "PEN",
            FixtureStatus::Postponed => "PST",
            FixtureStatus::Cancelled => "CANC",
            FixtureStatus::Abandoned => "ABD",
            FixtureStatus::Other(code) => code,
        }
    }

    /// FT/AET/PEN, or any provider code that contains "FT" (e.g. "FT_PEN")
    /// or is exactly "FINISHED", ignoring case.
    pub fn is_finished(&self) -> bool {
        match self {
            FixtureStatus::Finished
            | FixtureStatus::FinishedAfterExtraTime
            | FixtureStatus::FinishedAfterPenalties => true,
            FixtureStatus::Other(code) => {
                let upper = code.to_uppercase();
                upper.contains("FT") || upper == "FINISHED"
            }
            _ => false,
        }
    }
}

impl From<String> for FixtureStatus {
    fn from(code: String) -> Self {
        FixtureStatus::from_code(&code)
    }
}

impl From<FixtureStatus> for String {
    fn from(status: FixtureStatus) -> Self {
        status.code().to_string()
    }
}

impl fmt::Display for FixtureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single match as returned by the fixture store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,
    /// Kick-off time
    pub date: DateTime<Utc>,
    pub league_id: i64,
    pub season: i32,
    /// e.g. "Regular Season - 12"
    #[serde(default)]
    pub round: Option<String>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub status: FixtureStatus,
    #[serde(default)]
    pub score_home: Option<i32>,
    #[serde(default)]
    pub score_away: Option<i32>,
    /// Missing for roughly half of the fixtures of a typical season
    #[serde(default)]
    pub statistics: Option<MatchStatistics>,
    #[serde(default)]
    pub home_team_name: Option<String>,
    #[serde(default)]
    pub away_team_name: Option<String>,
    #[serde(default)]
    pub home_team_logo: Option<String>,
    #[serde(default)]
    pub away_team_logo: Option<String>,
}

impl Fixture {
    pub fn involves(&self, team_id: i64) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// The other side of the match from `team_id`'s point of view.
    pub fn opponent_of(&self, team_id: i64) -> i64 {
        if self.home_team_id == team_id {
            self.away_team_id
        } else {
            self.home_team_id
        }
    }

    pub fn opponent_name(&self, team_id: i64) -> Option<&str> {
        if self.home_team_id == team_id {
            self.away_team_name.as_deref()
        } else {
            self.home_team_name.as_deref()
        }
    }
}

/// Which half of a team's record is being looked at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn as_str(self) -> &'static str {
        match self {
            Venue::Home => "home",
            Venue::Away => "away",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Average produced ("for") and conceded ("against") per match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAverages {
    #[serde(rename = "for")]
    pub for_avg: f64,
    #[serde(rename = "against")]
    pub against_avg: f64,
}

/// Per-category averages of one team in one venue context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamAverageStats {
    pub team_id: i64,
    pub venue: Option<Venue>,
    /// Number of matches the averages were taken over, when known
    pub matches: Option<u32>,
    pub categories: HashMap<Category, StatAverages>,
}

impl TeamAverageStats {
    pub fn new(team_id: i64, venue: Venue) -> Self {
        TeamAverageStats {
            team_id,
            venue: Some(venue),
            matches: None,
            categories: HashMap::new(),
        }
    }

    /// Missing categories read as zero averages.
    pub fn get(&self, category: Category) -> StatAverages {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    pub fn set(&mut self, category: Category, averages: StatAverages) {
        self.categories.insert(category, averages);
    }
}
