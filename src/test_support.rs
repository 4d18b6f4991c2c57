//! Shared builders for unit tests.

use chrono::{Duration, TimeZone, Utc};

use crate::db::models::{Fixture, FixtureStatus, MatchStatistics};

pub(crate) const HOME: i64 = 100;
pub(crate) const AWAY: i64 = 200;

/// A finished fixture on day `id` of the season.
pub(crate) fn make_fixture(id: i64, home: i64, away: i64, stats: Option<MatchStatistics>) -> Fixture {
    Fixture {
        id,
        date: Utc.with_ymd_and_hms(2024, 9, 1, 15, 0, 0).unwrap() + Duration::days(id),
        league_id: 135,
        season: 2024,
        round: Some(format!("Regular Season - {}", id)),
        home_team_id: home,
        away_team_id: away,
        status: FixtureStatus::Finished,
        score_home: Some(1),
        score_away: Some(0),
        statistics: stats,
        home_team_name: Some(format!("Team {}", home)),
        away_team_name: Some(format!("Team {}", away)),
        home_team_logo: None,
        away_team_logo: None,
    }
}

/// Statistics where only corners are recorded.
pub(crate) fn corners(home: u32, away: u32) -> MatchStatistics {
    MatchStatistics {
        corners_home: home,
        corners_away: away,
        ..Default::default()
    }
}
