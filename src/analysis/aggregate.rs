use serde::Serialize;

use crate::db::models::{Fixture, StatAverages, TeamAverageStats, Venue};

use super::category::{Category, Side};
use super::extract::side_of;

/// Both sides' values of one match for a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchTotal {
    pub total: u32,
    pub home_value: u32,
    pub away_value: u32,
}

/// Sum of both sides for `category`.
///
/// A fixture without statistics yields an all-zero total rather than
/// `None`; callers that must tell "no data" from "zero" check
/// `fixture.statistics` themselves.
pub fn match_total(fixture: &Fixture, category: Category) -> MatchTotal {
    let Some(stats) = fixture.statistics.as_ref() else {
        return MatchTotal::default();
    };
    let fields = category.fields();
    let home_value = fields.get(stats, Side::Home);
    let away_value = fields.get(stats, Side::Away);
    MatchTotal {
        total: home_value + away_value,
        home_value,
        away_value,
    }
}

pub fn is_finished(fixture: &Fixture) -> bool {
    fixture.status.is_finished()
}

/// Finished fixtures in which `team_id` played at `venue`, newest first.
pub fn played_at(fixtures: &[Fixture], team_id: i64, venue: Venue) -> Vec<Fixture> {
    let mut matches: Vec<Fixture> = fixtures
        .iter()
        .filter(|f| is_finished(f))
        .filter(|f| match venue {
            Venue::Home => f.home_team_id == team_id,
            Venue::Away => f.away_team_id == team_id,
        })
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.date.cmp(&a.date));
    matches
}

/// Averages computed from raw match statistics, used when the store has no
/// precomputed averages for the team.
///
/// Only finished fixtures at `venue` that carry statistics contribute.
/// Returns `None` when there is no such fixture.
pub fn averages_from_fixtures(fixtures: &[Fixture], team_id: i64, venue: Venue) -> Option<TeamAverageStats> {
    let with_stats: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| is_finished(f))
        .filter(|f| match venue {
            Venue::Home => f.home_team_id == team_id,
            Venue::Away => f.away_team_id == team_id,
        })
        .filter(|f| f.statistics.is_some())
        .collect();
    if with_stats.is_empty() {
        return None;
    }

    let n = with_stats.len() as f64;
    let mut averages = TeamAverageStats::new(team_id, venue);
    averages.matches = Some(with_stats.len() as u32);

    for category in Category::ALL {
        let fields = category.fields();
        let (mut produced, mut conceded) = (0u64, 0u64);
        for fixture in &with_stats {
            if let Some(stats) = fixture.statistics.as_ref() {
                let own = side_of(fixture, team_id);
                produced += fields.get(stats, own) as u64;
                conceded += fields.get(stats, own.opposite()) as u64;
            }
        }
        averages.set(
            category,
            StatAverages {
                for_avg: produced as f64 / n,
                against_avg: conceded as f64 / n,
            },
        );
    }
    Some(averages)
}
