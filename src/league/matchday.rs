use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::models::Fixture;

const ROUND_PREFIXES: [&str; 2] = ["matchday ", "regular season - "];

/// Matchday number from a round label such as `Regular Season - 12` or
/// `Matchday 12` (case-insensitive).
pub fn matchday_number(round: &str) -> Option<u32> {
    let lower = round.to_ascii_lowercase();
    ROUND_PREFIXES.iter().find_map(|prefix| {
        let start = lower.find(prefix)? + prefix.len();
        let digits: String = lower[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    })
}

fn fixture_matchday(fixture: &Fixture) -> Option<u32> {
    fixture.round.as_deref().and_then(matchday_number)
}

/// Fixtures grouped by matchday, ascending. Fixtures without a recognisable
/// round are left out.
pub fn group_by_matchday(fixtures: &[Fixture]) -> BTreeMap<u32, Vec<&Fixture>> {
    let mut groups: BTreeMap<u32, Vec<&Fixture>> = BTreeMap::new();
    for fixture in fixtures {
        if let Some(n) = fixture_matchday(fixture) {
            groups.entry(n).or_default().push(fixture);
        }
    }
    groups
}

/// The matchday to show first: the one holding the nearest upcoming unplayed
/// fixture, otherwise the last fully played matchday, otherwise 1.
pub fn optimal_matchday(fixtures: &[Fixture], now: DateTime<Utc>) -> u32 {
    let groups = group_by_matchday(fixtures);

    let next = groups
        .iter()
        .flat_map(|(n, group)| group.iter().map(move |f| (*n, *f)))
        .filter(|(_, f)| !f.status.is_finished() && f.date >= now)
        .min_by_key(|(n, f)| (f.date, *n))
        .map(|(n, _)| n);

    let last_completed = groups
        .iter()
        .filter(|(_, group)| group.iter().all(|f| f.status.is_finished()))
        .map(|(n, _)| *n)
        .max();

    next.or(last_completed).filter(|n| *n > 0).unwrap_or(1)
}

#[derive(Debug, Clone, Serialize)]
pub struct Matchday {
    pub number: u32,
    /// Every matchday number present in the season, ascending
    pub available: Vec<u32>,
    pub fixtures: Vec<Fixture>,
}

/// The fixtures of matchday `number`, by kick-off time.
pub fn matchday(fixtures: &[Fixture], number: u32) -> Matchday {
    let groups = group_by_matchday(fixtures);
    let mut selected: Vec<Fixture> = groups
        .get(&number)
        .map(|g| g.iter().map(|f| (*f).clone()).collect())
        .unwrap_or_default();
    selected.sort_by_key(|f| (f.date, f.id));
    Matchday {
        number,
        available: groups.keys().copied().collect(),
        fixtures: selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FixtureStatus;
    use crate::test_support::make_fixture;
    use chrono::{Duration, TimeZone};

    fn fixture(id: i64, round: u32, finished: bool, kickoff: DateTime<Utc>) -> Fixture {
        let mut f = make_fixture(id, 1, 2, None);
        f.round = Some(format!("Regular Season - {}", round));
        f.date = kickoff;
        if !finished {
            f.status = FixtureStatus::NotStarted;
        }
        f
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_matchday_number_formats() {
        assert_eq!(matchday_number("Regular Season - 12"), Some(12));
        assert_eq!(matchday_number("MATCHDAY 3"), Some(3));
        assert_eq!(matchday_number("regular season - 7 (replay)"), Some(7));
        assert_eq!(matchday_number("Quarter-finals"), None);
        assert_eq!(matchday_number("Matchday X"), None);
    }

    #[test]
    fn test_prefers_matchday_of_next_fixture() {
        let fixtures = vec![
            fixture(1, 5, true, now() - Duration::days(7)),
            fixture(2, 6, false, now() + Duration::days(2)),
            fixture(3, 7, false, now() + Duration::days(9)),
            // a postponed match from an earlier round, scheduled even later
            fixture(4, 4, false, now() + Duration::days(30)),
        ];
        assert_eq!(optimal_matchday(&fixtures, now()), 6);
    }

    #[test]
    fn test_falls_back_to_last_completed_matchday() {
        let fixtures = vec![
            fixture(1, 37, true, now() - Duration::days(14)),
            fixture(2, 38, true, now() - Duration::days(7)),
            // overdue and never played
            fixture(3, 36, false, now() - Duration::days(30)),
        ];
        assert_eq!(optimal_matchday(&fixtures, now()), 38);
    }

    #[test]
    fn test_defaults_to_first_matchday() {
        assert_eq!(optimal_matchday(&[], now()), 1);
        let mut no_round = fixture(1, 1, false, now() + Duration::days(1));
        no_round.round = None;
        assert_eq!(optimal_matchday(&[no_round], now()), 1);
    }

    #[test]
    fn test_matchday_selection() {
        let fixtures = vec![
            fixture(2, 6, false, now() + Duration::days(3)),
            fixture(1, 6, false, now() + Duration::days(2)),
            fixture(3, 7, false, now() + Duration::days(9)),
        ];
        let md = matchday(&fixtures, 6);
        assert_eq!(md.fixtures.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(md.available, vec![6, 7]);
        assert!(matchday(&fixtures, 12).fixtures.is_empty());
    }
}
