use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::db::models::Fixture;

/// Results kept in a standings row's form guide.
pub const FORM_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl MatchResult {
    fn from_goals(scored: i32, conceded: i32) -> Self {
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => MatchResult::Win,
            std::cmp::Ordering::Equal => MatchResult::Draw,
            std::cmp::Ordering::Less => MatchResult::Loss,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            MatchResult::Win => 3,
            MatchResult::Draw => 1,
            MatchResult::Loss => 0,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchResult::Win => "W",
            MatchResult::Draw => "D",
            MatchResult::Loss => "L",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub position: u32,
    pub team_id: i64,
    pub team_name: String,
    pub team_logo: Option<String>,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// Most recent results, oldest first
    pub form: Vec<MatchResult>,
}

impl Standing {
    fn new(team_id: i64, name: Option<&str>, logo: Option<&str>) -> Self {
        Standing {
            position: 0,
            team_id,
            team_name: name.map(str::to_string).unwrap_or_else(|| format!("Team {}", team_id)),
            team_logo: logo.map(str::to_string),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            form: Vec::new(),
        }
    }

    fn record(&mut self, scored: i32, conceded: i32) {
        let result = MatchResult::from_goals(scored, conceded);
        self.played += 1;
        self.goals_for += scored.max(0) as u32;
        self.goals_against += conceded.max(0) as u32;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
        self.points += result.points();
        match result {
            MatchResult::Win => self.won += 1,
            MatchResult::Draw => self.drawn += 1,
            MatchResult::Loss => self.lost += 1,
        }
        self.form.push(result);
        if self.form.len() > FORM_LENGTH {
            self.form.remove(0);
        }
    }
}

fn finished_with_score(fixture: &Fixture) -> Option<(i32, i32)> {
    if !fixture.status.is_finished() {
        return None;
    }
    Some((fixture.score_home?, fixture.score_away?))
}

/// League table from finished fixtures.
///
/// Every team appearing in a finished fixture gets a row; only fixtures
/// with both scores count toward the numbers. Ordered by points, goal
/// difference and goals scored, then team id.
pub fn compute_standings(fixtures: &[Fixture]) -> Vec<Standing> {
    let mut finished: Vec<&Fixture> = fixtures.iter().filter(|f| f.status.is_finished()).collect();
    finished.sort_by_key(|f| (f.date, f.id));

    let mut table: HashMap<i64, Standing> = HashMap::new();
    for f in &finished {
        table
            .entry(f.home_team_id)
            .or_insert_with(|| Standing::new(f.home_team_id, f.home_team_name.as_deref(), f.home_team_logo.as_deref()));
        table
            .entry(f.away_team_id)
            .or_insert_with(|| Standing::new(f.away_team_id, f.away_team_name.as_deref(), f.away_team_logo.as_deref()));
    }

    for f in &finished {
        let Some((home_goals, away_goals)) = finished_with_score(f) else {
            continue;
        };
        if let Some(home) = table.get_mut(&f.home_team_id) {
            home.record(home_goals, away_goals);
        }
        if let Some(away) = table.get_mut(&f.away_team_id) {
            away.record(away_goals, home_goals);
        }
    }

    let mut rows: Vec<Standing> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team_id.cmp(&b.team_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }
    rows
}

/// Last `n` results of `team_id`, oldest first.
pub fn team_form(fixtures: &[Fixture], team_id: i64, n: usize) -> Vec<MatchResult> {
    let mut played: Vec<(&Fixture, MatchResult)> = fixtures
        .iter()
        .filter(|f| f.involves(team_id))
        .filter_map(|f| {
            let (home, away) = finished_with_score(f)?;
            let result = if f.home_team_id == team_id {
                MatchResult::from_goals(home, away)
            } else {
                MatchResult::from_goals(away, home)
            };
            Some((f, result))
        })
        .collect();
    played.sort_by_key(|(f, _)| (f.date, f.id));
    let skip = played.len().saturating_sub(n);
    played.into_iter().skip(skip).map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FixtureStatus;
    use crate::test_support::make_fixture;

    const A: i64 = 1;
    const B: i64 = 2;
    const C: i64 = 3;

    fn result(id: i64, home: i64, away: i64, hg: i32, ag: i32) -> Fixture {
        let mut f = make_fixture(id, home, away, None);
        f.score_home = Some(hg);
        f.score_away = Some(ag);
        f
    }

    #[test]
    fn test_points_and_ordering() {
        let fixtures = vec![
            result(1, A, B, 2, 0),
            result(2, B, C, 1, 1),
            result(3, C, A, 0, 3),
            result(4, B, A, 2, 2),
        ];
        let table = compute_standings(&fixtures);
        let order: Vec<i64> = table.iter().map(|s| s.team_id).collect();
        assert_eq!(order, vec![A, B, C]);

        let a = &table[0];
        assert_eq!((a.played, a.won, a.drawn, a.lost, a.points), (3, 2, 1, 0, 7));
        assert_eq!((a.goals_for, a.goals_against, a.goal_difference), (7, 2, 5));
        assert_eq!(a.position, 1);
        assert_eq!(table[2].position, 3);
        assert_eq!(table[1].points, 2);
    }

    #[test]
    fn test_goal_difference_breaks_point_ties() {
        let fixtures = vec![result(1, A, C, 1, 0), result(2, B, C, 4, 0)];
        let table = compute_standings(&fixtures);
        assert_eq!(table[0].team_id, B);
        assert_eq!(table[1].team_id, A);
    }

    #[test]
    fn test_unfinished_and_scoreless_fixtures_are_ignored() {
        let mut upcoming = result(1, A, B, 0, 0);
        upcoming.status = FixtureStatus::NotStarted;
        let mut missing_score = result(2, A, C, 0, 0);
        missing_score.score_away = None;
        let table = compute_standings(&[upcoming, missing_score]);
        // A and C appear from the finished fixture, but nothing is counted
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|s| s.played == 0 && s.points == 0));
    }

    #[test]
    fn test_form_keeps_last_five_oldest_first() {
        let fixtures: Vec<Fixture> = (1..=7)
            .map(|i| if i % 2 == 0 { result(i, A, B, 0, 1) } else { result(i, A, B, 1, 0) })
            .collect();
        let table = compute_standings(&fixtures);
        let a = table.iter().find(|s| s.team_id == A).unwrap();
        use MatchResult::*;
        assert_eq!(a.form, vec![Win, Loss, Win, Loss, Win]);
        assert_eq!(team_form(&fixtures, B, 3), vec![Loss, Win, Loss]);
        assert_eq!(team_form(&fixtures, C, 5), vec![]);
    }

    #[test]
    fn test_names_fall_back_to_team_id() {
        let mut f = result(1, A, B, 1, 0);
        f.home_team_name = None;
        let table = compute_standings(&[f]);
        assert_eq!(table[0].team_name, "Team 1");
        assert_eq!(table[1].team_name, "Team 2");
    }
}
