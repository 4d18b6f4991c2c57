use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::future::{try_join, try_join4};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::line_stats::match_hit;
use crate::analysis::{
    averages_from_fixtures, classify, expected_value, line_stats, match_total, played_at, stat_value,
    suggest_lines, AnalysisMode, Category, Direction, Line, LineStatsResult, Recommendation, SuggestedLines,
};
use crate::db::models::{Fixture, Team, TeamAverageStats, Venue};
use crate::league::{
    compare_teams, compute_standings, matchday, optimal_matchday, team_form, CategoryComparison, MatchResult,
    Matchday, Standing, FORM_LENGTH,
};
use crate::store::FixtureStore;

/// Parameters of one analysis: an upcoming fixture plus what to look at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub league_id: i64,
    pub season: i32,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub category: Category,
    pub mode: AnalysisMode,
    pub direction: Direction,
    /// Caller's line; the suggested main line is used when absent
    pub line: Option<Line>,
}

/// Where a team's averages came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragesSource {
    Store,
    Fixtures,
    Unavailable,
}

/// One past match of a team as shown in the analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    pub fixture_id: i64,
    pub date: DateTime<Utc>,
    pub opponent_id: i64,
    pub opponent_name: Option<String>,
    pub team_value: Option<u32>,
    pub opponent_value: Option<u32>,
    pub match_total: Option<u32>,
    /// `None` when the match carries no statistics
    pub hit: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAnalysis {
    pub team_id: i64,
    pub team: Option<Team>,
    pub venue: Venue,
    /// Whether the percentages count what the team produced or conceded
    pub performing: bool,
    pub averages_source: AveragesSource,
    pub averages: Option<TeamAverageStats>,
    pub stats: Option<LineStatsResult>,
    pub percentage_label: Option<String>,
    pub matches: Vec<MatchRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchAnalysis {
    pub request: AnalysisRequest,
    pub expected_value: f64,
    pub suggestion: Option<SuggestedLines>,
    /// Line the percentages were computed against
    pub line: Option<Line>,
    pub home: TeamAnalysis,
    pub away: TeamAnalysis,
    pub badges: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub home_team: Option<Team>,
    pub away_team: Option<Team>,
    pub home_averages_source: AveragesSource,
    pub away_averages_source: AveragesSource,
    pub categories: Vec<CategoryComparison>,
    pub home_form: Vec<MatchResult>,
    pub away_form: Vec<MatchResult>,
}

/// Wires store lookups into the statistics core.
#[derive(Clone)]
pub struct AnalysisEngine {
    store: Arc<dyn FixtureStore>,
}

impl AnalysisEngine {
    pub fn new(store: Arc<dyn FixtureStore>) -> Self {
        AnalysisEngine { store }
    }

    pub fn store(&self) -> &Arc<dyn FixtureStore> {
        &self.store
    }

    /// Full analysis of an upcoming fixture. Both teams' data is fetched
    /// concurrently and must all arrive before anything is computed.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<MatchAnalysis> {
        let AnalysisRequest {
            league_id,
            season,
            home_team_id,
            away_team_id,
            category,
            mode,
            direction,
            ..
        } = request;

        let store = self.store.as_ref();
        let ((home_fixtures, away_fixtures, home_stored, away_stored), (home_team, away_team)) = try_join(
            try_join4(
                store.list_fixtures(home_team_id, league_id, season),
                store.list_fixtures(away_team_id, league_id, season),
                store.team_averages(home_team_id, league_id, season, Venue::Home),
                store.team_averages(away_team_id, league_id, season, Venue::Away),
            ),
            try_join(store.get_team(home_team_id), store.get_team(away_team_id)),
        )
        .await
        .with_context(|| {
            format!(
                "Failed to load data for {} vs {} from {}",
                home_team_id,
                away_team_id,
                store.name()
            )
        })?;

        let (home_avg, home_source) = resolve_averages(home_stored, &home_fixtures, home_team_id, Venue::Home);
        let (away_avg, away_source) = resolve_averages(away_stored, &away_fixtures, away_team_id, Venue::Away);

        let empty_home = TeamAverageStats::new(home_team_id, Venue::Home);
        let empty_away = TeamAverageStats::new(away_team_id, Venue::Away);
        let ev = expected_value(
            home_avg.as_ref().unwrap_or(&empty_home),
            away_avg.as_ref().unwrap_or(&empty_away),
            category,
            mode,
            direction,
        );
        let suggestion = suggest_lines(ev, mode);
        let line = match mode {
            AnalysisMode::HeadToHead => None,
            _ => request
                .line
                .or_else(|| suggestion.as_ref().and_then(|s| s.main_line)),
        };

        // Team mode: "for" reads the home side's production against the away
        // side's concessions, "against" the reverse.
        let (home_performing, away_performing) = match mode {
            AnalysisMode::TeamUnderOver => (direction.is_for(), !direction.is_for()),
            AnalysisMode::MatchUnderOver | AnalysisMode::HeadToHead => (true, true),
        };

        let home = team_analysis(
            home_team_id,
            home_team,
            Venue::Home,
            &home_fixtures,
            (home_avg, home_source),
            category,
            line,
            home_performing,
            mode,
        );
        let away = team_analysis(
            away_team_id,
            away_team,
            Venue::Away,
            &away_fixtures,
            (away_avg, away_source),
            category,
            line,
            away_performing,
            mode,
        );

        let (expected_home, expected_away) = match mode {
            AnalysisMode::HeadToHead => (
                home.averages.as_ref().map(|a| a.get(category).for_avg),
                away.averages.as_ref().map(|a| a.get(category).for_avg),
            ),
            _ => (None, None),
        };
        // Badges need both hit rates, and a line outside head-to-head
        let line_ready = line.is_some() || mode == AnalysisMode::HeadToHead;
        let badges = match (home.stats, away.stats) {
            (Some(h), Some(a)) if line_ready => {
                classify(Some(h.percentage), Some(a.percentage), mode, expected_home, expected_away)
            }
            _ => Vec::new(),
        };

        info!(
            "Analysis {} vs {} [{} / {} / {:?}]: ev={:.2}, line={}, home={}, away={}, {} badge(s)",
            home_team_id,
            away_team_id,
            category,
            mode,
            direction,
            ev,
            line.map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
            home.percentage_label.as_deref().unwrap_or("n/a"),
            away.percentage_label.as_deref().unwrap_or("n/a"),
            badges.len()
        );

        Ok(MatchAnalysis {
            request,
            expected_value: ev,
            suggestion,
            line,
            home,
            away,
            badges,
        })
    }

    pub async fn standings(&self, league_id: i64, season: i32) -> Result<Vec<Standing>> {
        let fixtures = self
            .store
            .list_league_fixtures(league_id, season)
            .await
            .with_context(|| format!("Failed to load fixtures of league {} ({})", league_id, season))?;
        let table = compute_standings(&fixtures);
        debug!("Standings for league {} ({}): {} teams", league_id, season, table.len());
        Ok(table)
    }

    /// Fixtures of one matchday; the most relevant one when `number` is
    /// not given.
    pub async fn matchday(
        &self,
        league_id: i64,
        season: i32,
        number: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Matchday> {
        let fixtures = self
            .store
            .list_league_fixtures(league_id, season)
            .await
            .with_context(|| format!("Failed to load fixtures of league {} ({})", league_id, season))?;
        let number = number.unwrap_or_else(|| optimal_matchday(&fixtures, now));
        Ok(matchday(&fixtures, number))
    }

    /// Home team's home averages next to the away team's away averages.
    pub async fn compare(
        &self,
        league_id: i64,
        season: i32,
        home_team_id: i64,
        away_team_id: i64,
    ) -> Result<TeamComparison> {
        let store = self.store.as_ref();
        let ((home_fixtures, away_fixtures, home_stored, away_stored), (home_team, away_team)) = try_join(
            try_join4(
                store.list_fixtures(home_team_id, league_id, season),
                store.list_fixtures(away_team_id, league_id, season),
                store.team_averages(home_team_id, league_id, season, Venue::Home),
                store.team_averages(away_team_id, league_id, season, Venue::Away),
            ),
            try_join(store.get_team(home_team_id), store.get_team(away_team_id)),
        )
        .await
        .with_context(|| format!("Failed to load data for {} vs {}", home_team_id, away_team_id))?;

        let (home_avg, home_source) = resolve_averages(home_stored, &home_fixtures, home_team_id, Venue::Home);
        let (away_avg, away_source) = resolve_averages(away_stored, &away_fixtures, away_team_id, Venue::Away);
        let home_avg = home_avg.unwrap_or_else(|| TeamAverageStats::new(home_team_id, Venue::Home));
        let away_avg = away_avg.unwrap_or_else(|| TeamAverageStats::new(away_team_id, Venue::Away));

        Ok(TeamComparison {
            home_team,
            away_team,
            home_averages_source: home_source,
            away_averages_source: away_source,
            categories: compare_teams(&home_avg, &away_avg),
            home_form: team_form(&home_fixtures, home_team_id, FORM_LENGTH),
            away_form: team_form(&away_fixtures, away_team_id, FORM_LENGTH),
        })
    }
}

fn resolve_averages(
    stored: Option<TeamAverageStats>,
    fixtures: &[Fixture],
    team_id: i64,
    venue: Venue,
) -> (Option<TeamAverageStats>, AveragesSource) {
    if let Some(averages) = stored {
        return (Some(averages), AveragesSource::Store);
    }
    match averages_from_fixtures(fixtures, team_id, venue) {
        Some(averages) => {
            debug!(
                "No stored {} averages for team {}, derived from {} fixtures",
                venue,
                team_id,
                averages.matches.unwrap_or(0)
            );
            (Some(averages), AveragesSource::Fixtures)
        }
        None => {
            warn!("No {} averages available for team {}", venue, team_id);
            (None, AveragesSource::Unavailable)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn team_analysis(
    team_id: i64,
    team: Option<Team>,
    venue: Venue,
    fixtures: &[Fixture],
    (averages, averages_source): (Option<TeamAverageStats>, AveragesSource),
    category: Category,
    line: Option<Line>,
    performing: bool,
    mode: AnalysisMode,
) -> TeamAnalysis {
    let matches = played_at(fixtures, team_id, venue);
    let stats = line_stats(&matches, team_id, category, line, performing, mode);
    let rows = matches
        .iter()
        .map(|f| {
            let opponent_id = f.opponent_of(team_id);
            MatchRow {
                fixture_id: f.id,
                date: f.date,
                opponent_id,
                opponent_name: f.opponent_name(team_id).map(str::to_string),
                team_value: stat_value(f, category, team_id, true),
                opponent_value: stat_value(f, category, opponent_id, true),
                match_total: f.statistics.as_ref().map(|_| match_total(f, category).total),
                hit: match_hit(f, team_id, category, line, performing, mode),
            }
        })
        .collect();

    TeamAnalysis {
        team_id,
        team,
        venue,
        performing,
        averages_source,
        averages,
        percentage_label: stats.as_ref().map(LineStatsResult::percentage_label),
        stats,
        matches: rows,
    }
}
