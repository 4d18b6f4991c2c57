use serde::Serialize;

use crate::db::models::Fixture;

use super::aggregate::match_total;
use super::category::{AnalysisMode, Category};
use super::extract::stat_value;
use super::line::Line;

/// Hit count of a set of matches against a line (or against the opponent
/// in head-to-head mode).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStatsResult {
    pub total: u32,
    pub over: u32,
    pub percentage: f64,
}

impl LineStatsResult {
    fn new(total: u32, over: u32) -> Self {
        Self {
            total,
            over,
            percentage: round1(over as f64 / total as f64 * 100.0),
        }
    }

    /// `"50.0"` style label.
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whether one match counts toward `over`, or `None` when it is not
/// eligible (missing statistics).
pub fn match_hit(
    fixture: &Fixture,
    team_id: i64,
    category: Category,
    line: Option<Line>,
    performing: bool,
    mode: AnalysisMode,
) -> Option<bool> {
    match mode {
        AnalysisMode::HeadToHead => {
            let own = stat_value(fixture, category, team_id, true)?;
            let opponent = stat_value(fixture, category, fixture.opponent_of(team_id), true)?;
            Some(own > opponent)
        }
        AnalysisMode::MatchUnderOver => {
            fixture.statistics.as_ref()?;
            let line = line?;
            Some(match_total(fixture, category).total as f64 > line.value())
        }
        AnalysisMode::TeamUnderOver => {
            let value = stat_value(fixture, category, team_id, performing)?;
            Some(value as f64 > line?.value())
        }
    }
}

/// Over/under (or head-to-head win) rate of `team_id` across `matches`.
///
/// `None` when there are no matches, when the mode needs a line and none is
/// given, or when no match carries the statistics needed.
pub fn line_stats(
    matches: &[Fixture],
    team_id: i64,
    category: Category,
    line: Option<Line>,
    performing: bool,
    mode: AnalysisMode,
) -> Option<LineStatsResult> {
    if matches.is_empty() || (mode.requires_line() && line.is_none()) {
        return None;
    }

    let (mut total, mut over) = (0u32, 0u32);
    for fixture in matches {
        if let Some(hit) = match_hit(fixture, team_id, category, line, performing, mode) {
            total += 1;
            if hit {
                over += 1;
            }
        }
    }

    if total == 0 {
        return None;
    }
    Some(LineStatsResult::new(total, over))
}
