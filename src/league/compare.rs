use serde::Serialize;

use crate::analysis::{Category, Direction, Side};
use crate::db::models::TeamAverageStats;

/// One "for" or "against" line of the comparison, home team's home averages
/// next to away team's away averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub direction: Direction,
    pub home: f64,
    pub away: f64,
    /// Bar widths; 50/50 when both values are zero
    pub home_share: f64,
    pub away_share: f64,
    pub lower_is_better: bool,
    /// `None` on a tie
    pub better: Option<Side>,
}

impl ComparisonRow {
    fn new(direction: Direction, home: f64, away: f64, lower_is_better: bool) -> Self {
        let total = home + away;
        let (home_share, away_share) = if total > 0.0 {
            (home / total * 100.0, away / total * 100.0)
        } else {
            (50.0, 50.0)
        };
        let better = if home == away {
            None
        } else if (home < away) == lower_is_better {
            Some(Side::Home)
        } else {
            Some(Side::Away)
        };
        ComparisonRow {
            direction,
            home,
            away,
            home_share,
            away_share,
            lower_is_better,
            better,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedSplit {
    pub home: f64,
    pub away: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub category: Category,
    pub label: &'static str,
    pub rows: Vec<ComparisonRow>,
    pub expected: ExpectedSplit,
}

/// Side-by-side averages for every category.
///
/// For fouls, cards and offsides the team producing fewer is better; for
/// "against" rows the preference flips.
pub fn compare_teams(home: &TeamAverageStats, away: &TeamAverageStats) -> Vec<CategoryComparison> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let h = home.get(category);
            let a = away.get(category);
            let negative = category.is_negative();
            let expected_home = (h.for_avg + a.against_avg) / 2.0;
            let expected_away = (a.for_avg + h.against_avg) / 2.0;
            CategoryComparison {
                category,
                label: category.label(),
                rows: vec![
                    ComparisonRow::new(Direction::For, h.for_avg, a.for_avg, negative),
                    ComparisonRow::new(Direction::Against, h.against_avg, a.against_avg, !negative),
                ],
                expected: ExpectedSplit {
                    home: expected_home,
                    away: expected_away,
                    total: expected_home + expected_away,
                },
            }
        })
        .collect()
}
