use crate::db::models::TeamAverageStats;

use super::category::{AnalysisMode, Category, Direction};

/// Win probability used when neither team has produced anything.
pub const NO_INFORMATION_PCT: f64 = 50.0;

/// Expected value for the upcoming match from the two teams' venue averages.
///
/// Under/over modes return a count on the category's own scale; head-to-head
/// returns the home side's win percentage. Missing averages read as zero.
pub fn expected_value(
    home: &TeamAverageStats,
    away: &TeamAverageStats,
    category: Category,
    mode: AnalysisMode,
    direction: Direction,
) -> f64 {
    let h = home.get(category);
    let a = away.get(category);

    let value = match mode {
        AnalysisMode::TeamUnderOver => match direction {
            Direction::For => (h.for_avg + a.against_avg) / 2.0,
            Direction::Against => (h.against_avg + a.for_avg) / 2.0,
        },
        AnalysisMode::MatchUnderOver => {
            let home_side = (h.for_avg + a.against_avg) / 2.0;
            let away_side = (a.for_avg + h.against_avg) / 2.0;
            home_side + away_side
        }
        AnalysisMode::HeadToHead => {
            let sum = h.for_avg + a.for_avg;
            if sum > 0.0 {
                h.for_avg / sum * 100.0
            } else {
                NO_INFORMATION_PCT
            }
        }
    };

    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{StatAverages, Venue};
    use approx::assert_relative_eq;

    fn averages(team_id: i64, venue: Venue, category: Category, for_avg: f64, against_avg: f64) -> TeamAverageStats {
        let mut stats = TeamAverageStats::new(team_id, venue);
        stats.set(category, StatAverages { for_avg, against_avg });
        stats
    }

    #[test]
    fn test_team_for_blends_own_attack_with_opponent_defence() {
        let home = averages(1, Venue::Home, Category::Shots, 12.0, 3.0);
        let away = averages(2, Venue::Away, Category::Shots, 5.0, 8.0);
        let ev = expected_value(&home, &away, Category::Shots, AnalysisMode::TeamUnderOver, Direction::For);
        assert_relative_eq!(ev, 10.0);
    }

    #[test]
    fn test_team_against_uses_the_other_pair() {
        let home = averages(1, Venue::Home, Category::Shots, 12.0, 3.0);
        let away = averages(2, Venue::Away, Category::Shots, 5.0, 8.0);
        let ev = expected_value(&home, &away, Category::Shots, AnalysisMode::TeamUnderOver, Direction::Against);
        assert_relative_eq!(ev, 4.0);
    }

    #[test]
    fn test_match_mode_sums_both_contributions() {
        let home = averages(1, Venue::Home, Category::Corners, 6.0, 4.0);
        let away = averages(2, Venue::Away, Category::Corners, 3.0, 5.0);
        // (6 + 5) / 2 + (3 + 4) / 2
        let ev = expected_value(&home, &away, Category::Corners, AnalysisMode::MatchUnderOver, Direction::For);
        assert_relative_eq!(ev, 9.0);
    }

    #[test]
    fn test_head_to_head_is_a_share_of_production() {
        let home = averages(1, Venue::Home, Category::Corners, 6.0, 0.0);
        let away = averages(2, Venue::Away, Category::Corners, 2.0, 0.0);
        let ev = expected_value(&home, &away, Category::Corners, AnalysisMode::HeadToHead, Direction::For);
        assert_relative_eq!(ev, 75.0);
    }

    #[test]
    fn test_head_to_head_without_data_is_exactly_fifty() {
        let home = TeamAverageStats::new(1, Venue::Home);
        let away = TeamAverageStats::new(2, Venue::Away);
        let ev = expected_value(&home, &away, Category::Fouls, AnalysisMode::HeadToHead, Direction::For);
        assert_eq!(ev, 50.0);
    }

    #[test]
    fn test_missing_category_reads_as_zero() {
        let home = averages(1, Venue::Home, Category::Shots, 12.0, 3.0);
        let away = TeamAverageStats::new(2, Venue::Away);
        let ev = expected_value(&home, &away, Category::Corners, AnalysisMode::TeamUnderOver, Direction::For);
        assert_eq!(ev, 0.0);
    }
}
