use crate::db::models::Fixture;

use super::category::{Category, Side};

/// Which side of the fixture `team_id` played on. Anything that is not the
/// home team is treated as the away side.
pub fn side_of(fixture: &Fixture, team_id: i64) -> Side {
    if fixture.home_team_id == team_id {
        Side::Home
    } else {
        Side::Away
    }
}

/// Statistic value of one match for `team_id`.
///
/// `performing = true` reads what the team produced, `false` what it
/// conceded (the opponent's value). Returns `None` when the fixture carries
/// no statistics.
pub fn stat_value(fixture: &Fixture, category: Category, team_id: i64, performing: bool) -> Option<u32> {
    let stats = fixture.statistics.as_ref()?;
    let own = side_of(fixture, team_id);
    let side = if performing { own } else { own.opposite() };
    Some(category.fields().get(stats, side))
}

/// String-keyed variant for callers holding raw category ids.
pub fn stat_value_by_id(fixture: &Fixture, category_id: &str, team_id: i64, performing: bool) -> Option<u32> {
    stat_value(fixture, Category::from_id(category_id)?, team_id, performing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MatchStatistics;
    use crate::test_support::{make_fixture, AWAY, HOME};

    fn shots(home: u32, away: u32) -> MatchStatistics {
        MatchStatistics {
            shots_home: home,
            shots_away: away,
            ..Default::default()
        }
    }

    #[test]
    fn test_home_team_performing_reads_home_side() {
        let f = make_fixture(1, HOME, AWAY, Some(shots(10, 4)));
        assert_eq!(stat_value(&f, Category::Shots, HOME, true), Some(10));
    }

    #[test]
    fn test_conceded_reads_opponent_side() {
        let f = make_fixture(1, HOME, AWAY, Some(shots(10, 4)));
        assert_eq!(stat_value(&f, Category::Shots, HOME, false), Some(4));
        assert_eq!(stat_value(&f, Category::Shots, AWAY, true), Some(4));
        assert_eq!(stat_value(&f, Category::Shots, AWAY, false), Some(10));
    }

    #[test]
    fn test_missing_statistics_is_none_not_zero() {
        let f = make_fixture(1, HOME, AWAY, None);
        assert_eq!(stat_value(&f, Category::Corners, HOME, true), None);
    }

    #[test]
    fn test_cards_combine_yellow_and_red() {
        let stats = MatchStatistics {
            yellow_cards_away: 2,
            red_cards_away: 1,
            ..Default::default()
        };
        let f = make_fixture(1, HOME, AWAY, Some(stats));
        assert_eq!(stat_value(&f, Category::Cards, AWAY, true), Some(3));
        assert_eq!(stat_value(&f, Category::Cards, HOME, true), Some(0));
    }

    #[test]
    fn test_unknown_category_id_is_none() {
        let f = make_fixture(1, HOME, AWAY, Some(shots(10, 4)));
        assert_eq!(stat_value_by_id(&f, "goals", HOME, true), None);
        assert_eq!(stat_value_by_id(&f, "tiri", HOME, true), Some(10));
    }

    #[test]
    fn test_extraction_does_not_touch_input() {
        let f = make_fixture(1, HOME, AWAY, Some(shots(10, 4)));
        let before = f.clone();
        let _ = stat_value(&f, Category::Shots, HOME, true);
        assert_eq!(f, before);
    }
}
